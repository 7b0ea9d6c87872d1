//! Authenticated access to the NMC web interface.
//!
//! The NMC has no API for the universal I/O probes, so readings are
//! scraped from its status page behind a form login. The session token
//! lives in the URL path and stays valid until the NMC decides
//! otherwise; validity is only discovered by using it.

use std::future::Future;
use std::sync::LazyLock;

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use tracing::debug;

use crate::config::Target;

/// The login form redirects to `/NMC/<token>/<page>` on success.
static SESSION_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/NMC/([^/]+)/").expect("session token pattern is valid")
});

/// NMC web operations used by the probe acquirer. A trait seam so the
/// one-login-one-retry flow can be tested without a device.
pub trait NmcApi: Send + Sync {
    /// Performs a fresh form login and caches the resulting session
    /// token on the target. Failure clears any cached token.
    fn login(&self, target: &mut Target) -> impl Future<Output = Result<String>> + Send;

    /// Fetches the probe status page using an existing session token.
    fn fetch_status_page(
        &self,
        target: &Target,
        token: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Real NMC client over reqwest. Cheap to clone; all clones share one
/// connection pool.
#[derive(Clone)]
pub struct NmcClient {
    http: reqwest::Client,
}

impl NmcClient {
    /// Builds the shared HTTP client. Certificate verification is off
    /// because NMCs ship self-signed certificates.
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("building NMC HTTP client")?;

        Ok(Self { http })
    }
}

impl NmcApi for NmcClient {
    async fn login(&self, target: &mut Target) -> Result<String> {
        target.nmc_session = None;

        let username = target
            .http_username
            .as_deref()
            .ok_or_else(|| anyhow!("target {} has no web username", target.name))?;
        let password = target
            .http_password
            .as_deref()
            .ok_or_else(|| anyhow!("target {} has no web password", target.name))?;

        let form = [
            ("prefLanguage", "00000000"),
            ("login_username", username),
            ("login_password", password),
            ("submit", "Log On"),
        ];

        let resp = self
            .http
            .post(format!("{}/Forms/login1", target.nmc_base_url()))
            .form(&form)
            .timeout(target.fetch_timeout)
            .send()
            .await
            .with_context(|| format!("NMC login request to {} failed", target.name))?;

        if !resp.status().is_success() {
            bail!("NMC login to {} returned {}", target.name, resp.status());
        }

        // The token only appears in the post-redirect URL.
        let final_url = resp.url().to_string();
        let token = SESSION_TOKEN_RE
            .captures(&final_url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                anyhow!("NMC login to {} redirected without a session token", target.name)
            })?;

        debug!(target = %target.name, "NMC login succeeded");
        target.nmc_session = Some(token.clone());
        Ok(token)
    }

    async fn fetch_status_page(&self, target: &Target, token: &str) -> Result<String> {
        let url = format!("{}/NMC/{}/uiostatus.htm", target.nmc_base_url(), token);

        let resp = self
            .http
            .get(&url)
            .timeout(target.fetch_timeout)
            .send()
            .await
            .with_context(|| format!("NMC status page request to {} failed", target.name))?;

        if !resp.status().is_success() {
            bail!(
                "NMC status page for {} returned {}",
                target.name,
                resp.status()
            );
        }

        resp.text()
            .await
            .with_context(|| format!("reading NMC status page body from {}", target.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_pattern() {
        let caps = SESSION_TOKEN_RE
            .captures("https://10.0.0.10/NMC/k4pRxGcSzrGWlBOMualanQ/uiostatus.htm")
            .unwrap();
        assert_eq!(&caps[1], "k4pRxGcSzrGWlBOMualanQ");
    }

    #[test]
    fn test_session_token_absent_from_login_page() {
        assert!(SESSION_TOKEN_RE
            .captures("https://10.0.0.10/logon.htm")
            .is_none());
    }
}
