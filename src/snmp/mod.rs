pub mod oids;

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use snmp2::{AsyncSession, Oid, Value};

/// SNMP credentials for a single device.
#[derive(Debug, Clone)]
pub enum SnmpCredentials {
    /// SNMPv2c community string.
    V2c { community: String },
    /// SNMPv3 user with authentication (authNoPriv).
    V3 { username: String, password: String },
}

/// Bulk-GET capability used by the poller and the probe acquirer.
///
/// Returns a map of dotted numeric OID (no leading dot) to the value
/// rendered as a string: integers in decimal, octet strings as UTF-8 text.
pub trait BulkGet: Send + Sync {
    fn bulk_get(
        &self,
        roots: &[&str],
    ) -> impl std::future::Future<Output = Result<HashMap<String, String>>> + Send;
}

/// SNMP client for one device, backed by `snmp2`.
///
/// A fresh UDP session is opened per request; the NMCs in the fleet drop
/// idle sessions aggressively, so there is nothing worth keeping alive
/// between poll cycles.
pub struct SnmpClient {
    addr: String,
    credentials: SnmpCredentials,
    timeout: Duration,
}

impl SnmpClient {
    /// Creates a client for `host:port` with the given credentials.
    pub fn new(host: &str, port: u16, credentials: SnmpCredentials, timeout: Duration) -> Self {
        Self {
            addr: format!("{host}:{port}"),
            credentials,
            timeout,
        }
    }

    async fn open_session(&self) -> Result<AsyncSession> {
        match &self.credentials {
            SnmpCredentials::V2c { community } => {
                AsyncSession::new_v2c(&self.addr, community.as_bytes(), 2)
                    .await
                    .map_err(|e| anyhow!("opening SNMPv2c session to {}: {e:?}", self.addr))
            }
            SnmpCredentials::V3 { username, password } => {
                let security = snmp2::v3::Security::new(username.as_bytes(), password.as_bytes())
                    .with_auth_protocol(snmp2::v3::AuthProtocol::Sha1);
                AsyncSession::new_v3(&self.addr, 2, security)
                    .await
                    .map_err(|e| anyhow!("opening SNMPv3 session to {}: {e:?}", self.addr))
            }
        }
    }

    /// Walks one subtree with GETBULK, inserting decoded leaf values.
    async fn walk_subtree(
        session: &mut AsyncSession,
        root: &str,
        out: &mut HashMap<String, String>,
    ) -> Result<()> {
        let root_oid = parse_oid(root)?;
        let mut current = root_oid.to_owned();

        loop {
            let resp = session
                .getbulk(&[&current], 0, 20)
                .await
                .map_err(|e| anyhow!("SNMP GETBULK for {root} failed: {e:?}"))?;

            let mut advanced = false;
            for (oid, value) in resp.varbinds {
                if !oid.starts_with(&root_oid) {
                    return Ok(());
                }
                if let Some(text) = decode_value(&value) {
                    out.insert(oid_key(&oid), text);
                }
                current = oid.to_owned();
                advanced = true;
            }

            if !advanced {
                return Ok(());
            }
        }
    }
}

impl BulkGet for SnmpClient {
    async fn bulk_get(&self, roots: &[&str]) -> Result<HashMap<String, String>> {
        let fetch = async {
            let mut session = self.open_session().await?;
            let mut out = HashMap::new();
            for root in roots {
                Self::walk_subtree(&mut session, root, &mut out).await?;
            }
            Ok(out)
        };

        tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| anyhow!("SNMP request to {} timed out", self.addr))?
    }
}

/// Parses a dotted OID string into an `Oid`.
pub fn parse_oid(s: &str) -> Result<Oid<'static>> {
    let parts: Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();

    let parts = parts.with_context(|| format!("invalid OID {s}"))?;
    Oid::from(&parts).map_err(|e| anyhow!("building OID {s}: {e:?}"))
}

/// Renders an OID as the dotted map key used throughout the collector.
fn oid_key(oid: &Oid<'_>) -> String {
    oid.to_string().trim_start_matches('.').to_string()
}

/// Decodes an SNMP value into its string form; unsupported types are
/// skipped rather than surfaced as errors.
fn decode_value(value: &Value<'_>) -> Option<String> {
    match value {
        Value::Integer(n) => Some(n.to_string()),
        Value::OctetString(bytes) => Some(String::from_utf8_lossy(bytes).trim().to_string()),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => Some(n.to_string()),
        Value::Counter64(n) => Some(n.to_string()),
        Value::IpAddress(octets) => Some(format!(
            "{}.{}.{}.{}",
            octets[0], octets[1], octets[2], octets[3]
        )),
        Value::Boolean(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_oid_accepts_leading_dot() {
        assert!(parse_oid(".1.3.6.1.4.1.318.1.1.1").is_ok());
        assert!(parse_oid("1.3.6.1.4.1.318.1.1.1").is_ok());
    }

    #[test]
    fn test_parse_oid_rejects_garbage() {
        assert!(parse_oid("1.3.not-an-oid").is_err());
    }

    #[test]
    fn test_decode_value_integer() {
        assert_eq!(decode_value(&Value::Integer(1190)), Some("1190".to_string()));
    }

    #[test]
    fn test_decode_value_octet_string_trims() {
        assert_eq!(
            decode_value(&Value::OctetString(b" Smart-UPS X 2200 ")),
            Some("Smart-UPS X 2200".to_string()),
        );
    }

    #[test]
    fn test_decode_value_null_skipped() {
        assert_eq!(decode_value(&Value::Null), None);
    }
}
