//! Environmental probe acquisition.
//!
//! Two paths to the same readings: the SNMP uioSensorStatusTable (whole
//! degrees only) or scraping the NMC's uiostatus.htm page, which shows
//! 0.5 degree increments. Either path failing is non-fatal; the cycle's
//! primary sample is delivered with whatever sensors were obtained.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::{ProbeStrategy, Target};
use crate::nmc::NmcApi;
use crate::snmp::{oids, BulkGet};

/// One row of the NMC's probe status table. Temperature cells read like
/// `26.5&deg;&nbsp;C`; the humidity cell is `45%&nbsp;RH` or
/// `Not Available`.
static PROBE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "<a href=\"uiocfg\\.htm\\?sensor=\\d\" alt=\"Edit\" title=\"Edit\">([^<]*)</a></td>\\r\\n\
         <td><span class=\"se-icon-f4-selection text-success\"></span>&nbsp;Normal</td>\\r\\n\
         <td>([^&]*)&deg;&nbsp;(F|C)</td>\\r\\n\
         <td>(?:(\\d{1,2})%&nbsp;RH|Not Available)</td>",
    )
    .expect("probe row pattern is valid")
});

/// A normalized environmental reading, e.g. ("Rack 3 Temperature", 26.5).
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReading {
    pub name: String,
    pub value: f64,
}

/// Acquires probe readings per the target's configured strategy.
pub async fn acquire<C, N>(snmp: &C, nmc: &N, target: &mut Target) -> Vec<ProbeReading>
where
    C: BulkGet,
    N: NmcApi,
{
    match target.probe_strategy {
        ProbeStrategy::Disabled => Vec::new(),
        ProbeStrategy::Snmp => acquire_snmp(snmp, target).await,
        ProbeStrategy::Http | ProbeStrategy::Https => acquire_http(nmc, target).await,
    }
}

async fn acquire_snmp<C: BulkGet>(snmp: &C, target: &Target) -> Vec<ProbeReading> {
    match snmp.bulk_get(&[oids::UIO_SENSOR_STATUS]).await {
        Ok(raw) => correlate_snmp_probes(&raw),
        Err(err) => {
            warn!(target = %target.name, %err, "probe SNMP fetch failed");
            Vec::new()
        }
    }
}

/// Scrapes uiostatus.htm. A stale session usually serves the login page,
/// which parses to zero probes, so an empty first parse is treated the
/// same as a failed request: exactly one fresh login and one retry.
async fn acquire_http<N: NmcApi>(nmc: &N, target: &mut Target) -> Vec<ProbeReading> {
    if let Some(token) = target.nmc_session.clone() {
        match nmc.fetch_status_page(target, &token).await {
            Ok(html) => {
                let probes = parse_status_page(&html);
                if !probes.is_empty() {
                    return probes;
                }
                debug!(target = %target.name, "cached NMC session yielded no probes, re-logging in");
            }
            Err(err) => {
                debug!(target = %target.name, %err, "cached NMC session failed, re-logging in");
            }
        }
    }

    let token = match nmc.login(target).await {
        Ok(token) => token,
        Err(err) => {
            warn!(target = %target.name, %err, "NMC login failed, skipping probes this cycle");
            return Vec::new();
        }
    };

    match nmc.fetch_status_page(target, &token).await {
        Ok(html) => parse_status_page(&html),
        Err(err) => {
            warn!(target = %target.name, %err, "probe scrape failed after fresh login");
            Vec::new()
        }
    }
}

/// Parses the probe status page into readings. Fahrenheit converts to
/// Celsius; humidity is emitted only when the NMC reports one.
pub fn parse_status_page(html: &str) -> Vec<ProbeReading> {
    let mut out = Vec::new();

    for caps in PROBE_ROW_RE.captures_iter(html) {
        let label = caps[1].trim();
        let Ok(raw_temp) = caps[2].trim().parse::<f64>() else {
            continue;
        };

        let celsius = if &caps[3] == "F" {
            (raw_temp - 32.0) * 5.0 / 9.0
        } else {
            raw_temp
        };
        out.push(ProbeReading {
            name: format!("{label} Temperature"),
            value: celsius,
        });

        if let Some(humidity) = caps.get(4).and_then(|m| m.as_str().parse::<f64>().ok()) {
            out.push(ProbeReading {
                name: format!("{label} Humidity"),
                value: humidity,
            });
        }
    }

    out
}

/// Correlates uioSensorStatusTable rows by their shared numeric suffix.
/// The raw map has no order, so resolution is two-pass: names first,
/// then temperature and humidity columns sorted by row index.
pub fn correlate_snmp_probes(raw: &HashMap<String, String>) -> Vec<ProbeReading> {
    let mut names: HashMap<u64, &str> = HashMap::new();
    let mut temps: Vec<(u64, f64)> = Vec::new();
    let mut humidities: Vec<(u64, f64)> = Vec::new();

    for (oid, value) in raw {
        if let Some(idx) = row_index(oid, oids::UIO_SENSOR_NAME_PREFIX) {
            names.insert(idx, value);
        } else if let Some(idx) = row_index(oid, oids::UIO_SENSOR_TEMP_C_PREFIX) {
            if let Ok(v) = value.parse() {
                temps.push((idx, v));
            }
        } else if let Some(idx) = row_index(oid, oids::UIO_SENSOR_HUMIDITY_PREFIX) {
            if let Ok(v) = value.parse() {
                humidities.push((idx, v));
            }
        }
    }

    temps.sort_unstable_by_key(|(idx, _)| *idx);
    humidities.sort_unstable_by_key(|(idx, _)| *idx);

    let mut out = Vec::new();
    for (idx, value) in temps {
        if let Some(name) = names.get(&idx) {
            out.push(ProbeReading {
                name: format!("{name} Temperature"),
                value,
            });
        }
    }
    for (idx, value) in humidities {
        if let Some(name) = names.get(&idx) {
            out.push(ProbeReading {
                name: format!("{name} Humidity"),
                value,
            });
        }
    }

    out
}

fn row_index(oid: &str, prefix: &str) -> Option<u64> {
    oid.strip_prefix(prefix)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeStrategy;
    use anyhow::{bail, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn target(strategy: ProbeStrategy) -> Target {
        Target {
            name: "rack-ups-1".to_string(),
            host: "10.0.0.10".to_string(),
            snmp_port: 161,
            credentials: crate::snmp::SnmpCredentials::V2c {
                community: "public".to_string(),
            },
            fetch_interval: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(15),
            probe_strategy: strategy,
            http_port: 443,
            http_username: Some("apc".to_string()),
            http_password: Some("apc".to_string()),
            rated_watts: None,
            rated_va: None,
            sku: None,
            nmc_session: Some("stale-token".to_string()),
        }
    }

    fn probe_row(label: &str, temp: &str, unit: &str, humidity: Option<&str>) -> String {
        let humidity_cell = match humidity {
            Some(h) => format!("{h}%&nbsp;RH"),
            None => "Not Available".to_string(),
        };
        format!(
            "<tr>\r\n<td><a href=\"uiocfg.htm?sensor=1\" alt=\"Edit\" title=\"Edit\">{label}</a></td>\r\n\
             <td><span class=\"se-icon-f4-selection text-success\"></span>&nbsp;Normal</td>\r\n\
             <td>{temp}&deg;&nbsp;{unit}</td>\r\n\
             <td>{humidity_cell}</td>\r\n</tr>\r\n"
        )
    }

    #[test]
    fn test_parse_status_page_fahrenheit_converts() {
        let html = probe_row("Server Room", "98.6", "F", None);
        let probes = parse_status_page(&html);

        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].name, "Server Room Temperature");
        assert!((probes[0].value - 37.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_status_page_humidity_only_when_present() {
        let html = format!(
            "{}{}",
            probe_row("Rack 3", "26.5", "C", Some("45")),
            probe_row("Rack 4", "24.0", "C", None),
        );
        let probes = parse_status_page(&html);

        let names: Vec<&str> = probes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Rack 3 Temperature",
                "Rack 3 Humidity",
                "Rack 4 Temperature",
            ],
        );
        assert_eq!(probes[0].value, 26.5);
        assert_eq!(probes[1].value, 45.0);
    }

    #[test]
    fn test_parse_status_page_login_page_yields_nothing() {
        assert!(parse_status_page("<html><body>Log On</body></html>").is_empty());
    }

    #[test]
    fn test_correlate_handles_any_arrival_order() {
        let raw: HashMap<String, String> = [
            (format!("{}2", oids::UIO_SENSOR_HUMIDITY_PREFIX), "51"),
            (format!("{}1", oids::UIO_SENSOR_TEMP_C_PREFIX), "24"),
            (format!("{}2", oids::UIO_SENSOR_NAME_PREFIX), "Rack B"),
            (format!("{}2", oids::UIO_SENSOR_TEMP_C_PREFIX), "27"),
            (format!("{}1", oids::UIO_SENSOR_NAME_PREFIX), "Rack A"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();

        let probes = correlate_snmp_probes(&raw);
        let names: Vec<&str> = probes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Rack A Temperature", "Rack B Temperature", "Rack B Humidity"],
        );
        assert_eq!(probes[0].value, 24.0);
        assert_eq!(probes[2].value, 51.0);
    }

    struct FailingSnmp;

    impl BulkGet for FailingSnmp {
        async fn bulk_get(
            &self,
            _roots: &[&str],
        ) -> Result<HashMap<String, String>> {
            bail!("timed out")
        }
    }

    /// NMC mock that always serves the login page, so every parse comes
    /// up empty and the acquirer's retry path is fully exercised.
    struct StaleSessionNmc {
        logins: AtomicUsize,
        fetches: AtomicUsize,
    }

    impl NmcApi for StaleSessionNmc {
        async fn login(&self, target: &mut Target) -> Result<String> {
            self.logins.fetch_add(1, Ordering::SeqCst);
            target.nmc_session = Some("fresh-token".to_string());
            Ok("fresh-token".to_string())
        }

        async fn fetch_status_page(&self, _target: &Target, _token: &str) -> Result<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok("<html><body>Log On</body></html>".to_string())
        }
    }

    #[tokio::test]
    async fn test_http_retry_logs_in_exactly_once() {
        let nmc = StaleSessionNmc {
            logins: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        };
        let mut target = target(ProbeStrategy::Https);

        let probes = acquire(&FailingSnmp, &nmc, &mut target).await;

        assert!(probes.is_empty());
        assert_eq!(nmc.logins.load(Ordering::SeqCst), 1);
        assert_eq!(nmc.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(target.nmc_session.as_deref(), Some("fresh-token"));
    }

    #[tokio::test]
    async fn test_snmp_probe_failure_is_non_fatal() {
        let nmc = StaleSessionNmc {
            logins: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        };
        let mut target = target(ProbeStrategy::Snmp);

        let probes = acquire(&FailingSnmp, &nmc, &mut target).await;
        assert!(probes.is_empty());
        assert_eq!(nmc.logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disabled_strategy_produces_nothing() {
        let nmc = StaleSessionNmc {
            logins: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        };
        let mut target = target(ProbeStrategy::Disabled);

        assert!(acquire(&FailingSnmp, &nmc, &mut target).await.is_empty());
    }
}
