use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::snmp::SnmpCredentials;

/// Top-level configuration for the collector.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Logging verbosity (debug, info, warn, error). Default: "info".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum samples buffered between pollers and the sink writer.
    /// Default: 50.
    #[serde(default = "default_queue_limit")]
    pub queue_limit: usize,

    /// Default poll interval for devices without their own. Default: 30s.
    #[serde(default = "default_fetch_interval", with = "humantime_serde")]
    pub fetch_interval: Duration,

    /// Default per-request timeout for devices without their own.
    /// Default: 15s.
    #[serde(default = "default_fetch_timeout", with = "humantime_serde")]
    pub fetch_timeout: Duration,

    /// ClickHouse connection configuration.
    #[serde(default)]
    pub clickhouse: ClickHouseConfig,

    /// The UPS fleet.
    #[serde(default)]
    pub ups: Vec<UpsConfig>,
}

/// ClickHouse connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClickHouseConfig {
    /// ClickHouse native protocol address (host:port).
    #[serde(default)]
    pub endpoint: String,

    /// Target database name. Default: "default".
    #[serde(default = "default_database")]
    pub database: String,

    /// Target table name. Default: "apc_ups".
    #[serde(default = "default_table")]
    pub table: String,

    /// ClickHouse username.
    #[serde(default)]
    pub username: String,

    /// ClickHouse password.
    #[serde(default)]
    pub password: String,
}

/// One UPS entry as written in the config file. Resolved into a
/// [`Target`] at startup; invalid entries are skipped with a logged
/// reason rather than failing the whole fleet.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsConfig {
    /// Display name, also the `name` column in every sample.
    #[serde(default)]
    pub name: String,

    /// Device address (IP or hostname).
    #[serde(default)]
    pub host: String,

    /// SNMP UDP port. Default: 161.
    #[serde(default = "default_snmp_port")]
    pub snmp_port: u16,

    /// SNMPv2c community string. Mutually exclusive with the v3 fields.
    #[serde(default)]
    pub community: Option<String>,

    /// SNMPv3 username (authNoPriv, SHA-1).
    #[serde(default)]
    pub snmp_username: Option<String>,

    /// SNMPv3 authentication passphrase.
    #[serde(default)]
    pub snmp_password: Option<String>,

    /// Poll interval override.
    #[serde(default, with = "humantime_serde::option")]
    pub interval: Option<Duration>,

    /// Request timeout override.
    #[serde(default, with = "humantime_serde::option")]
    pub timeout: Option<Duration>,

    /// How to obtain environmental probe readings. Default: disabled.
    #[serde(default)]
    pub fetch_probes: ProbeStrategy,

    /// NMC web port override. Defaults to 80 or 443 by scheme.
    #[serde(default)]
    pub http_port: Option<u16>,

    /// NMC web username, required for http/https probe scraping.
    #[serde(default)]
    pub http_username: Option<String>,

    /// NMC web password, required for http/https probe scraping.
    #[serde(default)]
    pub http_password: Option<String>,

    /// Nameplate watt rating, used when the device model has no direct
    /// output power OID.
    #[serde(default)]
    pub rated_watts: Option<f64>,

    /// Nameplate VA rating, same fallback as `rated_watts`.
    #[serde(default)]
    pub rated_va: Option<f64>,

    /// Fallback SKU for devices that do not report a part number.
    #[serde(default)]
    pub sku: Option<String>,
}

/// Probe acquisition strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStrategy {
    #[default]
    Disabled,
    Snmp,
    Http,
    Https,
}

/// A validated device, exclusively owned by its poller task. The cached
/// NMC session lives here so no cross-task state is needed.
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub host: String,
    pub snmp_port: u16,
    pub credentials: SnmpCredentials,
    pub fetch_interval: Duration,
    pub fetch_timeout: Duration,
    pub probe_strategy: ProbeStrategy,
    pub http_port: u16,
    pub http_username: Option<String>,
    pub http_password: Option<String>,
    pub rated_watts: Option<f64>,
    pub rated_va: Option<f64>,
    pub sku: Option<String>,
    pub nmc_session: Option<String>,
}

impl Target {
    /// Base URL of the device's web interface.
    pub fn nmc_base_url(&self) -> String {
        let scheme = match self.probe_strategy {
            ProbeStrategy::Https => "https",
            _ => "http",
        };
        format!("{scheme}://{}:{}", self.host, self.http_port)
    }
}

// --- Default value functions ---

fn default_log_level() -> String {
    "info".to_string()
}

fn default_queue_limit() -> usize {
    50
}

fn default_fetch_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_database() -> String {
    "default".to_string()
}

fn default_table() -> String {
    "apc_ups".to_string()
}

fn default_snmp_port() -> u16 {
    161
}

// --- Default trait impls ---

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            queue_limit: default_queue_limit(),
            fetch_interval: default_fetch_interval(),
            fetch_timeout: default_fetch_timeout(),
            clickhouse: ClickHouseConfig::default(),
            ups: Vec::new(),
        }
    }
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            database: default_database(),
            table: default_table(),
            username: String::new(),
            password: String::new(),
        }
    }
}

// --- Validation and loading ---

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;

        let cfg: Config = serde_yaml::from_str(&data)
            .with_context(|| format!("parsing config file {}", path.display()))?;

        cfg.validate()?;

        Ok(cfg)
    }

    /// Validate the configuration for required fields and consistency.
    pub fn validate(&self) -> Result<()> {
        if self.clickhouse.endpoint.is_empty() {
            bail!("clickhouse.endpoint is required");
        }

        if self.queue_limit == 0 {
            bail!("queue_limit must be positive");
        }

        if self.fetch_interval.is_zero() {
            bail!("fetch_interval must be positive");
        }

        if self.ups.is_empty() {
            bail!("at least one ups entry is required");
        }

        Ok(())
    }

    /// Resolves the configured fleet into runtime targets. Entries with
    /// missing credentials are skipped with a logged reason; zero valid
    /// targets is fatal.
    pub fn resolve_targets(&self) -> Result<Vec<Target>> {
        let mut targets = Vec::with_capacity(self.ups.len());

        for ups in &self.ups {
            match self.resolve_target(ups) {
                Ok(target) => targets.push(target),
                Err(err) => {
                    warn!(name = %ups.name, host = %ups.host, %err, "skipping invalid ups entry");
                }
            }
        }

        if targets.is_empty() {
            bail!("no valid ups targets after validation");
        }

        Ok(targets)
    }

    fn resolve_target(&self, ups: &UpsConfig) -> Result<Target> {
        if ups.name.is_empty() {
            bail!("ups entry has no name");
        }
        if ups.host.is_empty() {
            bail!("ups entry has no host");
        }

        let credentials = match (&ups.community, &ups.snmp_username, &ups.snmp_password) {
            (Some(community), None, None) if !community.is_empty() => SnmpCredentials::V2c {
                community: community.clone(),
            },
            (None, Some(username), Some(password))
                if !username.is_empty() && !password.is_empty() =>
            {
                SnmpCredentials::V3 {
                    username: username.clone(),
                    password: password.clone(),
                }
            }
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                bail!("community and snmp_username/snmp_password are mutually exclusive")
            }
            _ => bail!("needs either community or snmp_username + snmp_password"),
        };

        if matches!(ups.fetch_probes, ProbeStrategy::Http | ProbeStrategy::Https)
            && (ups.http_username.is_none() || ups.http_password.is_none())
        {
            bail!("http/https probe scraping needs http_username and http_password");
        }

        let http_port = ups.http_port.unwrap_or(match ups.fetch_probes {
            ProbeStrategy::Https => 443,
            _ => 80,
        });

        Ok(Target {
            name: ups.name.clone(),
            host: ups.host.clone(),
            snmp_port: ups.snmp_port,
            credentials,
            fetch_interval: ups.interval.unwrap_or(self.fetch_interval),
            fetch_timeout: ups.timeout.unwrap_or(self.fetch_timeout),
            probe_strategy: ups.fetch_probes,
            http_port,
            http_username: ups.http_username.clone(),
            http_password: ups.http_password.clone(),
            rated_watts: ups.rated_watts,
            rated_va: ups.rated_va,
            sku: ups.sku.clone(),
            nmc_session: None,
        })
    }
}
