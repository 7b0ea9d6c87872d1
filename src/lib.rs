//! APC UPS fleet telemetry collector.
//!
//! Polls each configured UPS over SNMP at its own cadence, derives a typed
//! sample from the raw PowerNet values, optionally enriches it with
//! environmental probe readings (SNMP or authenticated NMC scraping), and
//! feeds everything through a bounded queue into a ClickHouse writer that
//! retries failed inserts until the sink recovers.

pub mod config;
pub mod derive;
pub mod nmc;
pub mod poller;
pub mod probe;
pub mod sample;
pub mod sink;
pub mod snmp;
