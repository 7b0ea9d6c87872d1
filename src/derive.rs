//! Pure derivation of a typed [`Sample`] from raw SNMP values.
//!
//! Every rule here is field-local: a value that is absent or fails to
//! parse degrades that one field to `None` and never aborts the rest of
//! the sample.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::Target;
use crate::sample::Sample;
use crate::snmp::oids;

/// Raw indicator value the NMC reports when the battery self-test has
/// flagged the pack for replacement.
const BATTERY_NEEDS_REPLACING: &str = "batteryNeedsReplacing";

/// Derives the primary sample for one poll cycle. Probe readings are
/// merged in afterwards by the poller; the only sensor emitted here is
/// the internal battery temperature, which always sorts first.
pub fn derive_sample(raw: &HashMap<String, String>, target: &Target, time: u64) -> Sample {
    let load_raw = numeric(raw, oids::HIGH_PREC_OUTPUT_LOAD);

    let mut sample = Sample {
        name: target.name.clone(),
        model: text(raw, oids::BASIC_IDENT_MODEL).map(str::to_string),
        sku: text(raw, oids::ADV_IDENT_SKU_NUMBER)
            .map(str::to_string)
            .or_else(|| target.sku.clone()),

        sensitivity: text(raw, oids::ADV_CONFIG_SENSITIVITY).map(str::to_string),
        status: text(raw, oids::BASIC_OUTPUT_STATUS).map(str::to_string),
        last_transfer_reason: text(raw, oids::ADV_INPUT_LINE_FAIL_CAUSE).map(str::to_string),
        battery_needs_replacement: text(raw, oids::ADV_BATTERY_REPLACE_INDICATOR)
            == Some(BATTERY_NEEDS_REPLACING),
        battery_status: text(raw, oids::BASIC_BATTERY_STATUS).map(str::to_string),

        output_load_watts: output_power(
            numeric(raw, oids::ADV_OUTPUT_ACTIVE_POWER),
            target.rated_watts,
            load_raw,
        ),
        output_load_va: output_power(
            numeric(raw, oids::ADV_OUTPUT_APPARENT_POWER),
            target.rated_va,
            load_raw,
        ),
        battery_capacity_percent: scaled(raw, oids::HIGH_PREC_BATTERY_CAPACITY, 10.0),
        battery_voltage: scaled(raw, oids::HIGH_PREC_BATTERY_ACTUAL_VOLTAGE, 10.0),
        input_voltage: scaled(raw, oids::HIGH_PREC_INPUT_LINE_VOLTAGE, 10.0),
        input_frequency: scaled(raw, oids::HIGH_PREC_INPUT_FREQUENCY, 10.0),
        output_voltage: scaled(raw, oids::HIGH_PREC_OUTPUT_VOLTAGE, 10.0),
        output_frequency: scaled(raw, oids::HIGH_PREC_OUTPUT_FREQUENCY, 10.0),
        output_load_percent: load_raw.map(|v| v / 10.0),
        output_current_amps: scaled(raw, oids::HIGH_PREC_OUTPUT_CURRENT, 10.0),
        // Firmware can report small negative noise near zero load.
        output_efficiency_percent: scaled(raw, oids::HIGH_PREC_OUTPUT_EFFICIENCY, 10.0)
            .map(|v| v.max(0.0)),
        output_energy_usage_kwh: scaled(raw, oids::HIGH_PREC_OUTPUT_ENERGY_USAGE, 100.0),

        manufacture_date: text(raw, oids::ADV_IDENT_DATE_OF_MANUFACTURE).and_then(parse_date),
        battery_last_replace_date: text(raw, oids::BASIC_BATTERY_LAST_REPLACE_DATE)
            .and_then(parse_date),
        battery_next_replace_date: text(raw, oids::ADV_BATTERY_RECOMMENDED_REPLACE_DATE)
            .and_then(parse_date),

        runtime_remaining_seconds: text(raw, oids::ADV_BATTERY_RUN_TIME_REMAINING)
            .and_then(parse_duration_seconds),
        on_battery_seconds: text(raw, oids::BASIC_BATTERY_TIME_ON_BATTERY)
            .and_then(parse_duration_seconds),

        sensor_name: Vec::new(),
        sensor_value: Vec::new(),

        time,
    };

    if let Some(temp) = scaled(raw, oids::HIGH_PREC_EXTD_BATTERY_TEMPERATURE, 10.0) {
        sample.push_sensor("Battery Temperature".to_string(), temp);
    }

    sample
}

/// Looks up a raw value, treating empty strings as absent.
fn text<'a>(raw: &'a HashMap<String, String>, oid: &str) -> Option<&'a str> {
    raw.get(oid).map(String::as_str).filter(|s| !s.is_empty())
}

fn numeric(raw: &HashMap<String, String>, oid: &str) -> Option<f64> {
    text(raw, oid).and_then(|s| s.parse::<f64>().ok())
}

/// Divides a raw fixed-point integer down to the physical unit.
fn scaled(raw: &HashMap<String, String>, oid: &str, divisor: f64) -> Option<f64> {
    numeric(raw, oid).map(|v| v / divisor)
}

/// Prefers the device-reported power; falls back to the nameplate rating
/// scaled by the output load when the device model omits the direct OID.
/// The raw load value is in tenths of a percent, i.e. permille.
fn output_power(direct: Option<f64>, rated: Option<f64>, load_raw: Option<f64>) -> Option<f64> {
    direct.or_else(|| Some(rated? * (load_raw? / 1000.0)))
}

/// Parses `MM/DD/YYYY` or `MM/DD/YY`, choosing the format by length and
/// retrying the alternate before giving up.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let (first, second) = if s.len() > 8 {
        ("%m/%d/%Y", "%m/%d/%y")
    } else {
        ("%m/%d/%y", "%m/%d/%Y")
    };

    NaiveDate::parse_from_str(s, first)
        .or_else(|_| NaiveDate::parse_from_str(s, second))
        .ok()
}

/// Parses an NMC duration string `D:H:M:S.ss` into whole seconds,
/// flooring the fractional seconds.
fn parse_duration_seconds(s: &str) -> Option<u64> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 4 {
        return None;
    }

    let days: u64 = parts[0].trim().parse().ok()?;
    let hours: u64 = parts[1].trim().parse().ok()?;
    let minutes: u64 = parts[2].trim().parse().ok()?;
    let seconds: f64 = parts[3].trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    Some(days * 86400 + hours * 3600 + minutes * 60 + seconds as u64)
}
