//! SQL construction for the apc_ups table.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::sample::Sample;

/// Column list in the table's fixed order. Every insert names the
/// columns explicitly so a schema gaining columns stays compatible.
const COLUMNS: &str = "name, model, sku, sensitivity, status, last_transfer_reason, \
     battery_needs_replacement, battery_status, output_load_watts, output_load_va, \
     battery_capacity_percent, battery_voltage, input_voltage, input_frequency, \
     output_voltage, output_frequency, output_load_percent, output_current_amps, \
     output_efficiency_percent, output_energy_usage_kwh, manufacture_date, \
     battery_last_replace_date, battery_next_replace_date, runtime_remaining_seconds, \
     on_battery_seconds, sensor_name, sensor_value, time";

/// Builds the single-row INSERT for one sample.
pub fn build_insert_sql(database: &str, table: &str, sample: &Sample) -> String {
    let name = escape_sql(&sample.name);
    let sensor_names = format_string_array(&sample.sensor_name);
    let sensor_values = format_f64_array(&sample.sensor_value);
    let needs_replacement = if sample.battery_needs_replacement {
        1
    } else {
        0
    };

    let mut sql = String::with_capacity(256 + COLUMNS.len() * 2);
    let _ = write!(sql, "INSERT INTO {database}.{table} ({COLUMNS}) VALUES (");
    let _ = write!(
        sql,
        "'{name}', {}, {}, {}, {}, {}, {needs_replacement}, {}, ",
        opt_string(&sample.model),
        opt_string(&sample.sku),
        opt_string(&sample.sensitivity),
        opt_string(&sample.status),
        opt_string(&sample.last_transfer_reason),
        opt_string(&sample.battery_status),
    );
    let _ = write!(
        sql,
        "{}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, ",
        opt_f64(sample.output_load_watts),
        opt_f64(sample.output_load_va),
        opt_f64(sample.battery_capacity_percent),
        opt_f64(sample.battery_voltage),
        opt_f64(sample.input_voltage),
        opt_f64(sample.input_frequency),
        opt_f64(sample.output_voltage),
        opt_f64(sample.output_frequency),
        opt_f64(sample.output_load_percent),
        opt_f64(sample.output_current_amps),
        opt_f64(sample.output_efficiency_percent),
        opt_f64(sample.output_energy_usage_kwh),
    );
    let _ = write!(
        sql,
        "{}, {}, {}, {}, {}, {sensor_names}, {sensor_values}, {})",
        opt_date(sample.manufacture_date),
        opt_date(sample.battery_last_replace_date),
        opt_date(sample.battery_next_replace_date),
        opt_u64(sample.runtime_remaining_seconds),
        opt_u64(sample.on_battery_seconds),
        sample.time,
    );

    sql
}

// --- SQL formatting helpers ---

/// Escapes a string value for SQL insertion (single-quote escaping).
fn escape_sql(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

fn opt_string(value: &Option<String>) -> String {
    match value {
        Some(s) => format!("'{}'", escape_sql(s)),
        None => "NULL".to_string(),
    }
}

fn opt_f64(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "NULL".to_string(),
    }
}

fn opt_u64(value: Option<u64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "NULL".to_string(),
    }
}

/// Formats an optional date as a ClickHouse Date literal.
fn opt_date(value: Option<NaiveDate>) -> String {
    match value {
        Some(d) => format!("'{}'", d.format("%Y-%m-%d")),
        None => "NULL".to_string(),
    }
}

fn format_string_array(values: &[String]) -> String {
    if values.is_empty() {
        return "[]".to_string();
    }

    let mut out = String::with_capacity(values.len() * 16 + 2);
    out.push('[');
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        let escaped = escape_sql(value);
        let _ = write!(out, "'{escaped}'");
    }
    out.push(']');
    out
}

fn format_f64_array(values: &[f64]) -> String {
    if values.is_empty() {
        return "[]".to_string();
    }

    let mut out = String::with_capacity(values.len() * 8 + 2);
    out.push('[');
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{value}");
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sample {
        Sample {
            name: "rack-ups-1".to_string(),
            model: Some("Smart-UPS X 2200".to_string()),
            sku: None,
            sensitivity: Some("high".to_string()),
            status: Some("2".to_string()),
            last_transfer_reason: None,
            battery_needs_replacement: false,
            battery_status: Some("2".to_string()),
            output_load_watts: Some(680.0),
            output_load_va: None,
            battery_capacity_percent: Some(100.0),
            battery_voltage: Some(54.6),
            input_voltage: None,
            input_frequency: None,
            output_voltage: Some(229.8),
            output_frequency: Some(50.0),
            output_load_percent: Some(68.0),
            output_current_amps: None,
            output_efficiency_percent: Some(0.0),
            output_energy_usage_kwh: Some(1234.56),
            manufacture_date: NaiveDate::from_ymd_opt(2021, 2, 3),
            battery_last_replace_date: None,
            battery_next_replace_date: NaiveDate::from_ymd_opt(2027, 5, 16),
            runtime_remaining_seconds: Some(10884),
            on_battery_seconds: None,
            sensor_name: vec![
                "Battery Temperature".to_string(),
                "Rack 3 Temperature".to_string(),
            ],
            sensor_value: vec![26.5, 24.0],
            time: 1700000000,
        }
    }

    #[test]
    fn test_escape_sql() {
        assert_eq!(escape_sql("hello"), "hello");
        assert_eq!(escape_sql("it's"), "it\\'s");
        assert_eq!(escape_sql("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_opt_helpers_render_null() {
        assert_eq!(opt_string(&None), "NULL");
        assert_eq!(opt_f64(None), "NULL");
        assert_eq!(opt_u64(None), "NULL");
        assert_eq!(opt_date(None), "NULL");
    }

    #[test]
    fn test_opt_date_literal() {
        assert_eq!(
            opt_date(NaiveDate::from_ymd_opt(2027, 5, 16)),
            "'2027-05-16'"
        );
    }

    #[test]
    fn test_format_string_array() {
        let values = vec!["Battery Temperature".to_string(), "Rack's Probe".to_string()];
        assert_eq!(
            format_string_array(&values),
            "['Battery Temperature', 'Rack\\'s Probe']"
        );
        assert_eq!(format_string_array(&[]), "[]");
    }

    #[test]
    fn test_format_f64_array() {
        assert_eq!(format_f64_array(&[26.5, 24.0]), "[26.5, 24]");
        assert_eq!(format_f64_array(&[]), "[]");
    }

    #[test]
    fn test_build_insert_sql_full_row() {
        let sql = build_insert_sql("power", "apc_ups", &sample());

        assert!(sql.starts_with("INSERT INTO power.apc_ups (name, model, sku,"));
        assert!(sql.contains("VALUES ('rack-ups-1', 'Smart-UPS X 2200', NULL, 'high', '2', NULL, 0, '2', "));
        assert!(sql.contains("680, NULL, 100, 54.6, NULL, NULL, 229.8, 50, 68, NULL, 0, 1234.56, "));
        assert!(sql.contains("'2021-02-03', NULL, '2027-05-16', 10884, NULL, "));
        assert!(sql.contains("['Battery Temperature', 'Rack 3 Temperature'], [26.5, 24], "));
        assert!(sql.ends_with("1700000000)"));
    }

    #[test]
    fn test_build_insert_sql_escapes_name() {
        let mut s = sample();
        s.name = "ups'); DROP TABLE".to_string();
        let sql = build_insert_sql("default", "apc_ups", &s);
        assert!(sql.contains("'ups\\'); DROP TABLE'"));
    }
}
