use chrono::NaiveDate;

/// One poll cycle's complete derived telemetry for a single UPS.
///
/// Produced by a poller, consumed exactly once by the sink writer. Numeric
/// gauges are `None` when the device did not report the underlying OID;
/// a missing value is never stored as zero. The `sensor_name` and
/// `sensor_value` vectors are parallel: equal length, matching order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub model: Option<String>,
    pub sku: Option<String>,

    /// Enumeration codes stored as received from the device; decoding the
    /// PowerNet value tables is left to the query side.
    pub sensitivity: Option<String>,
    pub status: Option<String>,
    pub last_transfer_reason: Option<String>,
    pub battery_needs_replacement: bool,
    pub battery_status: Option<String>,

    pub output_load_watts: Option<f64>,
    pub output_load_va: Option<f64>,
    pub battery_capacity_percent: Option<f64>,
    pub battery_voltage: Option<f64>,
    pub input_voltage: Option<f64>,
    pub input_frequency: Option<f64>,
    pub output_voltage: Option<f64>,
    pub output_frequency: Option<f64>,
    pub output_load_percent: Option<f64>,
    pub output_current_amps: Option<f64>,
    pub output_efficiency_percent: Option<f64>,
    pub output_energy_usage_kwh: Option<f64>,

    pub manufacture_date: Option<NaiveDate>,
    pub battery_last_replace_date: Option<NaiveDate>,
    pub battery_next_replace_date: Option<NaiveDate>,

    pub runtime_remaining_seconds: Option<u64>,
    pub on_battery_seconds: Option<u64>,

    /// Environmental sensor readings: battery temperature first when
    /// present, then probe-derived sensors in discovery order.
    pub sensor_name: Vec<String>,
    pub sensor_value: Vec<f64>,

    /// Capture timestamp, UTC epoch seconds.
    pub time: u64,
}

impl Sample {
    /// Appends one sensor reading, keeping the parallel vectors aligned.
    pub fn push_sensor(&mut self, name: String, value: f64) {
        self.sensor_name.push(name);
        self.sensor_value.push(value);
    }
}
