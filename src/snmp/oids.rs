//! PowerNet MIB OIDs used by the collector.
//!
//! Keys match the map returned by [`super::BulkGet`]: dotted numeric form,
//! no leading dot, scalar instances with their `.0` suffix.

/// upsBasicIdentModel.0
pub const BASIC_IDENT_MODEL: &str = "1.3.6.1.4.1.318.1.1.1.1.1.1.0";
/// upsAdvIdentDateOfManufacture.0
pub const ADV_IDENT_DATE_OF_MANUFACTURE: &str = "1.3.6.1.4.1.318.1.1.1.1.2.2.0";
/// upsAdvIdentSkuNumber.0
pub const ADV_IDENT_SKU_NUMBER: &str = "1.3.6.1.4.1.318.1.1.1.1.2.5.0";

/// upsBasicBatteryStatus.0
pub const BASIC_BATTERY_STATUS: &str = "1.3.6.1.4.1.318.1.1.1.2.1.1.0";
/// upsBasicBatteryTimeOnBattery.0
pub const BASIC_BATTERY_TIME_ON_BATTERY: &str = "1.3.6.1.4.1.318.1.1.1.2.1.2.0";
/// upsBasicBatteryLastReplaceDate.0
pub const BASIC_BATTERY_LAST_REPLACE_DATE: &str = "1.3.6.1.4.1.318.1.1.1.2.1.3.0";
/// upsAdvBatteryRunTimeRemaining.0
pub const ADV_BATTERY_RUN_TIME_REMAINING: &str = "1.3.6.1.4.1.318.1.1.1.2.2.3.0";
/// upsAdvBatteryReplaceIndicator.0
pub const ADV_BATTERY_REPLACE_INDICATOR: &str = "1.3.6.1.4.1.318.1.1.1.2.2.4.0";
/// upsAdvBatteryRecommendedReplaceDate.0
pub const ADV_BATTERY_RECOMMENDED_REPLACE_DATE: &str = "1.3.6.1.4.1.318.1.1.1.2.2.21.0";
/// upsHighPrecBatteryCapacity.0 (tenths of a percent)
pub const HIGH_PREC_BATTERY_CAPACITY: &str = "1.3.6.1.4.1.318.1.1.1.2.3.1.0";
/// upsHighPrecBatteryActualVoltage.0 (tenths of a volt)
pub const HIGH_PREC_BATTERY_ACTUAL_VOLTAGE: &str = "1.3.6.1.4.1.318.1.1.1.2.3.4.0";
/// upsHighPrecExtdBatteryTemperature.0 (tenths of a degree C)
pub const HIGH_PREC_EXTD_BATTERY_TEMPERATURE: &str = "1.3.6.1.4.1.318.1.1.1.2.3.13.0";

/// upsAdvInputLineFailCause.0
pub const ADV_INPUT_LINE_FAIL_CAUSE: &str = "1.3.6.1.4.1.318.1.1.1.3.2.5.0";
/// upsHighPrecInputLineVoltage.0 (tenths of a volt)
pub const HIGH_PREC_INPUT_LINE_VOLTAGE: &str = "1.3.6.1.4.1.318.1.1.1.3.3.1.0";
/// upsHighPrecInputFrequency.0 (tenths of a hertz)
pub const HIGH_PREC_INPUT_FREQUENCY: &str = "1.3.6.1.4.1.318.1.1.1.3.3.4.0";

/// upsBasicOutputStatus.0
pub const BASIC_OUTPUT_STATUS: &str = "1.3.6.1.4.1.318.1.1.1.4.1.1.0";
/// upsAdvOutputActivePower.0 (watts)
pub const ADV_OUTPUT_ACTIVE_POWER: &str = "1.3.6.1.4.1.318.1.1.1.4.2.8.0";
/// upsAdvOutputApparentPower.0 (volt-amps)
pub const ADV_OUTPUT_APPARENT_POWER: &str = "1.3.6.1.4.1.318.1.1.1.4.2.9.0";
/// upsHighPrecOutputVoltage.0 (tenths of a volt)
pub const HIGH_PREC_OUTPUT_VOLTAGE: &str = "1.3.6.1.4.1.318.1.1.1.4.3.1.0";
/// upsHighPrecOutputFrequency.0 (tenths of a hertz)
pub const HIGH_PREC_OUTPUT_FREQUENCY: &str = "1.3.6.1.4.1.318.1.1.1.4.3.2.0";
/// upsHighPrecOutputLoad.0 (tenths of a percent)
pub const HIGH_PREC_OUTPUT_LOAD: &str = "1.3.6.1.4.1.318.1.1.1.4.3.3.0";
/// upsHighPrecOutputCurrent.0 (tenths of an amp)
pub const HIGH_PREC_OUTPUT_CURRENT: &str = "1.3.6.1.4.1.318.1.1.1.4.3.4.0";
/// upsHighPrecOutputEfficiency.0 (tenths of a percent, can go negative)
pub const HIGH_PREC_OUTPUT_EFFICIENCY: &str = "1.3.6.1.4.1.318.1.1.1.4.3.5.0";
/// upsHighPrecOutputEnergyUsage.0 (hundredths of a kWh)
pub const HIGH_PREC_OUTPUT_ENERGY_USAGE: &str = "1.3.6.1.4.1.318.1.1.1.4.3.6.0";

/// upsAdvConfigSensitivity.0
pub const ADV_CONFIG_SENSITIVITY: &str = "1.3.6.1.4.1.318.1.1.1.5.2.7.0";

/// uioSensorStatusTable subtree root (environmental probes).
pub const UIO_SENSOR_STATUS: &str = "1.3.6.1.4.1.318.1.1.25.1";
/// uioSensorStatusSensorName column prefix; rows keyed by trailing index.
pub const UIO_SENSOR_NAME_PREFIX: &str = "1.3.6.1.4.1.318.1.1.25.1.2.1.3.";
/// uioSensorStatusTemperatureDegC column prefix (whole degrees).
pub const UIO_SENSOR_TEMP_C_PREFIX: &str = "1.3.6.1.4.1.318.1.1.25.1.2.1.6.";
/// uioSensorStatusHumidity column prefix (whole percent).
pub const UIO_SENSOR_HUMIDITY_PREFIX: &str = "1.3.6.1.4.1.318.1.1.25.1.2.1.7.";

/// Primary fetch subtrees, split in two batches because a single request
/// exceeds the NMC's packet size limit.
pub const PRIMARY_BATCH_A: &[&str] = &[
    "1.3.6.1.4.1.318.1.1.1.1.1",
    "1.3.6.1.4.1.318.1.1.1.1.2",
    "1.3.6.1.4.1.318.1.1.1.2.1",
    "1.3.6.1.4.1.318.1.1.1.2.2",
    "1.3.6.1.4.1.318.1.1.1.2.3",
];

pub const PRIMARY_BATCH_B: &[&str] = &[
    "1.3.6.1.4.1.318.1.1.1.3.2",
    "1.3.6.1.4.1.318.1.1.1.3.3",
    "1.3.6.1.4.1.318.1.1.1.4.1",
    "1.3.6.1.4.1.318.1.1.1.4.2",
    "1.3.6.1.4.1.318.1.1.1.4.3",
    "1.3.6.1.4.1.318.1.1.1.5.2",
];
