//! K30 resource paths.
//!
//! Paths are relative to `{base}/{device}/resource`. Only the paths the
//! default [`PollPlan`](crate::PollPlan) reads, plus the common write
//! targets, are listed here.

// ── Heating circuit ──────────────────────────────────────────────────
pub const HC_ROOM_TEMP: &str = "/heatingCircuits/hc1/roomtemperature";
pub const HC_CURRENT_SETPOINT: &str = "/heatingCircuits/hc1/currentRoomSetpoint";
pub const HC_TEMP_OVERRIDE: &str = "/heatingCircuits/hc1/temporaryRoomSetpoint";
pub const HC_OPERATION_MODE: &str = "/heatingCircuits/hc1/operationMode";
pub const HC_ACTIVE_PROGRAM: &str = "/heatingCircuits/hc1/activeSwitchProgram";
pub const HC_STATUS: &str = "/heatingCircuits/hc1/overallStatus";
pub const HC_COMFORT2_TEMP: &str = "/heatingCircuits/hc1/temperatureLevels/comfort2";
pub const HC_ECO_TEMP: &str = "/heatingCircuits/hc1/temperatureLevels/eco";
pub const HC_MAX_FLOW_TEMP: &str = "/heatingCircuits/hc1/maxFlowTemp";
pub const HC_HEATING_TYPE: &str = "/heatingCircuits/hc1/heatingType";
pub const HC_CONTROL_TYPE: &str = "/heatingCircuits/hc1/controlType";
pub const HC_HEAT_COOL_MODE: &str = "/heatingCircuits/hc1/heatCoolMode";
pub const HC_SUWI_MODE: &str = "/heatingCircuits/hc1/currentSuWiMode";
pub const HC_SUWI_SWITCH: &str = "/heatingCircuits/hc1/suWiSwitchMode";
pub const HC_SUWI_THRESHOLD: &str = "/heatingCircuits/hc1/suWiThreshold";

// ── Hot water ────────────────────────────────────────────────────────
pub const DHW_ACTUAL_TEMP: &str = "/dhwCircuits/dhw1/actualTemp";
pub const DHW_CURRENT_SETPOINT: &str = "/dhwCircuits/dhw1/currentSetpoint";
pub const DHW_OPERATION_MODE: &str = "/dhwCircuits/dhw1/operationMode";
pub const DHW_STATUS: &str = "/dhwCircuits/dhw1/overallStatus";
pub const DHW_CHARGE: &str = "/dhwCircuits/dhw1/charge";
pub const DHW_CHARGE_DURATION: &str = "/dhwCircuits/dhw1/chargeDuration";
pub const DHW_SINGLE_CHARGE_SETPOINT: &str = "/dhwCircuits/dhw1/singleChargeSetpoint";
pub const DHW_REDUCE_TEMP_ON_ALARM: &str = "/dhwCircuits/dhw1/reduceTempOnAlarm";
pub const DHW_TD_MODE: &str = "/dhwCircuits/dhw1/tdMode";
pub const DHW_TEMP_ECO: &str = "/dhwCircuits/dhw1/temperatureLevels/eco";
pub const DHW_TEMP_HIGH: &str = "/dhwCircuits/dhw1/temperatureLevels/high";
pub const DHW_TEMP_LOW: &str = "/dhwCircuits/dhw1/temperatureLevels/low";

// ── Heat sources ─────────────────────────────────────────────────────
pub const HS_ACTUAL_MODULATION: &str = "/heatSources/actualModulation";
pub const HS_SUPPLY_TEMP: &str = "/heatSources/actualSupplyTemperature";
pub const HS_RETURN_TEMP: &str = "/heatSources/returnTemperature";
pub const HS_CH_STATUS: &str = "/heatSources/chStatus";
pub const HS_HEAT_DEMAND: &str = "/heatSources/actualHeatDemand";
pub const HS_NUM_STARTS: &str = "/heatSources/numberOfStarts";
pub const HS_HS1_STARTS: &str = "/heatSources/hs1/numberOfStarts";
pub const HS_STANDBY: &str = "/heatSources/standbyMode";
pub const HS_EM_STATUS: &str = "/heatSources/emStatus";

// ── System ───────────────────────────────────────────────────────────
pub const SYS_OUTDOOR_TEMP: &str = "/system/sensors/temperatures/outdoor_t1";
pub const SYS_TYPE: &str = "/system/type";

// ── Gateway ──────────────────────────────────────────────────────────
pub const GW_FIRMWARE: &str = "/gateway/versionFirmware";
pub const GW_HARDWARE: &str = "/gateway/versionHardware";
pub const GW_IP: &str = "/gateway/wifi/ip/ipv4";
pub const GW_MAC: &str = "/gateway/wifi/mac";
pub const GW_SSID: &str = "/gateway/wifi/ssid";
pub const GW_SERIAL: &str = "/gateway/serialId";
pub const GW_SW_PREFIX: &str = "/gateway/swPrefix";
pub const GW_TIMEZONE: &str = "/gateway/tzInfo/timeZone";

pub const NOTIFICATIONS: &str = "/notifications";

// ── Variable tariff ──────────────────────────────────────────────────
pub const VT_CH_OPTIMIZATION: &str = "/system/variableTariff/ch/optimization";
pub const VT_CH_HIGH_DELTA: &str = "/system/variableTariff/ch/highPriceDelta";
pub const VT_CH_LOW_DELTA: &str = "/system/variableTariff/ch/lowPriceDelta";
pub const VT_CH_MID_SETPOINT: &str = "/system/variableTariff/ch/midPriceSetpoint";
pub const VT_DHW_OPTIMIZATION: &str = "/system/variableTariff/dhw/optimization";
pub const VT_DHW_HIGH_ENABLE: &str = "/system/variableTariff/dhw/highPriceEnable";
pub const VT_DHW_LOW_ENABLE: &str = "/system/variableTariff/dhw/lowPriceEnable";

// ── Energy recordings ────────────────────────────────────────────────
pub const REC_TOTAL_COMPRESSOR: &str = "/recordings/heatSources/emon/total/compressor";
pub const REC_TOTAL_EHEATER: &str = "/recordings/heatSources/emon/total/eheater";
pub const REC_TOTAL_OUTPUT: &str = "/recordings/heatSources/emon/total/outputProduced";
pub const REC_CH_COMPRESSOR: &str = "/recordings/heatSources/emon/ch/compressor";
pub const REC_CH_EHEATER: &str = "/recordings/heatSources/emon/ch/eheater";
pub const REC_CH_OUTPUT: &str = "/recordings/heatSources/emon/ch/outputProduced";
pub const REC_DHW_COMPRESSOR: &str = "/recordings/heatSources/emon/dhw/compressor";
pub const REC_DHW_EHEATER: &str = "/recordings/heatSources/emon/dhw/eheater";
pub const REC_DHW_OUTPUT: &str = "/recordings/heatSources/emon/dhw/outputProduced";

/// Live readings and settings, re-read every cycle.
pub const LIVE: &[&str] = &[
    HC_ROOM_TEMP,
    HC_CURRENT_SETPOINT,
    HC_TEMP_OVERRIDE,
    HC_OPERATION_MODE,
    HC_ACTIVE_PROGRAM,
    HC_STATUS,
    HC_COMFORT2_TEMP,
    HC_ECO_TEMP,
    HC_MAX_FLOW_TEMP,
    HC_HEAT_COOL_MODE,
    HC_SUWI_MODE,
    HC_SUWI_THRESHOLD,
    HC_HEATING_TYPE,
    HC_CONTROL_TYPE,
    DHW_ACTUAL_TEMP,
    DHW_CURRENT_SETPOINT,
    DHW_OPERATION_MODE,
    DHW_STATUS,
    DHW_CHARGE,
    DHW_CHARGE_DURATION,
    DHW_SINGLE_CHARGE_SETPOINT,
    DHW_TEMP_ECO,
    DHW_TEMP_HIGH,
    DHW_TEMP_LOW,
    DHW_TD_MODE,
    DHW_REDUCE_TEMP_ON_ALARM,
    HS_ACTUAL_MODULATION,
    HS_SUPPLY_TEMP,
    HS_RETURN_TEMP,
    HS_CH_STATUS,
    HS_HEAT_DEMAND,
    HS_NUM_STARTS,
    HS_STANDBY,
    HS_EM_STATUS,
    SYS_OUTDOOR_TEMP,
    SYS_TYPE,
    GW_FIRMWARE,
    GW_HARDWARE,
    GW_IP,
    GW_MAC,
    GW_SSID,
    GW_SERIAL,
    GW_SW_PREFIX,
    GW_TIMEZONE,
    HS_HS1_STARTS,
    NOTIFICATIONS,
    VT_CH_OPTIMIZATION,
    VT_CH_HIGH_DELTA,
    VT_CH_LOW_DELTA,
    VT_CH_MID_SETPOINT,
    VT_DHW_OPTIMIZATION,
    VT_DHW_HIGH_ENABLE,
    VT_DHW_LOW_ENABLE,
];

/// Cumulative energy counters. They move slowly and are expensive for
/// the device to compute.
pub const ENERGY: &[&str] = &[
    REC_TOTAL_COMPRESSOR,
    REC_TOTAL_EHEATER,
    REC_TOTAL_OUTPUT,
    REC_CH_COMPRESSOR,
    REC_CH_EHEATER,
    REC_CH_OUTPUT,
    REC_DHW_COMPRESSOR,
    REC_DHW_EHEATER,
    REC_DHW_OUTPUT,
];
