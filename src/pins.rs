//! GPIO / peripheral pin assignments for the GasNode board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors: analog (ADC1, 10-bit)
// ---------------------------------------------------------------------------

/// MQ-series gas sensor, small-signal output.
/// ADC1 channel 6 (GPIO 34 on ESP32).
pub const GAS_ADC_GPIO: i32 = 34;
pub const GAS_ADC_CHANNEL: u32 = 6;

/// Analog temperature sensor, full-range output.
/// ADC1 channel 7 (GPIO 35 on ESP32).
pub const TEMP_ADC_GPIO: i32 = 35;
pub const TEMP_ADC_CHANNEL: u32 = 7;

// ---------------------------------------------------------------------------
// Heater (gas sensor pre-heat, MOSFET gate)
// ---------------------------------------------------------------------------

/// Digital output: HIGH = heater element energised.
pub const HEATER_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// LoRa transceiver (RN2483, UART2)
// ---------------------------------------------------------------------------

/// Active-low hardware reset line of the transceiver.
pub const RADIO_RESET_GPIO: i32 = 27;
pub const RADIO_TX_GPIO: i32 = 17;
pub const RADIO_RX_GPIO: i32 = 16;
