//! Sensor readings and the fixed 4-byte uplink payload.
//!
//! ```text
//!  byte  0        1        2        3
//!      ┌────────┬────────┬────────┬────────┐
//!      │ gas hi │ gas lo │ temp hi│ temp lo│
//!      └────────┴────────┴────────┴────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Exact length of every uplink.
pub const PAYLOAD_LEN: usize = 4;

/// Full-scale code of the 10-bit converter.
pub const ADC_MAX: u16 = 1023;

/// ADC reference configuration active while a sample was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reference {
    /// Smallest input span, highest resolution (gas sensor).
    LowRange,
    /// Default wide span (temperature sensor).
    FullRange,
}

/// One raw converter code, tagged with the reference it was taken under.
///
/// No filtering or calibration: a failed sample reads as a low value and
/// cannot be told apart from a genuine one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReading {
    pub raw: u16,
    pub reference: Reference,
}

impl SensorReading {
    pub fn new(raw: u16, reference: Reference) -> Self {
        Self { raw, reference }
    }
}

/// Big-endian gas/temperature pair, built once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload([u8; PAYLOAD_LEN]);

impl Payload {
    /// Pack both codes as big-endian 16-bit words, gas first.
    pub fn pack(gas: u16, temperature: u16) -> Self {
        let [g_hi, g_lo] = gas.to_be_bytes();
        let [t_hi, t_lo] = temperature.to_be_bytes();
        Self([g_hi, g_lo, t_hi, t_lo])
    }

    pub fn from_readings(gas: SensorReading, temperature: SensorReading) -> Self {
        Self::pack(gas.raw, temperature.raw)
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.0
    }

    pub fn gas(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    pub fn temperature(&self) -> u16 {
        u16::from_be_bytes([self.0[2], self.0[3]])
    }
}
