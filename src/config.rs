//! Node configuration parameters
//!
//! Timing and radio parameters are fixed at build time; the defaults below
//! are the values flashed to the field.  LoRaWAN session credentials are
//! injected by `build.rs` from `node.toml`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Raw hex strings as written into `node.toml`.
#[derive(Debug, Clone, Copy)]
pub struct RawCredentials {
    pub dev_addr: &'static str,
    pub nwk_skey: &'static str,
    pub app_skey: &'static str,
}

include!(concat!(env!("OUT_DIR"), "/credentials.rs"));

/// What the scheduler does when an uplink is not acknowledged by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransmitPolicy {
    /// One attempt per cycle, no retry, no queue.  A lost reading costs
    /// less than keeping the node awake.
    BestEffort,
    /// Re-send up to `retries` more times, only on transient failures, so
    /// at most `retries + 1` sends per cycle.
    RetryTransient { retries: u8 },
}

/// Core node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Duty cycle ---
    /// Gas sensor pre-heat time before sampling (seconds)
    pub heat_secs: u32,
    /// Deep-sleep time per cycle (seconds, multiple of the tick period)
    pub sleep_secs: u32,
    /// Hardware watchdog interrupt period (seconds)
    pub tick_period_secs: u32,

    // --- Radio ---
    /// Advisory bound on radio bring-up (milliseconds)
    pub startup_timeout_ms: u32,
    /// LoRaWAN application port for uplinks
    pub radio_port: u8,
    /// Transceiver UART baud rate
    pub radio_baud: u32,
    /// Band argument for `mac reset` (868 or 433)
    pub radio_band_mhz: u16,
    /// Retry behaviour on failed uplinks
    pub transmit_policy: TransmitPolicy,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Duty cycle
            heat_secs: 5,
            sleep_secs: 120, // 15 watchdog ticks
            tick_period_secs: 8,

            // Radio
            startup_timeout_ms: 15_000,
            radio_port: 1,
            radio_baud: 57_600,
            radio_band_mhz: 868,
            transmit_policy: TransmitPolicy::BestEffort,
        }
    }
}

impl NodeConfig {
    /// Range-check every field.  Rejects, never clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_secs == 0 {
            return Err(ConfigError::ValidationFailed("tick period must be non-zero"));
        }
        if self.sleep_secs % self.tick_period_secs != 0 {
            return Err(ConfigError::ValidationFailed(
                "sleep time must be a multiple of the tick period",
            ));
        }
        if self.radio_port == 0 || self.radio_port > 223 {
            return Err(ConfigError::ValidationFailed("radio port outside 1..=223"));
        }
        if self.radio_band_mhz != 868 && self.radio_band_mhz != 433 {
            return Err(ConfigError::ValidationFailed("radio band must be 868 or 433"));
        }
        Ok(())
    }
}

/// ABP session identifiers.  Immutable once parsed.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCredentials {
    pub dev_addr: [u8; 4],
    pub nwk_skey: [u8; 16],
    pub app_skey: [u8; 16],
}

impl core::fmt::Debug for DeviceCredentials {
    // Keys stay out of the serial log.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceCredentials")
            .field("dev_addr", &self.dev_addr)
            .finish_non_exhaustive()
    }
}

impl DeviceCredentials {
    pub fn parse(raw: &RawCredentials) -> Result<Self, ConfigError> {
        Ok(Self {
            dev_addr: parse_hex(raw.dev_addr, "dev_addr")?,
            nwk_skey: parse_hex(raw.nwk_skey, "nwk_skey")?,
            app_skey: parse_hex(raw.app_skey, "app_skey")?,
        })
    }

    /// Credentials baked in by `build.rs`.
    pub fn from_build() -> Result<Self, ConfigError> {
        match BUILD_CREDENTIALS {
            Some(raw) => Self::parse(&raw),
            None => Err(ConfigError::MissingCredentials),
        }
    }
}

pub(crate) fn parse_hex<const N: usize>(s: &str, field: &'static str) -> Result<[u8; N], ConfigError> {
    let s = s.trim();
    if s.len() != N * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConfigError::BadHex(field));
    }
    let mut out = [0u8; N];
    for (byte, pair) in out.iter_mut().zip(s.as_bytes().chunks_exact(2)) {
        let pair = core::str::from_utf8(pair).map_err(|_| ConfigError::BadHex(field))?;
        *byte = u8::from_str_radix(pair, 16).map_err(|_| ConfigError::BadHex(field))?;
    }
    Ok(out)
}
