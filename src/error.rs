//! Unified error types for the GasNode firmware.
//!
//! A single `Error` enum that every subsystem converts into.  All variants
//! are `Copy` so they travel through events and logs without allocation.
//! None of these ever stop the duty cycle: the scheduler logs them and
//! moves on.

use core::fmt;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The radio transceiver failed or replied with something unusable.
    Radio(RadioError),
    /// An actuator output could not be driven.
    Actuator(ActuatorError),
    /// Configuration or credentials are invalid.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Radio errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// No reply line arrived before the serial read timeout.
    NoResponse,
    /// The serial peripheral itself failed (write or read error).
    Serial,
    /// A reply line did not fit the line buffer.
    LineOverflow,
    /// The module answered, but not with what the command expects.
    UnexpectedResponse,
    /// The module rejected a parameter (`invalid_param`, `invalid_data_len`).
    InvalidParam,
    /// Uplink attempted before a session was established.
    NotJoined,
    /// The join procedure was refused (`denied`).
    JoinDenied,
    /// Duty-cycle or channel limits hold the module back (`no_free_ch`, `busy`, `silent`).
    Busy,
    /// The MAC layer reported a transmission error (`mac_err`).
    TxFailed,
    /// Frame counter rolled over; the session must be re-personalised.
    FrameCounterExhausted,
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => write!(f, "no response"),
            Self::Serial => write!(f, "serial I/O failed"),
            Self::LineOverflow => write!(f, "reply line too long"),
            Self::UnexpectedResponse => write!(f, "unexpected response"),
            Self::InvalidParam => write!(f, "invalid parameter"),
            Self::NotJoined => write!(f, "not joined"),
            Self::JoinDenied => write!(f, "join denied"),
            Self::Busy => write!(f, "no free channel"),
            Self::TxFailed => write!(f, "transmission failed"),
            Self::FrameCounterExhausted => write!(f, "frame counter exhausted"),
        }
    }
}

impl RadioError {
    /// Worth trying again next cycle without any change on the node.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::NoResponse | Self::Serial | Self::UnexpectedResponse | Self::Busy | Self::TxFailed
        )
    }
}

impl std::error::Error for RadioError {}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl std::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The firmware was built without a `node.toml`.
    MissingCredentials,
    /// A key or address is not valid hex of the expected length.
    BadHex(&'static str),
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "built without credentials"),
            Self::BadHex(field) => write!(f, "{field} is not valid hex"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}
