//! Port traits: the boundary between the duty cycle and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DutyCycleScheduler (domain)
//! ```
//!
//! The [`DutyCycleScheduler`](crate::scheduler::DutyCycleScheduler) takes
//! these via generics, so the cycle logic runs against mocks on the host.

use heapless::String;

use crate::app::events::NodeEvent;
use crate::config::DeviceCredentials;
use crate::drivers::sleep::SleepReport;
use crate::error::{ActuatorError, RadioError};
use crate::payload::{Payload, SensorReading};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// One raw gas sample under the low-range reference.
    fn read_gas(&mut self) -> SensorReading;

    /// One raw temperature sample under the full-range reference.
    fn read_temperature(&mut self) -> SensorReading;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait ActuatorPort {
    /// Configure the heater output and drive it off.  Boot only.
    fn prepare_heater(&mut self) -> Result<(), ActuatorError>;

    /// Heater on, block `secs`, heater off.
    fn heat(&mut self, secs: u32) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Power port (watchdog tick source + low-power halt)
// ───────────────────────────────────────────────────────────────

pub trait PowerPort {
    /// Start the periodic watchdog interrupt.  Boot only.
    fn arm_watchdog(&mut self);

    /// Sleep for `secs` (a multiple of the tick period), counted in ticks.
    fn sleep_for(&mut self, secs: u32) -> SleepReport;
}

// ───────────────────────────────────────────────────────────────
// Radio link (external collaborator: LoRaWAN transceiver)
// ───────────────────────────────────────────────────────────────

/// Outcome of one uplink as far as the transceiver can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// Accepted and sent (with or without a downlink).
    Success,
    /// Link-level failure; the next cycle may well succeed.
    TransientFailure(RadioError),
    /// The module refuses the request as configured (not joined, bad
    /// parameters); repeating it will not help.
    ConfigFailure(RadioError),
}

impl TxStatus {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientFailure(_))
    }
}

impl From<RadioError> for TxStatus {
    fn from(e: RadioError) -> Self {
        if e.is_transient() {
            Self::TransientFailure(e)
        } else {
            Self::ConfigFailure(e)
        }
    }
}

/// What the transceiver reported about itself during bring-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RadioStatus {
    pub firmware: String<48>,
    pub hardware_eui: Option<[u8; 8]>,
    pub supply_mv: Option<u16>,
}

pub trait RadioLink {
    /// Reset the transceiver and query its status.
    fn initialize(&mut self) -> Result<RadioStatus, RadioError>;

    /// Activation by personalisation with pre-shared session keys.
    fn join(&mut self, credentials: &DeviceCredentials) -> Result<(), RadioError>;

    /// Unconfirmed uplink of `payload` on application `port`.
    fn send_bytes(&mut self, payload: &[u8], port: u8) -> TxStatus;

    /// Pack both codes into the 4-byte payload and send it.
    fn send_values(&mut self, gas: u16, temperature: u16, port: u8) -> TxStatus {
        self.send_bytes(Payload::pack(gas, temperature).as_bytes(), port)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → diagnostic stream)
// ───────────────────────────────────────────────────────────────

/// The scheduler emits [`NodeEvent`]s through this port.  The stream is
/// for humans on the serial console, not a machine-readable contract.
pub trait EventSink {
    fn emit(&mut self, event: &NodeEvent);
}
