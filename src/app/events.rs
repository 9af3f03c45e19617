//! Outbound diagnostic events.
//!
//! The scheduler emits these through the
//! [`EventSink`](super::ports::EventSink) port.

use crate::app::ports::{RadioStatus, TxStatus};
use crate::drivers::sleep::SleepReport;
use crate::error::{ActuatorError, ConfigError, RadioError};
use crate::fsm::CyclePhase;

#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// Boot sequence finished; the duty cycle is about to start.
    Started,

    /// Transceiver came up and answered the status query.
    RadioReady(RadioStatus),
    RadioFailed(RadioError),

    /// The advisory bring-up timeout expired before the radio answered.
    StartupTimeout { timeout_ms: u32 },

    Joined,
    JoinFailed(RadioError),
    /// No usable credentials; the join was not attempted.
    JoinSkipped(ConfigError),

    PhaseChanged { from: CyclePhase, to: CyclePhase },

    HeaterFault(ActuatorError),

    Sampled { gas: u16, temperature: u16 },

    Transmitted { attempts: u8, status: TxStatus },

    Slept(SleepReport),
}
