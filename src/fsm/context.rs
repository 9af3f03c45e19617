//! Per-cycle blackboard.
//!
//! Each phase writes what it produced here and the next phase reads it.
//! Everything is reset when a new cycle opens, so a reading or status can
//! never carry over into the following cycle.

use crate::app::ports::TxStatus;
use crate::drivers::sleep::SleepReport;
use crate::error::ActuatorError;
use crate::payload::{Payload, SensorReading};

#[derive(Debug, Clone, Default)]
pub struct CycleContext {
    /// Cycle number, 0 for the first.
    pub cycle: u32,

    // -- Heating --
    pub heater_fault: Option<ActuatorError>,

    // -- Sampling --
    pub gas: Option<SensorReading>,
    pub temperature: Option<SensorReading>,

    // -- Transmitting --
    pub payload: Option<Payload>,
    pub tx_status: Option<TxStatus>,
    pub tx_attempts: u8,

    // -- Sleeping --
    pub sleep: Option<SleepReport>,
}

impl CycleContext {
    pub fn begin_cycle(&mut self, cycle: u32) {
        *self = Self {
            cycle,
            ..Self::default()
        };
    }
}
