//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the sensor reader, the heater, the sleep controller and the
//! watchdog timer, exposing them through [`SensorPort`], [`ActuatorPort`]
//! and [`PowerPort`].  Generic over the concrete ADC, pin, delay and halt
//! so the same wiring runs on the board and against fakes on the host.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::app::ports::{ActuatorPort, PowerPort, SensorPort};
use crate::drivers::heater::HeaterActuator;
use crate::drivers::sleep::{Halt, SleepController, SleepReport};
use crate::drivers::watchdog::WatchdogTimer;
use crate::error::ActuatorError;
use crate::payload::SensorReading;
use crate::sensors::{AnalogPort, SensorReader};

pub struct HardwareAdapter<'a, A: AnalogPort, P: OutputPin, D: DelayNs, H: Halt> {
    sensors: SensorReader<A>,
    heater: HeaterActuator<P, D>,
    sleeper: SleepController<'a, H>,
    watchdog: WatchdogTimer,
}

impl<'a, A: AnalogPort, P: OutputPin, D: DelayNs, H: Halt> HardwareAdapter<'a, A, P, D, H> {
    pub fn new(
        sensors: SensorReader<A>,
        heater: HeaterActuator<P, D>,
        sleeper: SleepController<'a, H>,
        watchdog: WatchdogTimer,
    ) -> Self {
        Self {
            sensors,
            heater,
            sleeper,
            watchdog,
        }
    }

    pub fn heater(&self) -> &HeaterActuator<P, D> {
        &self.heater
    }

    pub fn watchdog(&self) -> &WatchdogTimer {
        &self.watchdog
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<A: AnalogPort, P: OutputPin, D: DelayNs, H: Halt> SensorPort for HardwareAdapter<'_, A, P, D, H> {
    fn read_gas(&mut self) -> SensorReading {
        self.sensors.read_gas()
    }

    fn read_temperature(&mut self) -> SensorReading {
        self.sensors.read_temperature()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<A: AnalogPort, P: OutputPin, D: DelayNs, H: Halt> ActuatorPort for HardwareAdapter<'_, A, P, D, H> {
    fn prepare_heater(&mut self) -> Result<(), ActuatorError> {
        self.heater.prepare()
    }

    fn heat(&mut self, secs: u32) -> Result<(), ActuatorError> {
        self.heater.heat(secs)
    }
}

// ── PowerPort implementation ──────────────────────────────────

impl<A: AnalogPort, P: OutputPin, D: DelayNs, H: Halt> PowerPort for HardwareAdapter<'_, A, P, D, H> {
    fn arm_watchdog(&mut self) {
        self.watchdog.start();
    }

    fn sleep_for(&mut self, secs: u32) -> SleepReport {
        self.sleeper.sleep_for(secs)
    }
}
