//! Gas sensor heater driver (MOSFET gate on a digital output).
//!
//! The element is pre-heated immediately before sampling and nothing
//! else runs while it is on: `heat()` blocks the whole cycle.
//!
//! ## Dual-target design
//!
//! Generic over `embedded-hal` 1.0 [`OutputPin`] and [`DelayNs`]: on
//! ESP-IDF a `PinDriver` plus `FreeRtos` delay, on host a recording mock.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterState {
    Off,
    On,
}

pub struct HeaterActuator<P: OutputPin, D: DelayNs> {
    pin: P,
    delay: D,
    state: HeaterState,
}

impl<P: OutputPin, D: DelayNs> HeaterActuator<P, D> {
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            pin,
            delay,
            state: HeaterState::Off,
        }
    }

    /// Drive the output low so the element is off from boot.
    pub fn prepare(&mut self) -> Result<(), ActuatorError> {
        self.pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.state = HeaterState::Off;
        Ok(())
    }

    /// Energise for `secs`, then switch off.
    ///
    /// The off edge is always attempted, even when switching on failed.
    pub fn heat(&mut self, secs: u32) -> Result<(), ActuatorError> {
        info!("heater: on for {}s", secs);
        let on = self.pin.set_high();
        if on.is_ok() {
            self.state = HeaterState::On;
            self.delay.delay_ms(secs.saturating_mul(1000));
        } else {
            warn!("heater: failed to switch on, skipping pre-heat");
        }

        let off = self.pin.set_low();
        if off.is_ok() {
            self.state = HeaterState::Off;
        }
        on.and(off).map_err(|_| ActuatorError::GpioWriteFailed)
    }

    pub fn state(&self) -> HeaterState {
        self.state
    }
}
