//! Sensor subsystem: raw single-shot reads of the gas and temperature
//! sensors.
//!
//! Each read selects the reference span that suits the signal, takes
//! exactly one conversion and hands back the raw code.  There is no
//! averaging, calibration or error path.

pub mod adc;

use log::debug;

use crate::payload::{Reference, SensorReading};

/// Raw converter access.  Implemented by [`adc::AdcAnalog`] on the board
/// and by scripted fakes in tests.
pub trait AnalogPort {
    /// Select the input span for `channel` before the next sample.
    fn set_reference(&mut self, channel: u32, reference: Reference);

    /// One conversion on `channel` (0–1023).
    fn sample(&mut self, channel: u32) -> u16;
}

pub struct SensorReader<A: AnalogPort> {
    adc: A,
    gas_channel: u32,
    temp_channel: u32,
}

impl<A: AnalogPort> SensorReader<A> {
    pub fn new(adc: A, gas_channel: u32, temp_channel: u32) -> Self {
        Self {
            adc,
            gas_channel,
            temp_channel,
        }
    }

    /// Gas sensor output is a few hundred millivolts: narrow span.
    pub fn read_gas(&mut self) -> SensorReading {
        self.read(self.gas_channel, Reference::LowRange, "gas")
    }

    /// Temperature sensor swings across the supply: wide span.
    pub fn read_temperature(&mut self) -> SensorReading {
        self.read(self.temp_channel, Reference::FullRange, "temp")
    }

    fn read(&mut self, channel: u32, reference: Reference, name: &str) -> SensorReading {
        self.adc.set_reference(channel, reference);
        let raw = self.adc.sample(channel);
        debug!("sensor: {} ch{} {:?} = {}", name, channel, reference, raw);
        SensorReading::new(raw, reference)
    }

    pub fn adc(&self) -> &A {
        &self.adc
    }
}
