//! Board ADC adapter.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: ADC1 oneshot reads via hw_init, span set by attenuation.
//! On host/test: hw_init reads from static atomics for injection.

use log::warn;

use super::AnalogPort;
use crate::drivers::hw_init;
use crate::payload::Reference;

pub struct AdcAnalog {
    /// Last span applied per channel, to skip redundant reconfiguration.
    current: [(u32, Reference); 2],
}

impl AdcAnalog {
    pub fn new() -> Self {
        Self {
            current: [
                (crate::pins::GAS_ADC_CHANNEL, Reference::LowRange),
                (crate::pins::TEMP_ADC_CHANNEL, Reference::FullRange),
            ],
        }
    }
}

impl Default for AdcAnalog {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogPort for AdcAnalog {
    fn set_reference(&mut self, channel: u32, reference: Reference) {
        if self.current.contains(&(channel, reference)) {
            return;
        }
        match hw_init::adc_set_reference(channel, reference) {
            Ok(()) => {
                if let Some(slot) = self.current.iter_mut().find(|(c, _)| *c == channel) {
                    slot.1 = reference;
                }
            }
            Err(e) => warn!("adc: {} on ch{}", e, channel),
        }
    }

    fn sample(&mut self, channel: u32) -> u16 {
        hw_init::adc_read(channel)
    }
}
