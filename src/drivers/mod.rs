//! Timing sources, actuator drivers, and one-shot peripheral setup.

pub mod heater;
pub mod hw_init;
pub mod sleep;
pub mod timeout_guard;
pub mod watchdog;
