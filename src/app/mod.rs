//! Application boundary: port traits and the diagnostic event stream.
//!
//! All interaction with hardware happens through the traits in [`ports`],
//! keeping the duty cycle testable without real peripherals.

pub mod events;
pub mod ports;
