//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one line per [`NodeEvent`] to the
//! ESP-IDF logger (UART0 in the field).  Failures are `warn!`, everything
//! else `info!`; nothing here is an error because nothing stops the cycle.

use log::{info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::{EventSink, TxStatus};

/// Adapter that logs every [`NodeEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::Started => info!("START | duty cycle running"),
            NodeEvent::RadioReady(status) => {
                info!(
                    "RADIO | ready fw='{}' eui={:02X?} vdd={:?}mV",
                    status.firmware, status.hardware_eui, status.supply_mv
                );
            }
            NodeEvent::RadioFailed(e) => warn!("RADIO | bring-up failed: {}", e),
            NodeEvent::StartupTimeout { timeout_ms } => {
                warn!("RADIO | bring-up exceeded {}ms", timeout_ms);
            }
            NodeEvent::Joined => info!("JOIN  | ABP session active"),
            NodeEvent::JoinFailed(e) => warn!("JOIN  | failed: {}", e),
            NodeEvent::JoinSkipped(e) => warn!("JOIN  | skipped: {}", e),
            NodeEvent::PhaseChanged { from, to } => {
                info!("PHASE | {} -> {}", from.name(), to.name());
            }
            NodeEvent::HeaterFault(e) => warn!("HEAT  | {}", e),
            NodeEvent::Sampled { gas, temperature } => {
                info!("SAMPLE| gas={} temp={}", gas, temperature);
            }
            NodeEvent::Transmitted { attempts, status } => match status {
                TxStatus::Success => info!("TX    | sent after {} attempt(s)", attempts),
                TxStatus::TransientFailure(e) => {
                    warn!("TX    | dropped after {} attempt(s): {}", attempts, e);
                }
                TxStatus::ConfigFailure(e) => {
                    warn!("TX    | rejected by module: {}", e);
                }
            },
            NodeEvent::Slept(report) => {
                info!(
                    "SLEEP | {}/{} ticks, {} wakeups",
                    report.ticks_counted, report.ticks_target, report.halts
                );
            }
        }
    }
}
