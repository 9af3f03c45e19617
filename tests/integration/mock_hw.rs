//! Mock adapters for integration tests.
//!
//! Every port call lands in one shared [`Journal`], so tests can assert
//! on the order of calls across the hardware and the radio.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;
use std::time::Duration;

use gasnode::adapters::radio::{Line, SerialLine};
use gasnode::app::events::NodeEvent;
use gasnode::app::ports::{
    ActuatorPort, EventSink, PowerPort, RadioLink, RadioStatus, SensorPort, TxStatus,
};
use gasnode::config::DeviceCredentials;
use gasnode::drivers::sleep::{Halt, SleepController, SleepReport};
use gasnode::drivers::watchdog::TickCounter;
use gasnode::error::{ActuatorError, RadioError};
use gasnode::payload::{Reference, SensorReading};

// ── Call journal ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    PrepareHeater,
    Heat(u32),
    ReadGas,
    ReadTemperature,
    ArmWatchdog,
    Sleep(u32),
    RadioInit,
    Join,
    Send { payload: Vec<u8>, port: u8 },
}

pub type Journal = Rc<RefCell<Vec<Call>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

// ── MockHardware ──────────────────────────────────────────────

/// Sensors, heater and power in one.  Sleep goes through a real
/// [`SleepController`] whose halt delivers one watchdog tick.
pub struct MockHardware {
    journal: Journal,
    /// (gas, temperature) per cycle; the last pair repeats.
    readings: Vec<(u16, u16)>,
    cycle: usize,
    pub heater_fails: bool,
    pub tick_period_secs: u32,
    ticks: TickCounter,
}

struct TickPerHalt<'a>(&'a TickCounter);

impl Halt for TickPerHalt<'_> {
    fn halt(&mut self) {
        self.0.increment();
    }
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            readings: vec![(300, 900)],
            cycle: 0,
            heater_fails: false,
            tick_period_secs: 8,
            ticks: TickCounter::new(),
        }
    }

    pub fn with_readings(mut self, readings: &[(u16, u16)]) -> Self {
        self.readings = readings.to_vec();
        self
    }

    fn current(&self) -> (u16, u16) {
        let idx = self.cycle.min(self.readings.len().saturating_sub(1));
        self.readings.get(idx).copied().unwrap_or((0, 0))
    }

    pub fn ticks(&self) -> &TickCounter {
        &self.ticks
    }
}

impl SensorPort for MockHardware {
    fn read_gas(&mut self) -> SensorReading {
        self.journal.borrow_mut().push(Call::ReadGas);
        SensorReading::new(self.current().0, Reference::LowRange)
    }

    fn read_temperature(&mut self) -> SensorReading {
        self.journal.borrow_mut().push(Call::ReadTemperature);
        let raw = self.current().1;
        self.cycle += 1;
        SensorReading::new(raw, Reference::FullRange)
    }
}

impl ActuatorPort for MockHardware {
    fn prepare_heater(&mut self) -> Result<(), ActuatorError> {
        self.journal.borrow_mut().push(Call::PrepareHeater);
        Ok(())
    }

    fn heat(&mut self, secs: u32) -> Result<(), ActuatorError> {
        self.journal.borrow_mut().push(Call::Heat(secs));
        if self.heater_fails {
            Err(ActuatorError::GpioWriteFailed)
        } else {
            Ok(())
        }
    }
}

impl PowerPort for MockHardware {
    fn arm_watchdog(&mut self) {
        self.journal.borrow_mut().push(Call::ArmWatchdog);
    }

    fn sleep_for(&mut self, secs: u32) -> SleepReport {
        let report = SleepController::new(&self.ticks, TickPerHalt(&self.ticks), self.tick_period_secs)
            .sleep_for(secs);
        self.journal.borrow_mut().push(Call::Sleep(secs));
        report
    }
}

// ── MockRadio ─────────────────────────────────────────────────

pub struct MockRadio {
    journal: Journal,
    pub init_result: Result<RadioStatus, RadioError>,
    pub init_delay: Duration,
    pub join_result: Result<(), RadioError>,
    /// Uplink outcomes in order; `Success` once exhausted.
    pub tx_script: VecDeque<TxStatus>,
    pub joined_with: Option<DeviceCredentials>,
}

#[allow(dead_code)]
impl MockRadio {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            init_result: Ok(RadioStatus::default()),
            init_delay: Duration::ZERO,
            join_result: Ok(()),
            tx_script: VecDeque::new(),
            joined_with: None,
        }
    }

    pub fn with_tx(mut self, script: &[TxStatus]) -> Self {
        self.tx_script = script.iter().copied().collect();
        self
    }
}

impl RadioLink for MockRadio {
    fn initialize(&mut self) -> Result<RadioStatus, RadioError> {
        self.journal.borrow_mut().push(Call::RadioInit);
        if !self.init_delay.is_zero() {
            std::thread::sleep(self.init_delay);
        }
        self.init_result.clone()
    }

    fn join(&mut self, credentials: &DeviceCredentials) -> Result<(), RadioError> {
        self.journal.borrow_mut().push(Call::Join);
        self.joined_with = Some(*credentials);
        self.join_result
    }

    fn send_bytes(&mut self, payload: &[u8], port: u8) -> TxStatus {
        self.journal.borrow_mut().push(Call::Send {
            payload: payload.to_vec(),
            port,
        });
        self.tx_script.pop_front().unwrap_or(TxStatus::Success)
    }
}

// ── LogSink ───────────────────────────────────────────────────

/// Records every event for later inspection.
pub struct LogSink {
    pub events: Vec<NodeEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&NodeEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &NodeEvent) {
        self.events.push(event.clone());
    }
}

// ── Scripted transceiver line ─────────────────────────────────

/// Replays canned reply lines and records what was written.
pub struct ScriptedLine {
    pub written: Vec<String>,
    replies: VecDeque<Result<&'static str, RadioError>>,
}

#[allow(dead_code)]
impl ScriptedLine {
    pub fn new(replies: &[Result<&'static str, RadioError>]) -> Self {
        Self {
            written: Vec::new(),
            replies: replies.iter().copied().collect(),
        }
    }

    pub fn push_replies(&mut self, replies: &[&'static str]) {
        self.replies.extend(replies.iter().map(|r| Ok(*r)));
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl SerialLine for ScriptedLine {
    fn write_line(&mut self, line: &str) -> Result<(), RadioError> {
        self.written.push(line.to_string());
        Ok(())
    }

    fn read_line(&mut self, _timeout_ms: u32) -> Result<Line, RadioError> {
        match self.replies.pop_front() {
            Some(Ok(text)) => {
                let mut line = Line::new();
                line.push_str(text).map_err(|_| RadioError::LineOverflow)?;
                Ok(line)
            }
            Some(Err(e)) => Err(e),
            None => Err(RadioError::NoResponse),
        }
    }
}

// ── Pins and delays ───────────────────────────────────────────

#[derive(Default)]
pub struct RecPin {
    pub levels: Vec<bool>,
}

impl embedded_hal::digital::ErrorType for RecPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for RecPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.push(true);
        Ok(())
    }
}

pub struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
