//! Duty-cycle scheduler.
//!
//! Owns the node after boot.  Bring-up runs once, then the four phases
//! repeat until power is lost:
//!
//! ```text
//!  start():  radio init (guarded) ─▶ heater off ─▶ watchdog ─▶ ABP join
//!
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │ Heating ──▶ Sampling ──▶ Transmitting ──▶ Sleeping ──┐       │
//!  │    ▲                                                 │       │
//!  │    └─────────────────────────────────────────────────┘       │
//!  └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transmit contract
//!
//! Best effort, no retry, no queue.  Whatever the radio returns, the next
//! phase is Sleeping and the reading is gone.  [`TransmitPolicy`] can
//! allow a bounded number of re-sends on transient failures; it never
//! changes where the cycle goes next.
//!
//! Nothing here returns an error.  Failures become [`NodeEvent`]s and
//! the cycle carries on.

use core::time::Duration;

use log::{debug, error, info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::{ActuatorPort, EventSink, PowerPort, RadioLink, SensorPort, TxStatus};
use crate::config::{DeviceCredentials, NodeConfig, TransmitPolicy};
use crate::drivers::sleep::SleepReport;
use crate::drivers::timeout_guard::TimeoutGuard;
use crate::error::{ActuatorError, ConfigError};
use crate::fsm::context::CycleContext;
use crate::fsm::{CyclePhase, Fsm};
use crate::payload::Payload;

/// What bring-up achieved.  Informational only: the cycle runs either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartupReport {
    pub radio_ready: bool,
    /// The advisory guard expired while the radio was coming up.
    pub timed_out: bool,
    pub heater_ready: bool,
    pub joined: bool,
}

/// Snapshot of one completed cycle, taken just before the context is
/// cleared for the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub cycle: u32,
    pub heater_fault: Option<ActuatorError>,
    pub payload: Option<Payload>,
    pub tx_status: Option<TxStatus>,
    pub tx_attempts: u8,
    pub sleep: Option<SleepReport>,
}

impl From<&CycleContext> for CycleReport {
    fn from(ctx: &CycleContext) -> Self {
        Self {
            cycle: ctx.cycle,
            heater_fault: ctx.heater_fault,
            payload: ctx.payload,
            tx_status: ctx.tx_status,
            tx_attempts: ctx.tx_attempts,
            sleep: ctx.sleep,
        }
    }
}

pub struct DutyCycleScheduler<HW, R, E>
where
    HW: SensorPort + ActuatorPort + PowerPort,
    R: RadioLink,
    E: EventSink,
{
    hw: HW,
    radio: R,
    sink: E,
    config: NodeConfig,
    credentials: Result<DeviceCredentials, ConfigError>,
    fsm: Fsm,
    ctx: CycleContext,
    startup: Option<StartupReport>,
    last_cycle: CycleReport,
}

impl<HW, R, E> DutyCycleScheduler<HW, R, E>
where
    HW: SensorPort + ActuatorPort + PowerPort,
    R: RadioLink,
    E: EventSink,
{
    pub fn new(
        config: NodeConfig,
        credentials: Result<DeviceCredentials, ConfigError>,
        hw: HW,
        radio: R,
        sink: E,
    ) -> Self {
        Self {
            hw,
            radio,
            sink,
            config,
            credentials,
            fsm: Fsm::new(),
            ctx: CycleContext::default(),
            startup: None,
            last_cycle: CycleReport::default(),
        }
    }

    // ── Bring-up ──────────────────────────────────────────────

    /// One-time boot sequence.  Each step runs exactly once and none is
    /// retried; a second call returns the first call's report untouched.
    pub fn start(&mut self) -> StartupReport {
        if let Some(report) = self.startup {
            warn!("scheduler: already started");
            return report;
        }
        info!("scheduler: starting node bring-up");

        let timeout = Duration::from_millis(u64::from(self.config.startup_timeout_ms));
        let mut guard = TimeoutGuard::new("radio bring-up", timeout);
        let radio = guard.guard(|| self.radio.initialize());

        let mut report = StartupReport {
            timed_out: guard.has_fired(),
            ..StartupReport::default()
        };
        if report.timed_out {
            self.sink.emit(&NodeEvent::StartupTimeout {
                timeout_ms: self.config.startup_timeout_ms,
            });
        }
        match radio {
            Ok(status) => {
                report.radio_ready = true;
                self.sink.emit(&NodeEvent::RadioReady(status));
            }
            Err(e) => {
                error!("scheduler: radio bring-up failed: {}", e);
                self.sink.emit(&NodeEvent::RadioFailed(e));
            }
        }

        match self.hw.prepare_heater() {
            Ok(()) => report.heater_ready = true,
            Err(e) => self.sink.emit(&NodeEvent::HeaterFault(e)),
        }

        self.hw.arm_watchdog();

        match self.credentials {
            Ok(credentials) => match self.radio.join(&credentials) {
                Ok(()) => {
                    report.joined = true;
                    self.sink.emit(&NodeEvent::Joined);
                }
                Err(e) => {
                    error!("scheduler: join failed: {}", e);
                    self.sink.emit(&NodeEvent::JoinFailed(e));
                }
            },
            Err(e) => self.sink.emit(&NodeEvent::JoinSkipped(e)),
        }

        self.startup = Some(report);
        self.sink.emit(&NodeEvent::Started);
        report
    }

    // ── Cycle ─────────────────────────────────────────────────

    /// Run the current phase to completion, then advance.  Returns the
    /// phase that just ran.
    pub fn step(&mut self) -> CyclePhase {
        let phase = self.fsm.current_phase();
        match phase {
            CyclePhase::Heating => self.run_heating(),
            CyclePhase::Sampling => self.run_sampling(),
            CyclePhase::Transmitting => self.run_transmitting(),
            CyclePhase::Sleeping => {
                self.run_sleeping();
                self.last_cycle = CycleReport::from(&self.ctx);
            }
        }

        let (from, to) = self.fsm.advance(&mut self.ctx);
        self.sink.emit(&NodeEvent::PhaseChanged { from, to });
        phase
    }

    /// Step until the Sleeping phase has run.  From a fresh scheduler that
    /// is one full Heating → Sleeping lap.
    pub fn run_cycle(&mut self) -> CycleReport {
        while self.step() != CyclePhase::Sleeping {}
        self.last_cycle
    }

    /// Bring up the node if that has not happened yet, then cycle forever.
    pub fn run_forever(mut self) -> ! {
        if self.startup.is_none() {
            self.start();
        }
        loop {
            let report = self.run_cycle();
            debug!("scheduler: cycle {} done", report.cycle);
        }
    }

    fn run_heating(&mut self) {
        if let Err(e) = self.hw.heat(self.config.heat_secs) {
            self.ctx.heater_fault = Some(e);
            self.sink.emit(&NodeEvent::HeaterFault(e));
        }
    }

    fn run_sampling(&mut self) {
        let gas = self.hw.read_gas();
        let temperature = self.hw.read_temperature();
        self.ctx.gas = Some(gas);
        self.ctx.temperature = Some(temperature);
        self.ctx.payload = Some(Payload::from_readings(gas, temperature));
        self.sink.emit(&NodeEvent::Sampled {
            gas: gas.raw,
            temperature: temperature.raw,
        });
    }

    fn run_transmitting(&mut self) {
        let Some(payload) = self.ctx.payload else {
            warn!("scheduler: nothing sampled this cycle, skipping uplink");
            return;
        };
        let (attempts, status) = self.transmit(&payload);
        self.ctx.tx_attempts = attempts;
        self.ctx.tx_status = Some(status);
        self.sink.emit(&NodeEvent::Transmitted { attempts, status });
    }

    fn transmit(&mut self, payload: &Payload) -> (u8, TxStatus) {
        let mut retries_left = match self.config.transmit_policy {
            TransmitPolicy::BestEffort => 0,
            TransmitPolicy::RetryTransient { retries } => retries,
        };
        let mut attempts = 0u8;
        loop {
            attempts = attempts.saturating_add(1);
            let status = self
                .radio
                .send_bytes(payload.as_bytes(), self.config.radio_port);
            if status.is_transient() && retries_left > 0 {
                retries_left -= 1;
                debug!("scheduler: uplink attempt {} failed, retrying", attempts);
                continue;
            }
            return (attempts, status);
        }
    }

    fn run_sleeping(&mut self) {
        let report = self.hw.sleep_for(self.config.sleep_secs);
        self.ctx.sleep = Some(report);
        self.sink.emit(&NodeEvent::Slept(report));
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn phase(&self) -> CyclePhase {
        self.fsm.current_phase()
    }

    pub fn cycles_completed(&self) -> u32 {
        self.fsm.cycles_completed()
    }

    pub fn context(&self) -> &CycleContext {
        &self.ctx
    }

    pub fn startup_report(&self) -> Option<StartupReport> {
        self.startup
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn hardware(&self) -> &HW {
        &self.hw
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }
}
