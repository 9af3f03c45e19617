//! Tick-counted low-power sleep.
//!
//! ```text
//!  reset ──▶ halt ──(watchdog irq)──▶ ticks < target? ──yes──▶ halt …
//!                                          │
//!                                          no
//!                                          ▼
//!                                        reset ──▶ return
//! ```
//!
//! Elapsed time is measured only in watchdog ticks, so a request is
//! honoured to within one tick period.  Halt/wake latency is not modelled.

use log::{debug, warn};

use crate::drivers::watchdog::TickCounter;

/// Something that parks the CPU until the next interrupt.
pub trait Halt {
    fn halt(&mut self);
}

/// Outcome of one [`SleepController::sleep_for`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SleepReport {
    /// Ticks the request asked for.
    pub ticks_target: u16,
    /// Counter value seen on exit, before the final reset.
    pub ticks_counted: u16,
    /// Number of halt/wake round trips.
    pub halts: u32,
}

/// Whole ticks in `secs`.  A remainder is dropped, not rounded.
pub fn ticks_for(secs: u32, tick_period_secs: u32) -> u16 {
    if tick_period_secs == 0 {
        return 0;
    }
    (secs / tick_period_secs).min(u32::from(u16::MAX)) as u16
}

pub struct SleepController<'a, H: Halt> {
    ticks: &'a TickCounter,
    halt: H,
    tick_period_secs: u32,
}

impl<'a, H: Halt> SleepController<'a, H> {
    pub fn new(ticks: &'a TickCounter, halt: H, tick_period_secs: u32) -> Self {
        Self {
            ticks,
            halt,
            tick_period_secs,
        }
    }

    /// Halt repeatedly until `secs / tick_period` watchdog ticks have passed.
    ///
    /// The counter is zero on entry to the wait and zero again on return.
    /// A tick that lands between the reset and the first halt is counted,
    /// so the sleep can end up to one period early, never later.
    pub fn sleep_for(&mut self, secs: u32) -> SleepReport {
        let target = ticks_for(secs, self.tick_period_secs);
        self.ticks.reset();

        let mut halts = 0u32;
        let mut seen = 0u16;
        while self.ticks.get() < target {
            self.halt.halt();
            halts = halts.saturating_add(1);

            let now = self.ticks.get();
            if now != seen {
                debug!("sleep: tick {}/{}", now, target);
                seen = now;
            }
        }

        let counted = self.ticks.get();
        self.ticks.reset();
        SleepReport {
            ticks_target: target,
            ticks_counted: counted,
            halts,
        }
    }
}

/// Log a rejected power-management call.  Without light sleep the halt
/// degrades to a 1 ms task delay, so the node stays awake between ticks.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn sleep_call_ok(step: &str, rc: i32) -> bool {
    if rc != 0 {
        warn!("sleep: {} rejected (rc={}), staying awake", step, rc);
        return false;
    }
    true
}

/// ESP-IDF light sleep until the next pending `esp_timer` alarm, which is
/// the watchdog tick while the node is otherwise idle.
#[cfg(target_os = "espidf")]
pub struct LightSleepHalt;

#[cfg(target_os = "espidf")]
impl Halt for LightSleepHalt {
    fn halt(&mut self) {
        use esp_idf_svc::sys::*;

        // SAFETY: plain ESP-IDF power-management calls from the main task.
        unsafe {
            let now = esp_timer_get_time();
            let next = esp_timer_get_next_alarm();
            let delta = next - now;
            if delta > 0
                && sleep_call_ok("timer wakeup", esp_sleep_enable_timer_wakeup(delta as u64))
            {
                sleep_call_ok("light sleep", esp_light_sleep_start());
            }
        }
        // Let the esp_timer task dispatch the due watchdog callback.
        esp_idf_hal::delay::FreeRtos::delay_ms(1);
    }
}
