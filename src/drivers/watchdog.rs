//! Watchdog tick source.
//!
//! A hardware timer fires every tick period (8 s) and the callback does
//! exactly one thing: bump [`WATCHDOG_TICKS`].  It is the only clock that
//! keeps running while the CPU is halted, so it is the only way the
//! [`SleepController`](crate::drivers::sleep::SleepController) can tell
//! how long it has been asleep.
//!
//! The counter is written from two contexts:
//!
//! | Context        | Operation                  |
//! |----------------|----------------------------|
//! | interrupt      | `increment()`              |
//! | main line      | `reset()`, `get()`         |
//!
//! Each is a single atomic instruction on a 16-bit word.  Main-line code
//! never does a read-modify-write on it.

use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Interrupt-shared tick counter.
#[derive(Debug)]
pub struct TickCounter(AtomicU16);

impl TickCounter {
    pub const fn new() -> Self {
        Self(AtomicU16::new(0))
    }

    /// Interrupt side.  Wraps at `u16::MAX` (≈ 6 days of 8 s ticks, far
    /// beyond any single sleep request).
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Release);
    }

    pub fn get(&self) -> u16 {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide counter driven by the watchdog interrupt.
pub static WATCHDOG_TICKS: TickCounter = TickCounter::new();

/// Interrupt handler body.  Must stay this small: no logging, no waiting.
pub fn on_watchdog_interrupt() {
    WATCHDOG_TICKS.increment();
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn watchdog_tick_cb(_arg: *mut core::ffi::c_void) {
    on_watchdog_interrupt();
}

/// Periodic interrupt source.  Armed once at boot and never stopped.
pub struct WatchdogTimer {
    period_secs: u32,
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,
}

impl WatchdogTimer {
    pub fn new(period_secs: u32) -> Self {
        Self {
            period_secs,
            #[cfg(target_os = "espidf")]
            handle: core::ptr::null_mut(),
        }
    }

    pub fn period_secs(&self) -> u32 {
        self.period_secs
    }

    pub fn is_running(&self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            !self.handle.is_null()
        }
        #[cfg(not(target_os = "espidf"))]
        {
            false
        }
    }

    /// Arm the periodic interrupt.  A failure here is a wiring or sdkconfig
    /// mistake; it is logged and the node runs without a sleep clock.
    #[cfg(target_os = "espidf")]
    pub fn start(&mut self) {
        if !self.handle.is_null() {
            return;
        }
        let args = esp_timer_create_args_t {
            callback: Some(watchdog_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"watchdog".as_ptr(),
            skip_unhandled_events: false,
        };
        // SAFETY: `args` outlives the call; the handle is owned by `self`
        // and only touched from the main task.
        unsafe {
            let ret = esp_timer_create(&args, &mut self.handle);
            if ret != ESP_OK {
                log::error!("watchdog: timer create failed (rc={})", ret);
                self.handle = core::ptr::null_mut();
                return;
            }
            let period_us = u64::from(self.period_secs) * 1_000_000;
            let ret = esp_timer_start_periodic(self.handle, period_us);
            if ret != ESP_OK {
                log::error!("watchdog: timer start failed (rc={})", ret);
                esp_timer_delete(self.handle);
                self.handle = core::ptr::null_mut();
                return;
            }
        }
        log::info!("watchdog: tick every {}s", self.period_secs);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn start(&mut self) {
        log::info!("watchdog(sim): {}s ticks are injected by the caller", self.period_secs);
    }

    #[cfg(target_os = "espidf")]
    pub fn stop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        // SAFETY: non-null handle was created by `start()` and not yet deleted.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
        }
        self.handle = core::ptr::null_mut();
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn stop(&mut self) {}
}

#[cfg(target_os = "espidf")]
impl Drop for WatchdogTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
