//! Advisory one-shot timeout.
//!
//! Armed around calls that may block on the radio (status queries during
//! bring-up) and disarmed as soon as they return.  If it expires first it
//! logs a warning and disarms itself.  It never resets the chip and never
//! interrupts the guarded call: a truly hung link still stalls the cycle.
//!
//! Independent of the hardware watchdog tick source.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: a one-shot `esp_timer`.
//! On host/test: a detached timer thread.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use core::time::Duration;
use std::sync::Arc;

use log::warn;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// `state` holds the arming generation while armed, 0 while disarmed.
/// Whoever swaps it back to 0 first (expiry or `disarm`) wins.
struct GuardShared {
    label: &'static str,
    timeout_ms: u64,
    state: AtomicU32,
    fired: AtomicBool,
}

impl GuardShared {
    fn expire(&self, generation: u32) {
        if self
            .state
            .compare_exchange(generation, 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.fired.store(true, Ordering::Release);
            warn!(
                "timeout: '{}' still running after {}ms, continuing",
                self.label, self.timeout_ms
            );
        }
    }
}

pub struct TimeoutGuard {
    shared: Arc<GuardShared>,
    timeout: Duration,
    next_generation: u32,
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn guard_expired_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is `Arc::as_ptr` of the owning guard's shared state; the
    // timer is deleted in `Drop` before that Arc is released.
    let shared = unsafe { &*(arg as *const GuardShared) };
    let generation = shared.state.load(Ordering::Acquire);
    if generation != 0 {
        shared.expire(generation);
    }
}

impl TimeoutGuard {
    pub fn new(label: &'static str, timeout: Duration) -> Self {
        let shared = Arc::new(GuardShared {
            label,
            timeout_ms: timeout.as_millis() as u64,
            state: AtomicU32::new(0),
            fired: AtomicBool::new(false),
        });

        #[cfg(target_os = "espidf")]
        let handle = {
            let args = esp_timer_create_args_t {
                callback: Some(guard_expired_cb),
                arg: Arc::as_ptr(&shared) as *mut core::ffi::c_void,
                dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
                name: c"timeout_guard".as_ptr(),
                skip_unhandled_events: true,
            };
            let mut handle: esp_timer_handle_t = core::ptr::null_mut();
            // SAFETY: `args` outlives the call; handle owned by this guard.
            let ret = unsafe { esp_timer_create(&args, &mut handle) };
            if ret != ESP_OK {
                log::error!("timeout_guard: timer create failed (rc={})", ret);
                handle = core::ptr::null_mut();
            }
            handle
        };

        Self {
            shared,
            timeout,
            next_generation: 0,
            #[cfg(target_os = "espidf")]
            handle,
        }
    }

    /// Start the countdown.  Re-arming restarts it.
    pub fn arm(&mut self) {
        self.next_generation = self.next_generation.wrapping_add(1).max(1);
        let generation = self.next_generation;
        self.shared.fired.store(false, Ordering::Release);
        self.shared.state.store(generation, Ordering::Release);
        self.start_countdown(generation);
    }

    /// Stop the countdown.  Returns `true` if it had not fired yet.
    pub fn disarm(&mut self) -> bool {
        #[cfg(target_os = "espidf")]
        if !self.handle.is_null() {
            // SAFETY: valid handle; stopping an idle timer is harmless.
            unsafe {
                esp_timer_stop(self.handle);
            }
        }
        self.shared.state.swap(0, Ordering::AcqRel) != 0
    }

    pub fn is_armed(&self) -> bool {
        self.shared.state.load(Ordering::Acquire) != 0
    }

    /// Whether the last arming expired before `disarm`.
    pub fn has_fired(&self) -> bool {
        self.shared.fired.load(Ordering::Acquire)
    }

    /// Run `f` with the guard armed.  `f` always runs to completion.
    ///
    /// Only expiry can clear `state` while `f` runs, so losing the disarm
    /// race means it fired, even if `expire` has not stored `fired` yet.
    pub fn guard<T>(&mut self, f: impl FnOnce() -> T) -> T {
        self.arm();
        let out = f();
        if !self.disarm() {
            self.shared.fired.store(true, Ordering::Release);
        }
        out
    }

    #[cfg(target_os = "espidf")]
    fn start_countdown(&mut self, _generation: u32) {
        if self.handle.is_null() {
            return;
        }
        // SAFETY: valid handle created in `new`.
        unsafe {
            esp_timer_stop(self.handle);
            let ret = esp_timer_start_once(self.handle, self.timeout.as_micros() as u64);
            if ret != ESP_OK {
                log::error!("timeout_guard: timer start failed (rc={})", ret);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn start_countdown(&mut self, generation: u32) {
        let shared = Arc::clone(&self.shared);
        let timeout = self.timeout;
        std::thread::spawn(move || {
            std::thread::sleep(timeout);
            shared.expire(generation);
        });
    }
}

impl Drop for TimeoutGuard {
    fn drop(&mut self) {
        self.disarm();
        #[cfg(target_os = "espidf")]
        if !self.handle.is_null() {
            // SAFETY: stopped above; no callback can run after delete.
            unsafe {
                esp_timer_delete(self.handle);
            }
        }
    }
}
