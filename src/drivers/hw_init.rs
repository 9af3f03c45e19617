//! One-shot ADC peripheral initialization.
//!
//! Configures ADC1 in oneshot mode at 10-bit width using raw ESP-IDF sys
//! calls.  Called once from `main()` before the duty cycle starts.  The
//! attenuation of a channel is what the sensor layer calls its reference:
//! 0 dB gives the narrow high-resolution span, 12 dB the full span.
//!
//! On host/test the ADC reads from static atomics set by `sim_set_adc()`.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::payload::Reference;

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    AdcChannelFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::AdcChannelFailed(rc) => write!(f, "ADC1 channel config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: ADC1_HANDLE is written once by `init_adc()` before the duty
/// cycle starts and only read from the main task afterwards.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
pub fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    adc_set_reference(crate::pins::GAS_ADC_CHANNEL, Reference::LowRange)?;
    adc_set_reference(crate::pins::TEMP_ADC_CHANNEL, Reference::FullRange)?;

    log::info!("hw_init: ADC1 configured (10-bit, gas+temp)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_adc() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ADC init skipped");
    Ok(())
}

/// Reconfigure one channel's input span.
#[cfg(target_os = "espidf")]
pub fn adc_set_reference(channel: u32, reference: Reference) -> Result<(), HwInitError> {
    let atten = match reference {
        Reference::LowRange => adc_atten_t_ADC_ATTEN_DB_0,
        Reference::FullRange => adc_atten_t_ADC_ATTEN_DB_12,
    };
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_10,
    };
    // SAFETY: adc1_handle() contract; main task only, after init.
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::AdcChannelFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn adc_set_reference(_channel: u32, _reference: Reference) -> Result<(), HwInitError> {
    SIM_REFERENCE_WRITES.fetch_add(1, Ordering::Relaxed);
    Ok(())
}

/// One raw conversion.  A failed read returns 0, which is
/// indistinguishable from a genuine zero reading.
#[cfg(target_os = "espidf")]
pub fn adc_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract; main task only, after init.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK {
        return 0;
    }
    raw.clamp(0, i32::from(crate::payload::ADC_MAX)) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc_read(channel: u32) -> u16 {
    match channel {
        crate::pins::GAS_ADC_CHANNEL => SIM_GAS_ADC.load(Ordering::Relaxed),
        crate::pins::TEMP_ADC_CHANNEL => SIM_TEMP_ADC.load(Ordering::Relaxed),
        _ => 0,
    }
}

// ── Host injection ────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_GAS_ADC: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_ADC: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_REFERENCE_WRITES: AtomicU32 = AtomicU32::new(0);

/// Set the code the simulated ADC returns for `channel`.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(channel: u32, raw: u16) {
    match channel {
        crate::pins::GAS_ADC_CHANNEL => SIM_GAS_ADC.store(raw, Ordering::Relaxed),
        crate::pins::TEMP_ADC_CHANNEL => SIM_TEMP_ADC.store(raw, Ordering::Relaxed),
        _ => {}
    }
}

/// Channel reconfigurations the simulated ADC has received so far.
#[cfg(not(target_os = "espidf"))]
pub fn sim_reference_writes() -> u32 {
    SIM_REFERENCE_WRITES.load(Ordering::Relaxed)
}
