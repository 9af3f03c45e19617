//! GasNode Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter            Rn2483<UartLine>    LogEventSink   │
//! │  (Sensor+Actuator+Power)    (RadioLink)         (EventSink)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          DutyCycleScheduler (pure logic)               │    │
//! │  │  Heating → Sampling → Transmitting → Sleeping          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  esp_timer watchdog tick · light sleep between ticks           │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use gasnode::adapters::hardware::HardwareAdapter;
use gasnode::adapters::log_sink::LogEventSink;
use gasnode::adapters::radio::Rn2483;
use gasnode::adapters::serial::UartLine;
use gasnode::config::{DeviceCredentials, NodeConfig};
use gasnode::drivers::heater::HeaterActuator;
use gasnode::drivers::hw_init;
use gasnode::drivers::sleep::{LightSleepHalt, SleepController};
use gasnode::drivers::watchdog::{WATCHDOG_TICKS, WatchdogTimer};
use gasnode::error::Error;
use gasnode::pins;
use gasnode::scheduler::DutyCycleScheduler;
use gasnode::sensors::SensorReader;
use gasnode::sensors::adc::AdcAnalog;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GasNode v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Build-time parameters ──────────────────────────────
    let config = NodeConfig::default();
    config.validate().map_err(Error::from)?;

    let credentials = DeviceCredentials::from_build();
    match &credentials {
        Ok(c) => info!("Credentials: {:?}", c),
        Err(e) => warn!("Credentials: {} (node will sample but never join)", e),
    }

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_adc().map_err(Error::from)?;
    let peripherals = Peripherals::take()?;

    // SAFETY: each GPIO number below is claimed exactly once, here.
    let (heater_pin, reset_pin, tx_pin, rx_pin) = unsafe {
        (
            AnyOutputPin::new(pins::HEATER_GPIO),
            AnyOutputPin::new(pins::RADIO_RESET_GPIO),
            AnyOutputPin::new(pins::RADIO_TX_GPIO),
            AnyInputPin::new(pins::RADIO_RX_GPIO),
        )
    };

    let uart = UartDriver::new(
        peripherals.uart2,
        tx_pin,
        rx_pin,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::new().baudrate(Hertz(config.radio_baud)),
    )?;

    // ── 4. Adapters ───────────────────────────────────────────
    let hw = HardwareAdapter::new(
        SensorReader::new(
            AdcAnalog::new(),
            pins::GAS_ADC_CHANNEL,
            pins::TEMP_ADC_CHANNEL,
        ),
        HeaterActuator::new(PinDriver::output(heater_pin)?, FreeRtos),
        SleepController::new(&WATCHDOG_TICKS, LightSleepHalt, config.tick_period_secs),
        WatchdogTimer::new(config.tick_period_secs),
    );

    let radio = Rn2483::new(
        UartLine::new(uart),
        PinDriver::output(reset_pin)?,
        FreeRtos,
        config.radio_band_mhz,
    );

    // ── 5. Run ────────────────────────────────────────────────
    let mut scheduler = DutyCycleScheduler::new(config, credentials, hw, radio, LogEventSink::new());
    scheduler.start();

    info!("System ready. Entering duty cycle.");
    scheduler.run_forever()
}
