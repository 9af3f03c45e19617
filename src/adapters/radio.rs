//! LoRaWAN transceiver adapter (RN2483 class ASCII command set).
//!
//! Every command is one `\r\n`-terminated line; the module answers with
//! one line, and for `mac join` / `mac tx` a second line once the air
//! exchange is over:
//!
//! ```text
//!   mac tx uncnf 1 012C0384 ──▶ ok ──▶ mac_tx_ok
//!                                  └──▶ mac_rx <port> <hex>
//!                                  └──▶ mac_err
//!                      └──▶ not_joined | no_free_ch | busy | invalid_param …
//! ```
//!
//! The adapter is generic over a [`SerialLine`] plus an `embedded-hal`
//! reset pin and delay, so the whole exchange runs against a scripted
//! line on the host.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::String;
use log::{debug, info, warn};

use crate::app::ports::{RadioLink, RadioStatus, TxStatus};
use crate::config::{parse_hex, DeviceCredentials};
use crate::error::RadioError;

/// Longest command or reply line handled.  A 4-byte uplink needs 25.
pub const LINE_CAP: usize = 96;

pub type Line = String<LINE_CAP>;

/// Most commands answer within a few milliseconds.
pub const CMD_TIMEOUT_MS: u32 = 2_000;
/// Second reply of `mac tx`: airtime plus both receive windows at SF12.
pub const TX_TIMEOUT_MS: u32 = 30_000;

const RESET_PULSE_MS: u32 = 10;
const BOOT_TIMEOUT_MS: u32 = 1_000;

// ───────────────────────────────────────────────────────────────
// Line transport
// ───────────────────────────────────────────────────────────────

/// Line-oriented serial link to the transceiver.
pub trait SerialLine {
    /// Send `line` followed by `\r\n`.
    fn write_line(&mut self, line: &str) -> Result<(), RadioError>;

    /// Next complete line without its terminator.
    /// `Err(NoResponse)` if nothing arrives within `timeout_ms`.
    fn read_line(&mut self, timeout_ms: u32) -> Result<Line, RadioError>;

    /// Drop anything buffered (boot banners, stale replies).
    fn flush_input(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Reply classification
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply<'a> {
    Ok,
    Accepted,
    TxOk,
    /// Downlink delivered in a receive window.
    Rx { port: u8, data: &'a str },
    Error(RadioError),
    /// Anything else: version strings, numeric query answers.
    Other(&'a str),
}

pub fn classify(line: &str) -> Reply<'_> {
    let line = line.trim();
    match line {
        "ok" => Reply::Ok,
        "accepted" => Reply::Accepted,
        "mac_tx_ok" => Reply::TxOk,
        "invalid_param" | "invalid_data_len" => Reply::Error(RadioError::InvalidParam),
        "not_joined" | "keys_not_init" => Reply::Error(RadioError::NotJoined),
        "denied" => Reply::Error(RadioError::JoinDenied),
        "no_free_ch" | "busy" | "silent" | "mac_paused" => Reply::Error(RadioError::Busy),
        "mac_err" => Reply::Error(RadioError::TxFailed),
        "frame_counter_err_rejoin_needed" => Reply::Error(RadioError::FrameCounterExhausted),
        _ => match line.strip_prefix("mac_rx ") {
            Some(rest) => parse_downlink(rest),
            None => Reply::Other(line),
        },
    }
}

fn parse_downlink(rest: &str) -> Reply<'_> {
    let mut parts = rest.split_ascii_whitespace();
    let port = parts.next().and_then(|p| p.parse::<u8>().ok());
    match (port, parts.next(), parts.next()) {
        (Some(port), Some(data), None) if data.bytes().all(|b| b.is_ascii_hexdigit()) => {
            Reply::Rx { port, data }
        }
        // Empty downlink (ack or MAC commands only).
        (Some(port), None, None) => Reply::Rx { port, data: "" },
        _ => Reply::Error(RadioError::UnexpectedResponse),
    }
}

/// Map the two replies of `mac tx` to a [`TxStatus`].
///
/// `second` is `None` when the first reply already ended the exchange or
/// the module went quiet.
pub fn tx_outcome(first: &str, second: Option<&str>) -> TxStatus {
    match classify(first) {
        Reply::Ok => {}
        Reply::Error(e) => return e.into(),
        _ => return RadioError::UnexpectedResponse.into(),
    }
    let Some(second) = second else {
        return RadioError::NoResponse.into();
    };
    match classify(second) {
        Reply::TxOk => TxStatus::Success,
        Reply::Rx { port, data } => {
            info!("radio: downlink on port {} ({} bytes)", port, data.len() / 2);
            TxStatus::Success
        }
        Reply::Error(e) => e.into(),
        _ => RadioError::UnexpectedResponse.into(),
    }
}

// ───────────────────────────────────────────────────────────────
// Transceiver driver
// ───────────────────────────────────────────────────────────────

pub struct Rn2483<S: SerialLine, R: OutputPin, D: DelayNs> {
    serial: S,
    reset: R,
    delay: D,
    band_mhz: u16,
    joined: bool,
}

impl<S: SerialLine, R: OutputPin, D: DelayNs> Rn2483<S, R, D> {
    pub fn new(serial: S, reset: R, delay: D, band_mhz: u16) -> Self {
        Self {
            serial,
            reset,
            delay,
            band_mhz,
            joined: false,
        }
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// One command, one reply line.
    fn query(&mut self, cmd: &str) -> Result<Line, RadioError> {
        debug!("radio: > {}", cmd);
        self.serial.write_line(cmd)?;
        let reply = self.serial.read_line(CMD_TIMEOUT_MS)?;
        debug!("radio: < {}", reply);
        Ok(reply)
    }

    /// One command that must be answered with `ok`.
    fn command(&mut self, cmd: &str) -> Result<(), RadioError> {
        let reply = self.query(cmd)?;
        match classify(&reply) {
            Reply::Ok => Ok(()),
            Reply::Error(e) => Err(e),
            _ => Err(RadioError::UnexpectedResponse),
        }
    }

    fn command_hex(&mut self, key: &str, bytes: &[u8]) -> Result<(), RadioError> {
        let mut cmd = Line::new();
        write!(cmd, "mac set {} ", key).map_err(|_| RadioError::LineOverflow)?;
        push_hex(&mut cmd, bytes)?;
        self.command(&cmd)
    }

    fn pulse_reset(&mut self) {
        // A stuck reset line is not fatal: `sys reset` below still works.
        if self.reset.set_low().is_err() {
            warn!("radio: reset line write failed");
        }
        self.delay.delay_ms(RESET_PULSE_MS);
        if self.reset.set_high().is_err() {
            warn!("radio: reset line write failed");
        }
        // The banner after a hardware reset is discarded; `sys reset`
        // prints it again where we can read it synchronously.
        let _ = self.serial.read_line(BOOT_TIMEOUT_MS);
        self.serial.flush_input();
    }
}

impl<S: SerialLine, R: OutputPin, D: DelayNs> RadioLink for Rn2483<S, R, D> {
    fn initialize(&mut self) -> Result<RadioStatus, RadioError> {
        info!("radio: resetting transceiver");
        self.joined = false;
        self.pulse_reset();

        let banner = self.query("sys reset")?;
        if !banner.starts_with("RN") {
            warn!("radio: unexpected banner '{}'", banner);
            return Err(RadioError::UnexpectedResponse);
        }
        let mut status = RadioStatus::default();
        for c in banner.chars() {
            if status.firmware.push(c).is_err() {
                break;
            }
        }

        // Status queries are informational: a bad answer is logged, not fatal.
        status.hardware_eui = self
            .query("sys get hweui")
            .ok()
            .and_then(|eui| parse_hex::<8>(&eui, "hweui").ok());
        status.supply_mv = self
            .query("sys get vdd")
            .ok()
            .and_then(|mv| mv.trim().parse::<u16>().ok());

        info!(
            "radio: {} eui={:02X?} vdd={:?}mV",
            status.firmware, status.hardware_eui, status.supply_mv
        );
        Ok(status)
    }

    fn join(&mut self, credentials: &DeviceCredentials) -> Result<(), RadioError> {
        let mut cmd = Line::new();
        write!(cmd, "mac reset {}", self.band_mhz).map_err(|_| RadioError::LineOverflow)?;
        self.command(&cmd)?;
        self.command_hex("devaddr", &credentials.dev_addr)?;
        self.command_hex("nwkskey", &credentials.nwk_skey)?;
        self.command_hex("appskey", &credentials.app_skey)?;

        self.command("mac join abp")?;
        let second = self.serial.read_line(CMD_TIMEOUT_MS)?;
        debug!("radio: < {}", second);
        match classify(&second) {
            Reply::Accepted => {
                self.joined = true;
                info!("radio: ABP session active");
                Ok(())
            }
            Reply::Error(e) => Err(e),
            _ => Err(RadioError::UnexpectedResponse),
        }
    }

    fn send_bytes(&mut self, payload: &[u8], port: u8) -> TxStatus {
        let mut cmd = Line::new();
        if write!(cmd, "mac tx uncnf {} ", port).is_err() || push_hex(&mut cmd, payload).is_err() {
            return TxStatus::ConfigFailure(RadioError::LineOverflow);
        }

        let first = match self.query(&cmd) {
            Ok(line) => line,
            Err(e) => return e.into(),
        };
        if classify(&first) != Reply::Ok {
            return tx_outcome(&first, None);
        }
        match self.serial.read_line(TX_TIMEOUT_MS) {
            Ok(second) => {
                debug!("radio: < {}", second);
                tx_outcome(&first, Some(&second))
            }
            Err(e) => e.into(),
        }
    }
}

/// Append upper-case hex, two digits per byte.
pub fn push_hex<const N: usize>(out: &mut String<N>, bytes: &[u8]) -> Result<(), RadioError> {
    for b in bytes {
        write!(out, "{:02X}", b).map_err(|_| RadioError::LineOverflow)?;
    }
    Ok(())
}
