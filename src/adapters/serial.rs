//! UART line transport for the transceiver (ESP-IDF only).
//!
//! 57600 8N1, no flow control.  Reads are byte-at-a-time against the
//! driver's RX ring buffer, so the timeout applies per byte: a module
//! that keeps talking keeps the read alive.

use esp_idf_hal::delay::TickType;
use esp_idf_hal::uart::UartDriver;

use crate::adapters::radio::{Line, SerialLine};
use crate::error::RadioError;

pub struct UartLine<'d> {
    uart: UartDriver<'d>,
}

impl<'d> UartLine<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl SerialLine for UartLine<'_> {
    fn write_line(&mut self, line: &str) -> Result<(), RadioError> {
        self.uart
            .write(line.as_bytes())
            .and_then(|_| self.uart.write(b"\r\n"))
            .map_err(|_| RadioError::Serial)?;
        Ok(())
    }

    fn read_line(&mut self, timeout_ms: u32) -> Result<Line, RadioError> {
        let ticks = TickType::new_millis(u64::from(timeout_ms)).ticks();
        let mut line = Line::new();
        let mut byte = [0u8; 1];
        loop {
            let n = self
                .uart
                .read(&mut byte, ticks)
                .map_err(|_| RadioError::Serial)?;
            if n == 0 {
                return Err(RadioError::NoResponse);
            }
            match byte[0] {
                b'\n' => return Ok(line),
                b'\r' => {}
                b => line.push(char::from(b)).map_err(|_| RadioError::LineOverflow)?,
            }
        }
    }

    fn flush_input(&mut self) {
        if self.uart.clear_rx().is_err() {
            log::warn!("radio: RX flush failed");
        }
    }
}
