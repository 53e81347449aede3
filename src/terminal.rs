//! Serial terminal input
//!
//! Turns digits typed over the UART into numbers.
//!
//! # Parsing rules
//! - Digits are accumulated left to right
//! - Every other byte is skipped, including a leading sign
//! - Input ends at the end of the slice or at the first NUL byte
//! - No digits parses as 0
//! - Overflow beyond `i32` wraps silently; callers must not rely on the
//!   value of oversized input

use crate::hal::SerialPort;

/// Parse the decimal digits of `input` into an `i32`.
pub fn parse_decimal(input: &[u8]) -> i32 {
    input
        .iter()
        .take_while(|&&b| b != 0)
        .filter(|b| b.is_ascii_digit())
        .fold(0i32, |acc, &b| {
            acc.wrapping_mul(10).wrapping_add(i32::from(b - b'0'))
        })
}

/// Size of the terminal line buffer.
pub const LINE_CAPACITY: usize = 32;

/// Line-oriented reader on top of the terminal UART.
pub struct Terminal<'a, U: SerialPort> {
    uart: &'a mut U,
    line: [u8; LINE_CAPACITY],
    /// Last line ended on CR; an LF right after it belongs to that line
    after_cr: bool,
}

impl<'a, U: SerialPort> Terminal<'a, U> {
    pub fn new(uart: &'a mut U) -> Self {
        Self {
            uart,
            line: [0; LINE_CAPACITY],
            after_cr: false,
        }
    }

    /// Read bytes until CR, LF or CRLF, echoing printable input.
    ///
    /// Bytes past the buffer capacity are dropped.
    pub fn read_line(&mut self) -> &[u8] {
        let mut len = 0;
        loop {
            let byte = self.uart.recv_byte();
            let after_cr = core::mem::replace(&mut self.after_cr, byte == b'\r');
            if byte == b'\n' && after_cr {
                continue;
            }
            if byte == b'\r' || byte == b'\n' {
                self.uart.send_byte(b'\r');
                self.uart.send_byte(b'\n');
                break;
            }
            if len < LINE_CAPACITY {
                self.line[len] = byte;
                len += 1;
            }
            if byte.is_ascii_graphic() || byte == b' ' {
                self.uart.send_byte(byte);
            }
        }
        &self.line[..len]
    }

    /// Read one line and parse it as a number.
    pub fn read_value(&mut self) -> i32 {
        parse_decimal(self.read_line())
    }
}
