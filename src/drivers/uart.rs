//! Cadence PS UART console writer
//!
//! Minimal polled transmitter for the Zynq PS UART, used as the console
//! sink before and after the vendor driver configures the port. Baud rate
//! and framing are left as the FSBL or the vendor driver set them.
//!
//! # Memory Map (ZYBO)
//! - PS7 UART 1 base address: 0xE000_1000
//! - Register size: 0x1000 bytes

use core::fmt::{self, Write};

/// Cadence UART register offsets
mod regs {
    /// Channel Status Register
    pub const SR: usize = 0x2C;
    /// Transmit and Receive FIFO
    pub const FIFO: usize = 0x30;
}

/// Channel Status Register bits
mod flags {
    /// Transmit FIFO full
    pub const TXFULL: u32 = 1 << 4;
}

/// Polled PS UART transmitter
pub struct PsUart {
    base: usize,
}

impl PsUart {
    /// Create a transmitter for the UART at `base`.
    ///
    /// # Safety
    /// `base` must point to a Cadence UART register block (or memory laid out
    /// like one) that stays mapped for the lifetime of the writer.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Write a single byte to the UART
    fn write_byte(&self, byte: u8) {
        // SAFETY: new() requires base to be a valid register block
        // The accesses are to known MMIO registers
        unsafe {
            let sr = (self.base + regs::SR) as *const u32;
            let fifo = (self.base + regs::FIFO) as *mut u32;

            // Wait for transmit FIFO to have space
            while core::ptr::read_volatile(sr) & flags::TXFULL != 0 {
                core::hint::spin_loop();
            }

            core::ptr::write_volatile(fifo, byte as u32);
        }
    }

    /// Write a string, expanding `\n` to `\r\n`
    pub fn write_str(&self, s: &str) {
        for byte in crlf_bytes(s) {
            self.write_byte(byte);
        }
    }
}

/// Bytes of `s` as sent on the wire, with `\n` expanded to `\r\n`.
fn crlf_bytes(s: &str) -> impl Iterator<Item = u8> + '_ {
    s.bytes().flat_map(|byte| {
        let cr = (byte == b'\n').then_some(b'\r');
        cr.into_iter().chain(core::iter::once(byte))
    })
}

impl Write for PsUart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        PsUart::write_str(self, s);
        Ok(())
    }
}
