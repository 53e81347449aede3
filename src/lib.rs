//! ZYBO display/audio bring-up
//!
//! Board support for the Digilent ZYBO (Zynq-7000) HDMI and audio demo.
//!
//! # Bring-up order
//! 1. Display: frame buffers, SCU timer, display controller, its own GIC
//! 2. Audio: GIC, AXI IIC, codec, settle delay, codec again, input routing
//! 3. Interrupt enable, once every device in the vector table is up
//! 4. UART terminal at 115200 baud
//!
//! # Architecture
//! - The vendor HAL is reached through the traits in [`hal`]
//! - [`platform::zynq`] binds those traits to the BSP (bare-metal only)
//! - [`platform::sim`] is a simulated driver layer for tests and host runs

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod bringup;
pub mod config;
pub mod console;
pub mod delay;
pub mod demo;
pub mod display;
pub mod drivers;
pub mod error;
pub mod framebuf;
pub mod hal;
#[cfg(target_os = "none")]
pub mod heap;
pub mod irq;
pub mod platform;
pub mod terminal;

pub use bringup::{Sequencer, Steps};
pub use config::{BoardConfig, BringupOptions};
pub use error::{BringupError, DisplayError, StatusCode};
pub use hal::{Board, Platform};
