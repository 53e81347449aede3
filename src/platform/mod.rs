//! Driver implementations
//!
//! - `sim`: simulated drivers with call tracing and failure injection
//! - `zynq`: bindings to the vendor BSP, bare-metal targets only

pub mod sim;
#[cfg(target_os = "none")]
pub mod zynq;
