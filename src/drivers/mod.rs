//! Device drivers owned by this crate
//!
//! Everything else is the vendor BSP's, reached through [`crate::hal`].

pub mod uart;
