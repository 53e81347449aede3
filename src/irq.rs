//! Interrupt Vector Table
//!
//! Maps interrupt source IDs to a handler and the driver instance the
//! handler operates on. The table is handed to the interrupt controller in
//! one call when interrupts are enabled.
//!
//! # Layout
//! ```text
//! ┌──────────────┬────────────────────────┬────────────────────┐
//! │ id: u32      │ handler: extern "C" fn │ callback_ref: *mut │
//! └──────────────┴────────────────────────┴────────────────────┘
//! ```
//! Identical to the BSP's `ivt_t`, so a slice can be passed straight to
//! `fnEnableInterrupts`.
//!
//! # Ordering
//! Entries are only registered after the referenced device initialized
//! successfully, so a handler can never see a half-built instance.

use alloc::vec::Vec;
use core::ffi::c_void;
use core::fmt;

/// Interrupt handler signature used by the vendor drivers.
pub type Handler = unsafe extern "C" fn(callback_ref: *mut c_void);

/// One entry of the vector table.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct IvtEntry {
    /// Interrupt source ID
    pub id: u32,
    /// Handler invoked when the source fires
    pub handler: Handler,
    /// Driver instance passed to the handler (not owned)
    pub callback_ref: *mut c_void,
}

impl IvtEntry {
    pub const fn new(id: u32, handler: Handler, callback_ref: *mut c_void) -> Self {
        Self {
            id,
            handler,
            callback_ref,
        }
    }

    /// Run the handler against its context.
    ///
    /// # Safety
    /// `callback_ref` must still point to the driver instance the handler
    /// expects.
    pub unsafe fn dispatch(&self) {
        // SAFETY: upheld by the caller
        unsafe { (self.handler)(self.callback_ref) }
    }
}

/// Error type for vector table operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorError {
    /// The source ID already has a handler.
    DuplicateSource(u32),
}

impl fmt::Display for VectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorError::DuplicateSource(id) => {
                write!(f, "interrupt source {} registered twice", id)
            }
        }
    }
}

/// Ordered interrupt vector table, built during bring-up.
#[derive(Debug, Default)]
pub struct VectorTable {
    entries: Vec<IvtEntry>,
}

impl VectorTable {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry. Each source may only appear once.
    pub fn register(&mut self, entry: IvtEntry) -> Result<(), VectorError> {
        if self.contains(entry.id) {
            return Err(VectorError::DuplicateSource(entry.id));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    #[inline]
    pub fn as_slice(&self) -> &[IvtEntry] {
        &self.entries
    }
}
