//! Frame Buffer Storage
//!
//! Fixed set of equally sized, 32-byte aligned frame buffers plus the
//! parallel array of pointers the display controller scans out from.
//!
//! # Design
//! - Frames are never resized or reallocated
//! - `pointers[i]` always refers to the first byte of frame `i`
//! - The board's frames live in static storage that is claimed once

use core::marker::PhantomData;
use core::ptr::addr_of_mut;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::{DEMO_MAX_FRAME, DISPLAY_NUM_FRAMES};

/// Required alignment of every frame, in bytes.
pub const FRAME_ALIGN: usize = 32;

/// One frame of `SIZE` bytes.
#[repr(C, align(32))]
pub struct Frame<const SIZE: usize>(pub [u8; SIZE]);

impl<const SIZE: usize> Frame<SIZE> {
    pub const ZEROED: Self = Self([0; SIZE]);
}

/// `N` frames of `SIZE` bytes and their pointer array.
pub struct FrameBufferSet<'a, const N: usize, const SIZE: usize> {
    pointers: [*mut u8; N],
    _storage: PhantomData<&'a mut [Frame<SIZE>; N]>,
}

impl<'a, const N: usize, const SIZE: usize> FrameBufferSet<'a, N, SIZE> {
    /// Take exclusive ownership of `storage` and record each frame's start.
    pub fn new(storage: &'a mut [Frame<SIZE>; N]) -> Self {
        let pointers = storage.each_mut().map(|frame| frame.0.as_mut_ptr());
        Self {
            pointers,
            _storage: PhantomData,
        }
    }

    /// Number of frames.
    #[inline]
    pub const fn count(&self) -> usize {
        N
    }

    /// Size of one frame in bytes.
    #[inline]
    pub const fn frame_size(&self) -> usize {
        SIZE
    }

    /// Pointer array handed to the display controller.
    #[inline]
    pub fn pointers(&self) -> &[*mut u8; N] {
        &self.pointers
    }

    /// Mutable view of frame `index`, or `None` if out of range.
    pub fn frame_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let ptr = *self.pointers.get(index)?;
        // SAFETY:
        // - ptr was derived from the exclusive borrow held for 'a
        // - each frame is SIZE bytes and frames do not overlap
        // - &mut self prevents a second live view
        Some(unsafe { core::slice::from_raw_parts_mut(ptr, SIZE) })
    }

    /// Fill every frame with `value`.
    pub fn fill(&mut self, value: u8) {
        for index in 0..N {
            if let Some(frame) = self.frame_mut(index) {
                frame.fill(value);
            }
        }
    }
}

/// Frame set backing the HDMI output.
pub type BoardFrames = FrameBufferSet<'static, DISPLAY_NUM_FRAMES, DEMO_MAX_FRAME>;

const EMPTY_FRAME: Frame<DEMO_MAX_FRAME> = Frame::ZEROED;

static mut FRAME_STORAGE: [Frame<DEMO_MAX_FRAME>; DISPLAY_NUM_FRAMES] =
    [EMPTY_FRAME; DISPLAY_NUM_FRAMES];

static FRAME_STORAGE_TAKEN: AtomicBool = AtomicBool::new(false);

/// Claim the board's static frame storage.
///
/// Returns `None` on every call after the first.
pub fn take_board_frames() -> Option<BoardFrames> {
    if FRAME_STORAGE_TAKEN.swap(true, Ordering::AcqRel) {
        return None;
    }
    // SAFETY:
    // - FRAME_STORAGE is a valid static array
    // - the flag above hands out the only reference, exactly once
    let storage = unsafe { &mut *addr_of_mut!(FRAME_STORAGE) };
    Some(FrameBufferSet::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;

    const F32: Frame<32> = Frame::ZEROED;
    const F64: Frame<64> = Frame::ZEROED;
    const F100: Frame<100> = Frame::ZEROED;

    #[test]
    fn test_pointer_per_frame() {
        let mut storage = Box::new([F100; 3]);
        let frames = FrameBufferSet::new(&mut *storage);
        assert_eq!(frames.pointers().len(), frames.count());
        assert_eq!(frames.count(), 3);
    }

    #[test]
    fn test_frames_are_aligned() {
        let mut storage = Box::new([F100; 4]);
        let frames = FrameBufferSet::new(&mut *storage);
        for ptr in frames.pointers() {
            assert_eq!(*ptr as usize % FRAME_ALIGN, 0);
        }
    }

    #[test]
    fn test_pointers_follow_storage_order() {
        let mut storage = Box::new([F64; 3]);
        let base = storage.as_ptr() as usize;
        let frames = FrameBufferSet::new(&mut *storage);
        for (i, ptr) in frames.pointers().iter().enumerate() {
            assert_eq!(*ptr as usize, base + i * 64);
        }
    }

    #[test]
    fn test_frame_mut_writes_through() {
        let mut storage = Box::new([F32; 2]);
        let mut frames = FrameBufferSet::new(&mut *storage);
        frames.frame_mut(1).unwrap()[5] = 0xAB;
        assert!(frames.frame_mut(2).is_none());
        frames.fill(0x11);
        assert!(frames.frame_mut(0).unwrap().iter().all(|&b| b == 0x11));
        drop(frames);
        assert_eq!(storage[1].0[5], 0x11);
    }

    #[test]
    fn test_board_frames_claimed_once() {
        let frames = take_board_frames().unwrap();
        assert_eq!(frames.count(), DISPLAY_NUM_FRAMES);
        assert_eq!(frames.frame_size(), DEMO_MAX_FRAME);
        assert!(frames.pointers().iter().all(|p| *p as usize % FRAME_ALIGN == 0));
        assert!(take_board_frames().is_none());
    }
}
