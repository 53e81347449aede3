//! Bare-metal heap for the board build
//!
//! Bring-up allocates only twice: the console sink box (one `PsUart`, a
//! single base address) and the interrupt vector table (one IIC entry,
//! growing to a four-entry `Vec`). Both stay under a hundred bytes, so a
//! 4 KiB arena leaves room for a few more vector entries and `log`'s
//! bookkeeping. Frame buffers never touch the heap.

use linked_list_allocator::LockedHeap;

#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// Arena size in bytes
const HEAP_SIZE: usize = 4 * 1024;

#[repr(C, align(16))]
struct Arena([u8; HEAP_SIZE]);

static mut ARENA: Arena = Arena([0; HEAP_SIZE]);

/// Hand the arena to the allocator.
///
/// Called once from the entry point, before the console is installed.
pub fn init_heap() {
    // SAFETY: ARENA is only ever touched here, and the entry point calls
    // this exactly once before the first allocation
    unsafe {
        let bottom = core::ptr::addr_of_mut!(ARENA) as *mut u8;
        ALLOCATOR.lock().init(bottom, HEAP_SIZE);
    }
}

/// Arena size in bytes
pub fn heap_size() -> usize {
    HEAP_SIZE
}
