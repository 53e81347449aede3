//! ZYBO display/audio demo
//!
//! On the board this is the bare-metal application the BSP's startup code
//! calls as `main`. On a host it runs the same sequence against the
//! simulated driver layer and prints to stdout.

#![cfg_attr(target_os = "none", no_std, no_main)]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(target_os = "none")]
extern crate alloc;

#[cfg(target_os = "none")]
mod board {
    use core::panic::PanicInfo;

    use alloc::boxed::Box;
    use zybo_bringup::config::{xparameters, BringupOptions};
    use zybo_bringup::drivers::uart::PsUart;
    use zybo_bringup::platform::zynq::BOARD;
    use zybo_bringup::{console, demo, framebuf, heap};

    /// Entry point called by the BSP startup code
    #[no_mangle]
    pub extern "C" fn main() -> i32 {
        heap::init_heap();

        // SAFETY: PS7 UART 1 is mapped at this address on the ZYBO
        let uart = unsafe { PsUart::new(xparameters::PS7_UART_1_BASEADDR) };
        console::install(Box::new(uart));

        let options = BringupOptions::default();
        console::init_logger(options.log_level);
        log::info!("Heap initialized ({} KiB)", heap::heap_size() / 1024);

        let mut frames = match framebuf::take_board_frames() {
            Some(frames) => frames,
            None => return demo::EXIT_FAILURE,
        };

        let mut board = BOARD.lock();
        demo::run(&mut *board, &mut frames, options).exit_code()
    }

    /// Panic handler - report and halt
    ///
    /// Never blocks on the console: a panic raised while it is locked goes
    /// straight to the halt loop.
    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        macro_rules! report {
            ($($arg:tt)*) => {
                if !console::try_write_fmt(format_args!($($arg)*)) {
                    halt();
                }
            };
        }

        report!("\n!!! PANIC !!!\n");
        if let Some(location) = info.location() {
            report!(
                "Location: {}:{}:{}\n",
                location.file(),
                location.line(),
                location.column()
            );
        }
        report!("Message: {}\n", info.message());
        report!("System halted.\n");

        halt();
    }

    /// Halt the CPU in a low-power state
    fn halt() -> ! {
        loop {
            // SAFETY: WFI is always safe to execute
            unsafe {
                core::arch::asm!("wfi", options(nostack, nomem));
            }
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    use std::fmt;
    use std::io::Write as _;

    use zybo_bringup::config::BringupOptions;
    use zybo_bringup::platform::sim::{SimOptions, SimPlatform};
    use zybo_bringup::{console, demo, framebuf};

    struct Stdout;

    impl fmt::Write for Stdout {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            std::io::stdout()
                .write_all(s.as_bytes())
                .map_err(|_| fmt::Error)
        }
    }

    console::install(Box::new(Stdout));
    let options = BringupOptions::default();
    console::init_logger(options.log_level);

    let (mut board, _probe) = SimPlatform::board(SimOptions::default());
    let code = match framebuf::take_board_frames() {
        Some(mut frames) => demo::run(&mut board, &mut frames, options).exit_code(),
        None => demo::EXIT_FAILURE,
    };
    std::process::exit(code);
}
