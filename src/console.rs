//! Serial console and log backend
//!
//! All text output (status banners and `log` records) goes through one
//! console sink. On the board the sink is the PS UART; on the host it is
//! stdout.
//!
//! Nothing is printed until a sink is installed.

use alloc::boxed::Box;
use core::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

/// Destination of console output.
pub struct Console {
    sink: Option<Box<dyn Write + Send>>,
}

impl Console {
    pub const fn new() -> Self {
        Self { sink: None }
    }

    /// Replace the output sink, returning the previous one.
    pub fn install(&mut self, sink: Box<dyn Write + Send>) -> Option<Box<dyn Write + Send>> {
        self.sink.replace(sink)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        match self.sink.as_mut() {
            Some(sink) => sink.write_str(s),
            None => Ok(()),
        }
    }
}

/// Global console protected by spinlock
pub static CONSOLE: Mutex<Console> = Mutex::new(Console::new());

/// Install the global console sink.
pub fn install(sink: Box<dyn Write + Send>) {
    CONSOLE.lock().install(sink);
}

/// Write to the console unless it is already locked.
///
/// Returns `false` if the console was busy or the sink failed. The panic
/// handler uses this because the panicking code may hold the lock.
pub fn try_write_fmt(args: fmt::Arguments<'_>) -> bool {
    match CONSOLE.try_lock() {
        Some(mut console) => console.write_fmt(args).is_ok(),
        None => false,
    }
}

/// Print macro for console output
#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => {{
        use core::fmt::Write;
        let mut console = $crate::console::CONSOLE.lock();
        let _ = write!(console, $($arg)*);
    }};
}

/// Println macro for console output
#[macro_export]
macro_rules! kprintln {
    () => {
        $crate::kprint!("\n")
    };
    ($($arg:tt)*) => {{
        $crate::kprint!($($arg)*);
        $crate::kprint!("\n");
    }};
}

/// `log` backend writing `[LEVEL target] message` lines to the console.
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut console = CONSOLE.lock();
        let _ = format_record(&mut *console, record);
    }

    fn flush(&self) {}
}

fn format_record<W: Write + ?Sized>(out: &mut W, record: &Record<'_>) -> fmt::Result {
    writeln!(
        out,
        "[{level} {target}] {message}",
        level = record.level(),
        target = record.target(),
        message = record.args(),
    )
}

/// Register the console logger with the `log` facade.
///
/// A second call only updates the level.
pub fn init_logger(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<String>>);

    impl Write for Capture {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.0.lock().push_str(s);
            Ok(())
        }
    }

    #[test]
    fn test_console_without_sink_drops_output() {
        let mut console = Console::new();
        assert!(write!(console, "lost").is_ok());
        let capture = Capture::default();
        assert!(console.install(Box::new(capture.clone())).is_none());
        assert!(capture.0.lock().is_empty());
    }

    #[test]
    fn test_console_forwards_to_sink() {
        let capture = Capture::default();
        let mut console = Console::new();
        console.install(Box::new(capture.clone()));
        write!(console, "status {}", 0).unwrap();
        assert_eq!(capture.0.lock().as_str(), "status 0");
    }

    #[test]
    fn test_try_write_gives_up_when_locked() {
        let held = CONSOLE.lock();
        assert!(!try_write_fmt(format_args!("panicked at {}\n", "bringup.rs")));
        drop(held);
    }

    #[test]
    fn test_record_format() {
        let mut out = String::new();
        format_record(
            &mut out,
            &Record::builder()
                .level(log::Level::Error)
                .target("zybo")
                .args(format_args!("Error initializing {}", "interrupts"))
                .build(),
        )
        .unwrap();
        assert_eq!(out, "[ERROR zybo] Error initializing interrupts\n");
    }
}
