//! Driver seams
//!
//! The vendor BSP supplies every peripheral driver. Bring-up only talks to
//! them through these traits, so the sequencing logic can run against the
//! real BSP or against [`crate::platform::sim`].
//!
//! Fallible calls return `Result<(), StatusCode>`, carrying the raw vendor
//! status on failure.

use crate::config::BoardConfig;
use crate::error::StatusCode;
use crate::irq::IvtEntry;

/// Result of a vendor driver call.
pub type DriverResult = Result<(), StatusCode>;

/// Interrupt controller (SCU GIC).
pub trait InterruptController {
    /// Initialize the controller and hook it into the CPU exception table.
    fn initialize(&mut self) -> DriverResult;

    /// Connect and enable every entry of the table.
    ///
    /// Every device referenced by `table` must already be initialized.
    fn enable_interrupts(&mut self, table: &[IvtEntry]) -> DriverResult;
}

/// I2C controller used to configure the audio codec.
pub trait IicController {
    fn initialize(&mut self) -> DriverResult;

    /// Vector entry routing `source` to this controller's interrupt handler.
    fn vector(&mut self, source: u32) -> IvtEntry;
}

/// Audio input routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioInput {
    Line,
    Mic,
}

/// Audio output routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioOutput {
    Headphone,
    Line,
}

/// Audio codec (SSM2603), configured over the I2C bus.
pub trait AudioCodec {
    /// Reset and power up the codec.
    fn initialize(&mut self) -> DriverResult;

    fn set_input(&mut self, input: AudioInput) -> DriverResult;

    fn set_output(&mut self, output: AudioOutput) -> DriverResult;
}

/// Free-running monotonic counter.
pub trait TimeSource {
    fn now(&self) -> u64;

    fn counts_per_second(&self) -> u64;
}

/// Hardware timer used by the display driver for coarse delays.
pub trait DelayTimer {
    fn initialize(&mut self, device_id: u16) -> DriverResult;
}

/// Configuration record found by UART lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    pub device_id: u16,
    pub base_address: usize,
    pub input_clock_hz: u32,
}

/// PS UART used as the serial terminal.
pub trait SerialPort {
    /// Find the configuration of `device_id`; `None` if it does not exist.
    fn lookup_config(&mut self, device_id: u16) -> Option<UartConfig>;

    fn cfg_initialize(&mut self, config: &UartConfig) -> DriverResult;

    fn set_baud_rate(&mut self, baud: u32) -> DriverResult;

    /// Block until a byte arrives.
    fn recv_byte(&mut self) -> u8;

    fn send_byte(&mut self, byte: u8);
}

/// HDMI display controller.
pub trait DisplayController {
    /// Bind the controller to its timing controller, clock generator and
    /// frame buffers.
    fn initialize(
        &mut self,
        vtc_id: u16,
        dynclk_base: usize,
        frames: &[*mut u8],
        stride: u32,
    ) -> DriverResult;

    /// Start scanning out the current frame.
    fn start(&mut self) -> DriverResult;
}

/// The set of drivers a board provides.
pub trait Platform {
    type Intc: InterruptController;
    type Iic: IicController;
    type Codec: AudioCodec;
    type Clock: TimeSource;
    type Timer: DelayTimer;
    type Uart: SerialPort;
    type Display: DisplayController;
}

/// Board context threaded through bring-up.
///
/// Holds every device instance. The audio path and the display path each
/// own a separate interrupt controller instance.
pub struct Board<P: Platform> {
    pub config: BoardConfig,
    /// Controller serving the IIC interrupt
    pub intc: P::Intc,
    /// Controller initialized by the display path
    pub display_intc: P::Intc,
    pub iic: P::Iic,
    pub codec: P::Codec,
    pub clock: P::Clock,
    pub timer: P::Timer,
    pub uart: P::Uart,
    pub display: P::Display,
}
