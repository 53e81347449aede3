//! ZYBO vendor BSP bindings
//!
//! Binds the [`crate::hal`] traits to the Digilent/Xilinx standalone BSP,
//! which is linked in as a C library.
//!
//! # Driver instances
//! The C drivers keep pointers into their instance structs (the GIC keeps
//! the handler table, the display controller keeps its frame pointers), so
//! every instance lives inside the static [`BOARD`] and never moves. Their
//! layouts are private to the BSP; this module only reserves storage large
//! enough for them.

use core::ffi::c_void;
use core::ptr::NonNull;

use spin::Mutex;

use crate::config::{BoardConfig, DISPLAY_NUM_FRAMES};
use crate::error::StatusCode;
use crate::hal::{
    AudioCodec, AudioInput, AudioOutput, Board, DelayTimer, DisplayController, DriverResult,
    IicController, InterruptController, Platform, SerialPort, TimeSource, UartConfig,
};
use crate::irq::IvtEntry;

/// Storage for a C driver instance whose layout is owned by the BSP.
#[repr(C, align(8))]
pub struct Opaque<const SIZE: usize>([u8; SIZE]);

impl<const SIZE: usize> Opaque<SIZE> {
    const fn new() -> Self {
        Self([0; SIZE])
    }

    fn as_mut_ptr<T>(&mut self) -> *mut T {
        self.0.as_mut_ptr() as *mut T
    }
}

// Upper bounds on the BSP struct sizes
const XSCUGIC_SIZE: usize = 1024;
const XIIC_SIZE: usize = 512;
const XUARTPS_SIZE: usize = 256;
const DISPLAY_CTRL_SIZE: usize = 1024;

/// `XUartPs_Config` from `xuartps.h`
#[repr(C)]
pub struct XUartPsConfig {
    pub device_id: u16,
    pub base_address: u32,
    pub input_clock_hz: u32,
    pub modem_pins_connected: i32,
}

extern "C" {
    // intc/intc.h
    fn fnInitInterruptController(ps_intc: *mut c_void) -> i32;
    fn fnEnableInterrupts(ps_intc: *mut c_void, ivt: *const IvtEntry, count: u32);

    // iic/iic.h and xiic.h
    fn fnInitIic(ps_iic: *mut c_void) -> i32;
    fn XIic_InterruptHandler(instance: *mut c_void);

    // audio/audio.h
    fn fnInitAudio() -> i32;
    fn fnSetLineInput();
    fn fnSetMicInput();
    fn fnSetHpOutput();
    fn fnSetLineOutput();

    // xtime_l.h
    fn XTime_GetTime(time: *mut u64);

    // timer_ps/timer_ps.h
    fn TimerInitialize(device_id: u16) -> i32;

    // xuartps.h
    fn XUartPs_LookupConfig(device_id: u16) -> *mut XUartPsConfig;
    fn XUartPs_CfgInitialize(
        instance: *mut c_void,
        config: *mut XUartPsConfig,
        effective_addr: u32,
    ) -> i32;
    fn XUartPs_SetBaudRate(instance: *mut c_void, baud: u32) -> i32;
    fn XUartPs_RecvByte(base_address: u32) -> u8;
    fn XUartPs_SendByte(base_address: u32, data: u8);

    // display_ctrl/display_ctrl.h
    fn DisplayInitialize(
        disp: *mut c_void,
        vtc_id: u16,
        dynclk_addr: u32,
        frames: *mut *mut u8,
        stride: u32,
    ) -> i32;
    fn DisplayStart(disp: *mut c_void) -> i32;
}

/// SCU GIC instance
pub struct ZynqIntc {
    raw: Opaque<XSCUGIC_SIZE>,
}

impl ZynqIntc {
    pub const fn new() -> Self {
        Self { raw: Opaque::new() }
    }
}

impl InterruptController for ZynqIntc {
    fn initialize(&mut self) -> DriverResult {
        // SAFETY: raw is reserved storage for an XScuGic that never moves
        StatusCode::check(unsafe { fnInitInterruptController(self.raw.as_mut_ptr()) })
    }

    fn enable_interrupts(&mut self, table: &[IvtEntry]) -> DriverResult {
        // SAFETY:
        // - IvtEntry is layout-compatible with ivt_t
        // - the count matches the slice
        unsafe {
            fnEnableInterrupts(self.raw.as_mut_ptr(), table.as_ptr(), table.len() as u32);
        }
        Ok(())
    }
}

/// AXI IIC instance
pub struct ZynqIic {
    raw: Opaque<XIIC_SIZE>,
}

impl ZynqIic {
    pub const fn new() -> Self {
        Self { raw: Opaque::new() }
    }
}

unsafe extern "C" fn iic_interrupt(callback_ref: *mut c_void) {
    // SAFETY: callback_ref is the XIic instance registered in vector()
    unsafe { XIic_InterruptHandler(callback_ref) }
}

impl IicController for ZynqIic {
    fn initialize(&mut self) -> DriverResult {
        // SAFETY: raw is reserved storage for an XIic that never moves
        StatusCode::check(unsafe { fnInitIic(self.raw.as_mut_ptr()) })
    }

    fn vector(&mut self, source: u32) -> IvtEntry {
        IvtEntry::new(source, iic_interrupt, self.raw.as_mut_ptr())
    }
}

/// SSM2603 codec, driven by the BSP over the AXI IIC bus
pub struct ZynqCodec;

impl AudioCodec for ZynqCodec {
    fn initialize(&mut self) -> DriverResult {
        // SAFETY: the BSP uses its own IIC instance, initialized by fnInitIic
        StatusCode::check(unsafe { fnInitAudio() })
    }

    fn set_input(&mut self, input: AudioInput) -> DriverResult {
        // SAFETY: codec registers are only written over the initialized bus
        unsafe {
            match input {
                AudioInput::Line => fnSetLineInput(),
                AudioInput::Mic => fnSetMicInput(),
            }
        }
        Ok(())
    }

    fn set_output(&mut self, output: AudioOutput) -> DriverResult {
        // SAFETY: as in set_input
        unsafe {
            match output {
                AudioOutput::Headphone => fnSetHpOutput(),
                AudioOutput::Line => fnSetLineOutput(),
            }
        }
        Ok(())
    }
}

/// Cortex-A9 global timer
pub struct ZynqClock {
    counts_per_second: u64,
}

impl TimeSource for ZynqClock {
    fn now(&self) -> u64 {
        let mut t = 0u64;
        // SAFETY: XTime_GetTime only writes the 64-bit counter value
        unsafe { XTime_GetTime(&mut t) };
        t
    }

    fn counts_per_second(&self) -> u64 {
        self.counts_per_second
    }
}

/// SCU private timer used by the display driver
pub struct ZynqTimer;

impl DelayTimer for ZynqTimer {
    fn initialize(&mut self, device_id: u16) -> DriverResult {
        // SAFETY: the BSP keeps its own timer instance
        StatusCode::check(unsafe { TimerInitialize(device_id) })
    }
}

/// PS UART instance
pub struct ZynqUart {
    raw: Opaque<XUARTPS_SIZE>,
    config: Option<NonNull<XUartPsConfig>>,
    base: u32,
}

// SAFETY: the config pointer refers to the BSP's static config table
unsafe impl Send for ZynqUart {}

impl ZynqUart {
    pub const fn new() -> Self {
        Self {
            raw: Opaque::new(),
            config: None,
            base: 0,
        }
    }
}

impl SerialPort for ZynqUart {
    fn lookup_config(&mut self, device_id: u16) -> Option<UartConfig> {
        // SAFETY: lookup only reads the BSP's config table
        let config = NonNull::new(unsafe { XUartPs_LookupConfig(device_id) })?;
        self.config = Some(config);
        // SAFETY: non-null entries of the config table are valid for reads
        let c = unsafe { config.as_ref() };
        Some(UartConfig {
            device_id: c.device_id,
            base_address: c.base_address as usize,
            input_clock_hz: c.input_clock_hz,
        })
    }

    fn cfg_initialize(&mut self, config: &UartConfig) -> DriverResult {
        let raw_config = self.config.ok_or(StatusCode::DEVICE_NOT_FOUND)?;
        self.base = config.base_address as u32;
        // SAFETY: raw is reserved storage for an XUartPs that never moves
        StatusCode::check(unsafe {
            XUartPs_CfgInitialize(self.raw.as_mut_ptr(), raw_config.as_ptr(), self.base)
        })
    }

    fn set_baud_rate(&mut self, baud: u32) -> DriverResult {
        // SAFETY: instance initialized by cfg_initialize
        StatusCode::check(unsafe { XUartPs_SetBaudRate(self.raw.as_mut_ptr(), baud) })
    }

    fn recv_byte(&mut self) -> u8 {
        // SAFETY: base is the configured UART's register block
        unsafe { XUartPs_RecvByte(self.base) }
    }

    fn send_byte(&mut self, byte: u8) {
        // SAFETY: as in recv_byte
        unsafe { XUartPs_SendByte(self.base, byte) }
    }
}

/// HDMI display controller instance
pub struct ZynqDisplay {
    raw: Opaque<DISPLAY_CTRL_SIZE>,
    frames: [*mut u8; DISPLAY_NUM_FRAMES],
}

// SAFETY: frame pointers refer to static frame storage
unsafe impl Send for ZynqDisplay {}

impl ZynqDisplay {
    pub const fn new() -> Self {
        Self {
            raw: Opaque::new(),
            frames: [core::ptr::null_mut(); DISPLAY_NUM_FRAMES],
        }
    }
}

impl DisplayController for ZynqDisplay {
    fn initialize(
        &mut self,
        vtc_id: u16,
        dynclk_base: usize,
        frames: &[*mut u8],
        stride: u32,
    ) -> DriverResult {
        // The C driver copies exactly DISPLAY_NUM_FRAMES pointers
        if frames.len() != DISPLAY_NUM_FRAMES {
            return Err(StatusCode::FAILURE);
        }
        self.frames.copy_from_slice(frames);
        // SAFETY:
        // - raw is reserved storage for a DisplayCtrl that never moves
        // - self.frames holds DISPLAY_NUM_FRAMES valid frame pointers
        StatusCode::check(unsafe {
            DisplayInitialize(
                self.raw.as_mut_ptr(),
                vtc_id,
                dynclk_base as u32,
                self.frames.as_mut_ptr(),
                stride,
            )
        })
    }

    fn start(&mut self) -> DriverResult {
        // SAFETY: instance initialized by initialize()
        StatusCode::check(unsafe { DisplayStart(self.raw.as_mut_ptr()) })
    }
}

/// Driver set of the ZYBO board.
pub struct Zynq;

impl Platform for Zynq {
    type Intc = ZynqIntc;
    type Iic = ZynqIic;
    type Codec = ZynqCodec;
    type Clock = ZynqClock;
    type Timer = ZynqTimer;
    type Uart = ZynqUart;
    type Display = ZynqDisplay;
}

/// The board's device instances.
pub static BOARD: Mutex<Board<Zynq>> = Mutex::new(Board {
    config: BoardConfig::ZYBO,
    intc: ZynqIntc::new(),
    display_intc: ZynqIntc::new(),
    iic: ZynqIic::new(),
    codec: ZynqCodec,
    clock: ZynqClock {
        counts_per_second: BoardConfig::ZYBO.counts_per_second,
    },
    timer: ZynqTimer,
    uart: ZynqUart::new(),
    display: ZynqDisplay::new(),
});
