//! Simulated driver layer
//!
//! Stands in for the vendor BSP. Every driver records the calls it receives
//! into a shared event trace, and each fallible call returns a configurable
//! status so tests can fail any step.
//!
//! The simulated GIC delivers interrupts only after its enable call, using
//! the handler and context captured in the vector table.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::ffi::c_void;

use crate::config::BoardConfig;
use crate::error::StatusCode;
use crate::hal::{
    AudioCodec, AudioInput, AudioOutput, Board, DelayTimer, DisplayController, DriverResult,
    IicController, InterruptController, Platform, SerialPort, TimeSource, UartConfig,
};
use crate::irq::IvtEntry;

/// A driver call observed by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    IntcInit(&'static str),
    EnableInterrupts(&'static str, usize),
    IicInit,
    CodecInit,
    SetInput(AudioInput),
    SetOutput(AudioOutput),
    TimerInit(u16),
    DisplayInit {
        vtc_id: u16,
        dynclk_base: usize,
        frames: usize,
        stride: u32,
    },
    DisplayStart,
    UartLookup(u16),
    UartCfgInit,
    UartBaud(u32),
}

/// Status returned by each simulated call; 0 is success.
#[derive(Debug, Clone)]
pub struct SimOptions {
    pub intc_status: i32,
    pub display_intc_status: i32,
    pub enable_status: i32,
    pub iic_status: i32,
    /// Status of the n-th codec init; missing entries succeed
    pub codec_statuses: Vec<i32>,
    pub routing_status: i32,
    pub timer_status: i32,
    pub display_init_status: i32,
    pub display_start_status: i32,
    pub uart_present: bool,
    pub uart_cfg_status: i32,
    pub baud_status: i32,
    pub counts_per_second: u64,
    /// Ticks the clock advances on every read
    pub clock_step: u64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            intc_status: 0,
            display_intc_status: 0,
            enable_status: 0,
            iic_status: 0,
            codec_statuses: Vec::new(),
            routing_status: 0,
            timer_status: 0,
            display_init_status: 0,
            display_start_status: 0,
            uart_present: true,
            uart_cfg_status: 0,
            baud_status: 0,
            counts_per_second: 1000,
            clock_step: 1,
        }
    }
}

type Trace = Rc<RefCell<Vec<Event>>>;

fn record(trace: &Trace, event: Event) {
    trace.borrow_mut().push(event);
}

/// Read-only view of what the simulated board observed.
#[derive(Clone)]
pub struct SimProbe {
    trace: Trace,
    iic_interrupts: Rc<Cell<u32>>,
    uart_output: Rc<RefCell<Vec<u8>>>,
}

impl SimProbe {
    /// Driver calls in the order they happened.
    pub fn events(&self) -> Vec<Event> {
        self.trace.borrow().clone()
    }

    /// Number of interrupts the IIC handler has serviced.
    pub fn iic_interrupts(&self) -> u32 {
        self.iic_interrupts.get()
    }

    /// Bytes sent through the terminal UART.
    pub fn uart_output(&self) -> Vec<u8> {
        self.uart_output.borrow().clone()
    }
}

/// Simulated SCU GIC.
pub struct SimIntc {
    name: &'static str,
    status: i32,
    enable_status: i32,
    trace: Trace,
    initialized: bool,
    enabled: Vec<IvtEntry>,
}

impl SimIntc {
    /// Raise interrupt `id`. Returns whether a handler ran.
    pub fn fire(&mut self, id: u32) -> bool {
        match self.enabled.iter().find(|e| e.id == id) {
            Some(entry) => {
                // SAFETY: entries were registered by initialized drivers whose
                // contexts are kept alive by the board and its probe
                unsafe { entry.dispatch() };
                true
            }
            None => false,
        }
    }
}

impl InterruptController for SimIntc {
    fn initialize(&mut self) -> DriverResult {
        record(&self.trace, Event::IntcInit(self.name));
        StatusCode::check(self.status)?;
        self.initialized = true;
        Ok(())
    }

    fn enable_interrupts(&mut self, table: &[IvtEntry]) -> DriverResult {
        record(&self.trace, Event::EnableInterrupts(self.name, table.len()));
        if !self.initialized {
            return Err(StatusCode::FAILURE);
        }
        StatusCode::check(self.enable_status)?;
        self.enabled = table.to_vec();
        Ok(())
    }
}

/// Simulated AXI IIC controller.
pub struct SimIic {
    status: i32,
    trace: Trace,
    irq_count: Rc<Cell<u32>>,
}

unsafe extern "C" fn sim_iic_interrupt(callback_ref: *mut c_void) {
    // SAFETY: callback_ref is the Cell<u32> shared by SimIic and SimProbe
    let count = unsafe { &*(callback_ref as *const Cell<u32>) };
    count.set(count.get() + 1);
}

impl IicController for SimIic {
    fn initialize(&mut self) -> DriverResult {
        record(&self.trace, Event::IicInit);
        StatusCode::check(self.status)
    }

    fn vector(&mut self, source: u32) -> IvtEntry {
        let ctx = Rc::as_ptr(&self.irq_count) as *mut c_void;
        IvtEntry::new(source, sim_iic_interrupt, ctx)
    }
}

/// Simulated SSM2603 codec.
pub struct SimCodec {
    statuses: Vec<i32>,
    inits: usize,
    routing_status: i32,
    trace: Trace,
}

impl AudioCodec for SimCodec {
    fn initialize(&mut self) -> DriverResult {
        record(&self.trace, Event::CodecInit);
        let status = self.statuses.get(self.inits).copied().unwrap_or(0);
        self.inits += 1;
        StatusCode::check(status)
    }

    fn set_input(&mut self, input: AudioInput) -> DriverResult {
        record(&self.trace, Event::SetInput(input));
        StatusCode::check(self.routing_status)
    }

    fn set_output(&mut self, output: AudioOutput) -> DriverResult {
        record(&self.trace, Event::SetOutput(output));
        StatusCode::check(self.routing_status)
    }
}

/// Simulated global timer; advances a fixed step per read.
pub struct SimClock {
    now: Cell<u64>,
    step: u64,
    counts_per_second: u64,
}

impl TimeSource for SimClock {
    fn now(&self) -> u64 {
        let t = self.now.get();
        self.now.set(t.wrapping_add(self.step));
        t
    }

    fn counts_per_second(&self) -> u64 {
        self.counts_per_second
    }
}

/// Simulated SCU private timer.
pub struct SimTimer {
    status: i32,
    trace: Trace,
}

impl DelayTimer for SimTimer {
    fn initialize(&mut self, device_id: u16) -> DriverResult {
        record(&self.trace, Event::TimerInit(device_id));
        StatusCode::check(self.status)
    }
}

/// Simulated PS UART with a scripted receive queue.
pub struct SimUart {
    present: bool,
    cfg_status: i32,
    baud_status: i32,
    baud: Option<u32>,
    rx: VecDeque<u8>,
    tx: Rc<RefCell<Vec<u8>>>,
    trace: Trace,
}

impl SimUart {
    /// Queue bytes to be received.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn baud_rate(&self) -> Option<u32> {
        self.baud
    }
}

impl SerialPort for SimUart {
    fn lookup_config(&mut self, device_id: u16) -> Option<UartConfig> {
        record(&self.trace, Event::UartLookup(device_id));
        self.present.then_some(UartConfig {
            device_id,
            base_address: BoardConfig::ZYBO.uart_base,
            input_clock_hz: 100_000_000,
        })
    }

    fn cfg_initialize(&mut self, _config: &UartConfig) -> DriverResult {
        record(&self.trace, Event::UartCfgInit);
        StatusCode::check(self.cfg_status)
    }

    fn set_baud_rate(&mut self, baud: u32) -> DriverResult {
        record(&self.trace, Event::UartBaud(baud));
        StatusCode::check(self.baud_status)?;
        self.baud = Some(baud);
        Ok(())
    }

    /// An empty queue reads as a carriage return.
    fn recv_byte(&mut self) -> u8 {
        self.rx.pop_front().unwrap_or(b'\r')
    }

    fn send_byte(&mut self, byte: u8) {
        self.tx.borrow_mut().push(byte);
    }
}

/// Simulated HDMI display controller.
pub struct SimDisplay {
    init_status: i32,
    start_status: i32,
    frames: Vec<*mut u8>,
    running: bool,
    trace: Trace,
}

impl SimDisplay {
    /// Frame pointers received at initialization.
    pub fn frames(&self) -> &[*mut u8] {
        &self.frames
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl DisplayController for SimDisplay {
    fn initialize(
        &mut self,
        vtc_id: u16,
        dynclk_base: usize,
        frames: &[*mut u8],
        stride: u32,
    ) -> DriverResult {
        record(
            &self.trace,
            Event::DisplayInit {
                vtc_id,
                dynclk_base,
                frames: frames.len(),
                stride,
            },
        );
        StatusCode::check(self.init_status)?;
        self.frames = frames.to_vec();
        Ok(())
    }

    fn start(&mut self) -> DriverResult {
        record(&self.trace, Event::DisplayStart);
        StatusCode::check(self.start_status)?;
        self.running = true;
        Ok(())
    }
}

/// Driver set of the simulated board.
pub struct SimPlatform;

impl Platform for SimPlatform {
    type Intc = SimIntc;
    type Iic = SimIic;
    type Codec = SimCodec;
    type Clock = SimClock;
    type Timer = SimTimer;
    type Uart = SimUart;
    type Display = SimDisplay;
}

impl SimPlatform {
    /// Build a ZYBO board backed by simulated drivers.
    pub fn board(options: SimOptions) -> (Board<SimPlatform>, SimProbe) {
        let trace: Trace = Rc::default();
        let irq_count = Rc::new(Cell::new(0));
        let tx = Rc::new(RefCell::new(Vec::new()));

        let intc = |name, status| SimIntc {
            name,
            status,
            enable_status: options.enable_status,
            trace: trace.clone(),
            initialized: false,
            enabled: Vec::new(),
        };

        let board = Board {
            config: BoardConfig::ZYBO,
            intc: intc("audio", options.intc_status),
            display_intc: intc("display", options.display_intc_status),
            iic: SimIic {
                status: options.iic_status,
                trace: trace.clone(),
                irq_count: irq_count.clone(),
            },
            codec: SimCodec {
                statuses: options.codec_statuses.clone(),
                inits: 0,
                routing_status: options.routing_status,
                trace: trace.clone(),
            },
            clock: SimClock {
                now: Cell::new(0),
                step: options.clock_step,
                counts_per_second: options.counts_per_second,
            },
            timer: SimTimer {
                status: options.timer_status,
                trace: trace.clone(),
            },
            uart: SimUart {
                present: options.uart_present,
                cfg_status: options.uart_cfg_status,
                baud_status: options.baud_status,
                baud: None,
                rx: VecDeque::new(),
                tx: tx.clone(),
                trace: trace.clone(),
            },
            display: SimDisplay {
                init_status: options.display_init_status,
                start_status: options.display_start_status,
                frames: Vec::new(),
                running: false,
                trace: trace.clone(),
            },
        };

        let probe = SimProbe {
            trace,
            iic_interrupts: irq_count,
            uart_output: tx,
        };
        (board, probe)
    }
}
