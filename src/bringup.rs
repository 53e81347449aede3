//! Peripheral Bring-up Sequencer
//!
//! Runs the audio-path and terminal initialization in a fixed order and
//! stops at the first failure. Steps that already ran are left in place;
//! there is no rollback.
//!
//! # Order
//! ```text
//! GIC init ─► IIC init ─► codec init ─► settle ─► codec init ─► routing
//!                                                                  │
//!                     UART config ◄─ interrupt enable ◄────────────┘
//! ```
//!
//! The IIC vector entry is captured only after the IIC controller came up,
//! and the table is handed to the GIC only after every referenced device is
//! initialized.

use bitflags::bitflags;
use log::{error, info};

use crate::config::BringupOptions;
use crate::delay;
use crate::error::{BringupError, Stage, StatusCode};
use crate::hal::{
    AudioCodec, Board, IicController, InterruptController, Platform, SerialPort,
};
use crate::irq::VectorTable;

bitflags! {
    /// Bring-up steps that completed successfully.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Steps: u16 {
        const INTC = 1 << 0;
        const IIC = 1 << 1;
        const AUDIO = 1 << 2;
        const SETTLE = 1 << 3;
        const AUDIO_REINIT = 1 << 4;
        const AUDIO_ROUTING = 1 << 5;
        const IRQ_ENABLE = 1 << 6;
        const UART = 1 << 7;
    }
}

impl Steps {
    /// Steps that must be done before interrupts may be enabled.
    pub const IRQ_PREREQUISITES: Self = Self::INTC.union(Self::IIC);
}

/// Drives the peripheral bring-up of one board.
#[derive(Debug)]
pub struct Sequencer {
    options: BringupOptions,
    completed: Steps,
    vectors: VectorTable,
}

impl Sequencer {
    pub fn new(options: BringupOptions) -> Self {
        Self {
            options,
            completed: Steps::empty(),
            vectors: VectorTable::new(),
        }
    }

    /// Steps that have completed so far.
    #[inline]
    pub fn completed(&self) -> Steps {
        self.completed
    }

    /// Vector table handed to the interrupt controller.
    #[inline]
    pub fn vectors(&self) -> &VectorTable {
        &self.vectors
    }

    /// Run the whole sequence.
    ///
    /// Logs the failing subsystem and returns on the first error.
    pub fn run<P: Platform>(&mut self, board: &mut Board<P>) -> Result<(), BringupError> {
        let result = self.run_steps(board);
        if let Err(e) = &result {
            error!("{}", e);
        }
        result
    }

    fn run_steps<P: Platform>(&mut self, board: &mut Board<P>) -> Result<(), BringupError> {
        board
            .intc
            .initialize()
            .map_err(|status| driver_error(Stage::InterruptController, status))?;
        self.completed |= Steps::INTC;

        board
            .iic
            .initialize()
            .map_err(|status| driver_error(Stage::Iic, status))?;
        self.completed |= Steps::IIC;
        self.vectors
            .register(board.iic.vector(board.config.iic_irq))?;

        board
            .codec
            .initialize()
            .map_err(|status| driver_error(Stage::AudioCodec, status))?;
        self.completed |= Steps::AUDIO;

        let elapsed = delay::busy_wait(&board.clock, self.options.settle_tenths)?;
        log::debug!("codec settled after {} ticks", elapsed);
        self.completed |= Steps::SETTLE;

        board
            .codec
            .initialize()
            .map_err(|status| driver_error(Stage::AudioCodecReinit, status))?;
        self.completed |= Steps::AUDIO_REINIT;

        board
            .codec
            .set_input(self.options.audio_input)
            .map_err(|status| driver_error(Stage::AudioRouting, status))?;
        if let Some(output) = self.options.audio_output {
            board
                .codec
                .set_output(output)
                .map_err(|status| driver_error(Stage::AudioRouting, status))?;
        }
        self.completed |= Steps::AUDIO_ROUTING;

        self.enable_interrupts(&mut board.intc)?;
        info!("Audio codec initialized.");

        self.configure_uart(&mut board.uart, board.config.uart_device_id)?;
        Ok(())
    }

    /// Hand the vector table to the interrupt controller.
    ///
    /// Refused until the controller and the devices in the table are up.
    pub fn enable_interrupts<I: InterruptController>(
        &mut self,
        intc: &mut I,
    ) -> Result<(), BringupError> {
        let missing = Steps::IRQ_PREREQUISITES.difference(self.completed);
        if !missing.is_empty() {
            return Err(BringupError::NotReady {
                stage: Stage::InterruptEnable,
                missing,
            });
        }

        intc.enable_interrupts(self.vectors.as_slice())
            .map_err(|status| driver_error(Stage::InterruptEnable, status))?;
        self.completed |= Steps::IRQ_ENABLE;
        Ok(())
    }

    /// Look up, initialize and set the baud rate of the terminal UART.
    pub fn configure_uart<U: SerialPort>(
        &mut self,
        uart: &mut U,
        device_id: u16,
    ) -> Result<(), BringupError> {
        let config = uart
            .lookup_config(device_id)
            .ok_or(BringupError::DeviceNotFound {
                stage: Stage::Uart,
                device_id,
            })?;
        uart.cfg_initialize(&config)
            .map_err(|status| driver_error(Stage::Uart, status))?;
        uart.set_baud_rate(self.options.baud_rate)
            .map_err(|status| driver_error(Stage::Uart, status))?;

        info!("UART Configured for User Input");
        self.completed |= Steps::UART;
        Ok(())
    }
}

fn driver_error(stage: Stage, status: StatusCode) -> BringupError {
    BringupError::Driver { stage, status }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::AudioInput;
    use crate::platform::sim::{Event, SimOptions, SimPlatform};

    fn quick_options() -> BringupOptions {
        BringupOptions {
            settle_tenths: 2,
            ..BringupOptions::default()
        }
    }

    #[test]
    fn test_full_sequence_succeeds() {
        let (mut board, probe) = SimPlatform::board(SimOptions::default());
        let mut seq = Sequencer::new(quick_options());

        assert_eq!(seq.run(&mut board), Ok(()));
        assert!(seq.completed().is_all());
        assert_eq!(
            probe.events(),
            [
                Event::IntcInit("audio"),
                Event::IicInit,
                Event::CodecInit,
                Event::CodecInit,
                Event::SetInput(AudioInput::Line),
                Event::EnableInterrupts("audio", 1),
                Event::UartLookup(0),
                Event::UartCfgInit,
                Event::UartBaud(115_200),
            ]
        );
    }

    #[test]
    fn test_intc_failure_stops_everything() {
        let opts = SimOptions {
            intc_status: 1,
            ..SimOptions::default()
        };
        let (mut board, probe) = SimPlatform::board(opts);
        let mut seq = Sequencer::new(quick_options());

        let err = seq.run(&mut board).unwrap_err();
        assert_eq!(err.stage(), Stage::InterruptController);
        assert_eq!(probe.events(), [Event::IntcInit("audio")]);
        assert!(seq.completed().is_empty());
    }

    #[test]
    fn test_iic_failure_leaves_table_empty() {
        let opts = SimOptions {
            iic_status: 3,
            ..SimOptions::default()
        };
        let (mut board, probe) = SimPlatform::board(opts);
        let mut seq = Sequencer::new(quick_options());

        assert_eq!(
            seq.run(&mut board),
            Err(BringupError::Driver {
                stage: Stage::Iic,
                status: StatusCode(3)
            })
        );
        assert!(seq.vectors().is_empty());
        assert!(!probe.events().contains(&Event::CodecInit));
    }

    #[test]
    fn test_codec_reinit_failure_is_reported() {
        let opts = SimOptions {
            codec_statuses: alloc::vec![0, 1],
            ..SimOptions::default()
        };
        let (mut board, probe) = SimPlatform::board(opts);
        let mut seq = Sequencer::new(quick_options());

        let err = seq.run(&mut board).unwrap_err();
        assert_eq!(err.stage(), Stage::AudioCodecReinit);
        assert!(seq.completed().contains(Steps::SETTLE));
        assert!(!probe
            .events()
            .iter()
            .any(|e| matches!(e, Event::EnableInterrupts(..))));
    }

    #[test]
    fn test_zero_tick_rate_aborts_before_reinit() {
        let opts = SimOptions {
            counts_per_second: 0,
            ..SimOptions::default()
        };
        let (mut board, probe) = SimPlatform::board(opts);
        let mut seq = Sequencer::new(quick_options());

        assert_eq!(seq.run(&mut board), Err(BringupError::ZeroTickRate));
        let codec_inits = probe
            .events()
            .iter()
            .filter(|e| **e == Event::CodecInit)
            .count();
        assert_eq!(codec_inits, 1);
    }

    #[test]
    fn test_enable_refused_before_devices_ready() {
        let (mut board, probe) = SimPlatform::board(SimOptions::default());
        let mut seq = Sequencer::new(quick_options());

        let err = seq.enable_interrupts(&mut board.intc).unwrap_err();
        assert_eq!(
            err,
            BringupError::NotReady {
                stage: Stage::InterruptEnable,
                missing: Steps::IRQ_PREREQUISITES
            }
        );
        assert!(probe.events().is_empty());
    }

    #[test]
    fn test_enable_follows_device_init() {
        let (mut board, probe) = SimPlatform::board(SimOptions::default());
        let mut seq = Sequencer::new(quick_options());
        seq.run(&mut board).unwrap();

        let events = probe.events();
        let enable = events
            .iter()
            .position(|e| matches!(e, Event::EnableInterrupts(..)))
            .unwrap();
        let intc = events.iter().position(|e| *e == Event::IntcInit("audio")).unwrap();
        let iic = events.iter().position(|e| *e == Event::IicInit).unwrap();
        assert!(intc < enable && iic < enable);
    }

    #[test]
    fn test_interrupts_delivered_only_after_enable() {
        let (mut board, probe) = SimPlatform::board(SimOptions::default());
        let irq = board.config.iic_irq;
        assert!(!board.intc.fire(irq));

        let mut seq = Sequencer::new(quick_options());
        seq.run(&mut board).unwrap();

        assert!(board.intc.fire(irq));
        assert!(board.intc.fire(irq));
        assert_eq!(probe.iic_interrupts(), 2);
        assert!(!board.intc.fire(irq + 1));
    }

    #[test]
    fn test_missing_uart_aborts() {
        let opts = SimOptions {
            uart_present: false,
            ..SimOptions::default()
        };
        let (mut board, probe) = SimPlatform::board(opts);
        let mut seq = Sequencer::new(quick_options());

        assert_eq!(
            seq.run(&mut board),
            Err(BringupError::DeviceNotFound {
                stage: Stage::Uart,
                device_id: 0
            })
        );
        assert!(seq.completed().contains(Steps::IRQ_ENABLE));
        assert!(!seq.completed().contains(Steps::UART));
        assert!(!probe.events().contains(&Event::UartCfgInit));
    }

    #[test]
    fn test_routing_failure_stops_before_enable() {
        let opts = SimOptions {
            routing_status: 6,
            ..SimOptions::default()
        };
        let (mut board, trace) = SimPlatform::board(opts);
        let mut seq = Sequencer::new(quick_options());

        assert_eq!(
            seq.run(&mut board),
            Err(BringupError::Driver {
                stage: Stage::AudioRouting,
                status: StatusCode(6)
            })
        );
        assert_eq!(trace.events().last(), Some(&Event::SetInput(AudioInput::Line)));
        assert!(!seq.completed().contains(Steps::AUDIO_ROUTING));
    }

    #[test]
    fn test_enable_failure_leaves_uart_untouched() {
        let opts = SimOptions {
            enable_status: 8,
            ..SimOptions::default()
        };
        let (mut board, trace) = SimPlatform::board(opts);
        let mut seq = Sequencer::new(quick_options());

        assert_eq!(
            seq.run(&mut board),
            Err(BringupError::Driver {
                stage: Stage::InterruptEnable,
                status: StatusCode(8)
            })
        );
        assert_eq!(
            trace.events().last(),
            Some(&Event::EnableInterrupts("audio", 1))
        );
        assert!(!seq.completed().contains(Steps::IRQ_ENABLE));
        assert!(!board.intc.fire(board.config.iic_irq));
    }

    #[test]
    fn test_uart_init_failure_skips_baud() {
        let opts = SimOptions {
            uart_cfg_status: 2,
            ..SimOptions::default()
        };
        let (mut board, trace) = SimPlatform::board(opts);
        let mut seq = Sequencer::new(quick_options());

        assert_eq!(
            seq.run(&mut board),
            Err(BringupError::Driver {
                stage: Stage::Uart,
                status: StatusCode(2)
            })
        );
        assert_eq!(trace.events().last(), Some(&Event::UartCfgInit));
        assert_eq!(board.uart.baud_rate(), None);
    }

    #[test]
    fn test_baud_failure_is_fatal() {
        let opts = SimOptions {
            baud_status: 1,
            ..SimOptions::default()
        };
        let (mut board, trace) = SimPlatform::board(opts);
        let mut seq = Sequencer::new(quick_options());

        assert_eq!(
            seq.run(&mut board),
            Err(BringupError::Driver {
                stage: Stage::Uart,
                status: StatusCode(1)
            })
        );
        assert_eq!(trace.events().last(), Some(&Event::UartBaud(115_200)));
        assert!(!seq.completed().contains(Steps::UART));
        assert_eq!(board.uart.baud_rate(), None);
    }

    #[test]
    fn test_optional_headphone_output() {
        let (mut board, probe) = SimPlatform::board(SimOptions::default());
        let mut seq = Sequencer::new(BringupOptions {
            audio_input: AudioInput::Mic,
            audio_output: Some(crate::hal::AudioOutput::Headphone),
            ..quick_options()
        });
        seq.run(&mut board).unwrap();

        let events = probe.events();
        assert!(events.contains(&Event::SetInput(AudioInput::Mic)));
        assert!(events.contains(&Event::SetOutput(crate::hal::AudioOutput::Headphone)));
    }
}
