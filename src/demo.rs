//! Demo entry sequence
//!
//! Display first, then the audio path and terminal, then the status banner.
//! A display failure is reported and the audio bring-up still runs; an audio
//! or UART failure ends the demo with `EXIT_FAILURE`.

use log::{info, warn};

use crate::bringup::Sequencer;
use crate::config::BringupOptions;
use crate::display;
use crate::error::{BringupError, DisplayError, StatusCode};
use crate::framebuf::FrameBufferSet;
use crate::hal::{Board, Platform};
use crate::kprintln;

/// Exit status on success.
pub const EXIT_SUCCESS: i32 = StatusCode::SUCCESS.0;
/// Exit status after an unrecoverable bring-up error.
pub const EXIT_FAILURE: i32 = StatusCode::FAILURE.0;

/// What happened during one demo run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub display: Result<(), DisplayError>,
    pub peripherals: Result<(), BringupError>,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self.peripherals {
            Ok(()) => EXIT_SUCCESS,
            Err(_) => EXIT_FAILURE,
        }
    }
}

/// Run the whole demo on `board`.
///
/// The frames are blanked before the display starts scanning them out.
pub fn run<P: Platform, const N: usize, const SIZE: usize>(
    board: &mut Board<P>,
    frames: &mut FrameBufferSet<'_, N, SIZE>,
    options: BringupOptions,
) -> Outcome {
    frames.fill(0);
    let display = display::bring_up(board, frames);
    if display.is_err() {
        warn!("continuing without HDMI output");
    }

    let mut sequencer = Sequencer::new(options);
    let peripherals = sequencer.run(board);
    if peripherals.is_ok() {
        print_banner();
    }

    let outcome = Outcome {
        display,
        peripherals,
    };
    info!("bring-up finished with status {}", outcome.exit_code());
    outcome
}

fn print_banner() {
    kprintln!("Successfully ran configuration sequence.");
    kprintln!("---------------------------------------------");
    kprintln!("Starting AXI DDS demo... To exit, press q. ");
    kprintln!("---------------------------------------------");
    kprintln!("End of test");
    kprintln!();
}
