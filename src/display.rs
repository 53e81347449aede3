//! HDMI display bring-up
//!
//! Wires the frame buffers into the display controller and starts video
//! output, then initializes the display path's own interrupt controller.
//! The audio path keeps a separate controller instance.

use log::{error, info};

use crate::error::DisplayError;
use crate::framebuf::FrameBufferSet;
use crate::hal::{Board, DelayTimer, DisplayController, InterruptController, Platform};

/// Bring up the display pipeline. Stops at the first failing step.
pub fn bring_up<P: Platform, const N: usize, const SIZE: usize>(
    board: &mut Board<P>,
    frames: &FrameBufferSet<'_, N, SIZE>,
) -> Result<(), DisplayError> {
    let result = bring_up_steps(board, frames);
    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

fn bring_up_steps<P: Platform, const N: usize, const SIZE: usize>(
    board: &mut Board<P>,
    frames: &FrameBufferSet<'_, N, SIZE>,
) -> Result<(), DisplayError> {
    let config = board.config;

    board
        .timer
        .initialize(config.scu_timer_id)
        .map_err(DisplayError::Timer)?;

    board
        .display
        .initialize(
            config.hdmi_vtc_id,
            config.dynclk_base,
            frames.pointers(),
            config.frame_stride,
        )
        .map_err(DisplayError::Init)?;

    board.display.start().map_err(DisplayError::Start)?;
    info!(
        "Display started with {} frame buffers of {} bytes",
        frames.count(),
        frames.frame_size()
    );

    board
        .display_intc
        .initialize()
        .map_err(DisplayError::InterruptController)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusCode;
    use crate::framebuf::Frame;
    use crate::platform::sim::{Event, SimOptions, SimPlatform};
    use alloc::boxed::Box;

    const F64: Frame<64> = Frame::ZEROED;

    #[test]
    fn test_display_bring_up_order() {
        let (mut board, probe) = SimPlatform::board(SimOptions::default());
        let mut storage = Box::new([F64; 3]);
        let frames = FrameBufferSet::new(&mut *storage);

        assert_eq!(bring_up(&mut board, &frames), Ok(()));
        assert_eq!(
            probe.events(),
            [
                Event::TimerInit(0),
                Event::DisplayInit {
                    vtc_id: 0,
                    dynclk_base: 0x43C1_0000,
                    frames: 3,
                    stride: 1920 * 3,
                },
                Event::DisplayStart,
                Event::IntcInit("display"),
            ]
        );
        assert_eq!(board.display.frames(), frames.pointers());
    }

    #[test]
    fn test_timer_failure_skips_display() {
        let opts = SimOptions {
            timer_status: 5,
            ..SimOptions::default()
        };
        let (mut board, trace) = SimPlatform::board(opts);
        let mut storage = Box::new([F64; 3]);
        let frames = FrameBufferSet::new(&mut *storage);

        assert_eq!(
            bring_up(&mut board, &frames),
            Err(DisplayError::Timer(StatusCode(5)))
        );
        assert_eq!(trace.events(), [Event::TimerInit(0)]);
        assert!(board.display.frames().is_empty());
    }

    #[test]
    fn test_init_failure_skips_start() {
        let opts = SimOptions {
            display_init_status: 9,
            ..SimOptions::default()
        };
        let (mut board, probe) = SimPlatform::board(opts);
        let mut storage = Box::new([F64; 3]);
        let frames = FrameBufferSet::new(&mut *storage);

        assert_eq!(
            bring_up(&mut board, &frames),
            Err(DisplayError::Init(StatusCode(9)))
        );
        assert!(!probe.events().contains(&Event::DisplayStart));
        assert!(!board.display.is_running());
    }

    #[test]
    fn test_start_failure_skips_intc() {
        let opts = SimOptions {
            display_start_status: 4,
            ..SimOptions::default()
        };
        let (mut board, probe) = SimPlatform::board(opts);
        let mut storage = Box::new([F64; 3]);
        let frames = FrameBufferSet::new(&mut *storage);

        assert_eq!(
            bring_up(&mut board, &frames),
            Err(DisplayError::Start(StatusCode(4)))
        );
        assert!(!probe.events().contains(&Event::IntcInit("display")));
    }

    #[test]
    fn test_display_intc_is_separate_instance() {
        let opts = SimOptions {
            display_intc_status: 1,
            ..SimOptions::default()
        };
        let (mut board, _probe) = SimPlatform::board(opts);
        let mut storage = Box::new([F64; 2]);
        let frames = FrameBufferSet::new(&mut *storage);

        assert_eq!(
            bring_up(&mut board, &frames),
            Err(DisplayError::InterruptController(StatusCode(1)))
        );
        assert!(board.display.is_running());
        assert_eq!(board.intc.initialize(), Ok(()));
    }
}
