//! Board configuration
//!
//! Hardware identifiers for the ZYBO peripheral map and the tunable knobs
//! of the bring-up sequence.
//!
//! The identifiers mirror the BSP's generated `xparameters.h`. Bring-up code
//! never computes them; it only passes them through to the drivers.

use log::LevelFilter;

use crate::hal::{AudioInput, AudioOutput};

/// Constants from the generated hardware description header.
pub mod xparameters {
    /// PS7 UART 1 (USB-UART bridge on the ZYBO)
    pub const PS7_UART_1_DEVICE_ID: u16 = 0;
    pub const PS7_UART_1_BASEADDR: usize = 0xE000_1000;

    /// SCU generic interrupt controller
    pub const PS7_SCUGIC_0_DEVICE_ID: u16 = 0;

    /// SCU private timer
    pub const SCUTIMER_DEVICE_ID: u16 = 0;

    /// AXI IIC interrupt line routed through IRQ_F2P[0]
    pub const FABRIC_AXI_IIC_0_IIC2INTC_IRPT_INTR: u32 = 61;
    pub const AXI_IIC_0_DEVICE_ID: u16 = 0;

    /// HDMI output video timing controller
    pub const V_TC_0_DEVICE_ID: u16 = 0;

    /// Dynamic pixel clock generator
    pub const AXI_DYNCLK_0_S_AXI_LITE_BASEADDR: usize = 0x43C1_0000;

    /// Cortex-A9 core clock; the global timer runs at half of it.
    pub const CPU_CORTEXA9_CORE_CLOCK_FREQ_HZ: u64 = 650_000_000;

    /// Global timer tick rate (`COUNTS_PER_SECOND` in `xtime_l.h`)
    pub const COUNTS_PER_SECOND: u64 = CPU_CORTEXA9_CORE_CLOCK_FREQ_HZ / 2;
}

/// Number of frame buffers handed to the display controller.
pub const DISPLAY_NUM_FRAMES: usize = 3;

/// Largest supported frame: 1080p at 24 bits per pixel.
pub const DEMO_MAX_FRAME: usize = 1920 * 1080 * 3;

/// Row stride of every frame, in bytes.
pub const DEMO_STRIDE: u32 = 1920 * 3;

/// Peripheral map of one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    pub uart_device_id: u16,
    pub uart_base: usize,
    pub intc_device_id: u16,
    pub iic_device_id: u16,
    /// Interrupt source ID of the IIC controller
    pub iic_irq: u32,
    pub scu_timer_id: u16,
    pub hdmi_vtc_id: u16,
    pub dynclk_base: usize,
    pub frame_stride: u32,
    pub counts_per_second: u64,
}

impl BoardConfig {
    /// The ZYBO peripheral map.
    pub const ZYBO: Self = Self {
        uart_device_id: xparameters::PS7_UART_1_DEVICE_ID,
        uart_base: xparameters::PS7_UART_1_BASEADDR,
        intc_device_id: xparameters::PS7_SCUGIC_0_DEVICE_ID,
        iic_device_id: xparameters::AXI_IIC_0_DEVICE_ID,
        iic_irq: xparameters::FABRIC_AXI_IIC_0_IIC2INTC_IRPT_INTR,
        scu_timer_id: xparameters::SCUTIMER_DEVICE_ID,
        hdmi_vtc_id: xparameters::V_TC_0_DEVICE_ID,
        dynclk_base: xparameters::AXI_DYNCLK_0_S_AXI_LITE_BASEADDR,
        frame_stride: DEMO_STRIDE,
        counts_per_second: xparameters::COUNTS_PER_SECOND,
    };
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::ZYBO
    }
}

/// Knobs of the bring-up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BringupOptions {
    /// Codec settle delay in tenths of a second
    pub settle_tenths: u32,
    pub baud_rate: u32,
    pub audio_input: AudioInput,
    /// Extra output routing; the demo leaves the headphone path untouched.
    pub audio_output: Option<AudioOutput>,
    pub log_level: LevelFilter,
}

impl BringupOptions {
    pub const DEFAULT_SETTLE_TENTHS: u32 = 20;
    pub const DEFAULT_BAUD_RATE: u32 = 115_200;
}

impl Default for BringupOptions {
    fn default() -> Self {
        Self {
            settle_tenths: Self::DEFAULT_SETTLE_TENTHS,
            baud_rate: Self::DEFAULT_BAUD_RATE,
            audio_input: AudioInput::Line,
            audio_output: None,
            log_level: LevelFilter::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_demo() {
        let options = BringupOptions::default();
        assert_eq!(options.settle_tenths, 20);
        assert_eq!(options.baud_rate, 115_200);
        assert_eq!(options.audio_input, AudioInput::Line);
        assert!(options.audio_output.is_none());
    }

    #[test]
    fn test_stride_covers_a_row() {
        let config = BoardConfig::ZYBO;
        assert_eq!(config.frame_stride as usize * 1080, DEMO_MAX_FRAME);
        assert_ne!(config.counts_per_second, 0);
    }
}
