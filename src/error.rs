//! Error types for bring-up
//!
//! Every vendor driver reports failure through an integer status. Stages
//! wrap that status together with the step that produced it, so the abort
//! message can name the subsystem.

use core::fmt;

use crate::bringup::Steps;
use crate::irq::VectorError;

/// Integer status returned by a vendor driver call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct StatusCode(pub i32);

impl StatusCode {
    /// `XST_SUCCESS`
    pub const SUCCESS: Self = Self(0);
    /// `XST_FAILURE`
    pub const FAILURE: Self = Self(1);
    /// `XST_DEVICE_NOT_FOUND`
    pub const DEVICE_NOT_FOUND: Self = Self(2);

    /// Turn a raw driver status into a `Result`.
    #[inline]
    pub const fn check(raw: i32) -> Result<(), StatusCode> {
        if raw == Self::SUCCESS.0 {
            Ok(())
        } else {
            Err(Self(raw))
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One step of the peripheral bring-up sequence.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    InterruptController,
    Iic,
    AudioCodec,
    SettleDelay,
    AudioCodecReinit,
    AudioRouting,
    InterruptEnable,
    Uart,
}

impl Stage {
    /// Message printed when this step fails.
    pub const fn failure_message(self) -> &'static str {
        match self {
            Stage::InterruptController => "Error initializing interrupts",
            Stage::Iic => "Error initializing I2C controller",
            Stage::AudioCodec | Stage::AudioCodecReinit => "Audio initializing ERROR",
            Stage::SettleDelay => "Audio settle delay misconfigured",
            Stage::AudioRouting => "Error routing audio codec input",
            Stage::InterruptEnable => "Error enabling interrupts",
            Stage::Uart => "Error configuring UART",
        }
    }
}

/// Failure of the peripheral bring-up sequence.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BringupError {
    /// A driver returned a non-success status.
    Driver { stage: Stage, status: StatusCode },
    /// Config lookup by device ID found nothing.
    DeviceNotFound { stage: Stage, device_id: u16 },
    /// The time source reports zero ticks per second.
    ZeroTickRate,
    /// A step ran before the steps it depends on.
    NotReady { stage: Stage, missing: Steps },
    /// The interrupt vector table rejected an entry.
    Vector(VectorError),
}

impl BringupError {
    /// Step the failure belongs to.
    pub const fn stage(&self) -> Stage {
        match self {
            BringupError::Driver { stage, .. }
            | BringupError::DeviceNotFound { stage, .. }
            | BringupError::NotReady { stage, .. } => *stage,
            BringupError::ZeroTickRate => Stage::SettleDelay,
            BringupError::Vector(_) => Stage::Iic,
        }
    }
}

impl fmt::Display for BringupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.stage().failure_message();
        match self {
            BringupError::Driver { status, .. } => write!(f, "{} (status {})", message, status),
            BringupError::DeviceNotFound { device_id, .. } => {
                write!(f, "{}: no device with ID {}", message, device_id)
            }
            BringupError::ZeroTickRate => write!(f, "{}: time source tick rate is zero", message),
            BringupError::NotReady { missing, .. } => {
                write!(f, "{}: prerequisites missing {:?}", message, missing)
            }
            BringupError::Vector(e) => write!(f, "{}: {}", message, e),
        }
    }
}

impl From<VectorError> for BringupError {
    fn from(e: VectorError) -> Self {
        BringupError::Vector(e)
    }
}

/// Failure of the display bring-up.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DisplayError {
    /// SCU timer initialization failed.
    Timer(StatusCode),
    /// Display controller rejected its configuration.
    Init(StatusCode),
    /// Display pipeline did not start.
    Start(StatusCode),
    /// Display-side interrupt controller failed to initialize.
    InterruptController(StatusCode),
}

impl DisplayError {
    pub const fn status(&self) -> StatusCode {
        match self {
            DisplayError::Timer(s)
            | DisplayError::Init(s)
            | DisplayError::Start(s)
            | DisplayError::InterruptController(s) => *s,
        }
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Timer(s) => write!(f, "Timer initialization failed {}", s),
            DisplayError::Init(s) => write!(
                f,
                "Display Ctrl initialization failed during demo initialization {}",
                s
            ),
            DisplayError::Start(s) => {
                write!(f, "Couldn't start display during demo initialization {}", s)
            }
            DisplayError::InterruptController(s) => {
                write!(f, "Error initializing interrupts {}", s)
            }
        }
    }
}
