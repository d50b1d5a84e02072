//!A mod for the error types
use std::fmt::{Debug, Display, Formatter};

///Error raised by a servo controller. The runner surfaces these unmodified.
pub enum ServoError {
    ///The bus or the controller on it could not be reached.
    Bus(String),
    ///The channel does not exist on the controller.
    InvalidChannel { channel: u8, channels: u8 },
    ///The angle is outside `0..=range` degrees.
    AngleOutOfRange { angle: f64, range: u16 },
    ///The pulse width bounds are unusable (min >= max, or longer than one period).
    InvalidPulseRange { min_us: u32, max_us: u32 },
    ///The controller configuration cannot be applied to the hardware.
    InvalidConfig(String),
    ///Status text could not be written.
    Output(std::io::Error),
}

impl ServoError {
    pub fn bus(msg: &str) -> Self {
        ServoError::Bus(msg.to_string())
    }
    pub fn config(msg: &str) -> Self {
        ServoError::InvalidConfig(msg.to_string())
    }
}

impl Display for ServoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bus(message) => write!(f, "bus error: {}", message),
            Self::InvalidChannel { channel, channels } => write!(
                f,
                "invalid servo channel {} (controller has channels 0-{})",
                channel,
                channels.saturating_sub(1)
            ),
            Self::AngleOutOfRange { angle, range } => {
                write!(f, "angle {} out of range 0-{}", angle, range)
            }
            Self::InvalidPulseRange { min_us, max_us } => {
                write!(f, "invalid pulse width range {}us-{}us", min_us, max_us)
            }
            Self::InvalidConfig(message) => write!(f, "invalid controller config: {}", message),
            Self::Output(err) => write!(f, "could not write output: {}", err),
        }
    }
}

impl Debug for ServoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("ServoError: {}", self))
    }
}

impl std::error::Error for ServoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Output(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ServoError {
    fn from(err: std::io::Error) -> Self {
        ServoError::Output(err)
    }
}
