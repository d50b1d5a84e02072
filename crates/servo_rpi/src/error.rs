use std::fmt::{Debug, Formatter};

use servo_core::error::ServoError;

pub struct BusError {
    pub message: String,
}

impl BusError {
    pub fn open(bus: u8, err: rppal::i2c::Error) -> Self {
        Self {
            message: format!("could not open i2c bus {} - Cause: {}", bus, err),
        }
    }
}

impl Debug for BusError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        fmt.write_str(&self.message)
    }
}

impl From<BusError> for ServoError {
    fn from(err: BusError) -> Self {
        ServoError::Bus(err.message)
    }
}
