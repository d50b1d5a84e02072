//!Raspberry Pi i2c access, a thin wrapper around the rppal library.
//!
//! `get_bus` is shaped to be handed straight to `Pca9685Builder::new` in `servo_devices`.

//internal error type for rpi i2c
pub mod error;

use error::BusError;
use tracing::debug;

pub use rppal::i2c::I2c;

//get i2c bus by id
pub fn get_bus(bus: u8) -> Result<I2c, BusError> {
    debug!("opening /dev/i2c-{}", bus);
    I2c::with_bus(bus).map_err(|err| BusError::open(bus, err))
}
