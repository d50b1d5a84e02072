use servo_core::error::ServoError;

#[derive(Debug)]
pub enum DeviceError {
    ///The i2c transfer failed. Holds the bus error's debug output.
    I2c(String),
    ///The driver refused a register value.
    InvalidInputData(&'static str),
}

#[cfg(feature = "pca9685")]
impl<E> From<pwm_pca9685::Error<E>> for DeviceError
where
    E: std::fmt::Debug,
{
    fn from(err: pwm_pca9685::Error<E>) -> DeviceError {
        match err {
            pwm_pca9685::Error::I2C(err) => {
                DeviceError::I2c(format!("Could not talk to PCA9685 device: {:?}", err))
            }
            pwm_pca9685::Error::InvalidInputData => {
                DeviceError::InvalidInputData("PCA9685: Invalid input data")
            }
        }
    }
}

impl From<DeviceError> for ServoError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::I2c(message) => ServoError::Bus(message),
            DeviceError::InvalidInputData(message) => ServoError::config(message),
        }
    }
}
