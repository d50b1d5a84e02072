//!Core types for the servo test tool. The hardware crates implement the traits defined here, and
//! the runner in `servo_test` only ever talks to a controller through them.

use error::ServoError;

pub mod error;
pub mod servo;

#[cfg(feature = "fake")]
pub mod fake;

pub use servo::{ServoBank, ServoSettings};

///PCA9685 internal oscillator.
pub const OSCILLATOR_HZ: f64 = 25_000_000.0;
///Steps in one PWM period on a 12 bit controller.
pub const STEPS_PER_PERIOD: f64 = 4096.0;

const PRESCALE_MIN: f64 = 3.0;
const PRESCALE_MAX: f64 = 255.0;

///One servo move, built from the command line and consumed by a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoCommand {
    pub servo_index: u8,
    pub min_pulse_us: u32,
    pub max_pulse_us: u32,
    pub target_angle_deg: i32,
}

///How to reach and set up the PWM controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub bus: u8,
    pub address: u8,
    pub channels: u8,
    pub frequency_hz: f64,
    pub actuation_range: u16,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            bus: 1,
            address: 0x40,
            channels: 16,
            frequency_hz: 50.0,
            actuation_range: servo::DEFAULT_ACTUATION_RANGE,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ServoError> {
        if self.channels != 8 && self.channels != 16 {
            return Err(ServoError::InvalidConfig(format!(
                "controller must have 8 or 16 channels, got {}",
                self.channels
            )));
        }
        self.prescale().map(|_| ())
    }

    ///Value for the PCA9685 prescale register that gives `frequency_hz`.
    pub fn prescale(&self) -> Result<u8, ServoError> {
        let freq = self.frequency_hz;
        if !freq.is_finite() || freq <= 0.0 {
            return Err(ServoError::InvalidConfig(format!(
                "PWM frequency must be positive, got {}",
                freq
            )));
        }
        let prescale = (OSCILLATOR_HZ / STEPS_PER_PERIOD / freq + 0.5).trunc() - 1.0;
        if !(PRESCALE_MIN..=PRESCALE_MAX).contains(&prescale) {
            return Err(ServoError::InvalidConfig(format!(
                "PCA9685 cannot output at {}Hz",
                freq
            )));
        }
        Ok(prescale as u8)
    }
}

///Opens a controller. This is the only step that touches the bus before a servo is moved.
pub trait ControllerBuilder {
    type Controller: ServoController;

    fn try_build(&self, cfg: &ControllerConfig) -> Result<Self::Controller, ServoError>;
}

///A multi-channel servo controller.
pub trait ServoController {
    ///Number of channels the controller was opened with.
    fn channels(&self) -> u8;

    ///Sets the pulse widths that correspond to 0 degrees and to the full actuation range.
    fn set_pulse_width_range(
        &mut self,
        channel: u8,
        min_pulse_us: u32,
        max_pulse_us: u32,
    ) -> Result<(), ServoError>;

    ///Moves the servo on `channel` to `angle` degrees using its pulse width range.
    fn set_angle(&mut self, channel: u8, angle: f64) -> Result<(), ServoError>;

    ///Handle for a single channel.
    fn servo(&mut self, channel: u8) -> Servo<'_, Self>
    where
        Self: Sized,
    {
        Servo {
            controller: self,
            channel,
        }
    }
}

///A single servo on a controller.
pub struct Servo<'a, C: ServoController> {
    controller: &'a mut C,
    channel: u8,
}

impl<C: ServoController> Servo<'_, C> {
    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn set_pulse_width_range(
        &mut self,
        min_pulse_us: u32,
        max_pulse_us: u32,
    ) -> Result<(), ServoError> {
        self.controller
            .set_pulse_width_range(self.channel, min_pulse_us, max_pulse_us)
    }

    pub fn set_angle(&mut self, angle: f64) -> Result<(), ServoError> {
        self.controller.set_angle(self.channel, angle)
    }
}
