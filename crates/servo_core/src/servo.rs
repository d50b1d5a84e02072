//!Pulse width bookkeeping and angle to duty cycle conversion shared by every controller.

use crate::{error::ServoError, ControllerConfig};
use tracing::debug;

pub const DEFAULT_MIN_PULSE_US: u32 = 500;
pub const DEFAULT_MAX_PULSE_US: u32 = 2500;
pub const DEFAULT_ACTUATION_RANGE: u16 = 180;

///Full scale of the 16 bit duty cycle the servo maths works in.
const DUTY_FULL_SCALE: f64 = 0xFFFF as f64;
///Largest off tick a 12 bit PCA9685 channel accepts.
const MAX_TICK: u32 = 4095;

///Pulse width bounds and actuation range for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServoSettings {
    pub min_pulse_us: u32,
    pub max_pulse_us: u32,
    pub actuation_range: u16,
}

impl Default for ServoSettings {
    fn default() -> Self {
        Self {
            min_pulse_us: DEFAULT_MIN_PULSE_US,
            max_pulse_us: DEFAULT_MAX_PULSE_US,
            actuation_range: DEFAULT_ACTUATION_RANGE,
        }
    }
}

impl ServoSettings {
    ///Settings for a pulse range, checked against the PWM period at `frequency_hz`.
    pub fn new(
        min_pulse_us: u32,
        max_pulse_us: u32,
        actuation_range: u16,
        frequency_hz: f64,
    ) -> Result<Self, ServoError> {
        let invalid = ServoError::InvalidPulseRange {
            min_us: min_pulse_us,
            max_us: max_pulse_us,
        };
        if min_pulse_us >= max_pulse_us {
            return Err(invalid);
        }
        //a pulse can't be longer than the period it lives in
        if f64::from(max_pulse_us) * frequency_hz / 1_000_000.0 > 1.0 {
            return Err(invalid);
        }
        Ok(Self {
            min_pulse_us,
            max_pulse_us,
            actuation_range,
        })
    }

    ///16 bit duty cycle that positions the servo at `angle` degrees.
    pub fn duty_cycle(&self, angle: f64, frequency_hz: f64) -> Result<u16, ServoError> {
        let range = f64::from(self.actuation_range);
        if !(0.0..=range).contains(&angle) {
            return Err(ServoError::AngleOutOfRange {
                angle,
                range: self.actuation_range,
            });
        }
        let fraction = if self.actuation_range == 0 {
            0.0
        } else {
            angle / range
        };

        let min_duty = pulse_to_duty(self.min_pulse_us, frequency_hz).trunc();
        let max_duty = pulse_to_duty(self.max_pulse_us, frequency_hz);
        let duty_range = (max_duty - min_duty).trunc();
        let duty = min_duty + (fraction * duty_range).trunc();

        Ok(duty.min(DUTY_FULL_SCALE) as u16)
    }
}

fn pulse_to_duty(pulse_us: u32, frequency_hz: f64) -> f64 {
    f64::from(pulse_us) * frequency_hz / 1_000_000.0 * DUTY_FULL_SCALE
}

///Converts a 16 bit duty cycle to the off tick of a 12 bit channel that turns on at tick 0.
pub fn duty_to_ticks(duty: u16) -> u16 {
    ((u32::from(duty) + 1) >> 4).min(MAX_TICK) as u16
}

///Per-channel settings for a whole controller.
#[derive(Debug, Clone)]
pub struct ServoBank {
    frequency_hz: f64,
    settings: Vec<ServoSettings>,
}

impl ServoBank {
    pub fn new(cfg: &ControllerConfig) -> Self {
        let settings = ServoSettings {
            actuation_range: cfg.actuation_range,
            ..ServoSettings::default()
        };
        Self {
            frequency_hz: cfg.frequency_hz,
            settings: vec![settings; cfg.channels as usize],
        }
    }

    pub fn channels(&self) -> u8 {
        self.settings.len() as u8
    }

    pub fn settings(&self, channel: u8) -> Result<&ServoSettings, ServoError> {
        self.settings
            .get(channel as usize)
            .ok_or(ServoError::InvalidChannel {
                channel,
                channels: self.channels(),
            })
    }

    pub fn set_pulse_width_range(
        &mut self,
        channel: u8,
        min_pulse_us: u32,
        max_pulse_us: u32,
    ) -> Result<(), ServoError> {
        let range = self.settings(channel)?.actuation_range;
        let settings = ServoSettings::new(min_pulse_us, max_pulse_us, range, self.frequency_hz)?;
        self.settings[channel as usize] = settings;
        debug!(
            "channel {} pulse width range set to {}us-{}us",
            channel, min_pulse_us, max_pulse_us
        );
        Ok(())
    }

    ///Off tick for `angle` on `channel`, using that channel's current pulse range.
    pub fn ticks_for_angle(&self, channel: u8, angle: f64) -> Result<u16, ServoError> {
        let duty = self.settings(channel)?.duty_cycle(angle, self.frequency_hz)?;
        let ticks = duty_to_ticks(duty);
        debug!(
            "channel {} angle {} -> duty {:#06x}, off tick {}",
            channel, angle, duty, ticks
        );
        Ok(ticks)
    }
}
