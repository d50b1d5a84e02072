use clap::Parser;
use servo_core::{ControllerConfig, ServoCommand};

///Servo test utility. Moves one servo on a PCA9685 board to an angle.
#[derive(Parser, Debug)]
#[command(name = "servo-test", version, about, long_about = None)]
pub struct Args {
    /// The servo you want to test, starting at 0
    #[arg(long)]
    pub servo: u8,

    /// Minimum impulse value (microseconds)
    #[arg(long, default_value_t = 500)]
    pub min: u32,

    /// Maximum impulse value (microseconds)
    #[arg(long, default_value_t = 2500)]
    pub max: u32,

    /// Angle to move to (degrees)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub angle: i32,

    /// I2C bus the PCA9685 is attached to
    #[arg(long, default_value_t = 1)]
    pub bus: u8,

    /// I2C address of the PCA9685, decimal or 0x-prefixed hex
    #[arg(long, default_value = "0x40", value_parser = parse_address)]
    pub address: u8,

    /// PWM frequency (Hz)
    #[arg(long, default_value_t = 50.0)]
    pub frequency: f64,

    /// Actuation range of the servo (degrees)
    #[arg(long, default_value_t = 180)]
    pub range: u16,
}

impl Args {
    pub fn command(&self) -> ServoCommand {
        ServoCommand {
            servo_index: self.servo,
            min_pulse_us: self.min,
            max_pulse_us: self.max,
            target_angle_deg: self.angle,
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            bus: self.bus,
            address: self.address,
            frequency_hz: self.frequency,
            actuation_range: self.range,
            ..ControllerConfig::default()
        }
    }
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|err| format!("invalid i2c address `{}`: {}", s, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["servo-test", "--servo", "0"])
            .unwrap();
        assert_eq!(
            args.command(),
            ServoCommand {
                servo_index: 0,
                min_pulse_us: 500,
                max_pulse_us: 2500,
                target_angle_deg: 0,
            }
        );
        assert_eq!(args.controller_config(), ControllerConfig::default());
    }

    #[test]
    fn test_servo_is_required() {
        let err = Args::try_parse_from(["servo-test", "--angle", "90"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_non_integer_is_usage_error() {
        let err = Args::try_parse_from(["servo-test", "--servo", "one"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        let err = Args::try_parse_from(["servo-test", "--servo", "1", "--min", "1.5"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_negative_angle_reaches_driver() {
        let args = Args::try_parse_from(["servo-test", "--servo", "1", "--angle", "-10"])
            .unwrap();
        assert_eq!(args.command().target_angle_deg, -10);
    }

    #[test]
    fn test_controller_flags() {
        let args = Args::try_parse_from([
            "servo-test",
            "--servo",
            "15",
            "--min",
            "600",
            "--max",
            "2400",
            "--bus",
            "0",
            "--address",
            "0x41",
            "--frequency",
            "60",
            "--range",
            "270",
        ])
        .unwrap();
        assert_eq!(args.command().servo_index, 15);
        assert_eq!(
            args.controller_config(),
            ControllerConfig {
                bus: 0,
                address: 0x41,
                channels: 16,
                frequency_hz: 60.0,
                actuation_range: 270,
            }
        );
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x40"), Ok(0x40));
        assert_eq!(parse_address("0X7f"), Ok(0x7f));
        assert_eq!(parse_address("65"), Ok(65));
        assert!(parse_address("0x140").is_err());
        assert!(parse_address("pca").is_err());
    }
}
