//!Moves a single servo for hardware bring-up: print the values, open the controller, set the pulse
//! width range, set the angle.

use std::io::Write;

use servo_core::{
    error::ServoError, ControllerBuilder, ControllerConfig, ServoCommand, ServoController,
};
use tracing::info;

pub mod cli;

///Runs one servo move. Driver errors are returned as they were raised.
pub fn run<B, W>(
    command: &ServoCommand,
    cfg: &ControllerConfig,
    builder: &B,
    out: &mut W,
) -> Result<(), ServoError>
where
    B: ControllerBuilder,
    W: Write,
{
    print_values(command, out)?;

    let mut controller = builder.try_build(cfg)?;
    info!("opened controller with {} channels", controller.channels());
    let mut servo = controller.servo(command.servo_index);

    info!(
        "setting servo {} pulse width range to {}us-{}us",
        servo.channel(),
        command.min_pulse_us,
        command.max_pulse_us
    );
    servo.set_pulse_width_range(command.min_pulse_us, command.max_pulse_us)?;

    info!(
        "moving servo {} to {} degrees",
        servo.channel(),
        command.target_angle_deg
    );
    servo.set_angle(f64::from(command.target_angle_deg))?;

    writeln!(out, "Movement completed")?;
    Ok(())
}

///Line printed on stderr when a run fails, so the reason is visible whatever `RUST_LOG` says.
pub fn failure_message(err: &ServoError) -> String {
    format!("Error: {}", err)
}

fn print_values<W: Write>(command: &ServoCommand, out: &mut W) -> Result<(), ServoError> {
    writeln!(out, "Using Values:")?;
    writeln!(out, "Min Impulse: {}", command.min_pulse_us)?;
    writeln!(out, "Max Impulse: {}", command.max_pulse_us)?;
    writeln!(out, "Angle: {}\n", command.target_angle_deg)?;
    out.flush()?;
    Ok(())
}
