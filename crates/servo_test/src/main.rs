use std::{io, process::ExitCode};

use clap::Parser;
use servo_core::{error::ServoError, ControllerConfig, ServoCommand};
use servo_test::cli::Args;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    //logs go to stderr, stdout is for the operator
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "servo_test=info,servo_devices=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    debug!("{:?}", args);

    let command = args.command();
    let cfg = args.controller_config();

    match run_on_hardware(&command, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("servo test failed: {}", err);
            eprintln!("{}", servo_test::failure_message(&err));
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "rpi")]
fn run_on_hardware(command: &ServoCommand, cfg: &ControllerConfig) -> Result<(), ServoError> {
    use servo_devices::devices::pca9685::Pca9685Builder;

    let builder = Pca9685Builder::new(servo_rpi::get_bus);
    servo_test::run(command, cfg, &builder, &mut io::stdout().lock())
}

#[cfg(not(feature = "rpi"))]
fn run_on_hardware(_command: &ServoCommand, _cfg: &ControllerConfig) -> Result<(), ServoError> {
    Err(ServoError::bus("built without the `rpi` feature, no i2c bus available"))
}
