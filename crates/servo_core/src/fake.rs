//!In-memory controller for exercising code that drives servos without a bus.
//!
//! Every call is appended to a shared [`CallLog`] before it is checked, so tests can assert on the
//! exact sequence of hardware calls, including the ones that failed.

use std::{cell::RefCell, rc::Rc};

use crate::{error::ServoError, ControllerBuilder, ControllerConfig, ServoBank, ServoController};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open { channels: u8 },
    SetPulseWidthRange {
        channel: u8,
        min_pulse_us: u32,
        max_pulse_us: u32,
    },
    SetAngle { channel: u8, angle: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }
}

///Builds [`FakeController`]s, or fails to as if the bus were missing.
#[derive(Debug, Clone, Default)]
pub struct FakeBuilder {
    log: CallLog,
    bus_missing: bool,
    fail_angle: bool,
}

impl FakeBuilder {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            ..Self::default()
        }
    }

    ///`try_build` fails with a bus error.
    pub fn bus_missing(mut self) -> Self {
        self.bus_missing = true;
        self
    }

    ///Every `set_angle` on built controllers fails with a bus error.
    pub fn fail_angle(mut self) -> Self {
        self.fail_angle = true;
        self
    }
}

impl ControllerBuilder for FakeBuilder {
    type Controller = FakeController;

    fn try_build(&self, cfg: &ControllerConfig) -> Result<FakeController, ServoError> {
        self.log.push(Call::Open {
            channels: cfg.channels,
        });
        if self.bus_missing {
            return Err(ServoError::Bus(format!("no controller on i2c bus {}", cfg.bus)));
        }
        cfg.validate()?;
        Ok(FakeController {
            log: self.log.clone(),
            bank: ServoBank::new(cfg),
            fail_angle: self.fail_angle,
            ticks: vec![None; cfg.channels as usize],
        })
    }
}

///Controller that keeps channel state in memory.
#[derive(Debug)]
pub struct FakeController {
    log: CallLog,
    bank: ServoBank,
    fail_angle: bool,
    ticks: Vec<Option<u16>>,
}

impl FakeController {
    ///Off tick last written to `channel`, if any.
    pub fn ticks(&self, channel: u8) -> Option<u16> {
        self.ticks.get(channel as usize).copied().flatten()
    }
}

impl ServoController for FakeController {
    fn channels(&self) -> u8 {
        self.bank.channels()
    }

    fn set_pulse_width_range(
        &mut self,
        channel: u8,
        min_pulse_us: u32,
        max_pulse_us: u32,
    ) -> Result<(), ServoError> {
        self.log.push(Call::SetPulseWidthRange {
            channel,
            min_pulse_us,
            max_pulse_us,
        });
        self.bank
            .set_pulse_width_range(channel, min_pulse_us, max_pulse_us)
    }

    fn set_angle(&mut self, channel: u8, angle: f64) -> Result<(), ServoError> {
        self.log.push(Call::SetAngle { channel, angle });
        let ticks = self.bank.ticks_for_angle(channel, angle)?;
        if self.fail_angle {
            return Err(ServoError::bus("write to controller failed"));
        }
        self.ticks[channel as usize] = Some(ticks);
        Ok(())
    }
}
