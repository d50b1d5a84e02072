use embedded_hal_0::blocking::i2c;
use pwm_pca9685::{Address, Channel, Pca9685};
use servo_core::{
    error::ServoError, ControllerBuilder, ControllerConfig, ServoBank, ServoController,
};
use tracing::{debug, info};

use crate::error::DeviceError;

//connected pwm chip instance driving servos on its channels
pub struct Pca9685Servos<I2C> {
    device: Pca9685<I2C>,
    bank: ServoBank,
}

impl<I2C, E> Pca9685Servos<I2C>
where
    E: std::fmt::Debug,
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
{
    ///Takes ownership of the bus, programs the prescale for the configured frequency and wakes the
    ///chip.
    pub fn build(cfg: &ControllerConfig, i2c: I2C) -> Result<Pca9685Servos<I2C>, ServoError> {
        cfg.validate()?;
        let prescale = cfg.prescale()?;

        let mut device = Pca9685::new(i2c, Address::from(cfg.address))
            .map_err(DeviceError::from)?;

        debug!(
            "setting PCA9685 prescale to {} for {}Hz",
            prescale, cfg.frequency_hz
        );
        device.set_prescale(prescale).map_err(DeviceError::from)?;
        device.enable().map_err(DeviceError::from)?;

        Ok(Pca9685Servos {
            device,
            bank: ServoBank::new(cfg),
        })
    }

    fn channel(&self, channel: u8) -> Result<Channel, ServoError> {
        Channel::try_from(channel).map_err(|_| ServoError::InvalidChannel {
            channel,
            channels: self.bank.channels(),
        })
    }
}

impl<I2C, E> ServoController for Pca9685Servos<I2C>
where
    E: std::fmt::Debug,
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
{
    fn channels(&self) -> u8 {
        self.bank.channels()
    }

    fn set_pulse_width_range(
        &mut self,
        channel: u8,
        min_pulse_us: u32,
        max_pulse_us: u32,
    ) -> Result<(), ServoError> {
        self.bank
            .set_pulse_width_range(channel, min_pulse_us, max_pulse_us)
    }

    fn set_angle(&mut self, channel: u8, angle: f64) -> Result<(), ServoError> {
        let off = self.bank.ticks_for_angle(channel, angle)?;
        let chann = self.channel(channel)?;
        self.device
            .set_channel_on_off(chann, 0, off)
            .map_err(DeviceError::from)?;
        Ok(())
    }
}

///Opens a [`Pca9685Servos`] on the bus handed out by `i2c_bus_provider`.
pub struct Pca9685Builder<F> {
    i2c_bus_provider: F,
}

impl<F> Pca9685Builder<F> {
    pub fn new(i2c_bus_provider: F) -> Pca9685Builder<F> {
        Pca9685Builder { i2c_bus_provider }
    }
}

impl<F, BE, I2C, E> ControllerBuilder for Pca9685Builder<F>
where
    F: Fn(u8) -> Result<I2C, BE>,
    BE: Into<ServoError>,
    E: std::fmt::Debug,
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
{
    type Controller = Pca9685Servos<I2C>;

    fn try_build(&self, cfg: &ControllerConfig) -> Result<Pca9685Servos<I2C>, ServoError> {
        info!(
            "opening PCA9685 at address {:#04x} on i2c bus {}",
            cfg.address, cfg.bus
        );
        //a bad config must not claim the bus
        cfg.validate()?;
        let i2c = (self.i2c_bus_provider)(cfg.bus)
            .map_err(|err| -> ServoError { err.into() })?;
        Pca9685Servos::build(cfg, i2c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    #[derive(Debug)]
    struct BusFault;

    //records every write, answers every read with zeros
    #[derive(Clone, Default)]
    struct RecordingBus {
        writes: Rc<RefCell<Vec<(u8, Vec<u8>)>>>,
        faulty: bool,
    }

    impl i2c::Write for RecordingBus {
        type Error = BusFault;

        fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusFault> {
            if self.faulty {
                return Err(BusFault);
            }
            self.writes.borrow_mut().push((address, bytes.to_vec()));
            Ok(())
        }
    }

    impl i2c::WriteRead for RecordingBus {
        type Error = BusFault;

        fn write_read(
            &mut self,
            address: u8,
            bytes: &[u8],
            buffer: &mut [u8],
        ) -> Result<(), BusFault> {
            if self.faulty {
                return Err(BusFault);
            }
            self.writes.borrow_mut().push((address, bytes.to_vec()));
            buffer.fill(0);
            Ok(())
        }
    }

    fn open(bus: &RecordingBus) -> Pca9685Servos<RecordingBus> {
        let bus = bus.clone();
        Pca9685Builder::new(move |_: u8| Ok::<_, ServoError>(bus.clone()))
            .try_build(&ControllerConfig::default())
            .unwrap()
    }

    #[test]
    fn test_open_programs_prescale() {
        let bus = RecordingBus::default();
        let servos = open(&bus);
        assert_eq!(servos.channels(), 16);

        let writes = bus.writes.borrow();
        assert!(writes.iter().all(|(address, _)| *address == 0x40));
        //PRE_SCALE register is 0xFE, 121 gives 50Hz
        let prescale = [0xFE, 121];
        assert!(writes.iter().any(|(_, bytes)| *bytes == prescale));
    }

    #[test]
    fn test_invalid_config_leaves_bus_alone() {
        let bus = RecordingBus::default();
        let twelve = ControllerConfig {
            channels: 12,
            ..ControllerConfig::default()
        };
        assert!(matches!(
            Pca9685Servos::build(&twelve, bus.clone()),
            Err(ServoError::InvalidConfig(_))
        ));
        let too_fast = ControllerConfig {
            frequency_hz: 2000.0,
            ..ControllerConfig::default()
        };
        assert!(matches!(
            Pca9685Servos::build(&too_fast, bus.clone()),
            Err(ServoError::InvalidConfig(_))
        ));
        assert!(bus.writes.borrow().is_empty());
    }

    #[test]
    fn test_config_checked_before_bus_is_opened() {
        let opened = Cell::new(0);
        let builder = Pca9685Builder::new(|_: u8| {
            opened.set(opened.get() + 1);
            Ok::<_, ServoError>(RecordingBus::default())
        });
        let twelve = ControllerConfig {
            channels: 12,
            ..ControllerConfig::default()
        };
        assert!(matches!(
            builder.try_build(&twelve),
            Err(ServoError::InvalidConfig(_))
        ));
        assert_eq!(opened.get(), 0);

        assert!(builder.try_build(&ControllerConfig::default()).is_ok());
        assert_eq!(opened.get(), 1);
    }

    #[test]
    fn test_set_angle_writes_channel_registers() {
        let bus = RecordingBus::default();
        let mut servos = open(&bus);

        servos.set_pulse_width_range(3, 500, 2500).unwrap();
        servos.set_angle(3, 90.0).unwrap();

        //LED3_ON_L is 0x06 + 4 * 3, on at tick 0 and off at tick 307
        let writes = bus.writes.borrow();
        let (address, bytes) = writes.last().unwrap();
        assert_eq!(*address, 0x40);
        assert_eq!(bytes.as_slice(), [0x12, 0x00, 0x00, 0x33, 0x01]);
    }

    #[test]
    fn test_driver_errors_leave_bus_alone() {
        let bus = RecordingBus::default();
        let mut servos = open(&bus);
        let opened = bus.writes.borrow().len();

        assert!(matches!(
            servos.set_pulse_width_range(16, 500, 2500),
            Err(ServoError::InvalidChannel { channel: 16, .. })
        ));
        assert!(matches!(
            servos.set_angle(0, 181.0),
            Err(ServoError::AngleOutOfRange { .. })
        ));
        assert_eq!(bus.writes.borrow().len(), opened);
    }

    #[test]
    fn test_missing_bus() {
        let builder = Pca9685Builder::new(|bus: u8| {
            Err::<RecordingBus, _>(ServoError::Bus(format!("no i2c bus {}", bus)))
        });
        assert!(matches!(
            builder.try_build(&ControllerConfig::default()),
            Err(ServoError::Bus(_))
        ));
    }

    #[test]
    fn test_faulty_bus_fails_open() {
        let bus = RecordingBus {
            faulty: true,
            ..RecordingBus::default()
        };
        let res = Pca9685Builder::new(move |_: u8| Ok::<_, ServoError>(bus.clone()))
            .try_build(&ControllerConfig::default());
        assert!(matches!(res, Err(ServoError::Bus(_))));
    }
}
