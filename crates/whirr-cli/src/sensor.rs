use linux_embedded_hal::I2cdev;
use nalgebra::Vector3;
use whirr_core::{Clock, ImuSample, SensorError, SensorReader, SystemClock};
use whirr_mpu6050::Mpu6050;

use crate::config::SensorSettings;
use crate::errors::DaemonError;

/// MPU-6050 behind a Linux I2C character device, adapted to the core
/// sensor contract. Scaled readings are converted to the units the
/// classifier expects: g for acceleration, rad/s for rotation.
pub struct I2cMotionSensor {
    driver: Mpu6050<I2cdev>,
    clock: SystemClock,
}

impl I2cMotionSensor {
    /// Opens the bus and configures the sensor once; range and rate
    /// stay fixed for the life of the process.
    pub fn open(settings: &SensorSettings) -> Result<Self, DaemonError> {
        let bus = I2cdev::new(&settings.i2c_bus).map_err(|err| DaemonError::I2cOpen {
            path: settings.i2c_bus.display().to_string(),
            message: err.to_string(),
        })?;
        let driver = Mpu6050::new(bus, settings.i2c_address, settings.mpu_config()?)
            .map_err(|err| DaemonError::SensorInit(format!("{err:?}")))?;
        Ok(Self {
            driver,
            clock: SystemClock::default(),
        })
    }
}

impl SensorReader for I2cMotionSensor {
    fn read_sample(&mut self) -> Result<ImuSample, SensorError> {
        let scaled = self
            .driver
            .read_scaled()
            .map_err(|err| SensorError::Unavailable {
                reason: format!("{err:?}"),
            })?;

        let accel = Vector3::new(
            f64::from(scaled.accel.x),
            f64::from(scaled.accel.y),
            f64::from(scaled.accel.z),
        );
        let gyro = Vector3::new(
            f64::from(scaled.gyro.x).to_radians(),
            f64::from(scaled.gyro.y).to_radians(),
            f64::from(scaled.gyro.z).to_radians(),
        );

        Ok(ImuSample::new(self.clock.now(), accel, gyro))
    }
}
