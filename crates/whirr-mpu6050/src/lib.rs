//! Minimal blocking MPU-6050 driver.
//!
//! Covers exactly what a polled motion detector needs: device probe,
//! wake-up and range configuration at startup, then one 14-byte burst
//! read per poll. DMP, FIFO and interrupt features of the chip are not
//! exposed.

#![cfg_attr(not(test), no_std)]

mod accel;
mod gyro;
mod registers;

pub use accel::{Accel, AccelF32, AccelFullScale};
pub use gyro::{Gyro, GyroF32, GyroFullScale};
pub use registers::Register;

use embedded_hal::i2c::I2c;

/// Default I2C address with AD0 pulled low.
pub const DEFAULT_ADDRESS: u8 = 0x68;

const WHO_AM_I_VALUE: u8 = 0x68;

/// PWR_MGMT_1 value: sleep cleared, gyro X PLL as clock source.
const PWR_CLOCK_GYRO_X: u8 = 0x01;

/// Error for sensor operations.
#[derive(Debug)]
pub enum Error<E> {
    /// The underlying bus transaction failed.
    Bus(E),
    /// WHO_AM_I did not identify an MPU-6050.
    WrongDevice { found: u8 },
}

/// Digital low pass filter selection (CONFIG register, DLPF_CFG bits).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DigitalLowPassFilter {
    Filter0 = 0,
    Filter1 = 1,
    Filter2 = 2,
    Filter3 = 3,
    Filter4 = 4,
    Filter5 = 5,
    Filter6 = 6,
}

/// Startup configuration applied once by [`Mpu6050::new`].
#[derive(Copy, Clone, Debug)]
pub struct Mpu6050Config {
    pub accel_scale: AccelFullScale,
    pub gyro_scale: GyroFullScale,
    /// Output rate is the 1 kHz filtered gyro rate / (1 + divider)
    pub sample_rate_divider: u8,
    pub low_pass_filter: DigitalLowPassFilter,
}

impl Default for Mpu6050Config {
    fn default() -> Self {
        Self {
            accel_scale: AccelFullScale::G2,
            gyro_scale: GyroFullScale::Deg500,
            sample_rate_divider: 9,
            low_pass_filter: DigitalLowPassFilter::Filter1,
        }
    }
}

/// One burst read of the contiguous data registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawSample {
    pub accel: Accel,
    pub temperature: i16,
    pub gyro: Gyro,
}

impl RawSample {
    /// Decodes the 14 big-endian bytes starting at ACCEL_XOUT_H.
    pub fn from_bytes(data: [u8; 14]) -> Self {
        Self {
            accel: Accel::from_bytes([data[0], data[1], data[2], data[3], data[4], data[5]]),
            temperature: i16::from_be_bytes([data[6], data[7]]),
            gyro: Gyro::from_bytes([data[8], data[9], data[10], data[11], data[12], data[13]]),
        }
    }

    /// Converts the raw counts into physical units.
    pub fn scaled(&self, accel_scale: AccelFullScale, gyro_scale: GyroFullScale) -> ScaledSample {
        ScaledSample {
            accel: self.accel.scaled(accel_scale),
            gyro: self.gyro.scaled(gyro_scale),
        }
    }
}

/// Acceleration in g and angular velocity in deg/s.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScaledSample {
    pub accel: AccelF32,
    pub gyro: GyroF32,
}

/// InvenSense MPU-6050 over a blocking I2C bus.
pub struct Mpu6050<I>
where
    I: I2c,
{
    i2c: I,
    address: u8,
    accel_scale: AccelFullScale,
    gyro_scale: GyroFullScale,
}

impl<I> Mpu6050<I>
where
    I: I2c,
{
    /// Probes the device, wakes it and applies the range and rate
    /// configuration.
    pub fn new(i2c: I, address: u8, config: Mpu6050Config) -> Result<Self, Error<I::Error>> {
        let mut sensor = Self {
            i2c,
            address,
            accel_scale: config.accel_scale,
            gyro_scale: config.gyro_scale,
        };

        let id = sensor.read_register(Register::WhoAmI)?;
        if id != WHO_AM_I_VALUE {
            return Err(Error::WrongDevice { found: id });
        }

        sensor.write_register(Register::PwrMgmt1, PWR_CLOCK_GYRO_X)?;
        sensor.write_register(Register::SmpRtDiv, config.sample_rate_divider)?;
        sensor.write_register(Register::Config, config.low_pass_filter as u8)?;
        sensor.write_register(Register::GyroConfig, (config.gyro_scale as u8) << 3)?;
        sensor.write_register(Register::AccelConfig, (config.accel_scale as u8) << 3)?;

        Ok(sensor)
    }

    /// Returns the underlying I2C peripheral, consuming the driver.
    pub fn release(self) -> I {
        self.i2c
    }

    pub fn accel_scale(&self) -> AccelFullScale {
        self.accel_scale
    }

    pub fn gyro_scale(&self) -> GyroFullScale {
        self.gyro_scale
    }

    /// Reads accel, temperature and gyro in one bus transaction.
    pub fn read_sample(&mut self) -> Result<RawSample, Error<I::Error>> {
        let mut buf = [0u8; 14];
        self.read_registers(Register::AccelXHigh, &mut buf)?;
        Ok(RawSample::from_bytes(buf))
    }

    /// Reads one sample and converts it to physical units using the
    /// ranges configured at startup.
    pub fn read_scaled(&mut self) -> Result<ScaledSample, Error<I::Error>> {
        Ok(self.read_sample()?.scaled(self.accel_scale, self.gyro_scale))
    }

    fn read_register(&mut self, reg: Register) -> Result<u8, Error<I::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg as u8], &mut buf)
            .map_err(Error::Bus)?;
        Ok(buf[0])
    }

    fn read_registers(&mut self, reg: Register, buf: &mut [u8]) -> Result<(), Error<I::Error>> {
        self.i2c
            .write_read(self.address, &[reg as u8], buf)
            .map_err(Error::Bus)
    }

    fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<I::Error>> {
        self.i2c
            .write(self.address, &[reg as u8, value])
            .map_err(Error::Bus)
    }
}
