/// Register subset of the MPU-6050 needed for polled motion sampling.
#[derive(Copy, Clone, Debug)]
pub enum Register {
    /// Sample Rate Divider (0x19): gyro output rate / (1 + divider)
    SmpRtDiv = 0x19,
    /// Configuration (0x1A): digital low pass filter selection
    Config = 0x1A,
    /// Gyroscope Configuration (0x1B): full-scale range in bits 4:3
    GyroConfig = 0x1B,
    /// Accelerometer Configuration (0x1C): full-scale range in bits 4:3
    AccelConfig = 0x1C,
    /// First data register; accel, temperature and gyro follow
    /// contiguously and are read as one 14-byte burst
    AccelXHigh = 0x3B,
    /// Power Management 1 (0x6B): sleep, reset and clock source
    PwrMgmt1 = 0x6B,
    /// Device identity (0x75), reads 0x68
    WhoAmI = 0x75,
}
