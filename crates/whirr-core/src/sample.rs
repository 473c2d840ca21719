use std::time::Duration;

use nalgebra::Vector3;

/// One calibrated reading from the motion sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// Time of the read relative to the control loop's clock origin
    pub timestamp: Duration,
    /// Acceleration in g (x, y, z)
    pub accel: Vector3<f64>,
    /// Angular velocity in rad/s (x, y, z)
    pub gyro: Vector3<f64>,
}

impl ImuSample {
    /// Creates a sample with full 6DOF sensor data
    pub fn new(timestamp: Duration, accel: Vector3<f64>, gyro: Vector3<f64>) -> Self {
        Self {
            timestamp,
            accel,
            gyro,
        }
    }

    /// Creates a sample with only accelerometer data (gyro zeroed)
    pub fn from_accel_only(timestamp: Duration, accel: Vector3<f64>) -> Self {
        Self {
            timestamp,
            accel,
            gyro: Vector3::zeros(),
        }
    }

    /// Get the timestamp in seconds
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp.as_secs_f64()
    }
}
