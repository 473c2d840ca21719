use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use whirr_core::{ClassifierConfig, ControllerConfig};
use whirr_mpu6050::{AccelFullScale, GyroFullScale, Mpu6050Config};

use crate::errors::{DaemonError, Result};

/// Daemon configuration, loaded from a YAML file at startup. Only the
/// switch URL is mandatory; everything else carries a workable default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    pub switch: SwitchSettings,
    #[serde(default)]
    pub sensor: SensorSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    /// Fixed interval between control loop ticks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Query switch status at startup to skip a redundant command
    #[serde(default = "default_reconcile_on_start")]
    pub reconcile_on_start: bool,
}

/// Network switch endpoint and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchSettings {
    /// Base URL of the switch, e.g. "http://192.168.1.40"
    pub url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Total attempts for a command before it is dropped
    #[serde(default = "default_command_attempts")]
    pub command_attempts: u32,
}

/// I2C bus location and sensor ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSettings {
    #[serde(default = "default_i2c_bus")]
    pub i2c_bus: PathBuf,
    #[serde(default = "default_i2c_address")]
    pub i2c_address: u8,
    /// Accelerometer full-scale range: 2, 4, 8 or 16 g
    #[serde(default = "default_accel_range_g")]
    pub accel_range_g: u16,
    /// Gyroscope full-scale range: 250, 500, 1000 or 2000 deg/s
    #[serde(default = "default_gyro_range_dps")]
    pub gyro_range_dps: u16,
    /// Output rate divider applied to the 1 kHz filtered rate
    #[serde(default = "default_sample_rate_divider")]
    pub sample_rate_divider: u8,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            i2c_bus: default_i2c_bus(),
            i2c_address: default_i2c_address(),
            accel_range_g: default_accel_range_g(),
            gyro_range_dps: default_gyro_range_dps(),
            sample_rate_divider: default_sample_rate_divider(),
        }
    }
}

/// Thresholds and debounce settings, mirroring
/// [`whirr_core::ClassifierConfig`] with serde defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default = "default_accel_activation")]
    pub accel_activation: f64,
    #[serde(default = "default_accel_deactivation")]
    pub accel_deactivation: f64,
    #[serde(default = "default_gyro_activation")]
    pub gyro_activation: f64,
    #[serde(default = "default_gyro_deactivation")]
    pub gyro_deactivation: f64,
    #[serde(default = "default_sustain_samples")]
    pub sustain_samples: u32,
    #[serde(default = "default_warmup_samples")]
    pub warmup_samples: u32,
    #[serde(default = "default_baseline_alpha")]
    pub baseline_alpha: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            accel_activation: default_accel_activation(),
            accel_deactivation: default_accel_deactivation(),
            gyro_activation: default_gyro_activation(),
            gyro_deactivation: default_gyro_deactivation(),
            sustain_samples: default_sustain_samples(),
            warmup_samples: default_warmup_samples(),
            baseline_alpha: default_baseline_alpha(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_reconcile_on_start() -> bool {
    true
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_command_attempts() -> u32 {
    3
}

fn default_i2c_bus() -> PathBuf {
    PathBuf::from("/dev/i2c-1")
}

fn default_i2c_address() -> u8 {
    whirr_mpu6050::DEFAULT_ADDRESS
}

fn default_accel_range_g() -> u16 {
    2
}

fn default_gyro_range_dps() -> u16 {
    500
}

fn default_sample_rate_divider() -> u8 {
    9
}

fn default_accel_activation() -> f64 {
    0.15
}

fn default_accel_deactivation() -> f64 {
    0.05
}

fn default_gyro_activation() -> f64 {
    0.5
}

fn default_gyro_deactivation() -> f64 {
    0.1
}

fn default_sustain_samples() -> u32 {
    3
}

fn default_warmup_samples() -> u32 {
    10
}

fn default_baseline_alpha() -> f64 {
    0.02
}

impl DaemonConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                DaemonError::ConfigFileNotFound(path.as_ref().display().to_string())
            } else {
                DaemonError::Io(err)
            }
        })?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Rejects configurations the daemon cannot run with. All failures
    /// here are fatal; nothing is validated lazily later.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.switch.url).map_err(|err| {
            DaemonError::InvalidConfig(format!("switch url {:?}: {err}", self.switch.url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DaemonError::InvalidConfig(format!(
                "switch url {:?}: unsupported scheme {:?}",
                self.switch.url,
                url.scheme()
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(DaemonError::InvalidConfig(
                "poll_interval_ms must be nonzero".into(),
            ));
        }
        if self.switch.command_attempts == 0 {
            return Err(DaemonError::InvalidConfig(
                "command_attempts must be at least 1".into(),
            ));
        }
        self.sensor.mpu_config()?;
        self.classifier.to_config().validate()?;
        Ok(())
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            command_attempts: self.switch.command_attempts,
            reconcile_on_start: self.reconcile_on_start,
        }
    }
}

impl SensorSettings {
    /// Maps the configured ranges onto driver settings.
    pub fn mpu_config(&self) -> Result<Mpu6050Config> {
        let accel_scale = match self.accel_range_g {
            2 => AccelFullScale::G2,
            4 => AccelFullScale::G4,
            8 => AccelFullScale::G8,
            16 => AccelFullScale::G16,
            other => {
                return Err(DaemonError::InvalidConfig(format!(
                    "accel_range_g {other} is not one of 2, 4, 8, 16"
                )))
            }
        };
        let gyro_scale = match self.gyro_range_dps {
            250 => GyroFullScale::Deg250,
            500 => GyroFullScale::Deg500,
            1000 => GyroFullScale::Deg1000,
            2000 => GyroFullScale::Deg2000,
            other => {
                return Err(DaemonError::InvalidConfig(format!(
                    "gyro_range_dps {other} is not one of 250, 500, 1000, 2000"
                )))
            }
        };
        Ok(Mpu6050Config {
            accel_scale,
            gyro_scale,
            sample_rate_divider: self.sample_rate_divider,
            ..Mpu6050Config::default()
        })
    }
}

impl ClassifierSettings {
    pub fn to_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            accel_activation: self.accel_activation,
            accel_deactivation: self.accel_deactivation,
            gyro_activation: self.gyro_activation,
            gyro_deactivation: self.gyro_deactivation,
            sustain_samples: self.sustain_samples,
            warmup_samples: self.warmup_samples,
            baseline_alpha: self.baseline_alpha,
        }
    }
}
