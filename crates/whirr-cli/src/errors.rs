use thiserror::Error;
use whirr_core::motion::ClassifierConfigError;

/// Errors that can occur while bringing the daemon up. Everything here
/// is fatal at startup; once the control loop runs, collaborator
/// failures are handled locally and never surface as `DaemonError`.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("classifier configuration error: {0}")]
    Classifier(#[from] ClassifierConfigError),

    #[error("config file not found: {0}")]
    ConfigFileNotFound(String),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open I2C bus {path}: {message}")]
    I2cOpen { path: String, message: String },

    #[error("sensor initialization failed: {0}")]
    SensorInit(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, DaemonError>;
