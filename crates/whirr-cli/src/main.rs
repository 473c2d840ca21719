use std::env;
use std::time::Duration;

use log::info;

use whirr_cli::config::DaemonConfig;
use whirr_cli::errors::Result;
use whirr_cli::sensor::I2cMotionSensor;
use whirr_cli::switch::TasmotaSwitch;
use whirr_core::{Controller, MotionClassifier, SystemClock};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).map(String::as_str).unwrap_or("whirr.yaml");

    let config = DaemonConfig::load(config_path)?;
    config.validate()?;
    info!("loaded configuration from {config_path}");

    let sensor = I2cMotionSensor::open(&config.sensor)?;
    let switch = TasmotaSwitch::new(
        &config.switch.url,
        Duration::from_millis(config.switch.request_timeout_ms),
    )?;
    let classifier = MotionClassifier::new(config.classifier.to_config())?;

    let mut controller = Controller::new(
        sensor,
        switch,
        SystemClock::default(),
        classifier,
        config.controller_config(),
    );

    info!(
        "watching {} for motion, driving {} (poll interval {} ms)",
        config.sensor.i2c_bus.display(),
        config.switch.url,
        config.poll_interval_ms
    );

    controller.run();
    Ok(())
}
