use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use whirr_core::contracts::{SwitchClient, SwitchCommand, SwitchError, SwitchState};

use crate::errors::DaemonError;

/// Tasmota-style power switch driven over its `/cm` HTTP endpoint.
///
/// Commands are plain GETs like `/cm?cmnd=Power%20On`; the firmware
/// echoes the resulting relay state as JSON (`{"POWER":"ON"}`). Every
/// request carries the configured timeout so a hung device surfaces as
/// `Unreachable` instead of stalling the control loop.
pub struct TasmotaSwitch {
    client: Client,
    command_endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    #[serde(rename = "POWER")]
    power: String,
}

impl TasmotaSwitch {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DaemonError> {
        let base = Url::parse(base_url).map_err(|err| {
            DaemonError::InvalidConfig(format!("switch url {base_url:?}: {err}"))
        })?;
        let command_endpoint = base.join("cm").map_err(|err| {
            DaemonError::InvalidConfig(format!("switch url {base_url:?}: {err}"))
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            command_endpoint,
        })
    }

    fn command_url(&self, cmnd: &str) -> Url {
        let mut url = self.command_endpoint.clone();
        url.set_query(Some(&format!("cmnd={}", cmnd.replace(' ', "%20"))));
        url
    }

    fn request(&self, cmnd: &str) -> Result<PowerResponse, SwitchError> {
        let url = self.command_url(cmnd);
        debug!(target: "whirr_cli::switch", "GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| SwitchError::Unreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SwitchError::UnexpectedResponse(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .map_err(|err| SwitchError::Unreachable(err.to_string()))?;
        parse_power_response(&body)
    }
}

fn parse_power_response(body: &str) -> Result<PowerResponse, SwitchError> {
    serde_json::from_str(body)
        .map_err(|_| SwitchError::UnexpectedResponse(body.trim().to_string()))
}

fn power_state(power: &str) -> Result<SwitchState, SwitchError> {
    match power {
        "ON" => Ok(SwitchState::On),
        "OFF" => Ok(SwitchState::Off),
        other => Err(SwitchError::UnexpectedResponse(format!(
            "unknown power state {other:?}"
        ))),
    }
}

impl SwitchClient for TasmotaSwitch {
    fn set(&mut self, command: SwitchCommand) -> Result<(), SwitchError> {
        let cmnd = match command {
            SwitchCommand::TurnOn => "Power On",
            SwitchCommand::TurnOff => "Power Off",
        };
        let response = self.request(cmnd)?;
        let reported = power_state(&response.power)?;
        if reported != command.target_state() {
            return Err(SwitchError::UnexpectedResponse(format!(
                "switch reported {reported:?} after {command:?}"
            )));
        }
        Ok(())
    }

    fn status(&mut self) -> Result<SwitchState, SwitchError> {
        let response = self.request("Power")?;
        power_state(&response.power)
    }
}
