//! Collaborator seams for the control loop.
//!
//! The loop itself is pure decision logic; everything that touches the
//! outside world (the I2C sensor bus, the switch's HTTP endpoint) lives
//! behind these traits so tests can drive the loop with synthetic
//! collaborators.

use thiserror::Error;

use crate::sample::ImuSample;

/// Command sent to the power switch, derived one-to-one from a motion
/// state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCommand {
    TurnOn,
    TurnOff,
}

/// Relay position as reported by the switch firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchCommand {
    /// The relay position this command drives towards.
    pub fn target_state(self) -> SwitchState {
        match self {
            SwitchCommand::TurnOn => SwitchState::On,
            SwitchCommand::TurnOff => SwitchState::Off,
        }
    }
}

/// Errors surfaced by a sensor read.
#[derive(Debug, Error)]
pub enum SensorError {
    /// The underlying bus transaction could not complete.
    #[error("sensor unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Errors surfaced by a switch call.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// The network call could not be completed (includes timeouts).
    #[error("switch unreachable: {0}")]
    Unreachable(String),
    /// The device replied, but not in the expected format.
    #[error("unexpected response from switch: {0}")]
    UnexpectedResponse(String),
}

/// Pulls one calibrated sample from the motion sensor.
pub trait SensorReader {
    fn read_sample(&mut self) -> Result<ImuSample, SensorError>;
}

/// Drives the remote power switch.
pub trait SwitchClient {
    /// Toggles the relay. The call physically switches the load.
    fn set(&mut self, command: SwitchCommand) -> Result<(), SwitchError>;

    /// Queries the current relay position.
    fn status(&mut self) -> Result<SwitchState, SwitchError>;
}
