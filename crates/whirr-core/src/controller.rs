use std::time::Duration;

use log::{debug, error, info, warn};

use crate::contracts::{SensorReader, SwitchClient, SwitchCommand, SwitchError, SwitchState};
use crate::motion::{MotionClassifier, MotionState};
use crate::time::Clock;

/// Pacing and retry settings for the control loop.
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    /// Fixed interval between ticks
    pub poll_interval: Duration,
    /// Total attempts for a switch command before it is dropped
    pub command_attempts: u32,
    /// Query switch status at startup to skip a redundant command
    pub reconcile_on_start: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            command_attempts: 3,
            reconcile_on_start: true,
        }
    }
}

/// Drives the system forward in time: one sensor read, one
/// classification, and (on a state change) one switch call per tick.
///
/// The classifier's state is authoritative. A failed switch command is
/// retried a bounded number of times and then dropped, so a flaky
/// network never stalls motion detection.
pub struct Controller<S, W, C> {
    sensor: S,
    switch: W,
    clock: C,
    classifier: MotionClassifier,
    config: ControllerConfig,
    last_state: MotionState,
}

impl<S, W, C> Controller<S, W, C>
where
    S: SensorReader,
    W: SwitchClient,
    C: Clock,
{
    pub fn new(
        sensor: S,
        switch: W,
        clock: C,
        classifier: MotionClassifier,
        config: ControllerConfig,
    ) -> Self {
        let last_state = classifier.state();
        Self {
            sensor,
            switch,
            clock,
            classifier,
            config,
            last_state,
        }
    }

    /// Last state the loop has acted on.
    pub fn state(&self) -> MotionState {
        self.last_state
    }

    /// The switch collaborator, mainly for inspection in tests.
    pub fn switch(&self) -> &W {
        &self.switch
    }

    /// Aligns the switch with the classifier's initial `Idle` state.
    /// Skips the command when the relay is already off. Failure to
    /// query is logged and ignored; the first genuine transition will
    /// correct the relay.
    pub fn reconcile(&mut self) {
        match self.switch.status() {
            Ok(SwitchState::Off) => {
                debug!(target: "whirr_core::controller",
                    "switch already off; skipping initial command");
            }
            Ok(SwitchState::On) => {
                info!(target: "whirr_core::controller",
                    "switch is on at startup; turning it off");
                if let Err(err) = self.send_command(SwitchCommand::TurnOff) {
                    error!(target: "whirr_core::controller",
                        "switch_error: startup TurnOff dropped: {err}");
                }
            }
            Err(err) => {
                warn!(target: "whirr_core::controller",
                    "switch_error: status query failed: {err}");
            }
        }
    }

    /// One control loop iteration. Never panics and never escalates a
    /// collaborator failure; the loop is meant to run unattended.
    pub fn tick(&mut self) {
        let sample = match self.sensor.read_sample() {
            Ok(sample) => sample,
            Err(err) => {
                // Fail-safe hold: the classifier is not fed, so the
                // exposed state cannot change on a bad read.
                warn!(target: "whirr_core::controller",
                    "sensor_error: {err}; holding state {:?}", self.last_state);
                return;
            }
        };

        let state = self.classifier.update(&sample);
        if state == self.last_state {
            return;
        }

        info!(target: "whirr_core::controller",
            "state_change: {:?} -> {:?} at {:.3}s",
            self.last_state, state, sample.timestamp_secs()
        );

        let command = match state {
            MotionState::Active => SwitchCommand::TurnOn,
            MotionState::Idle => SwitchCommand::TurnOff,
        };

        // The classifier is authoritative: record the new state before
        // talking to the switch so a network failure cannot stall
        // future detection.
        self.last_state = state;

        if let Err(err) = self.send_command(command) {
            error!(target: "whirr_core::controller",
                "switch_error: {command:?} dropped after {} attempts: {err}",
                self.config.command_attempts
            );
        }
    }

    /// Runs the polling loop forever.
    pub fn run(&mut self) {
        if self.config.reconcile_on_start {
            self.reconcile();
        }
        loop {
            self.tick();
            self.clock.sleep(self.config.poll_interval);
        }
    }

    fn send_command(&mut self, command: SwitchCommand) -> Result<(), SwitchError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.switch.set(command) {
                Ok(()) => {
                    debug!(target: "whirr_core::controller",
                        "{command:?} acknowledged on attempt {attempt}");
                    return Ok(());
                }
                Err(err) if attempt < self.config.command_attempts => {
                    warn!(target: "whirr_core::controller",
                        "switch_error: {command:?} attempt {attempt} failed: {err}; retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }
}
