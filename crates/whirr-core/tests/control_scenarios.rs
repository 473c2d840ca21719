//! End-to-end scenarios driving the classifier and controller with
//! synthetic sample sequences, no hardware or network involved.

use std::collections::VecDeque;
use std::time::Duration;

use nalgebra::Vector3;
use whirr_core::{
    ClassifierConfig, Clock, Controller, ControllerConfig, ImuSample, MotionClassifier,
    MotionState, SensorError, SensorReader, SwitchClient, SwitchCommand, SwitchError, SwitchState,
};

struct SampleFeed {
    samples: VecDeque<ImuSample>,
}

impl SampleFeed {
    /// Builds a feed of rest-oriented samples whose accel deviation from
    /// the (0, 0, 1) g baseline follows `deviations`.
    fn from_deviations(deviations: &[f64]) -> Self {
        let samples = deviations
            .iter()
            .enumerate()
            .map(|(i, dev)| {
                ImuSample::from_accel_only(
                    Duration::from_millis(i as u64 * 500),
                    Vector3::new(0.0, 0.0, 1.0 + dev),
                )
            })
            .collect();
        Self { samples }
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

impl SensorReader for SampleFeed {
    fn read_sample(&mut self) -> Result<ImuSample, SensorError> {
        self.samples
            .pop_front()
            .ok_or_else(|| SensorError::Unavailable {
                reason: "feed exhausted".into(),
            })
    }
}

struct RecordingSwitch {
    commands: Vec<SwitchCommand>,
    relay: SwitchState,
}

impl RecordingSwitch {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
            relay: SwitchState::Off,
        }
    }
}

impl SwitchClient for RecordingSwitch {
    fn set(&mut self, command: SwitchCommand) -> Result<(), SwitchError> {
        self.relay = command.target_state();
        self.commands.push(command);
        Ok(())
    }

    fn status(&mut self) -> Result<SwitchState, SwitchError> {
        Ok(self.relay)
    }
}

struct VirtualClock {
    now: Duration,
}

impl VirtualClock {
    fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }
}

impl Clock for VirtualClock {
    fn now(&mut self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
    }
}

fn scenario_config() -> ClassifierConfig {
    // Calibration scenario: rest deviation ~0.02 g, deactivation 0.05 g,
    // activation 0.15 g, three-sample sustain.
    ClassifierConfig {
        accel_activation: 0.15,
        accel_deactivation: 0.05,
        sustain_samples: 3,
        warmup_samples: 0,
        ..ClassifierConfig::default()
    }
}

#[test]
fn calibration_scenario_commits_on_third_sustained_sample() {
    let mut classifier = MotionClassifier::new(scenario_config()).unwrap();
    let mut feed = SampleFeed::from_deviations(&[0.02, 0.02, 0.20, 0.20, 0.20, 0.02]);

    let mut states = vec![classifier.state()];
    while feed.len() > 0 {
        let sample = feed.read_sample().unwrap();
        states.push(classifier.update(&sample));
    }

    assert_eq!(
        states,
        vec![
            MotionState::Idle,
            MotionState::Idle,
            MotionState::Idle,
            MotionState::Idle,
            MotionState::Idle,
            MotionState::Active,
            MotionState::Active,
        ]
    );
}

#[test]
fn calibration_scenario_issues_exactly_one_turn_on() {
    let feed = SampleFeed::from_deviations(&[0.02, 0.02, 0.20, 0.20, 0.20, 0.02]);
    let ticks = feed.len();
    let mut controller = Controller::new(
        feed,
        RecordingSwitch::new(),
        VirtualClock::new(),
        MotionClassifier::new(scenario_config()).unwrap(),
        ControllerConfig::default(),
    );

    controller.reconcile();
    for _ in 0..ticks {
        controller.tick();
    }

    assert_eq!(controller.state(), MotionState::Active);
    assert_eq!(controller.switch().commands, vec![SwitchCommand::TurnOn]);
}

#[test]
fn full_exercise_session_turns_the_fan_on_then_off() {
    // Rest, a workout long enough to activate, then rest long enough to
    // deactivate: exactly two commands in order.
    let mut deviations = vec![0.02; 5];
    deviations.extend(vec![0.30; 10]);
    deviations.extend(vec![0.01; 10]);

    let feed = SampleFeed::from_deviations(&deviations);
    let ticks = feed.len();
    let mut controller = Controller::new(
        feed,
        RecordingSwitch::new(),
        VirtualClock::new(),
        MotionClassifier::new(scenario_config()).unwrap(),
        ControllerConfig::default(),
    );

    for _ in 0..ticks {
        controller.tick();
    }

    assert_eq!(controller.state(), MotionState::Idle);
    assert_eq!(
        controller.switch().commands,
        vec![SwitchCommand::TurnOn, SwitchCommand::TurnOff]
    );
}

#[test]
fn continuous_low_magnitude_noise_never_activates() {
    let mut classifier = MotionClassifier::new(scenario_config()).unwrap();
    for i in 0..500u64 {
        // Pseudo-noise below the deactivation threshold.
        let dev = 0.04 * ((i % 7) as f64 / 7.0);
        let state = classifier.update(&ImuSample::from_accel_only(
            Duration::from_millis(i * 500),
            Vector3::new(0.0, 0.0, 1.0 + dev),
        ));
        assert_eq!(state, MotionState::Idle);
    }
}
