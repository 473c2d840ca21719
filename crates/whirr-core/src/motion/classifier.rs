use log::{debug, info};
use nalgebra::Vector3;
use thiserror::Error;

use crate::sample::ImuSample;

/// Binary motion decision exposed by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    /// No sustained motion; the fan should be off.
    Idle,
    /// Sustained motion present; the fan should be on.
    Active,
}

/// Thresholds and debounce settings for the classifier.
///
/// Two metrics are computed per sample: the accelerometer's deviation
/// from the learned rest baseline (in g) and the gyroscope magnitude
/// (in rad/s). Each metric carries an activation threshold and a lower
/// deactivation threshold; the gap between them is the hysteresis that
/// keeps borderline motion from flapping the switch.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierConfig {
    /// Accel deviation above which a sample counts as moving (g)
    pub accel_activation: f64,
    /// Accel deviation below which a sample counts as still (g)
    pub accel_deactivation: f64,
    /// Gyro magnitude above which a sample counts as moving (rad/s)
    pub gyro_activation: f64,
    /// Gyro magnitude below which a sample counts as still (rad/s)
    pub gyro_deactivation: f64,
    /// Consecutive samples required before a state change commits
    pub sustain_samples: u32,
    /// Initial samples that only feed the baseline and never transition
    pub warmup_samples: u32,
    /// Smoothing factor for the rest baseline, in (0, 1]
    pub baseline_alpha: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            accel_activation: 0.15,
            accel_deactivation: 0.05,
            gyro_activation: 0.5,
            gyro_deactivation: 0.1,
            sustain_samples: 3,
            warmup_samples: 10,
            baseline_alpha: 0.02,
        }
    }
}

/// Rejected classifier settings. Fatal at startup.
#[derive(Debug, Error)]
pub enum ClassifierConfigError {
    #[error("{metric} activation threshold {activation} must exceed deactivation threshold {deactivation}")]
    ThresholdOrder {
        metric: &'static str,
        activation: f64,
        deactivation: f64,
    },
    #[error("sustain_samples must be at least 1")]
    ZeroSustain,
    #[error("baseline_alpha {0} must be in (0, 1]")]
    BaselineAlphaRange(f64),
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ClassifierConfigError> {
        if self.accel_activation <= self.accel_deactivation {
            return Err(ClassifierConfigError::ThresholdOrder {
                metric: "accel",
                activation: self.accel_activation,
                deactivation: self.accel_deactivation,
            });
        }
        if self.gyro_activation <= self.gyro_deactivation {
            return Err(ClassifierConfigError::ThresholdOrder {
                metric: "gyro",
                activation: self.gyro_activation,
                deactivation: self.gyro_deactivation,
            });
        }
        if self.sustain_samples == 0 {
            return Err(ClassifierConfigError::ZeroSustain);
        }
        if !(self.baseline_alpha > 0.0 && self.baseline_alpha <= 1.0) {
            return Err(ClassifierConfigError::BaselineAlphaRange(
                self.baseline_alpha,
            ));
        }
        Ok(())
    }
}

/// Converts the raw sample stream into a stable binary motion decision.
///
/// The state machine has exactly two states. `Idle -> Active` commits
/// after `sustain_samples` consecutive moving samples; `Active -> Idle`
/// commits after `sustain_samples` consecutive still samples. Samples
/// landing between the deactivation and activation thresholds reset the
/// opposing streak, so a borderline signal holds the current state.
#[derive(Debug, Clone)]
pub struct MotionClassifier {
    config: ClassifierConfig,
    state: MotionState,
    baseline: Option<Vector3<f64>>,
    streak: u32,
    ingested: u64,
}

impl MotionClassifier {
    /// Creates a classifier in the `Idle` state. Fails on invalid
    /// thresholds rather than at the first sample.
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: MotionState::Idle,
            baseline: None,
            streak: 0,
            ingested: 0,
        })
    }

    /// Current state without ingesting a sample.
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Number of samples ingested so far.
    pub fn sample_count(&self) -> u64 {
        self.ingested
    }

    /// Learned rest baseline, once at least one sample has been seen.
    pub fn baseline(&self) -> Option<Vector3<f64>> {
        self.baseline
    }

    /// Ingests one sample and returns the (possibly updated) state.
    /// At most one transition can occur per call.
    pub fn update(&mut self, sample: &ImuSample) -> MotionState {
        let baseline = *self.baseline.get_or_insert(sample.accel);
        let accel_dev = (sample.accel - baseline).norm();
        let gyro_mag = sample.gyro.norm();

        let moving = accel_dev > self.config.accel_activation
            || gyro_mag > self.config.gyro_activation;
        let still = accel_dev < self.config.accel_deactivation
            && gyro_mag < self.config.gyro_deactivation;

        // Track the mounting orientation while the device is at rest so
        // the deviation metric stays referenced to true rest, not to a
        // fixed axis convention.
        if self.state == MotionState::Idle && still {
            let alpha = self.config.baseline_alpha;
            self.baseline = Some(baseline * (1.0 - alpha) + sample.accel * alpha);
        }

        self.ingested += 1;

        debug!(target: "whirr_core::motion",
            "sample {}: accel_dev={:.4}g gyro_mag={:.4}rad/s moving={} still={} streak={}",
            self.ingested, accel_dev, gyro_mag, moving, still, self.streak
        );

        if self.ingested <= u64::from(self.config.warmup_samples) {
            return self.state;
        }

        match self.state {
            MotionState::Idle => {
                if moving {
                    self.streak += 1;
                } else {
                    self.streak = 0;
                }
                if self.streak >= self.config.sustain_samples {
                    self.transition(MotionState::Active, accel_dev, gyro_mag);
                }
            }
            MotionState::Active => {
                if still {
                    self.streak += 1;
                } else {
                    self.streak = 0;
                }
                if self.streak >= self.config.sustain_samples {
                    self.transition(MotionState::Idle, accel_dev, gyro_mag);
                }
            }
        }

        self.state
    }

    fn transition(&mut self, next: MotionState, accel_dev: f64, gyro_mag: f64) {
        info!(target: "whirr_core::motion",
            "state_change: {:?} -> {:?} (accel_dev={:.4}g, gyro_mag={:.4}rad/s)",
            self.state, next, accel_dev, gyro_mag
        );
        self.state = next;
        self.streak = 0;
    }

    /// Drops the learned baseline and debounce history, returning to
    /// `Idle`.
    pub fn reset(&mut self) {
        self.state = MotionState::Idle;
        self.baseline = None;
        self.streak = 0;
        self.ingested = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(sustain: u32) -> ClassifierConfig {
        ClassifierConfig {
            accel_activation: 0.15,
            accel_deactivation: 0.05,
            sustain_samples: sustain,
            warmup_samples: 0,
            ..ClassifierConfig::default()
        }
    }

    fn sample_with_deviation(index: u64, deviation: f64) -> ImuSample {
        // Rest baseline is seeded at (0, 0, 1.0) g by the first sample.
        ImuSample::from_accel_only(
            Duration::from_millis(index * 500),
            nalgebra::Vector3::new(0.0, 0.0, 1.0 + deviation),
        )
    }

    fn feed(classifier: &mut MotionClassifier, deviations: &[f64]) -> Vec<MotionState> {
        deviations
            .iter()
            .enumerate()
            .map(|(i, dev)| classifier.update(&sample_with_deviation(i as u64, *dev)))
            .collect()
    }

    #[test]
    fn stays_idle_below_deactivation_threshold() {
        let mut classifier = MotionClassifier::new(config(3)).unwrap();
        let states = feed(&mut classifier, &[0.0, 0.02, 0.03, 0.01, 0.04, 0.02]);
        assert!(states.iter().all(|s| *s == MotionState::Idle));
    }

    #[test]
    fn activates_after_sustained_motion_and_holds() {
        let mut classifier = MotionClassifier::new(config(3)).unwrap();
        feed(&mut classifier, &[0.0, 0.2, 0.2, 0.2]);
        assert_eq!(classifier.state(), MotionState::Active);

        // Borderline samples (between the thresholds) must not release.
        feed(&mut classifier, &[0.1, 0.1, 0.1, 0.1]);
        assert_eq!(classifier.state(), MotionState::Active);

        // Three consecutive still samples release.
        feed(&mut classifier, &[0.0, 0.0, 0.0]);
        assert_eq!(classifier.state(), MotionState::Idle);
    }

    #[test]
    fn single_spike_is_debounced() {
        let mut classifier = MotionClassifier::new(config(3)).unwrap();
        let states = feed(&mut classifier, &[0.0, 0.02, 0.25, 0.02, 0.02, 0.02]);
        assert!(states.iter().all(|s| *s == MotionState::Idle));
    }

    #[test]
    fn sustain_of_one_reacts_immediately() {
        let mut classifier = MotionClassifier::new(config(1)).unwrap();
        let states = feed(&mut classifier, &[0.0, 0.2, 0.0]);
        assert_eq!(
            states,
            vec![MotionState::Idle, MotionState::Active, MotionState::Idle]
        );
    }

    #[test]
    fn interrupted_streak_restarts_the_count() {
        let mut classifier = MotionClassifier::new(config(3)).unwrap();
        // Two moving samples, a still one, then two more: never 3 in a row.
        let states = feed(&mut classifier, &[0.0, 0.2, 0.2, 0.02, 0.2, 0.2]);
        assert!(states.iter().all(|s| *s == MotionState::Idle));

        // Completing the streak commits.
        classifier.update(&sample_with_deviation(6, 0.2));
        assert_eq!(classifier.state(), MotionState::Active);
    }

    #[test]
    fn gyro_alone_triggers_activation() {
        let mut classifier = MotionClassifier::new(config(2)).unwrap();
        let accel = nalgebra::Vector3::new(0.0, 0.0, 1.0);
        classifier.update(&ImuSample::from_accel_only(Duration::ZERO, accel));

        for i in 0..2u64 {
            classifier.update(&ImuSample::new(
                Duration::from_millis(500 + i * 500),
                accel,
                nalgebra::Vector3::new(0.6, 0.0, 0.0),
            ));
        }
        assert_eq!(classifier.state(), MotionState::Active);
    }

    #[test]
    fn warmup_samples_never_transition() {
        let mut classifier = MotionClassifier::new(ClassifierConfig {
            warmup_samples: 5,
            sustain_samples: 1,
            ..config(1)
        })
        .unwrap();
        let states = feed(&mut classifier, &[0.0, 0.3, 0.3, 0.3, 0.3]);
        assert!(states.iter().all(|s| *s == MotionState::Idle));

        // First post-warmup moving sample commits with sustain of 1.
        classifier.update(&sample_with_deviation(5, 0.3));
        assert_eq!(classifier.state(), MotionState::Active);
    }

    #[test]
    fn baseline_tracks_slow_drift_while_idle() {
        let mut classifier = MotionClassifier::new(ClassifierConfig {
            baseline_alpha: 0.5,
            ..config(3)
        })
        .unwrap();

        // Feed a slowly tilting rest vector; the baseline follows it and
        // the deviation metric stays below the activation threshold.
        let mut z = 1.0;
        for i in 0..40u64 {
            z += 0.002;
            classifier.update(&ImuSample::from_accel_only(
                Duration::from_millis(i * 500),
                nalgebra::Vector3::new(0.0, 0.0, z),
            ));
        }
        assert_eq!(classifier.state(), MotionState::Idle);
    }

    #[test]
    fn baseline_ema_follows_still_samples() {
        use approx::assert_relative_eq;

        let mut classifier = MotionClassifier::new(ClassifierConfig {
            baseline_alpha: 0.5,
            ..config(3)
        })
        .unwrap();

        // First sample seeds the baseline exactly.
        classifier.update(&sample_with_deviation(0, 0.0));
        assert_relative_eq!(classifier.baseline().unwrap().z, 1.0, epsilon = 1e-12);

        // A still sample blends in at the configured alpha.
        classifier.update(&sample_with_deviation(1, 0.02));
        assert_relative_eq!(classifier.baseline().unwrap().z, 1.01, epsilon = 1e-12);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let result = MotionClassifier::new(ClassifierConfig {
            accel_activation: 0.05,
            accel_deactivation: 0.15,
            ..ClassifierConfig::default()
        });
        assert!(matches!(
            result,
            Err(ClassifierConfigError::ThresholdOrder { metric: "accel", .. })
        ));
    }

    #[test]
    fn rejects_zero_sustain() {
        let result = MotionClassifier::new(ClassifierConfig {
            sustain_samples: 0,
            ..ClassifierConfig::default()
        });
        assert!(matches!(result, Err(ClassifierConfigError::ZeroSustain)));
    }

    #[test]
    fn reset_returns_to_idle_and_relearns_baseline() {
        let mut classifier = MotionClassifier::new(config(1)).unwrap();
        feed(&mut classifier, &[0.0, 0.3]);
        assert_eq!(classifier.state(), MotionState::Active);

        classifier.reset();
        assert_eq!(classifier.state(), MotionState::Idle);
        assert_eq!(classifier.sample_count(), 0);
    }
}
