pub mod classifier;

pub use classifier::{ClassifierConfig, ClassifierConfigError, MotionClassifier, MotionState};
