use crate::stream::window::Window;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::{Arc, Weak};

/// A single timestamped scalar value flowing through the pipeline.
///
/// Timestamps are seconds relative to an arbitrary epoch and are
/// monotonically non-decreasing within one window's stream. Stages
/// never mutate a sample in place; they return a new one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub t: f64,
    pub v: f64,
}

impl Sample {
    pub fn new(t: f64, v: f64) -> Self {
        Self { t, v }
    }

    /// The conventional "not enough data yet" placeholder: value 0.0
    /// at the input's timestamp.
    pub fn zero_at(t: f64) -> Self {
        Self { t, v: 0.0 }
    }
}

/// Common error type for stage construction and pipeline edits.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no stage at index {0}")]
    StageIndex(usize),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing a stateful unary transform over the sample stream.
///
/// `process` is total: it must always return a valid sample, even while
/// the stage is internally buffering (the placeholder is value 0.0 at
/// the input's timestamp). Every returned sample, placeholders
/// included, must also be mirrored to the stage's tap.
pub trait Stage: Send {
    fn process(&mut self, sample: Sample) -> Sample;

    /// The secondary output sink attached to this stage.
    fn tap(&mut self) -> &mut Tap;

    /// Supports routing external control operations (e.g. gyro
    /// recalibration) to a concrete stage held behind `dyn Stage`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Optional non-owning secondary sink mirroring a stage's output.
///
/// The tap never participates in ownership or processing order; if the
/// target window has been dropped, mirroring silently stops.
#[derive(Default)]
pub struct Tap {
    target: Option<Weak<Window>>,
}

impl Tap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, window: &Arc<Window>) {
        self.target = Some(Arc::downgrade(window));
    }

    pub fn detach(&mut self) {
        self.target = None;
    }

    /// Mirrors the sample to the attached window, if any, and hands it
    /// back for returning from `process`.
    pub fn emit(&self, sample: Sample) -> Sample {
        if let Some(window) = self.target.as_ref().and_then(Weak::upgrade) {
            window.add(sample);
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_placeholder_keeps_timestamp() {
        let placeholder = Sample::zero_at(3.25);
        assert_eq!(placeholder.t, 3.25);
        assert_eq!(placeholder.v, 0.0);
    }

    #[test]
    fn detached_tap_passes_samples_through() {
        let tap = Tap::new();
        let sample = Sample::new(1.0, 2.0);
        assert_eq!(tap.emit(sample), sample);
    }

    #[test]
    fn tap_survives_dropped_target() {
        let mut tap = Tap::new();
        {
            let window = Arc::new(Window::new());
            tap.attach(&window);
        }
        let sample = Sample::new(0.5, -1.0);
        assert_eq!(tap.emit(sample), sample);
    }
}
