use crate::prelude::{Sample, Stage, Tap};
use std::any::Any;

/// Stateless comparator: 1.0 when the value strictly exceeds the
/// threshold, 0.0 otherwise. Values exactly at the threshold do not
/// trigger.
pub struct Threshold {
    thres: f64,
    tap: Tap,
}

impl Threshold {
    pub fn new(thres: f64) -> Self {
        Self {
            thres,
            tap: Tap::new(),
        }
    }
}

impl Stage for Threshold {
    fn process(&mut self, sample: Sample) -> Sample {
        let v = if sample.v > self.thres { 1.0 } else { 0.0 };
        self.tap.emit(Sample::new(sample.t, v))
    }

    fn tap(&mut self) -> &mut Tap {
        &mut self.tap
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
