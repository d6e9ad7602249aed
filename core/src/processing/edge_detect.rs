use crate::prelude::{Sample, Stage, Tap};
use std::any::Any;

/// Edge detector over a {0,1}-valued input stream: +1 on a rising
/// edge, -1 on a falling edge, 0 otherwise.
///
/// The previous-value memory starts at -1 so the very first sample
/// never registers an edge.
pub struct EdgeDetect {
    prev: f64,
    tap: Tap,
}

impl EdgeDetect {
    pub fn new() -> Self {
        Self {
            prev: -1.0,
            tap: Tap::new(),
        }
    }
}

impl Default for EdgeDetect {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for EdgeDetect {
    fn process(&mut self, sample: Sample) -> Sample {
        let v = if self.prev == 0.0 && sample.v == 1.0 {
            1.0
        } else if self.prev == 1.0 && sample.v == 0.0 {
            -1.0
        } else {
            0.0
        };

        self.prev = sample.v;
        self.tap.emit(Sample::new(sample.t, v))
    }

    fn tap(&mut self) -> &mut Tap {
        &mut self.tap
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
