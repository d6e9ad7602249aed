use crate::math::stats::StatsHelper;
use crate::prelude::{Sample, Stage, StageError, StageResult, Tap};
use std::any::Any;
use std::collections::VecDeque;

/// Rolling-window mean low-pass filter.
///
/// Emits the zero placeholder until the buffer holds `window - 1`
/// samples, then reports the mean of the buffered values at the
/// timestamp of the buffer's middle element and evicts the oldest.
/// The output is therefore time-centered, delayed by roughly half a
/// window length.
pub struct MovingAverage {
    buffer: VecDeque<Sample>,
    window: usize,
    tap: Tap,
}

impl MovingAverage {
    pub fn new(window: usize) -> StageResult<Self> {
        Self::validate(window)?;
        Ok(Self {
            buffer: VecDeque::with_capacity(window),
            window,
            tap: Tap::new(),
        })
    }

    pub fn set_window(&mut self, window: usize) -> StageResult<()> {
        Self::validate(window)?;
        self.window = window;
        Ok(())
    }

    fn validate(window: usize) -> StageResult<()> {
        if window < 2 {
            return Err(StageError::InvalidConfig(format!(
                "moving-average window must be at least 2, got {}",
                window
            )));
        }
        Ok(())
    }
}

impl Stage for MovingAverage {
    fn process(&mut self, sample: Sample) -> Sample {
        self.buffer.push_back(sample);

        if self.buffer.len() < self.window - 1 {
            return self.tap.emit(Sample::zero_at(sample.t));
        }

        let mean = StatsHelper::mean(self.buffer.iter().map(|s| s.v));
        let center_t = self.buffer[self.buffer.len() / 2].t;
        self.buffer.pop_front();

        self.tap.emit(Sample::new(center_t, mean))
    }

    fn tap(&mut self) -> &mut Tap {
        &mut self.tap
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
