use crate::prelude::{Sample, Stage, StageError, StageResult, Tap};
use std::any::Any;
use std::collections::VecDeque;

/// Sliding Riemann-sum estimator of average signal power over one
/// nominal period.
///
/// Buffers `ceil(period / spacing)` samples; while under capacity it
/// emits the zero placeholder, then reports `Σ v²·dt / period` at the
/// evicted sample's timestamp. The window sum is recomputed in full on
/// every sample so the floating-point summation order is stable.
pub struct Power {
    buffer: VecDeque<Sample>,
    capacity: usize,
    period: f64,
    tap: Tap,
}

impl Power {
    /// `period_secs` is the nominal signal period, `spacing_secs` the
    /// expected sample spacing.
    pub fn new(period_secs: f64, spacing_secs: f64) -> StageResult<Self> {
        if !period_secs.is_finite() || period_secs <= 0.0 {
            return Err(StageError::InvalidConfig(format!(
                "power period must be positive, got {}",
                period_secs
            )));
        }
        if !spacing_secs.is_finite() || spacing_secs <= 0.0 {
            return Err(StageError::InvalidConfig(format!(
                "sample spacing must be positive, got {}",
                spacing_secs
            )));
        }

        let capacity = (period_secs / spacing_secs).ceil() as usize;
        Ok(Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            period: period_secs,
            tap: Tap::new(),
        })
    }
}

impl Stage for Power {
    fn process(&mut self, sample: Sample) -> Sample {
        if self.buffer.len() < self.capacity - 1 {
            self.buffer.push_back(sample);
            return self.tap.emit(Sample::zero_at(sample.t));
        }

        self.buffer.push_back(sample);

        let dt = self.period / self.capacity as f64;
        let mut power = 0.0;
        for buffered in &self.buffer {
            power += buffered.v * buffered.v * dt;
        }
        power /= self.period;

        let out = match self.buffer.pop_front() {
            Some(oldest) => Sample::new(oldest.t, power),
            None => Sample::zero_at(sample.t),
        };
        self.tap.emit(out)
    }

    fn tap(&mut self) -> &mut Tap {
        &mut self.tap
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
