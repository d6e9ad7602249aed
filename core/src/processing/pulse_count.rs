use crate::prelude::{Sample, Stage, StageError, StageResult, Tap};
use std::any::Any;

/// Debounced pulse counter: emits 1.0 once `num_thres` positive inputs
/// have been observed, 0.0 otherwise.
///
/// With `time_thres` of zero the count is unconditional. Otherwise a
/// counting window opens at the first positive input after the counter
/// was idle or after the previous window timed out; firing resets both
/// the count and the window. Non-positive inputs are inert: they reset
/// neither the window nor the count.
pub struct PulseCount {
    num_thres: u32,
    time_thres: f64,
    window_start: Option<f64>,
    count: u32,
    tap: Tap,
}

impl PulseCount {
    pub fn new(num_thres: u32, time_thres_secs: f64) -> StageResult<Self> {
        if num_thres == 0 {
            return Err(StageError::InvalidConfig(
                "pulse count threshold must be at least 1".to_string(),
            ));
        }
        if !time_thres_secs.is_finite() || time_thres_secs < 0.0 {
            return Err(StageError::InvalidConfig(format!(
                "pulse time threshold must be non-negative, got {}",
                time_thres_secs
            )));
        }

        Ok(Self {
            num_thres,
            time_thres: time_thres_secs,
            window_start: None,
            count: 0,
            tap: Tap::new(),
        })
    }
}

impl Stage for PulseCount {
    fn process(&mut self, sample: Sample) -> Sample {
        if sample.v <= 0.0 {
            return self.tap.emit(Sample::zero_at(sample.t));
        }

        if self.time_thres == 0.0 {
            self.count += 1;
            if self.count >= self.num_thres {
                self.count = 0;
                return self.tap.emit(Sample::new(sample.t, 1.0));
            }
            return self.tap.emit(Sample::zero_at(sample.t));
        }

        // Open a fresh window when idle or when the previous one has
        // timed out; an expired window is simply abandoned.
        match self.window_start {
            Some(start) if sample.t - start <= self.time_thres => {}
            _ => {
                self.window_start = Some(sample.t);
                self.count = 0;
            }
        }

        self.count += 1;
        if self.count >= self.num_thres {
            self.count = 0;
            self.window_start = None;
            return self.tap.emit(Sample::new(sample.t, 1.0));
        }
        self.tap.emit(Sample::zero_at(sample.t))
    }

    fn tap(&mut self) -> &mut Tap {
        &mut self.tap
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
