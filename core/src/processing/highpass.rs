use crate::prelude::{Sample, Stage, StageError, StageResult, Tap};
use std::any::Any;
use std::f64::consts::PI;

/// One-pole discrete-time high-pass filter.
///
/// The time constant is `rc = 1 / (2π · cutoff)`. `dt` is recomputed
/// from the incoming timestamps on every sample, so irregular capture
/// spacing is tolerated. The first sample passes through unfiltered
/// and seeds both the filtered and raw memories.
pub struct HighPassFilter {
    rc: f64,
    prev_filtered: Option<Sample>,
    prev_raw: Option<Sample>,
    tap: Tap,
}

impl HighPassFilter {
    pub fn new(cutoff_hz: f64) -> StageResult<Self> {
        let mut filter = Self {
            rc: 0.0,
            prev_filtered: None,
            prev_raw: None,
            tap: Tap::new(),
        };
        filter.set_cutoff(cutoff_hz)?;
        Ok(filter)
    }

    /// Retunes the filter to a new 3dB cutoff frequency.
    pub fn set_cutoff(&mut self, cutoff_hz: f64) -> StageResult<()> {
        if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 {
            return Err(StageError::InvalidConfig(format!(
                "high-pass cutoff must be positive, got {}",
                cutoff_hz
            )));
        }
        self.rc = 1.0 / (2.0 * PI * cutoff_hz);
        Ok(())
    }

    /// Sets the RC time constant directly.
    pub fn set_rc(&mut self, rc_secs: f64) -> StageResult<()> {
        if !rc_secs.is_finite() || rc_secs <= 0.0 {
            return Err(StageError::InvalidConfig(format!(
                "high-pass time constant must be positive, got {}",
                rc_secs
            )));
        }
        self.rc = rc_secs;
        Ok(())
    }
}

impl Stage for HighPassFilter {
    fn process(&mut self, sample: Sample) -> Sample {
        let (prev_filtered, prev_raw) = match (self.prev_filtered, self.prev_raw) {
            (Some(filtered), Some(raw)) => (filtered, raw),
            _ => {
                self.prev_filtered = Some(sample);
                self.prev_raw = Some(sample);
                return self.tap.emit(sample);
            }
        };

        let dt = sample.t - prev_raw.t;
        let alpha = self.rc / (self.rc + dt);
        let filtered = Sample::new(
            sample.t,
            alpha * prev_filtered.v + alpha * (sample.v - prev_raw.v),
        );

        self.prev_filtered = Some(filtered);
        self.prev_raw = Some(sample);
        self.tap.emit(filtered)
    }

    fn tap(&mut self) -> &mut Tap {
        &mut self.tap
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
