use crate::prelude::{Sample, Stage, StageError, StageResult, Tap};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Detection mode for [`GyroDetect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GyroMode {
    Velocity,
    Position,
}

/// Dual-mode motion detector over angular-velocity input.
///
/// Velocity mode without return-to-zero is a memoryless sign detector
/// against the threshold. With return-to-zero enabled, a detection
/// fires only when the thresholded sign flips from one nonzero sign to
/// the opposite, and the emitted sign is the opposite of the new
/// crossing: move one way then the other counts as one completed
/// gesture. Position mode integrates velocity into a running position
/// estimate, optionally snapping to zero inside a `±thres/2` dead
/// zone.
pub struct GyroDetect {
    mode: GyroMode,
    rtz: bool,
    thres: f64,
    prev_det: f64,
    triggered: bool,
    integrator: f64,
    tap: Tap,
}

impl GyroDetect {
    pub fn new(thres: f64, mode: GyroMode, rtz: bool) -> StageResult<Self> {
        if !thres.is_finite() || thres <= 0.0 {
            return Err(StageError::InvalidConfig(format!(
                "gyro threshold must be positive, got {}",
                thres
            )));
        }

        Ok(Self {
            mode,
            rtz,
            thres,
            prev_det: 0.0,
            triggered: false,
            integrator: 0.0,
            tap: Tap::new(),
        })
    }

    /// Resets the position integrator, redefining the current physical
    /// position as the zero reference. Safe to call at any time; no
    /// other state is touched.
    pub fn calibrate_center(&mut self) {
        self.integrator = 0.0;
    }

    fn thresholded_sign(&self, v: f64) -> f64 {
        if v >= self.thres {
            1.0
        } else if v <= -self.thres {
            -1.0
        } else {
            0.0
        }
    }
}

impl Stage for GyroDetect {
    fn process(&mut self, sample: Sample) -> Sample {
        let v = match (self.mode, self.rtz) {
            (GyroMode::Velocity, false) => self.thresholded_sign(sample.v),
            (GyroMode::Velocity, true) => {
                let ynrz = self.thresholded_sign(sample.v);

                // Fire only on an opposite-sign re-crossing; emitted
                // sign is the opposite of the new crossing.
                let y = if self.prev_det == -1.0 && ynrz == 1.0 {
                    -1.0
                } else if self.prev_det == 1.0 && ynrz == -1.0 {
                    1.0
                } else {
                    0.0
                };

                // Triggered suppresses repeats until the velocity
                // returns to the dead zone.
                if y != 0.0 {
                    self.triggered = true;
                } else if ynrz == 0.0 {
                    self.triggered = false;
                }

                self.prev_det = if self.triggered {
                    0.0
                } else if ynrz != 0.0 {
                    ynrz
                } else {
                    self.prev_det
                };

                y
            }
            (GyroMode::Position, _) => {
                self.integrator += sample.v;

                let in_dead_zone = self.integrator >= -self.thres / 2.0
                    && self.integrator <= self.thres / 2.0;
                if self.rtz && in_dead_zone {
                    0.0
                } else {
                    self.integrator
                }
            }
        };

        self.tap.emit(Sample::new(sample.t, v))
    }

    fn tap(&mut self) -> &mut Tap {
        &mut self.tap
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(stage: &mut GyroDetect, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| stage.process(Sample::new(i as f64 * 0.1, v)).v)
            .collect()
    }

    #[test]
    fn rejects_non_positive_threshold() {
        assert!(GyroDetect::new(0.0, GyroMode::Velocity, false).is_err());
        assert!(GyroDetect::new(-10.0, GyroMode::Position, true).is_err());
    }

    #[test]
    fn velocity_without_rtz_is_memoryless() {
        let mut stage = GyroDetect::new(2000.0, GyroMode::Velocity, false).unwrap();
        let outputs = run(&mut stage, &[0.0, 2500.0, 2000.0, -2500.0, 1999.0, -1999.0]);
        assert_eq!(outputs, vec![0.0, 1.0, 1.0, -1.0, 0.0, 0.0]);
    }

    #[test]
    fn velocity_rtz_fires_once_on_opposite_recrossing() {
        let mut stage = GyroDetect::new(2000.0, GyroMode::Velocity, true).unwrap();
        // cross positive, then negative, then settle: exactly one
        // detection, at the second crossing, with the opposite sign
        let outputs = run(&mut stage, &[0.0, 2500.0, 0.0, -2500.0, 0.0, 0.0]);
        assert_eq!(outputs, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn velocity_rtz_mirrored_gesture_flips_sign() {
        let mut stage = GyroDetect::new(2000.0, GyroMode::Velocity, true).unwrap();
        let outputs = run(&mut stage, &[-2500.0, 0.0, 2500.0, 0.0]);
        assert_eq!(outputs, vec![0.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn velocity_rtz_single_direction_never_fires() {
        let mut stage = GyroDetect::new(2000.0, GyroMode::Velocity, true).unwrap();
        let outputs = run(&mut stage, &[2500.0, 3000.0, 2500.0, 0.0, 2500.0]);
        assert!(outputs.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn position_integrates_without_decay() {
        let mut stage = GyroDetect::new(10.0, GyroMode::Position, false).unwrap();
        let outputs = run(&mut stage, &[1.0, 2.0, 3.0, -4.0]);
        assert_eq!(outputs, vec![1.0, 3.0, 6.0, 2.0]);
    }

    #[test]
    fn position_rtz_snaps_dead_zone_to_zero() {
        let mut stage = GyroDetect::new(10.0, GyroMode::Position, true).unwrap();
        // integral 4 lies within +/-5: snapped
        assert_eq!(stage.process(Sample::new(0.0, 4.0)).v, 0.0);
        // integral 8 outside the dead zone
        assert_eq!(stage.process(Sample::new(0.1, 4.0)).v, 8.0);
    }

    #[test]
    fn calibrate_center_rezeroes_the_integrator() {
        let mut stage = GyroDetect::new(10.0, GyroMode::Position, true).unwrap();
        stage.process(Sample::new(0.0, 100.0));
        stage.process(Sample::new(0.1, 50.0));

        stage.calibrate_center();
        // next integrated value is exactly the just-added sample
        let out = stage.process(Sample::new(0.2, 42.0));
        assert_eq!(out.v, 42.0);
    }
}
