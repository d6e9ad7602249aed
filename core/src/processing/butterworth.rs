use crate::math::poly::{binomial_mult, trinomial_mult};
use crate::prelude::{Sample, Stage, StageError, StageResult, Tap};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::VecDeque;
use std::f64::consts::PI;

/// Frequency response shape of a [`Butterworth`] stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum BandForm {
    Lowpass { cutoff_hz: f64 },
    Highpass { cutoff_hz: f64 },
    Bandpass { low_hz: f64, high_hz: f64 },
}

/// General IIR Butterworth digital filter of configurable order.
///
/// Construction synthesizes the transfer-function coefficients
/// offline: the numerator from binomial-style prototype coefficients
/// (sign-alternated for high-pass, zero-interleaved for band-pass),
/// the denominator from bilinear-transform pole mapping expanded in
/// `math::poly`, and a closed-form gain factor folded into the
/// numerator for unit gain at the design frequency.
///
/// Runtime evaluation is the causal difference equation over the last
/// `len(B)` inputs and `len(A) - 1` outputs. Until the input buffer
/// fills, the already-available convolution is still evaluated and
/// returned; downstream consumers must tolerate this ring-up
/// transient.
pub struct Butterworth {
    num_b: Vec<f64>,
    den_a: Vec<f64>,
    inputs: VecDeque<Sample>,
    outputs: VecDeque<Sample>,
    tap: Tap,
}

impl Butterworth {
    pub fn new(order: usize, band: BandForm, sampling_rate_hz: f64) -> StageResult<Self> {
        if order < 1 || order > 7 {
            return Err(StageError::InvalidConfig(format!(
                "butterworth order must be in 1..=7, got {}",
                order
            )));
        }
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(StageError::InvalidConfig(format!(
                "sampling rate must be positive, got {}",
                sampling_rate_hz
            )));
        }

        let nyquist = sampling_rate_hz / 2.0;
        let check_edge = |label: &str, f: f64| -> StageResult<()> {
            if !f.is_finite() || f <= 0.0 || f >= nyquist {
                return Err(StageError::InvalidConfig(format!(
                    "{} frequency {} outside (0, {})",
                    label, f, nyquist
                )));
            }
            Ok(())
        };

        // Frequency edges as fractions of the Nyquist rate.
        let (mut num_b, den_a, factor) = match band {
            BandForm::Lowpass { cutoff_hz } => {
                check_edge("cutoff", cutoff_hz)?;
                let fnorm = cutoff_hz / nyquist;
                (
                    b_coeffs(order, band),
                    a_coeffs_single(order, fnorm),
                    gain_single(order, fnorm, true),
                )
            }
            BandForm::Highpass { cutoff_hz } => {
                check_edge("cutoff", cutoff_hz)?;
                let fnorm = cutoff_hz / nyquist;
                (
                    b_coeffs(order, band),
                    a_coeffs_single(order, fnorm),
                    gain_single(order, fnorm, false),
                )
            }
            BandForm::Bandpass { low_hz, high_hz } => {
                check_edge("low", low_hz)?;
                check_edge("high", high_hz)?;
                if low_hz >= high_hz {
                    return Err(StageError::InvalidConfig(format!(
                        "band edges must satisfy low < high, got {} >= {}",
                        low_hz, high_hz
                    )));
                }
                let flow = low_hz / nyquist;
                let fhigh = high_hz / nyquist;
                (
                    b_coeffs(order, band),
                    a_coeffs_band(order, flow, fhigh),
                    gain_band(order, flow, fhigh),
                )
            }
        };

        for b in &mut num_b {
            *b *= factor;
        }

        LogManager::new("butterworth").record_debug(&format!(
            "synthesized order {} {:?}: {} numerator / {} denominator taps",
            order,
            band,
            num_b.len(),
            den_a.len()
        ));

        Ok(Self {
            inputs: VecDeque::with_capacity(num_b.len()),
            outputs: VecDeque::with_capacity(num_b.len()),
            num_b,
            den_a,
            tap: Tap::new(),
        })
    }

    /// Numerator coefficients with the gain factor applied.
    pub fn numerator(&self) -> &[f64] {
        &self.num_b
    }

    /// Denominator coefficients; index 0 is always 1.0.
    pub fn denominator(&self) -> &[f64] {
        &self.den_a
    }
}

impl Stage for Butterworth {
    fn process(&mut self, sample: Sample) -> Sample {
        if self.outputs.is_empty() {
            let first = Sample::new(sample.t, self.num_b[0] * sample.v);
            self.outputs.push_back(first);
            self.inputs.push_back(sample);
            return self.tap.emit(first);
        }

        self.inputs.push_back(sample);

        let mut acc = 0.0;
        for (k, input) in self.inputs.iter().rev().enumerate() {
            acc += self.num_b[k] * input.v;
        }
        for (k, output) in self.outputs.iter().rev().enumerate() {
            acc -= self.den_a[k + 1] * output.v;
        }
        let out = Sample::new(sample.t, acc);

        // Ring-up: keep growing the history until len(B) inputs exist.
        if self.inputs.len() < self.num_b.len() {
            self.outputs.push_back(out);
            return self.tap.emit(out);
        }

        self.outputs.pop_front();
        self.outputs.push_back(out);
        self.inputs.pop_front();
        self.tap.emit(out)
    }

    fn tap(&mut self) -> &mut Tap {
        &mut self.tap
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Numerator polynomial of the prototype, most to least significant.
fn b_coeffs(order: usize, band: BandForm) -> Vec<f64> {
    let mut bcoeff = vec![0.0; order + 1];

    if order == 1 {
        bcoeff[0] = 1.0;
        bcoeff[1] = 1.0;
    } else {
        bcoeff[0] = 1.0;
        bcoeff[1] = order as f64;
        for i in 2..order / 2 + 1 {
            bcoeff[i] = (order - i + 1) as f64 * bcoeff[i - 1] / i as f64;
            bcoeff[order - i] = bcoeff[i];
        }
        bcoeff[order - 1] = order as f64;
        bcoeff[order] = 1.0;
    }

    // Sign-alternate odd powers for anything but lowpass.
    if !matches!(band, BandForm::Lowpass { .. }) {
        let mut j = 1;
        while j < order + 1 {
            bcoeff[j] = -bcoeff[j];
            j += 2;
        }
    }

    // Interleave zeros for bandpass, doubling the polynomial length.
    if matches!(band, BandForm::Bandpass { .. }) {
        let mut doubled = vec![0.0; 2 * order + 1];
        for i in 0..order {
            doubled[2 * i] = bcoeff[i];
        }
        doubled[2 * order] = bcoeff[order];
        return doubled;
    }

    bcoeff
}

/// Denominator polynomial for lowpass/highpass via first-order pole
/// factors expanded with `binomial_mult`.
fn a_coeffs_single(order: usize, fnorm: f64) -> Vec<f64> {
    let theta = PI * fnorm;
    let stheta = theta.sin();
    let ctheta = theta.cos();

    let mut poles = vec![0.0; 2 * order];
    for k in 0..order {
        let pang = PI * (2 * k + 1) as f64 / (2.0 * order as f64);
        let spang = pang.sin();
        let cpang = pang.cos();
        let scale = 1.0 + stheta * spang;

        poles[2 * k] = -ctheta / scale;
        poles[2 * k + 1] = -stheta * cpang / scale;
    }

    let expanded = binomial_mult(&poles);

    let mut acoeff = vec![0.0; order + 1];
    acoeff[0] = 1.0;
    for k in 1..order + 1 {
        acoeff[k] = expanded[2 * k - 2];
    }
    acoeff
}

/// Denominator polynomial for bandpass via second-order pole factors
/// (bandwidth and center-frequency rotation) expanded with
/// `trinomial_mult`.
fn a_coeffs_band(order: usize, flow: f64, fhigh: f64) -> Vec<f64> {
    let cp = (PI * (fhigh + flow) / 2.0).cos();
    let theta = PI * (fhigh - flow) / 2.0;
    let st = theta.sin();
    let ct = theta.cos();
    let s2t = 2.0 * st * ct;
    let c2t = 2.0 * ct * ct - 1.0;

    // z^-2 and z^-1 coefficients of each second-order factor
    let mut rcof = vec![0.0; 2 * order];
    let mut tcof = vec![0.0; 2 * order];

    for k in 0..order {
        let pang = PI * (2 * k + 1) as f64 / (2.0 * order as f64);
        let spang = pang.sin();
        let cpang = pang.cos();
        let scale = 1.0 + s2t * spang;

        rcof[2 * k] = c2t / scale;
        rcof[2 * k + 1] = s2t * cpang / scale;
        tcof[2 * k] = -2.0 * cp * (ct + st * spang) / scale;
        tcof[2 * k + 1] = -2.0 * cp * st * cpang / scale;
    }

    let expanded = trinomial_mult(&tcof, &rcof);

    let mut dcof = vec![0.0; 2 * order + 1];
    dcof[0] = 1.0;
    for k in 1..2 * order + 1 {
        dcof[k] = expanded[2 * k - 2];
    }
    dcof
}

/// Closed-form numerator gain for lowpass/highpass: unit gain at DC
/// (lowpass) or Nyquist (highpass).
fn gain_single(order: usize, fnorm: f64, lowpass: bool) -> f64 {
    let omega = PI * fnorm;
    let sin_omega = omega.sin();
    let pi_over_order = PI / (2.0 * order as f64);

    let mut factor = 1.0;
    for k in 0..order / 2 {
        factor *= 1.0 + sin_omega * ((2 * k + 1) as f64 * pi_over_order).sin();
    }

    let half = if lowpass {
        (omega / 2.0).sin()
    } else {
        (omega / 2.0).cos()
    };

    if order % 2 == 1 {
        factor *= half
            + if lowpass {
                (omega / 2.0).cos()
            } else {
                (omega / 2.0).sin()
            };
    }

    half.powi(order as i32) / factor
}

/// Closed-form numerator gain for bandpass: a complex product over the
/// pole angles.
fn gain_band(order: usize, flow: f64, fhigh: f64) -> f64 {
    let tt = 1.0 / (PI * (fhigh - flow) / 2.0).tan();

    let mut sfr = 1.0;
    let mut sfi = 0.0;

    for k in 0..order {
        let pang = PI * (2 * k + 1) as f64 / (2.0 * order as f64);
        let spang = tt + pang.sin();
        let cpang = pang.cos();
        let a = (sfr + sfi) * (spang - cpang);
        let b = sfr * spang;
        let c = -sfi * cpang;
        sfr = b - c;
        sfi = a - b - c;
    }

    1.0 / sfr
}
