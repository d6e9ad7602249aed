//! Polynomial expansion over complex roots, used by the Butterworth
//! denominator synthesis. Coefficients are stored as interleaved
//! real/imaginary pairs: slot `2k` is the real part of coefficient `k`
//! and slot `2k + 1` its imaginary part.

/// Expands the product of first-order factors `(z + p_i)` for the
/// complex values packed in `p`. Returns `2 * (p.len() / 2)` slots.
pub fn binomial_mult(p: &[f64]) -> Vec<f64> {
    let n = p.len() / 2;
    let mut a = vec![0.0; 2 * n];

    for i in 0..n {
        for j in (1..=i).rev() {
            a[2 * j] += p[2 * i] * a[2 * (j - 1)] - p[2 * i + 1] * a[2 * (j - 1) + 1];
            a[2 * j + 1] += p[2 * i] * a[2 * (j - 1) + 1] + p[2 * i + 1] * a[2 * (j - 1)];
        }

        a[0] += p[2 * i];
        a[1] += p[2 * i + 1];
    }

    a
}

/// Expands the product of second-order factors `(z^2 + b_i z + c_i)`
/// for the complex values packed in `b` and `c`. Returns
/// `4 * (b.len() / 2)` slots.
pub fn trinomial_mult(b: &[f64], c: &[f64]) -> Vec<f64> {
    let n = b.len() / 2;
    let mut a = vec![0.0; 4 * n];

    a[0] = b[0];
    a[1] = b[1];
    a[2] = c[0];
    a[3] = c[1];

    for i in 1..n {
        a[2 * (2 * i + 1)] +=
            c[2 * i] * a[2 * (2 * i - 1)] - c[2 * i + 1] * a[2 * (2 * i - 1) + 1];
        a[2 * (2 * i + 1) + 1] +=
            c[2 * i] * a[2 * (2 * i - 1) + 1] + c[2 * i + 1] * a[2 * (2 * i - 1)];

        for j in (2..=2 * i).rev() {
            a[2 * j] += b[2 * i] * a[2 * (j - 1)] - b[2 * i + 1] * a[2 * (j - 1) + 1]
                + c[2 * i] * a[2 * (j - 2)]
                - c[2 * i + 1] * a[2 * (j - 2) + 1];
            a[2 * j + 1] += b[2 * i] * a[2 * (j - 1) + 1]
                + b[2 * i + 1] * a[2 * (j - 1)]
                + c[2 * i] * a[2 * (j - 2) + 1]
                + c[2 * i + 1] * a[2 * (j - 2)];
        }

        a[2] += b[2 * i] * a[0] - b[2 * i + 1] * a[1] + c[2 * i];
        a[3] += b[2 * i] * a[1] + b[2 * i + 1] * a[0] + c[2 * i + 1];
        a[0] += b[2 * i];
        a[1] += b[2 * i + 1];
    }

    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomial_mult_expands_real_roots() {
        // (z + 2)(z + 3) = z^2 + 5z + 6
        let expanded = binomial_mult(&[2.0, 0.0, 3.0, 0.0]);
        assert_eq!(expanded, vec![5.0, 0.0, 6.0, 0.0]);
    }

    #[test]
    fn binomial_mult_cancels_conjugate_imaginaries() {
        // (z + i)(z - i) = z^2 + 1, purely real
        let expanded = binomial_mult(&[0.0, 1.0, 0.0, -1.0]);
        assert!(expanded[0].abs() < 1e-12);
        assert!(expanded[1].abs() < 1e-12);
        assert!((expanded[2] - 1.0).abs() < 1e-12);
        assert!(expanded[3].abs() < 1e-12);
    }

    #[test]
    fn trinomial_mult_single_factor_copies_coefficients() {
        let expanded = trinomial_mult(&[1.5, 0.0], &[-0.25, 0.0]);
        assert_eq!(expanded, vec![1.5, 0.0, -0.25, 0.0]);
    }

    #[test]
    fn trinomial_mult_expands_two_real_factors() {
        // (z^2 + z + 1)(z^2 + 2z + 3)
        //   = z^4 + 3z^3 + 6z^2 + 5z + 3
        let expanded = trinomial_mult(&[1.0, 0.0, 2.0, 0.0], &[1.0, 0.0, 3.0, 0.0]);
        let reals: Vec<f64> = expanded.iter().step_by(2).copied().collect();
        assert_eq!(reals, vec![3.0, 6.0, 5.0, 3.0]);
    }
}
