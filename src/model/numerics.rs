//! Numeric primitives backing the rating engine.
//!
//! The engine needs two special functions: the error function for head-to-head
//! win probabilities, and the inverse standard normal CDF for converting ranks
//! into performance scores. Both are implemented here rather than pulled from a
//! numerics crate because the rating algorithm is defined in terms of these
//! exact approximations.

use std::f64::consts::{PI, SQRT_2};

/// Natural log of the gamma function at 1/2, i.e. `ln(sqrt(pi))`.
const LN_GAMMA_HALF: f64 = 0.572_364_942_924_700_1;

/// Error function, rational-exponential approximation (Abramowitz & Stegun
/// 7.1.26). Absolute error is below 1.5e-7 for all inputs.
pub fn erf(z: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let x = z.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = t * (A1 + t * (A2 + t * (A3 + t * (A4 + t * A5))));
    let value = 1.0 - poly * (-x * x).exp();

    if z < 0.0 {
        -value
    } else {
        value
    }
}

/// Complementary error function, accurate to near machine precision.
///
/// This is deliberately much more accurate than [`erf`]: it drives the Halley
/// refinement step in [`inverse_normal_cdf`], which needs a residual well below
/// the error of the rational approximation it corrects. Evaluated through the
/// regularized incomplete gamma function at `a = 1/2`: a converging series for
/// small arguments and a continued fraction for large ones.
pub fn erfc(z: f64) -> f64 {
    if z < 0.0 {
        return 2.0 - erfc(-z);
    }

    let x2 = z * z;
    if z < 2.0 {
        1.0 - lower_gamma_half(x2)
    } else {
        upper_gamma_half(x2)
    }
}

/// Regularized lower incomplete gamma P(1/2, x), by series expansion.
fn lower_gamma_half(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }

    let a = 0.5;
    let mut ap = a;
    let mut sum = 1.0 / a;
    let mut term = sum;
    for _ in 0..200 {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * 1e-16 {
            break;
        }
    }

    sum * (-x + a * x.ln() - LN_GAMMA_HALF).exp()
}

/// Regularized upper incomplete gamma Q(1/2, x), by continued fraction
/// (modified Lentz). Converges rapidly for x >= 4.
fn upper_gamma_half(x: f64) -> f64 {
    const TINY: f64 = 1e-30;

    let a = 0.5;
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..200 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < 1e-16 {
            break;
        }
    }

    (-x + a * x.ln() - LN_GAMMA_HALF).exp() * h
}

/// Inverse standard normal CDF.
///
/// Two-branch rational approximation (Acklam's refinement of the
/// Beasley-Springer-Moro method) followed by a single Halley step against
/// [`erfc`], which pushes the residual below 1e-9 across the open unit
/// interval. Out-of-range probabilities saturate: `p <= 0` returns negative
/// infinity, `p >= 1` returns positive infinity. Engine callers guarantee
/// `0 < p < 1` via the rank formulas and `n >= 2`.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00
    ];

    // Break-point between the tail and central branches
    const P_LOW: f64 = 0.02425;

    let x = if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    // One Halley step: residual of the approximation against the true CDF
    let e = 0.5 * erfc(-x / SQRT_2) - p;
    let u = e * (2.0 * PI).sqrt() * (x * x / 2.0).exp();
    x - u / (1.0 + x * u / 2.0)
}
