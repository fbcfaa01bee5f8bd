//! Special functions behind the goodness-of-fit tests.
//!
//! Only what the chi-squared tail probability needs: the log-gamma
//! function and the regularized incomplete gamma functions.

/// Lanczos approximation of ln Γ(x).
///
/// Reference: Lanczos (1964), "A Precision Approximation of the Gamma
/// Function", *SIAM Journal on Numerical Analysis* 1(1).
///
/// # Accuracy
/// Relative error < 2 × 10⁻¹⁰ for x > 0.
///
/// # Examples
/// ```
/// use u_combinatorics::special::ln_gamma;
/// // Γ(5) = 24
/// assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
/// ```
pub fn ln_gamma(x: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS[1..].iter().enumerate() {
        sum += c / (x + i as f64 + 1.0);
    }

    let t = x + G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Regularized lower incomplete gamma function P(a, x) = γ(a, x) / Γ(a).
///
/// Uses the series expansion for `x < a + 1`, the continued fraction
/// otherwise.
pub fn regularized_lower_gamma(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x < a + 1.0 {
        gamma_series(a, x)
    } else {
        1.0 - gamma_cf(a, x)
    }
}

/// Regularized upper incomplete gamma function Q(a, x) = 1 − P(a, x).
///
/// Evaluated directly in the tail so small p-values keep their precision.
pub fn regularized_upper_gamma(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x < a + 1.0 {
        1.0 - gamma_series(a, x)
    } else {
        gamma_cf(a, x)
    }
}

fn gamma_series(a: f64, x: f64) -> f64 {
    let mut term = 1.0 / a;
    let mut sum = term;
    let mut ap = a;
    for _ in 0..200 {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * 1e-14 {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

// Lentz's continued fraction for Q(a, x).
fn gamma_cf(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / 1e-30;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=200 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < 1e-30 {
            d = 1e-30;
        }
        c = b + an / c;
        if c.abs() < 1e-30 {
            c = 1e-30;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < 1e-14 {
            break;
        }
    }
    h * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// CDF of the chi-squared distribution with `k` degrees of freedom.
///
/// # Returns
/// - `f64::NAN` if k ≤ 0 or inputs are NaN.
/// - `0.0` if x ≤ 0.
///
/// # Examples
/// ```
/// use u_combinatorics::special::chi_squared_cdf;
/// assert_eq!(chi_squared_cdf(0.0, 5.0), 0.0);
/// assert!((chi_squared_cdf(3.841, 1.0) - 0.95).abs() < 0.01);
/// ```
pub fn chi_squared_cdf(x: f64, k: f64) -> f64 {
    if x.is_nan() || k.is_nan() || k <= 0.0 {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    regularized_lower_gamma(k / 2.0, x / 2.0)
}

/// Upper tail P(X > x) of the chi-squared distribution, i.e. the p-value
/// of a goodness-of-fit statistic `x` with `k` degrees of freedom.
pub fn chi_squared_sf(x: f64, k: f64) -> f64 {
    if x.is_nan() || k.is_nan() || k <= 0.0 {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 1.0;
    }
    regularized_upper_gamma(k / 2.0, x / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ln_gamma_factorials() {
        let mut fact = 1.0_f64;
        for n in 1..15 {
            fact *= n as f64;
            let got = ln_gamma(n as f64 + 1.0);
            assert!((got - fact.ln()).abs() < 1e-9, "ln Γ({}) = {got}", n + 1);
        }
    }

    #[test]
    fn test_lower_gamma_exponential_case() {
        // P(1, x) = 1 - exp(-x)
        for &x in &[0.1, 0.5, 1.0, 2.0, 5.0, 10.0] {
            let p = regularized_lower_gamma(1.0, x);
            assert!((p - (1.0 - (-x as f64).exp())).abs() < 1e-10, "P(1, {x}) = {p}");
        }
    }

    #[test]
    fn test_chi_squared_critical_values() {
        // (statistic, df, upper tail)
        let table = [
            (3.841, 1.0, 0.05),
            (5.991, 2.0, 0.05),
            (16.919, 9.0, 0.05),
            (23.209, 10.0, 0.01),
            (36.191, 19.0, 0.01),
        ];
        for &(x, k, alpha) in &table {
            let p = chi_squared_sf(x, k);
            assert!((p - alpha).abs() < 1e-3, "sf({x}, {k}) = {p}, expected {alpha}");
        }
    }

    #[test]
    fn test_cdf_and_sf_are_complementary() {
        for &k in &[1.0, 4.0, 13.0, 41.0] {
            for &x in &[0.5, 3.0, 12.0, 40.0, 90.0] {
                let total = chi_squared_cdf(x, k) + chi_squared_sf(x, k);
                assert!((total - 1.0).abs() < 1e-9, "cdf + sf = {total} at x={x}, k={k}");
            }
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(chi_squared_cdf(1.0, 0.0).is_nan());
        assert!(chi_squared_sf(f64::NAN, 2.0).is_nan());
        assert_eq!(chi_squared_sf(-1.0, 3.0), 1.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn chi2_cdf_in_01(x in 0.01_f64..50.0, k in 0.5_f64..20.0) {
            let c = chi_squared_cdf(x, k);
            prop_assert!((0.0..=1.0).contains(&c), "chi2_cdf({x}, {k}) = {c} out of [0,1]");
        }

        #[test]
        fn chi2_sf_is_decreasing(x1 in 0.01_f64..60.0, x2 in 0.01_f64..60.0, k in 1.0_f64..30.0) {
            let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
            prop_assert!(chi_squared_sf(lo, k) + 1e-12 >= chi_squared_sf(hi, k));
        }
    }
}
