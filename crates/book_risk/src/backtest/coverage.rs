//! Likelihood-ratio coverage tests.
//!
//! - Kupiec proportion-of-failures: does the breach frequency match `1 - alpha`?
//! - Christoffersen independence: are breaches independent day to day?
//! - Conditional coverage: both at once, `LR_uc + LR_ind` against chi-square(2)
//!
//! Likelihoods are evaluated in log space with probabilities clamped into
//! `[PROB_EPSILON, 1 - PROB_EPSILON]`.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::RiskError;

use super::breach::BreachSequence;

/// Probability clamp applied before taking logarithms.
pub const PROB_EPSILON: f64 = 1e-12;

#[inline]
fn clamp_prob(p: f64) -> f64 {
    p.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON)
}

#[inline]
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Upper-tail probability of a chi-square statistic.
fn chi_square_p_value(statistic: f64, dof: f64) -> f64 {
    ChiSquared::new(dof).map_or(f64::NAN, |chi| chi.sf(statistic))
}

/// Kupiec unconditional-coverage test result.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KupiecResult {
    /// Likelihood ratio, chi-square(1) under the null
    pub likelihood_ratio: f64,
    /// `P(chi2(1) > LR)`
    pub p_value: f64,
    /// Breaches observed
    pub breach_count: usize,
    /// Sample size
    pub n: usize,
    /// `n * (1 - alpha)`
    pub expected_breaches: f64,
}

impl KupiecResult {
    /// Rejects correct unconditional coverage at `level`.
    #[inline]
    pub fn rejects(&self, level: f64) -> bool {
        self.p_value < level
    }
}

/// Christoffersen independence test result.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChristoffersenResult {
    /// No breach followed by no breach
    pub n00: usize,
    /// No breach followed by breach
    pub n01: usize,
    /// Breach followed by no breach
    pub n10: usize,
    /// Breach followed by breach
    pub n11: usize,
    /// Likelihood ratio, chi-square(1) under independence
    pub likelihood_ratio: f64,
    /// `P(chi2(1) > LR)`
    pub p_value: f64,
}

impl ChristoffersenResult {
    /// `P(breach | no breach yesterday)`.
    pub fn p01(&self) -> f64 {
        ratio(self.n01, self.n00 + self.n01)
    }

    /// `P(breach | breach yesterday)`.
    pub fn p11(&self) -> f64 {
        ratio(self.n11, self.n10 + self.n11)
    }

    /// Rejects independence (breaches cluster) at `level`.
    #[inline]
    pub fn rejects(&self, level: f64) -> bool {
        self.p_value < level
    }
}

/// Joint coverage-and-independence test result.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionalCoverageResult {
    /// `LR_uc + LR_ind`, chi-square(2) under the null
    pub likelihood_ratio: f64,
    /// `P(chi2(2) > LR)`
    pub p_value: f64,
}

/// Kupiec proportion-of-failures test.
///
/// # Errors
///
/// - [`RiskError::InvalidConfidence`] if `alpha` is not in `(0, 1)`
/// - [`RiskError::InsufficientData`] for an empty sequence
///
/// # Examples
///
/// ```
/// use book_risk::backtest::{kupiec_test, BreachSequence};
///
/// let mut breaches = vec![false; 1000];
/// for i in (0..1000).step_by(100) {
///     breaches[i] = true;
/// }
/// let result = kupiec_test(&BreachSequence::from_indicators(breaches), 0.99).unwrap();
/// assert_eq!(result.breach_count, 10);
/// assert!(result.likelihood_ratio < 1e-9);
/// assert!(result.p_value > 0.99);
/// ```
pub fn kupiec_test(breaches: &BreachSequence, alpha: f64) -> Result<KupiecResult, RiskError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(RiskError::InvalidConfidence(alpha));
    }
    let n = breaches.len();
    if n == 0 {
        return Err(RiskError::insufficient(1, 0));
    }
    let x = breaches.breach_count();
    let (hits, misses) = (x as f64, (n - x) as f64);

    let p = 1.0 - alpha;
    let p_hat = clamp_prob(x as f64 / n as f64);

    let ll_null = misses * (1.0 - p).ln() + hits * p.ln();
    let ll_alt = misses * (1.0 - p_hat).ln() + hits * p_hat.ln();
    let likelihood_ratio = (-2.0 * (ll_null - ll_alt)).max(0.0);

    Ok(KupiecResult {
        likelihood_ratio,
        p_value: chi_square_p_value(likelihood_ratio, 1.0),
        breach_count: x,
        n,
        expected_breaches: n as f64 * p,
    })
}

/// Christoffersen first-order Markov independence test.
///
/// # Errors
///
/// [`RiskError::InsufficientData`] with fewer than two observations.
pub fn christoffersen_test(breaches: &BreachSequence) -> Result<ChristoffersenResult, RiskError> {
    let seq = &breaches.breaches;
    if seq.len() < 2 {
        return Err(RiskError::insufficient(2, seq.len()));
    }

    let (mut n00, mut n01, mut n10, mut n11) = (0usize, 0usize, 0usize, 0usize);
    for pair in seq.windows(2) {
        match (pair[0], pair[1]) {
            (false, false) => n00 += 1,
            (false, true) => n01 += 1,
            (true, false) => n10 += 1,
            (true, true) => n11 += 1,
        }
    }

    let p01 = clamp_prob(ratio(n01, n00 + n01));
    let p11 = clamp_prob(ratio(n11, n10 + n11));
    let pi = clamp_prob(ratio(n01 + n11, n00 + n01 + n10 + n11));

    let ll_unrestricted = n00 as f64 * (1.0 - p01).ln()
        + n01 as f64 * p01.ln()
        + n10 as f64 * (1.0 - p11).ln()
        + n11 as f64 * p11.ln();
    let ll_restricted = (n00 + n10) as f64 * (1.0 - pi).ln() + (n01 + n11) as f64 * pi.ln();
    let likelihood_ratio = (-2.0 * (ll_restricted - ll_unrestricted)).max(0.0);

    Ok(ChristoffersenResult {
        n00,
        n01,
        n10,
        n11,
        likelihood_ratio,
        p_value: chi_square_p_value(likelihood_ratio, 1.0),
    })
}

/// Christoffersen conditional-coverage test.
///
/// # Errors
///
/// Any error from [`kupiec_test`] or [`christoffersen_test`].
pub fn conditional_coverage_test(
    breaches: &BreachSequence,
    alpha: f64,
) -> Result<ConditionalCoverageResult, RiskError> {
    let uc = kupiec_test(breaches, alpha)?;
    let ind = christoffersen_test(breaches)?;
    let likelihood_ratio = uc.likelihood_ratio + ind.likelihood_ratio;
    Ok(ConditionalCoverageResult {
        likelihood_ratio,
        p_value: chi_square_p_value(likelihood_ratio, 2.0),
    })
}
