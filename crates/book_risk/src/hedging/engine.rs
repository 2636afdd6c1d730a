//! Hedge construction.

use std::collections::BTreeMap;

use book_core::book::TradingBook;
use book_core::market_data::FactorSeries;
use book_core::types::{AssetClass, HedgeRule, Position};
use tracing::{debug, warn};

use super::beta::beta;
use crate::parallel::ParallelConfig;

/// Exposure magnitude below which no hedge is generated.
pub const NEGLIGIBLE_EXPOSURE: f64 = 1e-12;

/// A generated hedge and how it was sized.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HedgePosition {
    /// The position to add to the book
    pub position: Position,
    /// Index of the originating rule
    pub rule_index: usize,
    /// Exposure to the target factor that was neutralised
    pub target_exposure: f64,
    /// Notional before the cap (equals the final size when not clamped)
    pub unclamped_size: f64,
    /// The cap truncated the size; the hedge only partially neutralises
    pub clamped: bool,
    /// Sized against beta-weighted equity exposure
    pub beta_proxy_used: bool,
}

/// Why a rule produced no hedge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkipReason {
    /// Rule is disabled
    Disabled,
    /// Current exposure is effectively zero
    NegligibleExposure,
}

/// A rule that produced no hedge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkippedRule {
    /// Index of the rule
    pub rule_index: usize,
    /// Rule's hedge name
    pub hedge_name: String,
    /// Reason
    pub reason: SkipReason,
}

/// Output of [`build_hedges`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HedgePlan {
    /// Generated hedges in rule order
    pub hedges: Vec<HedgePosition>,
    /// Rules that produced nothing, in rule order
    pub skipped: Vec<SkippedRule>,
}

impl HedgePlan {
    /// Hedge positions ready to append to a book.
    pub fn positions(&self) -> Vec<Position> {
        self.hedges.iter().map(|h| h.position.clone()).collect()
    }

    /// Number of hedges whose size was capped.
    pub fn clamped_count(&self) -> usize {
        self.hedges.iter().filter(|h| h.clamped).count()
    }

    /// Returns `true` when no hedge was generated.
    pub fn is_empty(&self) -> bool {
        self.hedges.is_empty()
    }
}

enum RuleOutcome {
    Hedge(HedgePosition),
    Skipped(SkippedRule),
}

/// Beta-weighted exposure of the book's equity-like positions to `target`.
///
/// Sums `exposure * beta(position factor, target)` over enabled EQ/INDEX
/// positions whose factor has a series; beta is exactly 1.0 for positions
/// on the target itself. Returns `None` when `target` has no series.
pub fn beta_weighted_exposure(
    book: &TradingBook,
    target_factor_id: &str,
    factors: &FactorSeries,
) -> Option<f64> {
    let target = factors.series(target_factor_id)?;
    let mut betas: BTreeMap<&str, f64> = BTreeMap::new();
    let mut total = 0.0;

    for p in book
        .enabled_positions()
        .filter(|p| p.asset_class.is_equity_like())
    {
        let b = if p.factor_id == target_factor_id {
            1.0
        } else if let Some(&cached) = betas.get(p.factor_id.as_str()) {
            cached
        } else {
            let Some(own) = factors.series(&p.factor_id) else {
                continue;
            };
            let b = beta(&own, &target);
            betas.insert(p.factor_id.as_str(), b);
            b
        };
        total += p.exposure_usd() * b;
    }

    debug!(target = target_factor_id, ?betas, exposure = total, "Beta-weighted exposure");
    Some(total)
}

fn current_exposure(
    book: &TradingBook,
    rule: &HedgeRule,
    factors: Option<&FactorSeries>,
) -> (f64, bool) {
    if rule.use_beta_proxy {
        match factors.and_then(|f| beta_weighted_exposure(book, &rule.target_factor_id, f)) {
            Some(exposure) => return (exposure, true),
            None => warn!(
                rule = %rule.hedge_name,
                target = %rule.target_factor_id,
                "Beta proxy requested but target series missing; using net exposure"
            ),
        }
    }
    (book.net_exposure(&rule.target_factor_id), false)
}

fn evaluate_rule(
    index: usize,
    rule: &HedgeRule,
    book: &TradingBook,
    factors: Option<&FactorSeries>,
) -> RuleOutcome {
    let skipped = |reason| {
        RuleOutcome::Skipped(SkippedRule {
            rule_index: index,
            hedge_name: rule.hedge_name.clone(),
            reason,
        })
    };

    if !rule.enabled {
        return skipped(SkipReason::Disabled);
    }

    let (exposure, beta_proxy_used) = current_exposure(book, rule, factors);
    if exposure.abs() < NEGLIGIBLE_EXPOSURE {
        return skipped(SkipReason::NegligibleExposure);
    }

    let (position, unclamped_size, clamped) = if rule.hedge_asset_class == AssetClass::Rates {
        let dv01 = -exposure;
        (
            Position::dv01(rule.hedge_name.clone(), rule.hedge_factor_id.clone(), dv01),
            dv01,
            false,
        )
    } else {
        let multiplier = rule.effective_multiplier();
        let raw = -exposure / multiplier;
        let (notional, clamped) = match rule.cap() {
            Some(cap) if raw.abs() > cap => (raw.clamp(-cap, cap), true),
            _ => (raw, false),
        };
        if clamped {
            warn!(
                rule = %rule.hedge_name,
                requested = raw,
                capped = notional,
                "Hedge notional clamped; exposure only partially neutralised"
            );
        }
        (
            Position::delta(
                rule.hedge_name.clone(),
                rule.hedge_asset_class,
                rule.hedge_factor_id.clone(),
                notional,
                multiplier,
            ),
            raw,
            clamped,
        )
    };

    RuleOutcome::Hedge(HedgePosition {
        position,
        rule_index: index,
        target_exposure: exposure,
        unclamped_size,
        clamped,
        beta_proxy_used,
    })
}

/// Builds hedges with the default parallel configuration.
///
/// See [`build_hedges_with`].
///
/// # Examples
///
/// ```
/// use book_core::book::TradingBook;
/// use book_core::types::{AssetClass, HedgeRule, Position};
/// use book_risk::hedging::build_hedges;
///
/// let book = TradingBook::new(vec![
///     Position::delta("SPX Beta", AssetClass::Index, ".SPX", 3_000_000.0, 1.0),
/// ]);
/// let rule = HedgeRule::new("HEDGE_SPX", ".SPX", ".SPX", AssetClass::Index)
///     .with_max_abs_notional(1_000_000.0);
///
/// let plan = build_hedges(&book, &[rule], None);
/// assert_eq!(plan.hedges[0].position.notional_usd, -1_000_000.0);
/// assert!(plan.hedges[0].clamped);
/// ```
pub fn build_hedges(
    book: &TradingBook,
    rules: &[HedgeRule],
    factors: Option<&FactorSeries>,
) -> HedgePlan {
    build_hedges_with(book, rules, factors, &ParallelConfig::default())
}

/// Builds one hedge per enabled rule that faces a non-negligible exposure.
///
/// Rules are independent given the book and factor snapshot and are
/// evaluated in parallel; output order matches rule order. A rule whose
/// beta proxy cannot be computed falls back to plain net exposure.
pub fn build_hedges_with(
    book: &TradingBook,
    rules: &[HedgeRule],
    factors: Option<&FactorSeries>,
    parallel: &ParallelConfig,
) -> HedgePlan {
    let outcomes = parallel.map_range(0..rules.len(), |i| {
        evaluate_rule(i, &rules[i], book, factors)
    });

    let mut plan = HedgePlan::default();
    for outcome in outcomes {
        match outcome {
            RuleOutcome::Hedge(h) => plan.hedges.push(h),
            RuleOutcome::Skipped(s) => plan.skipped.push(s),
        }
    }
    debug!(
        rules = rules.len(),
        hedges = plan.hedges.len(),
        skipped = plan.skipped.len(),
        "Hedge plan built"
    );
    plan
}
