//! Hedge command implementation
//!
//! Builds hedge positions from a rule file. With a factor table the
//! beta proxy is available and the hedged book's risk is compared with
//! the unhedged one.

use std::path::Path;

use book_core::types::HedgeRule;
use book_risk::hedging::{build_hedges_with, hedge_effectiveness, HedgeEffectiveness, HedgePlan};
use book_risk::parallel::ParallelConfig;
use serde::Serialize;
use tracing::info;

use crate::commands::{load_book, FactorArgs};
use crate::loader::load_rules;
use crate::output::{num_opt, pct_opt, print_json, usd, usd_opt, Align, OutputFormat, Table};
use crate::Result;

#[derive(Debug, Serialize)]
struct HedgeOutput {
    plan: HedgePlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    effectiveness: Option<HedgeEffectiveness>,
}

/// Applies `default_cap` to rules that carry no cap of their own.
pub fn apply_default_cap(rules: Vec<HedgeRule>, default_cap: Option<f64>) -> Vec<HedgeRule> {
    match default_cap {
        Some(cap) => rules
            .into_iter()
            .map(|r| if r.cap().is_none() { r.with_max_abs_notional(cap) } else { r })
            .collect(),
        None => rules,
    }
}

/// Run the hedge command
pub fn run(
    book_path: &Path,
    rules_path: &Path,
    factors: Option<&FactorArgs>,
    default_cap: Option<f64>,
    alpha: f64,
    parallel: &ParallelConfig,
    format: OutputFormat,
) -> Result<()> {
    let book = load_book(book_path)?;
    let rules = apply_default_cap(load_rules(rules_path)?, default_cap);
    let factors = factors.map(|f| f.load(&book)).transpose()?;

    let plan = build_hedges_with(&book, &rules, factors.as_ref(), parallel);
    info!(
        "{} hedges from {} rules ({} clamped, {} skipped)",
        plan.hedges.len(),
        rules.len(),
        plan.clamped_count(),
        plan.skipped.len()
    );

    let effectiveness = factors
        .as_ref()
        .map(|f| hedge_effectiveness(&book, &plan.positions(), f, alpha))
        .transpose()?;
    let output = HedgeOutput { plan, effectiveness };

    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table => {
            print_plan(&output.plan);
            if let Some(eff) = &output.effectiveness {
                print_effectiveness(eff);
            }
            Ok(())
        }
    }
}

fn print_plan(plan: &HedgePlan) {
    let mut table = Table::new([
        "Hedge", "Factor", "Class", "Target exposure", "Notional", "DV01", "Flags",
    ])
    .with_title("Hedge plan")
    .align(1, Align::Left)
    .align(2, Align::Left)
    .align(6, Align::Left);
    for h in &plan.hedges {
        let p = &h.position;
        let mut flags = Vec::new();
        if h.clamped {
            flags.push(format!("clamped from {}", usd(h.unclamped_size)));
        }
        if h.beta_proxy_used {
            flags.push("beta proxy".to_string());
        }
        let (notional, dv01) = if p.asset_class.is_rates() {
            (String::new(), usd(p.dv01_usd_per_bp))
        } else {
            (usd(p.notional_usd), String::new())
        };
        table.push_row([
            p.name.clone(),
            p.factor_id.clone(),
            p.asset_class.to_string(),
            usd(h.target_exposure),
            notional,
            dv01,
            flags.join(", "),
        ]);
    }
    table.print();

    for s in &plan.skipped {
        println!("Skipped rule {} ({}): {:?}", s.rule_index, s.hedge_name, s.reason);
    }
}

fn print_effectiveness(eff: &HedgeEffectiveness) {
    let mut table = Table::new(["Book", "VaR (USD)", "ES (USD)"])
        .with_title(format!("Hedge effectiveness @{:.1}%", eff.alpha * 100.0));
    for (label, report) in [
        ("Unhedged", &eff.unhedged),
        ("Hedged", &eff.hedged),
        ("Hedges only", &eff.hedge_only),
    ] {
        table.push_row([label.to_string(), usd_opt(report.var), usd_opt(report.es)]);
    }
    table.push_row([
        "Reduction".to_string(),
        pct_opt(eff.var_reduction_pct, 1),
        pct_opt(eff.es_reduction_pct, 1),
    ]);
    table.print();

    let mut table = Table::new(["Statistic", "Value"]);
    table.push_row([
        "Corr(hedges, unhedged)".to_string(),
        num_opt(eff.corr_hedge_vs_unhedged, 3),
    ]);
    table.push_row([
        "Corr(hedged, unhedged)".to_string(),
        num_opt(eff.corr_hedged_vs_unhedged, 3),
    ]);
    table.push_row(["Gross hedge notional".to_string(), usd(eff.gross_hedge_notional)]);
    table.push_row(["Gross hedge DV01".to_string(), usd(eff.gross_hedge_dv01)]);
    table.print();
}
