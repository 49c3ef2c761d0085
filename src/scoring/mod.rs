//! Composite scoring, sector classification and the score-squared allocator.

use crate::config::{AllocationConfig, AppConfig};
use crate::models::{Scores, StockRecord};
use crate::valuation::{calculate_dcf, growth_for, round_to};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

// ── Composite score ───────────────────────────────────────────────────────────

pub const DCF_WEIGHT: f64 = 0.30;
pub const GROWTH_WEIGHT: f64 = 0.20;
pub const ROCE_WEIGHT: f64 = 0.10;
pub const MOAT_WEIGHT: f64 = 0.15;
pub const FII_DII_DE_WEIGHT: f64 = 0.05;
pub const TAILWIND_WEIGHT: f64 = 0.10;
pub const MANAGEMENT_WEIGHT: f64 = 0.10;

/// Weighted sum of the 0–100 sub-scores, rounded to 2 dp.
pub fn weighted_score(s: &Scores) -> f64 {
    let score = DCF_WEIGHT * s.dcf()
        + GROWTH_WEIGHT * s.growth()
        + ROCE_WEIGHT * s.roce()
        + MOAT_WEIGHT * s.moat()
        + FII_DII_DE_WEIGHT * s.fii_dii_de()
        + TAILWIND_WEIGHT * s.tailwind()
        + MANAGEMENT_WEIGHT * s.management();
    round_to(score, 2)
}

fn clamp_score(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

/// Intrinsic value relative to market cap; 25 points per 1x coverage.
pub fn dcf_score(intrinsic_total_cr: f64, market_cap_cr: f64) -> f64 {
    if market_cap_cr <= 0.0 {
        return 0.0;
    }
    clamp_score(intrinsic_total_cr / market_cap_cr * 25.0)
}

pub fn roce_score(roce_pct: f64) -> f64 {
    clamp_score(roce_pct * 2.0)
}

/// Average of leverage (100 at zero debt, 0 at D/E ≥ 2) and institutional holding.
pub fn fii_dii_de_score(debt_equity: f64, fii_pct: f64, dii_pct: f64) -> f64 {
    let de_score = (100.0 - debt_equity * 50.0).max(0.0);
    let holding_score = (fii_pct + dii_pct).min(100.0);
    (de_score + holding_score) / 2.0
}

// ── Broad sector ──────────────────────────────────────────────────────────────

/// Keyword → broad sector, checked in order against the lowercased sector.
const BROAD_SECTORS: &[(&str, &str)] = &[
    ("Financial", "Finance"),
    ("Bank", "Finance"),
    ("Insurance", "Finance"),
    ("NBFC", "Finance"),
    ("IT", "Technology"),
    ("Software", "Technology"),
    ("Tech", "Technology"),
    ("Pharmaceutical", "Healthcare"),
    ("Healthcare", "Healthcare"),
    ("Oils & Gas", "Energy"),
    ("Power", "Energy"),
    ("Energy", "Energy"),
    ("Auto", "Consumer"),
    ("Retail", "Consumer"),
    ("FMCG", "Consumer"),
    ("Consumer", "Consumer"),
    ("Telecom", "Communication"),
    ("Infrastructure", "Industrial"),
    ("Industrial", "Industrial"),
    ("Textile", "Industrial"),
    ("Chemicals", "Industrial"),
];

/// Map a granular sector label to its broad category ("Others" when unknown).
///
/// Plain substring matching: "it" also hits labels such as "Capital Goods".
pub fn broad_sector(sector: &str) -> &'static str {
    let lower = sector.to_lowercase();
    BROAD_SECTORS
        .iter()
        .find(|(key, _)| lower.contains(&key.to_lowercase()))
        .map(|(_, broad)| *broad)
        .unwrap_or(crate::models::FALLBACK_SECTOR)
}

fn broad_sector_of(r: &StockRecord) -> &'static str {
    broad_sector(r.sector.as_deref().unwrap_or("Other"))
}

// ── Allocation ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Allocation {
    pub symbol: String,
    pub weight: f64,
    pub broad_sector: String,
}

/// Score-squared weights over the best records that pass the quality and
/// valuation filters.
pub fn allocate_portfolio(records: &[StockRecord], cfg: &AllocationConfig) -> Vec<Allocation> {
    let mut eligible: Vec<&StockRecord> = records
        .iter()
        .filter(|r| {
            let intrinsic = r.intrinsic_price();
            if intrinsic > 0.0 && r.price() > intrinsic * (1.0 + cfg.max_overvaluation) {
                debug!("{}: excluded, {:.1} above intrinsic {:.1}", r.symbol, r.price(), intrinsic);
                return false;
            }
            if r.score() < cfg.min_score {
                debug!("{}: excluded, score {:.2} < {}", r.symbol, r.score(), cfg.min_score);
                return false;
            }
            true
        })
        .collect();

    eligible.sort_by(|a, b| b.score().total_cmp(&a.score()));
    eligible.truncate(cfg.max_positions);

    let total_sq: f64 = eligible.iter().map(|r| r.score().powi(2)).sum();
    if total_sq <= 0.0 {
        return vec![];
    }

    eligible
        .into_iter()
        .map(|r| Allocation {
            symbol: r.symbol.clone(),
            weight: round_to(r.score().powi(2) / total_sq, 4),
            broad_sector: broad_sector_of(r).to_string(),
        })
        .collect()
}

/// Re-derive broad sectors and replace every weight with a fresh allocation.
pub fn rebalance(records: &mut [StockRecord], cfg: &AllocationConfig) -> usize {
    for r in records.iter_mut() {
        r.broad_sector = Some(broad_sector_of(r).to_string());
        r.portfolio_weight = Some(0.0);
    }

    let weights: HashMap<String, f64> = allocate_portfolio(records, cfg)
        .into_iter()
        .map(|a| (a.symbol, a.weight))
        .collect();

    for r in records.iter_mut() {
        if let Some(w) = weights.get(&r.symbol) {
            r.portfolio_weight = Some(*w);
        }
    }
    weights.len()
}

// ── Rescore ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct RescoreOptions {
    /// Also recompute ROCE and FII/DII/DE sub-scores from the record's fundamentals.
    pub refresh_fundamentals: bool,
}

#[derive(Debug)]
pub struct RescoreStats {
    pub records: usize,
    pub held: usize,
    pub total_weight: f64,
}

/// Re-run the valuation and scoring model over a loaded dataset.
///
/// Output is sorted by final score with fresh portfolio weights.
pub fn rescore(
    mut records: Vec<StockRecord>,
    cfg: &AppConfig,
    opts: RescoreOptions,
) -> (Vec<StockRecord>, RescoreStats) {
    for r in records.iter_mut() {
        rescore_record(r, cfg, opts);
    }

    records.sort_by(|a, b| b.score().total_cmp(&a.score()));
    let held = rebalance(&mut records, &cfg.allocation);

    let stats = RescoreStats {
        records: records.len(),
        held,
        total_weight: records.iter().map(StockRecord::weight).sum(),
    };
    info!(
        "Rescored {} records: {} held, total weight {:.4}",
        stats.records, stats.held, stats.total_weight
    );
    (records, stats)
}

fn rescore_record(r: &mut StockRecord, cfg: &AppConfig, opts: RescoreOptions) {
    let intrinsic = calculate_dcf(r.fcf(), growth_for(r.revenue_cagr(), &cfg.dcf), &cfg.dcf);
    r.intrinsic_value_cr = Some(round_to(intrinsic, 2));

    let shares = r.shares_outstanding_cr.unwrap_or(1.0);
    if shares > 0.0 {
        r.intrinsic_price_per_share = Some(round_to(intrinsic / shares, 2));
    }

    let market_cap = r.market_cap_cr.unwrap_or(1.0);
    let mut scores = r.sub_scores();
    scores.dcf = Some(dcf_score(intrinsic, market_cap));

    if opts.refresh_fundamentals {
        scores.roce = Some(round_to(roce_score(r.roce()), 4));
        scores.fii_dii_de = Some(round_to(fii_dii_de_score(r.de(), r.fii(), r.dii()), 4));
    }

    r.final_score = Some(weighted_score(&scores));
    r.scores = Some(scores);
    debug!("{}: intrinsic {:.2} Cr, score {:.2}", r.symbol, intrinsic, r.score());
}

// ── Tests ─────────────────────────────────────────────────────────────────────
