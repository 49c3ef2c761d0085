use super::dashboard::SectorSlice;
use super::{bar, heading, palette_color, render_no_data, rule, Render, Route};
use crate::config::AppConfig;
use crate::models::StockRecord;
use crate::portfolio::{aggregate_by_sector, compute_stats, select_portfolio, PortfolioStats};
use crate::utils::{fit, fmt_weight};
use crate::valuation::{classify, Valuation};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Serialize)]
pub struct Holding {
    pub rank: usize,
    pub symbol: String,
    pub name: String,
    pub broad_sector: String,
    pub weight: f64,
    pub score: f64,
    pub current_price: Option<f64>,
    pub intrinsic_price: Option<f64>,
    pub valuation: Valuation,
    pub href: String,
}

/// Held positions with their aggregate statistics.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioView {
    pub target_size: usize,
    pub holdings: Vec<Holding>,
    pub sectors: Vec<SectorSlice>,
    pub stats: Option<PortfolioStats>,
    #[serde(skip)]
    dataset_empty: bool,
}

impl PortfolioView {
    pub fn build(records: &[StockRecord], cfg: &AppConfig) -> Self {
        let held = select_portfolio(records);

        let holdings = held
            .iter()
            .enumerate()
            .map(|(i, r)| Holding {
                rank: i + 1,
                symbol: r.symbol.clone(),
                name: r.display_name().to_string(),
                broad_sector: r.broad_sector_label().to_string(),
                weight: r.weight(),
                score: r.score(),
                current_price: r.current_price,
                intrinsic_price: r.intrinsic_price_per_share,
                valuation: classify(r.price(), r.intrinsic_price_per_share),
                href: Route::insights(&r.symbol).href(),
            })
            .collect();

        let sectors = aggregate_by_sector(held.iter().copied())
            .into_iter()
            .enumerate()
            .map(|(i, s)| SectorSlice {
                sector: s.sector,
                weight: s.weight,
                color: palette_color(i),
            })
            .collect();

        Self {
            target_size: cfg.allocation.max_positions,
            holdings,
            sectors,
            stats: compute_stats(&held, &cfg.analytics),
            dataset_empty: records.is_empty(),
        }
    }
}

impl Render for PortfolioView {
    fn render(&self) -> String {
        if self.dataset_empty {
            return render_no_data();
        }

        let mut out = String::new();
        heading(
            &mut out,
            "Main Quantitative Portfolio",
            &format!(
                "Target portfolio size: {} / {}",
                self.holdings.len(),
                self.target_size
            ),
        );

        let Some(stats) = &self.stats else {
            let _ = writeln!(out, "  No positions carry a portfolio weight.");
            rule(&mut out);
            return out;
        };

        let _ = writeln!(
            out,
            "  Wtd P/E {:>7.2}   Wtd P/B {:>6.2}   Exp. return {:>6.2}%",
            stats.weighted_pe, stats.weighted_pb, stats.expected_return
        );
        let _ = writeln!(
            out,
            "  Sharpe  {:>7.2}   Sortino {:>6.2}   Total weight {}",
            stats.sharpe,
            stats.sortino,
            fmt_weight(stats.total_weight)
        );
        rule(&mut out);

        let _ = writeln!(out, "  Strategic Capital Allocation");
        for h in &self.holdings {
            let _ = writeln!(
                out,
                "  {:>3}  {} {} {:>7} {:>6.2}  {:>13}  {}",
                h.rank,
                fit(&h.symbol, 12),
                fit(&h.broad_sector, 14),
                fmt_weight(h.weight),
                h.score,
                h.valuation.label(),
                h.href
            );
        }
        rule(&mut out);

        let _ = writeln!(out, "  Broad Sector Diversification");
        let total: f64 = self.sectors.iter().map(|s| s.weight).sum();
        for s in &self.sectors {
            let share = if total > 0.0 { s.weight / total } else { 0.0 };
            let _ = writeln!(
                out,
                "  {} {:>7} {}",
                fit(&s.sector, 16),
                fmt_weight(s.weight),
                bar(share, 36)
            );
        }
        rule(&mut out);
        out
    }
}
