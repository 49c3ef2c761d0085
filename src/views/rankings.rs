use super::{heading, render_no_data, rule, Render, Route};
use crate::models::StockRecord;
use crate::utils::{fit, fmt_opt};
use crate::valuation::{classify, round_to, Valuation};
use serde::Serialize;
use std::fmt::Write;
use std::io;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    High,
    Medium,
    Low,
}

impl ScoreTier {
    pub fn of(score: f64) -> Self {
        if score > 60.0 {
            ScoreTier::High
        } else if score > 40.0 {
            ScoreTier::Medium
        } else {
            ScoreTier::Low
        }
    }

    fn marker(self) -> &'static str {
        match self {
            ScoreTier::High => "▲",
            ScoreTier::Medium => "●",
            ScoreTier::Low => "·",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub symbol: String,
    pub broad_sector: String,
    pub top_pick: bool,
    pub score: f64,
    pub tier: ScoreTier,
    pub dcf: Option<f64>,
    pub growth: Option<f64>,
    pub roce: Option<f64>,
    pub moat: Option<f64>,
    pub relative_value: Valuation,
    pub href: String,
}

/// Flat shape for CSV export.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    rank: usize,
    symbol: &'a str,
    broad_sector: &'a str,
    top_pick: bool,
    final_score: f64,
    dcf_score: Option<f64>,
    growth_score: Option<f64>,
    roce_score: Option<f64>,
    moat_score: Option<f64>,
    relative_value_pct: f64,
}

/// Every analysed record, best score first.
#[derive(Debug, Clone, Serialize)]
pub struct RankingView {
    pub rows: Vec<RankingRow>,
}

impl RankingView {
    pub fn build(records: &[StockRecord], limit: Option<usize>) -> Self {
        let mut ranked: Vec<&StockRecord> = records.iter().collect();
        ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));

        let rows = ranked
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .enumerate()
            .map(|(i, r)| {
                let scores = r.scores.as_ref();
                RankingRow {
                    rank: i + 1,
                    symbol: r.symbol.clone(),
                    broad_sector: r.broad_sector_label().to_string(),
                    top_pick: r.is_held(),
                    score: r.score(),
                    tier: ScoreTier::of(r.score()),
                    dcf: scores.and_then(|s| s.dcf),
                    growth: scores.and_then(|s| s.growth),
                    roce: scores.and_then(|s| s.roce),
                    moat: scores.and_then(|s| s.moat),
                    relative_value: classify(r.price(), r.intrinsic_price_per_share),
                    href: Route::insights(&r.symbol).href(),
                }
            })
            .collect();

        Self { rows }
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for r in &self.rows {
            wtr.serialize(CsvRow {
                rank: r.rank,
                symbol: &r.symbol,
                broad_sector: &r.broad_sector,
                top_pick: r.top_pick,
                final_score: r.score,
                dcf_score: r.dcf,
                growth_score: r.growth,
                roce_score: r.roce,
                moat_score: r.moat,
                relative_value_pct: round_to(r.relative_value.signed_pct(), 2),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl Render for RankingView {
    fn render(&self) -> String {
        if self.rows.is_empty() {
            return render_no_data();
        }

        let mut out = String::new();
        heading(
            &mut out,
            "Full Quantitative Ranking",
            "Sub-component scores for DCF, Growth, ROCE and Moat",
        );
        let _ = writeln!(
            out,
            "  {:>4}  {} {} {:>8} {:>6} {:>6} {:>6} {:>6} {:>13}",
            "RANK",
            fit("SYMBOL", 12),
            fit("SECTOR", 14),
            "SCORE",
            "DCF",
            "GROWTH",
            "ROCE",
            "MOAT",
            "REL. VALUE"
        );
        for r in &self.rows {
            let pick = if r.top_pick { "★" } else { " " };
            let _ = writeln!(
                out,
                "  {:>4}{} {} {} {} {:>6.2} {:>6} {:>6} {:>6} {:>6} {:>13}",
                r.rank,
                pick,
                fit(&r.symbol, 12),
                fit(&r.broad_sector, 14),
                r.tier.marker(),
                r.score,
                fmt_opt(r.dcf, 1),
                fmt_opt(r.growth, 1),
                fmt_opt(r.roce, 1),
                fmt_opt(r.moat, 1),
                r.relative_value.label()
            );
        }
        rule(&mut out);
        let _ = writeln!(out, "  ★ top pick (held)   open a row with: insights --symbol <SYMBOL>");
        out
    }
}
