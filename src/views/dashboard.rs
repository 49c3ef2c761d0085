use super::{bar, heading, palette_color, render_no_data, rule, Render};
use crate::models::StockRecord;
use crate::portfolio::aggregate_by_sector;
use crate::utils::{fit, fmt_weight};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;

const TOP_SCORES: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBar {
    pub symbol: String,
    pub score: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorSlice {
    pub sector: String,
    pub weight: f64,
    pub color: &'static str,
}

/// Landing page: headline cards, top scores and sector exposure.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub as_of: NaiveDate,
    pub top_conviction: Option<String>,
    pub avg_score: Option<f64>,
    pub most_undervalued: Option<String>,
    pub active_symbols: usize,
    pub held_symbols: usize,
    pub top_scores: Vec<ScoreBar>,
    pub sectors: Vec<SectorSlice>,
}

impl DashboardView {
    pub fn build(records: &[StockRecord], as_of: NaiveDate) -> Self {
        let top_conviction = records
            .iter()
            .reduce(|best, r| if r.score() > best.score() { r } else { best })
            .map(|r| r.symbol.clone());

        let avg_score = if records.is_empty() {
            None
        } else {
            Some(records.iter().map(StockRecord::score).sum::<f64>() / records.len() as f64)
        };

        let mut ranked: Vec<&StockRecord> = records.iter().collect();
        ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
        let top_scores = ranked
            .iter()
            .take(TOP_SCORES)
            .enumerate()
            .map(|(i, r)| ScoreBar {
                symbol: r.symbol.clone(),
                score: r.score(),
                color: palette_color(i),
            })
            .collect();

        let sectors = aggregate_by_sector(records)
            .into_iter()
            .enumerate()
            .map(|(i, s)| SectorSlice {
                sector: s.sector,
                weight: s.weight,
                color: palette_color(i),
            })
            .collect();

        Self {
            as_of,
            top_conviction,
            avg_score,
            most_undervalued: most_undervalued(records).map(|r| r.symbol.clone()),
            active_symbols: records.len(),
            held_symbols: records.iter().filter(|r| r.is_held()).count(),
            top_scores,
            sectors,
        }
    }
}

/// Highest intrinsic/current ratio; later records win ties.
fn most_undervalued(records: &[StockRecord]) -> Option<&StockRecord> {
    records
        .iter()
        .filter(|r| r.price() > 0.0 && r.intrinsic_price() > 0.0)
        .max_by(|a, b| {
            (a.intrinsic_price() / a.price()).total_cmp(&(b.intrinsic_price() / b.price()))
        })
}

impl Render for DashboardView {
    fn render(&self) -> String {
        if self.active_symbols == 0 {
            return render_no_data();
        }

        let mut out = String::new();
        heading(
            &mut out,
            "Quant Strategy Dashboard",
            &format!("Smart Capital Allocation & Relative Value Analysis · {}", self.as_of),
        );

        let dash = || "—".to_string();
        let _ = writeln!(out, "  TOP CONVICTION    {}", self.top_conviction.clone().unwrap_or_else(dash));
        let _ = writeln!(
            out,
            "  AVG QUANT SCORE   {}",
            self.avg_score.map(|s| format!("{s:.1}")).unwrap_or_else(dash)
        );
        let _ = writeln!(out, "  MOST UNDERVALUED  {}", self.most_undervalued.clone().unwrap_or_else(dash));
        let _ = writeln!(
            out,
            "  ACTIVE SYMBOLS    {} ({} held)",
            self.active_symbols, self.held_symbols
        );
        rule(&mut out);

        let _ = writeln!(out, "  Quant Score Ranking");
        for s in &self.top_scores {
            let _ = writeln!(
                out,
                "  {} {:>6.2} {}",
                fit(&s.symbol, 12),
                s.score,
                bar(s.score / 100.0, 40)
            );
        }
        rule(&mut out);

        let total: f64 = self.sectors.iter().map(|s| s.weight).sum();
        let _ = writeln!(out, "  Sector Allocation");
        for s in self.sectors.iter().filter(|s| s.weight > 0.0) {
            let share = if total > 0.0 { s.weight / total } else { 0.0 };
            let _ = writeln!(
                out,
                "  {} {:>6} {}",
                fit(&s.sector, 16),
                fmt_weight(s.weight),
                bar(share, 36)
            );
        }
        rule(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, score: f64, price: f64, intrinsic: f64, weight: f64) -> StockRecord {
        StockRecord {
            symbol: symbol.into(),
            final_score: Some(score),
            current_price: Some(price),
            intrinsic_price_per_share: Some(intrinsic),
            portfolio_weight: Some(weight),
            broad_sector: Some("Finance".into()),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_headline_cards() {
        let records = vec![
            record("HDFCBANK", 62.0, 1600.0, 1800.0, 0.3),
            record("ITC", 58.0, 400.0, 600.0, 0.2),
            record("ZOMATO", 41.0, 200.0, 0.0, 0.0),
        ];
        let view = DashboardView::build(&records, today());

        assert_eq!(view.top_conviction.as_deref(), Some("HDFCBANK"));
        assert!((view.avg_score.unwrap() - 53.666_666).abs() < 1e-3);
        assert_eq!(view.most_undervalued.as_deref(), Some("ITC"));
        assert_eq!(view.active_symbols, 3);
        assert_eq!(view.held_symbols, 2);
        assert_eq!(view.top_scores[0].symbol, "HDFCBANK");
        assert_eq!(view.sectors.len(), 1);
        assert!((view.sectors[0].weight - 0.5).abs() < 1e-9);

        let text = view.render();
        assert!(text.contains("TOP CONVICTION    HDFCBANK"));
        assert!(text.contains("2025-01-15"));
    }

    #[test]
    fn test_first_record_wins_score_tie() {
        let records = vec![record("A", 50.0, 1.0, 1.0, 0.0), record("B", 50.0, 1.0, 1.0, 0.0)];
        let view = DashboardView::build(&records, today());
        assert_eq!(view.top_conviction.as_deref(), Some("A"));
    }

    #[test]
    fn test_empty_dataset() {
        let view = DashboardView::build(&[], today());
        assert_eq!(view.top_conviction, None);
        assert_eq!(view.avg_score, None);
        assert!(view.render().contains("No Analysis Data Found"));
    }
}
