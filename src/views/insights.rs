use super::{bar, heading, render_no_data, rule, Render, ViewError};
use crate::models::StockRecord;
use crate::utils::{fit, fmt_opt};
use crate::valuation::{classify, Valuation};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Serialize)]
pub struct RadarAxis {
    pub axis: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightDetail {
    pub symbol: String,
    pub name: String,
    pub about: Option<String>,
    pub score: f64,
    pub broad_sector: String,
    pub sector: String,
    pub industry: String,
    pub radar: Vec<RadarAxis>,
    pub roce_pct: Option<f64>,
    pub debt_equity: Option<f64>,
    pub sales_cagr_pct: Option<f64>,
    pub institutional_stake_pct: f64,
    pub valuation: Valuation,
    pub growth_thesis: String,
    pub moat_analysis: String,
    pub notes: Option<String>,
}

/// Single-record deep dive. The selected record is local to the view.
#[derive(Debug, Clone)]
pub struct InsightView<'a> {
    records: &'a [StockRecord],
    selected: usize,
}

impl<'a> InsightView<'a> {
    /// Starts on the first record.
    pub fn new(records: &'a [StockRecord]) -> Self {
        Self {
            records,
            selected: 0,
        }
    }

    /// Open the view on `symbol`, or the first record when none is given.
    /// An empty dataset opens on the no-data page whatever the symbol.
    pub fn open(records: &'a [StockRecord], symbol: Option<&str>) -> Result<Self, ViewError> {
        let mut view = Self::new(records);
        if records.is_empty() {
            return Ok(view);
        }
        if let Some(symbol) = symbol {
            if !view.select(symbol) {
                return Err(ViewError::UnknownSymbol(symbol.to_string()));
            }
        }
        Ok(view)
    }

    /// Switch to the record with exactly `symbol`. Unknown symbols leave the
    /// selection unchanged.
    pub fn select(&mut self, symbol: &str) -> bool {
        match self.records.iter().position(|r| r.symbol == symbol) {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Option<&'a StockRecord> {
        self.records.get(self.selected)
    }

    pub fn detail(&self) -> Option<InsightDetail> {
        self.selected().map(detail_of)
    }
}

fn detail_of(r: &StockRecord) -> InsightDetail {
    let s = r.sub_scores();
    let radar = vec![
        RadarAxis { axis: "DCF", value: s.dcf() },
        RadarAxis { axis: "Growth", value: s.growth() },
        RadarAxis { axis: "ROCE", value: s.roce() },
        RadarAxis { axis: "Moat/Sat", value: s.moat() },
        RadarAxis { axis: "FII/DII", value: s.fii_dii_de() },
        RadarAxis { axis: "Sector", value: s.tailwind() },
        RadarAxis { axis: "Mgmt", value: s.management() },
    ];

    InsightDetail {
        symbol: r.symbol.clone(),
        name: r.display_name().to_string(),
        about: r.about_text().map(str::to_string),
        score: r.score(),
        broad_sector: r.broad_sector_label().to_string(),
        sector: r.sector_label().to_string(),
        industry: r.industry_label().to_string(),
        radar,
        roce_pct: r.roce_pct,
        debt_equity: r.debt_equity,
        sales_cagr_pct: r.revenue_cagr_pct,
        institutional_stake_pct: r.institutional_stake(),
        valuation: classify(r.price(), r.intrinsic_price_per_share),
        growth_thesis: r.growth_thesis().to_string(),
        moat_analysis: r.moat_analysis().to_string(),
        notes: r
            .ai_notes
            .as_ref()
            .and_then(|n| n.summary())
            .map(str::to_string),
    }
}

impl Render for InsightView<'_> {
    fn render(&self) -> String {
        let Some(d) = self.detail() else {
            return render_no_data();
        };

        let mut out = String::new();
        heading(
            &mut out,
            "Deep Insight Engine",
            "Hard financials combined with AI-driven qualitative scoring",
        );

        for (i, r) in self.records.iter().enumerate() {
            let marker = if i == self.selected { "▶" } else { " " };
            let _ = writeln!(
                out,
                "  {} {} {} {:>6.2}",
                marker,
                fit(&r.symbol, 12),
                fit(r.broad_sector_label(), 16),
                r.score()
            );
        }
        rule(&mut out);

        let _ = writeln!(out, "  {}  ·  {}", d.symbol, d.name);
        let _ = writeln!(
            out,
            "  SCORE: {:.2}   {} | {} | {}",
            d.score, d.broad_sector, d.sector, d.industry
        );
        if let Some(about) = &d.about {
            let _ = writeln!(out, "  {}", about);
        }
        rule(&mut out);

        for axis in &d.radar {
            let _ = writeln!(
                out,
                "  {} {:>6.1} {}",
                fit(axis.axis, 10),
                axis.value,
                bar(axis.value / 100.0, 40)
            );
        }
        rule(&mut out);

        let _ = writeln!(
            out,
            "  ROCE % {:>8}   D/E Ratio {:>6}   Sales CAGR {:>7}   Inst. Stake {:.1}%",
            fmt_opt(d.roce_pct, 1),
            fmt_opt(d.debt_equity, 2),
            d.sales_cagr_pct
                .map(|v| format!("{v:.1}%"))
                .unwrap_or_else(|| "—".into()),
            d.institutional_stake_pct
        );
        let _ = writeln!(out, "  Relative value: {}", d.valuation.label());
        rule(&mut out);

        let _ = writeln!(out, "  GROWTH ENGINE");
        let _ = writeln!(out, "  {}", d.growth_thesis);
        let _ = writeln!(out, "  COMPETITIVE MOAT");
        let _ = writeln!(out, "  {}", d.moat_analysis);
        if let Some(notes) = &d.notes {
            let _ = writeln!(out, "  NOTES");
            let _ = writeln!(out, "  {}", notes);
        }
        rule(&mut out);
        out
    }
}
