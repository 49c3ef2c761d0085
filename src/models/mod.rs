use serde::{Deserialize, Serialize};

/// Marker the upstream bot writes when it could not scrape a text field.
pub const MISSING_SENTINEL: &str = "values missing";

/// Group label for records without a sector classification.
pub const FALLBACK_SECTOR: &str = "Others";

pub const GROWTH_THESIS_PLACEHOLDER: &str =
    "Solid growth trajectory supported by expanding market presence and operational efficiency.";
pub const MOAT_ANALYSIS_PLACEHOLDER: &str =
    "Strong structural barriers to entry reinforced by brand equity and distribution scale.";

// ── Stock record ──────────────────────────────────────────────────────────────

/// One analysed security as written to `stockData.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StockRecord {
    pub symbol: String,

    #[serde(rename = "Company Name", default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(rename = "About", default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,

    #[serde(rename = "Sector", default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(rename = "Broad Sector", default, skip_serializing_if = "Option::is_none")]
    pub broad_sector: Option<String>,
    #[serde(rename = "Industry", default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(rename = "Market Cap (Cr)", default, skip_serializing_if = "Option::is_none")]
    pub market_cap_cr: Option<f64>,
    #[serde(rename = "Current Price", default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(rename = "Intrinsic Value (Total Cr)", default, skip_serializing_if = "Option::is_none")]
    pub intrinsic_value_cr: Option<f64>,
    #[serde(rename = "Shares Outstanding (Cr)", default, skip_serializing_if = "Option::is_none")]
    pub shares_outstanding_cr: Option<f64>,
    #[serde(rename = "Intrinsic Price Per Share", default, skip_serializing_if = "Option::is_none")]
    pub intrinsic_price_per_share: Option<f64>,

    #[serde(rename = "ROCE (%)", default, skip_serializing_if = "Option::is_none")]
    pub roce_pct: Option<f64>,
    #[serde(rename = "PE", alias = "P/E", default, skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    #[serde(rename = "PB", alias = "P/B", default, skip_serializing_if = "Option::is_none")]
    pub pb_ratio: Option<f64>,
    #[serde(rename = "D/E", default, skip_serializing_if = "Option::is_none")]
    pub debt_equity: Option<f64>,
    #[serde(rename = "Rev CAGR (%)", default, skip_serializing_if = "Option::is_none")]
    pub revenue_cagr_pct: Option<f64>,
    #[serde(rename = "FCF (Cr)", default, skip_serializing_if = "Option::is_none")]
    pub free_cash_flow_cr: Option<f64>,
    #[serde(rename = "FII (%)", default, skip_serializing_if = "Option::is_none")]
    pub fii_pct: Option<f64>,
    #[serde(rename = "DII (%)", default, skip_serializing_if = "Option::is_none")]
    pub dii_pct: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Scores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_notes: Option<AiNotes>,
}

/// Sub-scores on a 0–100 scale feeding the composite score.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Scores {
    #[serde(rename = "dcf_score", default, skip_serializing_if = "Option::is_none")]
    pub dcf: Option<f64>,
    #[serde(rename = "growth_score", default, skip_serializing_if = "Option::is_none")]
    pub growth: Option<f64>,
    #[serde(rename = "roce_score", default, skip_serializing_if = "Option::is_none")]
    pub roce: Option<f64>,
    #[serde(rename = "moat_score", default, skip_serializing_if = "Option::is_none")]
    pub moat: Option<f64>,
    #[serde(rename = "fii_dii_de_score", default, skip_serializing_if = "Option::is_none")]
    pub fii_dii_de: Option<f64>,
    #[serde(rename = "tailwind_score", default, skip_serializing_if = "Option::is_none")]
    pub tailwind: Option<f64>,
    #[serde(rename = "management_score", default, skip_serializing_if = "Option::is_none")]
    pub management: Option<f64>,
}

/// Qualitative commentary: older datasets carry a single notes string,
/// newer ones split it into a growth thesis and a moat analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AiNotes {
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        growth_thesis: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        moat_analysis: Option<String>,
    },
    Text(String),
}

// ── Resolve-default helpers ───────────────────────────────────────────────────

/// `None` for absent, blank or sentinel text.
pub fn present_text(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(MISSING_SENTINEL))
}

fn or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

impl StockRecord {
    pub fn weight(&self) -> f64 {
        or_zero(self.portfolio_weight)
    }

    pub fn is_held(&self) -> bool {
        self.weight() > 0.0
    }

    pub fn score(&self) -> f64 {
        or_zero(self.final_score)
    }

    pub fn pe(&self) -> f64 {
        or_zero(self.pe_ratio)
    }

    pub fn pb(&self) -> f64 {
        or_zero(self.pb_ratio)
    }

    pub fn revenue_cagr(&self) -> f64 {
        or_zero(self.revenue_cagr_pct)
    }

    pub fn roce(&self) -> f64 {
        or_zero(self.roce_pct)
    }

    pub fn de(&self) -> f64 {
        or_zero(self.debt_equity)
    }

    pub fn fii(&self) -> f64 {
        or_zero(self.fii_pct)
    }

    pub fn dii(&self) -> f64 {
        or_zero(self.dii_pct)
    }

    /// FII + DII holding, in percent.
    pub fn institutional_stake(&self) -> f64 {
        self.fii() + self.dii()
    }

    pub fn fcf(&self) -> f64 {
        or_zero(self.free_cash_flow_cr)
    }

    pub fn price(&self) -> f64 {
        or_zero(self.current_price)
    }

    pub fn intrinsic_price(&self) -> f64 {
        or_zero(self.intrinsic_price_per_share)
    }

    pub fn sub_scores(&self) -> Scores {
        self.scores.clone().unwrap_or_default()
    }

    pub fn broad_sector_label(&self) -> &str {
        present_text(self.broad_sector.as_deref()).unwrap_or(FALLBACK_SECTOR)
    }

    pub fn sector_label(&self) -> &str {
        present_text(self.sector.as_deref()).unwrap_or(FALLBACK_SECTOR)
    }

    pub fn industry_label(&self) -> &str {
        present_text(self.industry.as_deref()).unwrap_or(FALLBACK_SECTOR)
    }

    pub fn company_name(&self) -> Option<&str> {
        present_text(self.company_name.as_deref())
    }

    /// Company name, or the symbol when the name is missing.
    pub fn display_name(&self) -> &str {
        self.company_name().unwrap_or(&self.symbol)
    }

    pub fn about_text(&self) -> Option<&str> {
        present_text(self.about.as_deref())
    }

    pub fn growth_thesis(&self) -> &str {
        self.ai_notes
            .as_ref()
            .and_then(AiNotes::growth_thesis)
            .unwrap_or(GROWTH_THESIS_PLACEHOLDER)
    }

    pub fn moat_analysis(&self) -> &str {
        self.ai_notes
            .as_ref()
            .and_then(AiNotes::moat_analysis)
            .unwrap_or(MOAT_ANALYSIS_PLACEHOLDER)
    }
}

impl Scores {
    pub fn dcf(&self) -> f64 {
        or_zero(self.dcf)
    }
    pub fn growth(&self) -> f64 {
        or_zero(self.growth)
    }
    pub fn roce(&self) -> f64 {
        or_zero(self.roce)
    }
    pub fn moat(&self) -> f64 {
        or_zero(self.moat)
    }
    pub fn fii_dii_de(&self) -> f64 {
        or_zero(self.fii_dii_de)
    }
    pub fn tailwind(&self) -> f64 {
        or_zero(self.tailwind)
    }
    pub fn management(&self) -> f64 {
        or_zero(self.management)
    }
}

impl AiNotes {
    pub fn growth_thesis(&self) -> Option<&str> {
        match self {
            AiNotes::Structured { growth_thesis, .. } => present_text(growth_thesis.as_deref()),
            AiNotes::Text(_) => None,
        }
    }

    pub fn moat_analysis(&self) -> Option<&str> {
        match self {
            AiNotes::Structured { moat_analysis, .. } => present_text(moat_analysis.as_deref()),
            AiNotes::Text(_) => None,
        }
    }

    /// Free-form notes, when the dataset carries them as a single string.
    pub fn summary(&self) -> Option<&str> {
        match self {
            AiNotes::Text(s) => present_text(Some(s)),
            AiNotes::Structured { .. } => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_keys() {
        let json = r#"{
            "symbol": "TCS",
            "Company Name": "Tata Consultancy Services",
            "Sector": "IT - Software",
            "Broad Sector": "Technology",
            "Current Price": 3850.5,
            "Intrinsic Price Per Share": 4100.0,
            "ROCE (%)": 64.3,
            "PE": 29.1,
            "PB": 14.2,
            "D/E": 0.1,
            "Rev CAGR (%)": 11.2,
            "FCF (Cr)": 41000.0,
            "FII (%)": 12.4,
            "DII (%)": 10.9,
            "scores": { "dcf_score": 40.0, "moat_score": 82.5 },
            "final_score": 61.37,
            "portfolio_weight": 0.0412,
            "ai_notes": { "growth_thesis": "Deal wins in BFSI." }
        }"#;
        let r: StockRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.symbol, "TCS");
        assert_eq!(r.pe(), 29.1);
        assert_eq!(r.revenue_cagr(), 11.2);
        assert_eq!(r.weight(), 0.0412);
        assert_eq!(r.sub_scores().moat(), 82.5);
        assert_eq!(r.sub_scores().growth(), 0.0);
        assert_eq!(r.growth_thesis(), "Deal wins in BFSI.");
        assert_eq!(r.moat_analysis(), MOAT_ANALYSIS_PLACEHOLDER);
        assert!((r.institutional_stake() - 23.3).abs() < 1e-9);
    }

    #[test]
    fn test_missing_fields_resolve_to_defaults() {
        let r: StockRecord = serde_json::from_str(r#"{ "symbol": "XYZ" }"#).unwrap();
        assert_eq!(r.weight(), 0.0);
        assert!(!r.is_held());
        assert_eq!(r.broad_sector_label(), "Others");
        assert_eq!(r.display_name(), "XYZ");
        assert_eq!(r.growth_thesis(), GROWTH_THESIS_PLACEHOLDER);
        assert_eq!(r.sub_scores(), Scores::default());
    }

    #[test]
    fn test_sentinel_text_is_missing() {
        let r: StockRecord = serde_json::from_str(
            r#"{ "symbol": "ABC", "Company Name": "values missing", "About": "  " }"#,
        )
        .unwrap();
        assert_eq!(r.company_name(), None);
        assert_eq!(r.display_name(), "ABC");
        assert_eq!(r.about_text(), None);
    }

    #[test]
    fn test_text_notes() {
        let r: StockRecord =
            serde_json::from_str(r#"{ "symbol": "ABC", "ai_notes": "Cyclical, watch margins." }"#)
                .unwrap();
        let notes = r.ai_notes.as_ref().unwrap();
        assert_eq!(notes.summary(), Some("Cyclical, watch margins."));
        assert_eq!(r.growth_thesis(), GROWTH_THESIS_PLACEHOLDER);
    }

    #[test]
    fn test_null_numbers_are_absent() {
        let r: StockRecord =
            serde_json::from_str(r#"{ "symbol": "N", "PE": null, "portfolio_weight": null }"#)
                .unwrap();
        assert_eq!(r.pe(), 0.0);
        assert_eq!(r.weight(), 0.0);
    }
}
