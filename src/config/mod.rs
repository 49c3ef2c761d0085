use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
    #[serde(default)]
    pub dcf: DcfConfig,
}

/// Where the precomputed analysis lives
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

/// Portfolio statistics constants
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    /// Percent units, same scale as revenue CAGR.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    #[serde(default = "default_std_dev_floor")]
    pub std_dev_floor: f64,

    #[serde(default = "default_downside_dev_floor")]
    pub downside_dev_floor: f64,
}

/// Portfolio optimizer filters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AllocationConfig {
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    /// Fraction above intrinsic price still accepted (0.15 = 15% premium).
    #[serde(default = "default_max_overvaluation")]
    pub max_overvaluation: f64,

    #[serde(default = "default_max_positions")]
    pub max_positions: usize,
}

/// Discounted cash flow model parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DcfConfig {
    #[serde(default = "default_growth")]
    pub default_growth: f64,

    #[serde(default = "default_max_growth")]
    pub max_growth: f64,

    #[serde(default = "default_growth_decay")]
    pub growth_decay: f64,

    #[serde(default = "default_terminal_growth")]
    pub terminal_growth: f64,

    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,

    #[serde(default = "default_years")]
    pub years: u32,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_data_path() -> PathBuf {
    PathBuf::from("data/stockData.json")
}
fn default_risk_free_rate() -> f64 {
    crate::portfolio::RISK_FREE_RATE
}
fn default_std_dev_floor() -> f64 {
    crate::portfolio::STD_DEV_FLOOR
}
fn default_downside_dev_floor() -> f64 {
    crate::portfolio::DOWNSIDE_DEV_FLOOR
}
fn default_min_score() -> f64 {
    45.0
}
fn default_max_overvaluation() -> f64 {
    0.15
}
fn default_max_positions() -> usize {
    50
}
fn default_growth() -> f64 {
    0.05
}
fn default_max_growth() -> f64 {
    0.25
}
fn default_growth_decay() -> f64 {
    0.9
}
fn default_terminal_growth() -> f64 {
    0.015
}
fn default_discount_rate() -> f64 {
    0.18
}
fn default_years() -> u32 {
    10
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { path: default_data_path() }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            std_dev_floor: default_std_dev_floor(),
            downside_dev_floor: default_downside_dev_floor(),
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_overvaluation: default_max_overvaluation(),
            max_positions: default_max_positions(),
        }
    }
}

impl Default for DcfConfig {
    fn default() -> Self {
        Self {
            default_growth: default_growth(),
            max_growth: default_max_growth(),
            growth_decay: default_growth_decay(),
            terminal_growth: default_terminal_growth(),
            discount_rate: default_discount_rate(),
            years: default_years(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("QUANT").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Invalid configuration ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dashboard_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data.path, PathBuf::from("data/stockData.json"));
        assert_eq!(cfg.analytics.risk_free_rate, 7.0);
        assert_eq!(cfg.analytics.std_dev_floor, 5.0);
        assert_eq!(cfg.analytics.downside_dev_floor, 3.0);
        assert_eq!(cfg.allocation.max_positions, 50);
        assert_eq!(cfg.dcf.years, 10);
    }

    #[test]
    fn test_partial_sections_fill_in_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{ "analytics": { "risk_free_rate": 6.5 } }"#).unwrap();
        assert_eq!(cfg.analytics.risk_free_rate, 6.5);
        assert_eq!(cfg.analytics.std_dev_floor, 5.0);
        assert_eq!(cfg.allocation.min_score, 45.0);
    }
}
