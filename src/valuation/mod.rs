//! Relative-value classification and the discounted cash flow model.

use crate::config::DcfConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValuationStatus {
    Undervalued,
    Premium,
    /// No usable intrinsic price.
    Neutral,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Valuation {
    pub status: ValuationStatus,
    /// Non-negative distance from intrinsic price, in percent.
    pub magnitude_pct: f64,
}

impl Valuation {
    pub const NEUTRAL: Valuation = Valuation {
        status: ValuationStatus::Neutral,
        magnitude_pct: 0.0,
    };

    /// Positive for a premium, negative for a discount.
    pub fn signed_pct(&self) -> f64 {
        match self.status {
            ValuationStatus::Premium => self.magnitude_pct,
            ValuationStatus::Undervalued => -self.magnitude_pct,
            ValuationStatus::Neutral => 0.0,
        }
    }

    /// "+12.3% PREM" / "8.1% DISC" as shown in the ranking table.
    pub fn label(&self) -> String {
        match self.status {
            ValuationStatus::Premium if self.magnitude_pct > 0.0 => {
                format!("+{:.1}% PREM", self.magnitude_pct)
            }
            _ => format!("{:.1}% DISC", self.magnitude_pct),
        }
    }
}

/// Classify `current` against `intrinsic`. Equal prices fall on the premium side.
pub fn classify(current: f64, intrinsic: Option<f64>) -> Valuation {
    let intrinsic = match intrinsic {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => return Valuation::NEUTRAL,
    };

    if intrinsic > current {
        Valuation {
            status: ValuationStatus::Undervalued,
            magnitude_pct: 100.0 * (1.0 - current / intrinsic),
        }
    } else {
        Valuation {
            status: ValuationStatus::Premium,
            magnitude_pct: 100.0 * (current / intrinsic - 1.0),
        }
    }
}

// ── DCF ───────────────────────────────────────────────────────────────────────

/// Initial growth for the DCF: revenue CAGR as a fraction, or the default.
pub fn growth_for(revenue_cagr_pct: f64, cfg: &DcfConfig) -> f64 {
    if revenue_cagr_pct > 0.0 {
        revenue_cagr_pct / 100.0
    } else {
        cfg.default_growth
    }
}

/// Intrinsic value (same unit as `fcf`) with decaying growth and a terminal value.
///
/// Growth is capped at `max_growth` and shrinks by `growth_decay` every year.
/// Year `i` (1-based) is discounted by `(1 + r)^i`; the terminal value by
/// `(1 + r)^years`.
pub fn calculate_dcf(fcf: f64, growth: f64, cfg: &DcfConfig) -> f64 {
    if fcf <= 0.0 || cfg.years == 0 {
        return 0.0;
    }

    let r = cfg.discount_rate;
    let g_terminal = cfg.terminal_growth;
    let mut working_growth = growth.min(cfg.max_growth);
    let mut current = fcf;
    let mut discounted = 0.0;

    for i in 1..=cfg.years {
        current *= 1.0 + working_growth;
        discounted += current / (1.0 + r).powi(i as i32);
        working_growth *= cfg.growth_decay;
    }

    let terminal = current * (1.0 + g_terminal) / (r - g_terminal);
    discounted + terminal / (1.0 + r).powi(cfg.years as i32)
}

/// Round half away from zero to `dp` decimal places.
pub fn round_to(value: f64, dp: i32) -> f64 {
    let f = 10f64.powi(dp);
    (value * f).round() / f
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_equal_prices_are_premium() {
        let v = classify(100.0, Some(100.0));
        assert_eq!(v.status, ValuationStatus::Premium);
        assert_eq!(v.magnitude_pct, 0.0);
        assert_eq!(v.label(), "0.0% DISC");
    }

    #[test]
    fn test_zero_or_missing_intrinsic_is_neutral() {
        assert_eq!(classify(50.0, Some(0.0)), Valuation::NEUTRAL);
        assert_eq!(classify(50.0, Some(-3.0)), Valuation::NEUTRAL);
        assert_eq!(classify(50.0, None), Valuation::NEUTRAL);
        assert_eq!(classify(50.0, Some(f64::NAN)), Valuation::NEUTRAL);
    }

    #[test]
    fn test_undervalued_and_premium_magnitudes() {
        let under = classify(80.0, Some(100.0));
        assert_eq!(under.status, ValuationStatus::Undervalued);
        assert!(close(under.magnitude_pct, 20.0));
        assert!(close(under.signed_pct(), -20.0));

        let prem = classify(150.0, Some(100.0));
        assert_eq!(prem.status, ValuationStatus::Premium);
        assert!(close(prem.magnitude_pct, 50.0));
        assert_eq!(prem.label(), "+50.0% PREM");
    }

    #[test]
    fn test_dcf_non_positive_fcf() {
        let cfg = DcfConfig::default();
        assert_eq!(calculate_dcf(0.0, 0.1, &cfg), 0.0);
        assert_eq!(calculate_dcf(-120.0, 0.1, &cfg), 0.0);
    }

    #[test]
    fn test_dcf_zero_growth() {
        // No growth: every year FCF stays at 100.
        let cfg = DcfConfig::default();
        let expected: f64 = (1..=10).map(|i| 100.0 / 1.18f64.powi(i)).sum::<f64>()
            + 100.0 * 1.015 / (0.18 - 0.015) / 1.18f64.powi(10);
        assert!(close(calculate_dcf(100.0, 0.0, &cfg), expected));
    }

    #[test]
    fn test_dcf_first_year_discounted_once() {
        let cfg = DcfConfig::default();
        assert!((calculate_dcf(100.0, 0.0, &cfg) - 566.9422).abs() < 1e-3);

        let one_year = DcfConfig { years: 1, ..cfg };
        let expected = 100.0 / 1.18 + 100.0 * 1.015 / 0.165 / 1.18;
        assert!(close(calculate_dcf(100.0, 0.0, &one_year), expected));
    }

    #[test]
    fn test_dcf_growth_is_capped() {
        let cfg = DcfConfig::default();
        assert!(close(
            calculate_dcf(100.0, 0.60, &cfg),
            calculate_dcf(100.0, 0.25, &cfg)
        ));
        assert!(calculate_dcf(100.0, 0.20, &cfg) < calculate_dcf(100.0, 0.25, &cfg));
    }

    #[test]
    fn test_growth_for() {
        let cfg = DcfConfig::default();
        assert!(close(growth_for(12.0, &cfg), 0.12));
        assert!(close(growth_for(0.0, &cfg), 0.05));
        assert!(close(growth_for(-4.0, &cfg), 0.05));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(61.37499, 2), 61.37);
        assert_eq!(round_to(0.123456, 4), 0.1235);
    }
}
