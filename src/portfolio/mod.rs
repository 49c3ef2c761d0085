//! Held-position selection and the aggregates shown on the portfolio page.
//!
//! Expected return and dispersion use revenue CAGR as the return proxy, so
//! Sharpe and Sortino here are ranking aids, not market-return ratios.

use crate::config::AnalyticsConfig;
use crate::models::StockRecord;
use serde::Serialize;

/// Percent, same unit as `Rev CAGR (%)`.
pub const RISK_FREE_RATE: f64 = 7.0;
/// Substituted when the weighted standard deviation comes out as zero.
pub const STD_DEV_FLOOR: f64 = 5.0;
/// Substituted when no holding grows below the risk-free rate.
pub const DOWNSIDE_DEV_FLOOR: f64 = 3.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PortfolioStats {
    pub weighted_pe: f64,
    pub weighted_pb: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub expected_return: f64,
    pub std_dev: f64,
    pub downside_dev: f64,
    pub total_weight: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SectorWeight {
    pub sector: String,
    pub weight: f64,
}

/// Held records, heaviest first. Ties keep input order.
pub fn select_portfolio(records: &[StockRecord]) -> Vec<&StockRecord> {
    let mut held: Vec<&StockRecord> = records.iter().filter(|r| r.is_held()).collect();
    held.sort_by(|a, b| b.weight().total_cmp(&a.weight()));
    held
}

/// Weighted valuation ratios and risk-adjusted return proxies.
///
/// Weights are divided by their sum, not assumed to add up to 1. Returns
/// `None` for an empty portfolio or one whose weights sum to zero.
pub fn compute_stats(portfolio: &[&StockRecord], cfg: &AnalyticsConfig) -> Option<PortfolioStats> {
    if portfolio.is_empty() {
        return None;
    }

    let total_weight: f64 = portfolio.iter().map(|r| r.weight()).sum();
    if total_weight <= 0.0 {
        return None;
    }

    let weighted = |f: fn(&StockRecord) -> f64| -> f64 {
        portfolio.iter().map(|r| f(*r) * r.weight()).sum::<f64>() / total_weight
    };

    let weighted_pe = weighted(StockRecord::pe);
    let weighted_pb = weighted(StockRecord::pb);
    let expected_return = weighted(StockRecord::revenue_cagr);

    let variance: f64 = portfolio
        .iter()
        .map(|r| r.weight() * (r.revenue_cagr() - expected_return).powi(2))
        .sum();
    let std_dev = floor_if_zero(variance.sqrt(), cfg.std_dev_floor);

    let rf = cfg.risk_free_rate;
    let downside_variance: f64 = portfolio
        .iter()
        .map(|r| r.weight() * (r.revenue_cagr() - rf).min(0.0).powi(2))
        .sum();
    let downside_dev = floor_if_zero(downside_variance.sqrt(), cfg.downside_dev_floor);

    Some(PortfolioStats {
        weighted_pe,
        weighted_pb,
        sharpe: (expected_return - rf) / std_dev,
        sortino: (expected_return - rf) / downside_dev,
        expected_return,
        std_dev,
        downside_dev,
        total_weight,
    })
}

fn floor_if_zero(value: f64, floor: f64) -> f64 {
    if value == 0.0 || !value.is_finite() { floor } else { value }
}

/// Sum of weights per broad sector, in order of first appearance.
pub fn aggregate_by_sector<'a, I>(records: I) -> Vec<SectorWeight>
where
    I: IntoIterator<Item = &'a StockRecord>,
{
    let mut sectors: Vec<SectorWeight> = Vec::new();
    for r in records {
        let label = r.broad_sector_label();
        match sectors.iter_mut().find(|s| s.sector == label) {
            Some(s) => s.weight += r.weight(),
            None => sectors.push(SectorWeight {
                sector: label.to_string(),
                weight: r.weight(),
            }),
        }
    }
    sectors
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(symbol: &str, weight: Option<f64>) -> StockRecord {
        StockRecord {
            symbol: symbol.to_string(),
            portfolio_weight: weight,
            ..Default::default()
        }
    }

    fn holding(symbol: &str, weight: f64, pe: f64, cagr: f64) -> StockRecord {
        StockRecord {
            pe_ratio: Some(pe),
            revenue_cagr_pct: Some(cagr),
            ..stock(symbol, Some(weight))
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_input() {
        assert!(select_portfolio(&[]).is_empty());
        assert!(compute_stats(&[], &AnalyticsConfig::default()).is_none());
    }

    #[test]
    fn test_select_filters_and_sorts() {
        let records = vec![
            stock("A", Some(0.1)),
            stock("B", None),
            stock("C", Some(0.0)),
            stock("D", Some(0.4)),
            stock("E", Some(-0.2)),
            stock("F", Some(0.1)),
            stock("G", Some(0.25)),
        ];
        let held: Vec<_> = select_portfolio(&records).iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(held, ["D", "G", "A", "F"]);
    }

    #[test]
    fn test_select_output_is_non_increasing() {
        let records: Vec<_> = [0.02, 0.3, 0.0, 0.11, 0.3, 0.05]
            .iter()
            .enumerate()
            .map(|(i, w)| stock(&format!("S{i}"), Some(*w)))
            .collect();
        let held = select_portfolio(&records);
        assert_eq!(held.len(), 5);
        assert!(held.windows(2).all(|w| w[0].weight() >= w[1].weight()));
    }

    #[test]
    fn test_stats_weighted_averages() {
        let records = vec![holding("A", 0.6, 20.0, 15.0), holding("B", 0.4, 10.0, 5.0)];
        let portfolio = select_portfolio(&records);
        let stats = compute_stats(&portfolio, &AnalyticsConfig::default()).unwrap();

        assert!(close(stats.weighted_pe, 16.0));
        assert!(close(stats.expected_return, 11.0));
        // 0.6·4² + 0.4·6² = 24
        assert!(close(stats.std_dev, 24f64.sqrt()));
        assert!(close(stats.sharpe, 4.0 / 24f64.sqrt()));
        // only B is below rf: 0.4·(5 − 7)² = 1.6
        assert!(close(stats.downside_dev, 1.6f64.sqrt()));
        assert!(close(stats.sortino, 4.0 / 1.6f64.sqrt()));
        assert_eq!(stats.weighted_pb, 0.0);
    }

    #[test]
    fn test_stats_divide_by_total_weight() {
        let records = vec![holding("A", 0.3, 20.0, 10.0), holding("B", 0.1, 40.0, 10.0)];
        let portfolio = select_portfolio(&records);
        let stats = compute_stats(&portfolio, &AnalyticsConfig::default()).unwrap();
        assert!(close(stats.total_weight, 0.4));
        assert!(close(stats.weighted_pe, 25.0));
    }

    #[test]
    fn test_zero_variance_floors() {
        let records = vec![holding("A", 0.5, 20.0, 12.0), holding("B", 0.5, 10.0, 12.0)];
        let portfolio = select_portfolio(&records);
        let stats = compute_stats(&portfolio, &AnalyticsConfig::default()).unwrap();

        assert_eq!(stats.std_dev, 5.0);
        assert!(close(stats.sharpe, (12.0 - 7.0) / 5.0));
        assert_eq!(stats.downside_dev, 3.0);
        assert!(close(stats.sortino, (12.0 - 7.0) / 3.0));
    }

    #[test]
    fn test_zero_total_weight_has_no_stats() {
        let records = vec![stock("A", Some(0.0))];
        let refs: Vec<&StockRecord> = records.iter().collect();
        assert!(compute_stats(&refs, &AnalyticsConfig::default()).is_none());
    }

    #[test]
    fn test_sector_totals_match_weights() {
        let mut records = vec![
            stock("A", Some(0.2)),
            stock("B", Some(0.15)),
            stock("C", None),
            stock("D", Some(0.05)),
        ];
        records[0].broad_sector = Some("Finance".into());
        records[1].broad_sector = Some("Technology".into());
        records[3].broad_sector = Some("Finance".into());

        let sectors = aggregate_by_sector(&records);
        let total: f64 = sectors.iter().map(|s| s.weight).sum();
        let expected: f64 = records.iter().map(|r| r.weight()).sum();
        assert!(close(total, expected));

        let names: Vec<_> = sectors.iter().map(|s| s.sector.as_str()).collect();
        assert_eq!(names, ["Finance", "Technology", "Others"]);
        assert!(close(sectors[0].weight, 0.25));
        assert_eq!(sectors[2].weight, 0.0);
    }
}
