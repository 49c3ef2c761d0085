//! Terminal renderings of the dashboard pages.
//!
//! Every view is built from the loaded records in one pass and can be printed
//! as text or serialised as a JSON view model.

pub mod dashboard;
pub mod insights;
pub mod portfolio;
pub mod rankings;
pub mod route;

use std::fmt::Write;
use thiserror::Error;

pub use dashboard::DashboardView;
pub use insights::InsightView;
pub use portfolio::PortfolioView;
pub use rankings::RankingView;
pub use route::Route;

/// Chart colours, assigned to series by index.
pub const PALETTE: [&str; 7] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4", "#f472b6",
];

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

const RULE_WIDTH: usize = 72;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Unknown route {0:?} (expected /, /portfolio, /rankings or /insights?symbol=…)")]
    UnknownRoute(String),

    #[error("Invalid route {input:?}")]
    InvalidRoute {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("No stock with symbol {0:?} in the dataset")]
    UnknownSymbol(String),
}

/// Text output for a view.
pub trait Render {
    fn render(&self) -> String;
}

pub(crate) fn rule(out: &mut String) {
    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
}

pub(crate) fn heading(out: &mut String, title: &str, subtitle: &str) {
    rule(out);
    let _ = writeln!(out, "  {}", title.to_uppercase());
    if !subtitle.is_empty() {
        let _ = writeln!(out, "  {}", subtitle);
    }
    rule(out);
}

/// Horizontal bar for a 0..=1 share.
pub(crate) fn bar(share: f64, width: usize) -> String {
    let filled = (share.clamp(0.0, 1.0) * width as f64).round() as usize;
    "█".repeat(filled)
}

/// Placeholder shown by every page when the dataset is empty.
pub fn render_no_data() -> String {
    let mut out = String::new();
    rule(&mut out);
    let _ = writeln!(out, "  No Analysis Data Found");
    let _ = writeln!(out, "  Please run the Quant Bot to generate stock intelligence.");
    rule(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_color(0), "#3b82f6");
        assert_eq!(palette_color(7), palette_color(0));
        assert_eq!(palette_color(9), "#f59e0b");
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.5, 10).chars().count(), 5);
        assert_eq!(bar(2.0, 4).chars().count(), 4);
        assert!(bar(0.0, 10).is_empty());
    }

    #[test]
    fn test_no_data_message() {
        assert!(render_no_data().contains("No Analysis Data Found"));
    }
}
