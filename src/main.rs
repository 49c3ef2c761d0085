mod config;
mod loader;
mod models;
mod portfolio;
mod scoring;
mod utils;
mod valuation;
mod views;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::loader::{JsonFileSource, StockSource};
use crate::models::StockRecord;
use crate::scoring::{rescore, RescoreOptions};
use crate::views::{
    DashboardView, InsightView, PortfolioView, RankingView, Render, Route,
};

#[derive(Parser)]
#[command(name = "quant-dash", about = "Quant stock analysis dashboard", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to stockData.json (overrides config `data.path`)
    #[arg(short, long, global = true, env = "QUANT_DATA")]
    data: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Headline summary: top conviction, average score, sector exposure
    Dashboard {
        #[arg(long)]
        json: bool,
    },

    /// Held positions with weighted ratios and Sharpe/Sortino proxies
    Portfolio {
        #[arg(long)]
        json: bool,
    },

    /// Every analysed symbol ranked by final score
    Rankings {
        /// Show only the first N rows
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(long, conflicts_with = "csv")]
        json: bool,

        #[arg(long)]
        csv: bool,
    },

    /// Deep dive into a single symbol (first record when omitted)
    Insights {
        #[arg(short, long)]
        symbol: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Open a dashboard route, e.g. `/insights?symbol=TCS`
    Open {
        route: String,

        #[arg(long)]
        json: bool,
    },

    /// Re-run DCF, scoring and allocation; prints the rescored dataset as JSON
    Rescore {
        /// Also recompute ROCE and FII/DII/DE sub-scores from fundamentals
        #[arg(long)]
        refresh_fundamentals: bool,
    },

    /// Show the broad sector a sector label maps to
    Sector { name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "quant_dash=info,warn",
        1 => "quant_dash=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;
    if let Some(path) = cli.data {
        config.data.path = path;
    }

    match cli.command {
        Command::Dashboard { json } => show(Route::Dashboard, &config, json),
        Command::Portfolio { json } => show(Route::Portfolio, &config, json),
        Command::Insights { symbol, json } => show(Route::Insights { symbol }, &config, json),

        Command::Open { route, json } => {
            let route = Route::parse(&route)?;
            info!("Opening {}", route);
            show(route, &config, json)
        }

        Command::Rankings { limit, json, csv } => {
            let records = load(&config)?;
            let view = RankingView::build(&records, limit);
            if csv {
                view.write_csv(std::io::stdout().lock())
                    .context("Failed to write rankings CSV")?;
                Ok(())
            } else {
                emit(&view, &view, json)
            }
        }

        Command::Rescore {
            refresh_fundamentals,
        } => {
            let records = load(&config)?;
            let _t = utils::Timer::start("Rescore");
            let (records, stats) = rescore(
                records,
                &config,
                RescoreOptions {
                    refresh_fundamentals,
                },
            );
            println!("{}", serde_json::to_string_pretty(&records)?);
            info!(
                "Done: {} records, {} held ({})",
                stats.records,
                stats.held,
                utils::fmt_weight(stats.total_weight)
            );
            Ok(())
        }

        Command::Sector { name } => {
            println!("{} → {}", name, scoring::broad_sector(&name));
            Ok(())
        }
    }
}

fn load(config: &AppConfig) -> Result<Vec<StockRecord>> {
    let _t = utils::Timer::start("Load stock data");
    let source = JsonFileSource::new(&config.data.path);
    let records = source
        .load()
        .with_context(|| format!("Could not load stock data from {:?}", source.path()))?;
    Ok(records)
}

/// Render one page of the dashboard.
fn show(route: Route, config: &AppConfig, json: bool) -> Result<()> {
    let records = load(config)?;

    match route {
        Route::Dashboard => {
            let view = DashboardView::build(&records, chrono::Local::now().date_naive());
            emit(&view, &view, json)
        }
        Route::Portfolio => {
            let view = PortfolioView::build(&records, config);
            emit(&view, &view, json)
        }
        Route::Rankings => {
            let view = RankingView::build(&records, None);
            emit(&view, &view, json)
        }
        Route::Insights { symbol } => {
            let view = InsightView::open(&records, symbol.as_deref())?;
            emit(&view, &view.detail(), json)
        }
    }
}

fn emit<M: Serialize>(view: &impl Render, model: &M, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(model)?);
    } else {
        print!("{}", view.render());
    }
    Ok(())
}
