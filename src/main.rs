//! Returns Engine CLI
//!
//! Runs deposit projections and fund return metrics from the command line,
//! printing JSON. This is the only place that reads the wall clock; pass
//! `--as-of` to value at a fixed date.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;

use returns_engine::deposits::{calculate_ppf, project, project_recurring, DepositForm, PpfYear};
use returns_engine::investment::{
    fiscal_year_ledger, generate_installments, FiscalYearActivity, Installment, Investment, PortfolioSnapshot,
};
use returns_engine::metrics::{
    compute_metrics, compute_portfolio_metrics, fund_metrics, holding_period, scheme_returns, FundHoldings,
    FundMetrics, ReturnMetrics,
};
use returns_engine::nav::{load_nav, NavSeries};
use returns_engine::EngineConfig;

/// Deposit projections and mutual fund returns
#[derive(Parser)]
#[command(name = "returns-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Valuation date (YYYY-MM-DD), defaults to today
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// JSON engine config; omitted fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a fixed deposit by fiscal year
    Fd(DepositArgs),

    /// Project a recurring deposit by fiscal year
    Rd(DepositArgs),

    /// Build a 15-year PPF schedule
    Ppf(PpfArgs),

    /// Metrics and installment history for one fund
    Fund(FundArgs),

    /// Metrics across every fund in a portfolio
    Portfolio(PortfolioArgs),

    /// Trailing returns of a scheme's NAV
    SchemeReturns(SchemeReturnsArgs),
}

#[derive(Args)]
struct DepositArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start_date: String,

    /// Principal for an FD, monthly installment for an RD
    #[arg(long)]
    amount: String,

    /// Annual rate in percent
    #[arg(long)]
    rate: String,

    #[arg(long, default_value = "0")]
    years: String,

    #[arg(long, default_value = "0")]
    months: String,

    #[arg(long, default_value = "0")]
    days: String,

    /// monthly, quarterly, halfYearly or annually
    #[arg(long, default_value = "")]
    compounding: String,
}

impl DepositArgs {
    fn form(&self) -> DepositForm {
        DepositForm {
            start_date: self.start_date.clone(),
            amount: self.amount.clone(),
            rate: self.rate.clone(),
            tenure_years: self.years.clone(),
            tenure_months: self.months.clone(),
            tenure_days: self.days.clone(),
            compounding: self.compounding.clone(),
        }
    }
}

#[derive(Args)]
struct PpfArgs {
    /// Fiscal year the account was opened (2023 for FY 2023-24)
    #[arg(long)]
    start_year: i32,

    /// Default annual rate in percent
    #[arg(long, default_value_t = 7.1)]
    rate: f64,

    /// JSON file with per-year contributions and rate overrides
    #[arg(long)]
    contributions: Option<PathBuf>,
}

#[derive(Args)]
struct FundArgs {
    /// JSON array of investments
    #[arg(long)]
    investments: PathBuf,

    /// NAV history (CSV, or scheme history JSON)
    #[arg(long)]
    nav: PathBuf,
}

#[derive(Args)]
struct PortfolioArgs {
    /// JSON portfolio snapshot (investments keyed by scheme code)
    #[arg(long)]
    holdings: PathBuf,

    /// Directory with one `<scheme_code>.json` or `<scheme_code>.csv` per fund
    #[arg(long)]
    nav_dir: PathBuf,
}

#[derive(Args)]
struct SchemeReturnsArgs {
    #[arg(long)]
    nav: PathBuf,
}

#[derive(Serialize)]
struct FundReport {
    metrics: ReturnMetrics,
    holding_period: String,
    installments: Vec<Installment>,
    fiscal_years: Vec<FiscalYearActivity>,
}

#[derive(Serialize)]
struct PortfolioReport {
    portfolio: ReturnMetrics,
    funds: Vec<FundMetrics>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let as_of = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    info!("valuing as of {}", as_of);

    match cli.command {
        Commands::Fd(args) => {
            let terms = args.form().to_fixed().context("invalid fixed deposit")?;
            print_json(&project(&terms)?)
        }
        Commands::Rd(args) => {
            let terms = args.form().to_recurring().context("invalid recurring deposit")?;
            print_json(&project_recurring(&terms)?)
        }
        Commands::Ppf(args) => {
            let years: Vec<PpfYear> = match &args.contributions {
                Some(path) => read_json(path)?,
                None => Vec::new(),
            };
            print_json(&calculate_ppf(args.start_year, args.rate, &years)?)
        }
        Commands::Fund(args) => run_fund(&args, as_of, &config),
        Commands::Portfolio(args) => run_portfolio(&args, as_of, &config),
        Commands::SchemeReturns(args) => {
            let navs = load_nav_file(&args.nav)?;
            print_json(&scheme_returns(&navs, as_of, &config.timeframes))
        }
    }
}

fn run_fund(args: &FundArgs, as_of: NaiveDate, config: &EngineConfig) -> Result<()> {
    let investments: Vec<Investment> = read_json(&args.investments)?;
    for investment in &investments {
        investment
            .validate()
            .with_context(|| format!("invalid investment {}", investment.id()))?;
    }
    let navs = load_nav_file(&args.nav)?;

    print_json(&FundReport {
        metrics: compute_metrics(&investments, &navs, as_of, config),
        holding_period: holding_period(&investments, as_of).to_string(),
        installments: generate_installments(&investments, &navs, as_of),
        fiscal_years: fiscal_year_ledger(&investments, &navs, as_of),
    })
}

fn run_portfolio(args: &PortfolioArgs, as_of: NaiveDate, config: &EngineConfig) -> Result<()> {
    let snapshot: PortfolioSnapshot = read_json(&args.holdings)?;
    for code in snapshot.scheme_codes() {
        for investment in snapshot.investments(code) {
            investment
                .validate()
                .with_context(|| format!("invalid investment {} in scheme {}", investment.id(), code))?;
        }
    }

    let funds = snapshot
        .scheme_codes()
        .map(|code| {
            let navs = find_scheme_nav(&args.nav_dir, code)?;
            Ok(FundHoldings::new(code, snapshot.investments(code).to_vec(), navs))
        })
        .collect::<Result<Vec<_>>>()?;

    print_json(&PortfolioReport {
        portfolio: compute_portfolio_metrics(&funds, as_of, config),
        funds: fund_metrics(&funds, as_of, config),
    })
}

/// NAV history for `scheme_code` from `dir`; a fund without a file gets an
/// empty series
fn find_scheme_nav(dir: &Path, scheme_code: u32) -> Result<NavSeries> {
    for ext in ["json", "csv"] {
        let path = dir.join(format!("{}.{}", scheme_code, ext));
        if path.exists() {
            return load_nav_file(&path);
        }
    }
    warn!("no NAV history for scheme {} in {}", scheme_code, dir.display());
    Ok(NavSeries::default())
}

fn load_nav_file(path: &Path) -> Result<NavSeries> {
    load_nav(path).with_context(|| format!("failed to load NAV history from {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
