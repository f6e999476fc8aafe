#![deny(warnings)]

//! Headless CLI: runs one policy scenario and prints the headline numbers.

use agri_core::{CropCatalog, CropSelection};
use agri_models::trajectory::SufficiencyOutcome;
use agri_runtime::{run_scenario, ScenarioConfig};
use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: agri-sim [--scenario FILE] [--crop ID|all] [--growth PCT] \
[--budget AMOUNT] [--investment stagnation|pniasan|vision-2040] [--json] [--list] [--version]";

#[derive(Debug, Default)]
struct Args {
    scenario: Option<PathBuf>,
    crop: Option<String>,
    growth: Option<f64>,
    budget: Option<Decimal>,
    investment: Option<String>,
    json: bool,
    list: bool,
    version: bool,
}

fn value<T>(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = it
        .next()
        .with_context(|| format!("{flag} expects a value"))?;
    match raw.parse() {
        Ok(v) => Ok(v),
        Err(e) => bail!("invalid value for {flag}: {raw:?} ({e})"),
    }
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = Some(value(&mut it, "--scenario")?),
            "--crop" => args.crop = Some(value(&mut it, "--crop")?),
            "--growth" => args.growth = Some(value(&mut it, "--growth")?),
            "--budget" => args.budget = Some(value(&mut it, "--budget")?),
            "--investment" => args.investment = Some(value(&mut it, "--investment")?),
            "--json" => args.json = true,
            "--list" => args.list = true,
            "--version" => args.version = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument {other:?}\n{USAGE}"),
        }
    }
    Ok(args)
}

fn scenario_from(args: &Args) -> Result<ScenarioConfig> {
    let mut cfg = match &args.scenario {
        Some(path) => ScenarioConfig::load(path)?,
        None => ScenarioConfig::default(),
    };
    if let Some(crop) = &args.crop {
        cfg.crop = crop.parse()?;
    }
    if let Some(growth) = args.growth {
        cfg.growth_rate_pct = growth;
    }
    if let Some(total) = args.budget {
        cfg.budget.total = total;
    }
    if let Some(investment) = &args.investment {
        cfg.investment = investment.parse()?;
    }
    Ok(cfg)
}

fn print_catalog(catalog: &CropCatalog, json: bool) -> Result<()> {
    let mut rows = Vec::new();
    for id in catalog.list_ids() {
        rows.push(catalog.profile(id)?.clone());
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for p in &rows {
        println!(
            "{:<8} | baseline: {:>10.0} T | 2040 target: {:>10.0} T | imports: {:.0}% | ROI: {} T/unit",
            p.id,
            p.data.baseline_production,
            p.data.target_2040,
            p.data.import_dependency_pct(),
            p.data.roi_coefficient
        );
    }
    let agg = catalog.get_aggregate();
    println!(
        "{:<8} | baseline: {:>10.0} T | 2040 target: {:>10.0} T | imports: {:.0}% | ROI: {} T/unit",
        CropSelection::All,
        agg.data.baseline_production,
        agg.data.target_2040,
        agg.data.import_dependency_pct(),
        agg.data.roi_coefficient
    );
    Ok(())
}

fn log_subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    log_subscriber(filter).init();

    let args = parse_args()?;
    if args.version {
        println!(
            "agri-sim {} ({} built {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }

    let catalog = CropCatalog::builtin();
    if args.list {
        return print_catalog(&catalog, args.json);
    }

    let cfg = scenario_from(&args)?;
    info!(crop = %cfg.crop, investment = ?cfg.investment, "running scenario");
    let report = run_scenario(&catalog, &cfg)?;

    if args.json {
        println!("{}", report.to_json_pretty()?);
        return Ok(());
    }

    println!(
        "Crop {} | baseline: {:.0} T | 2040 target: {:.0} T | imports: {:.0}% | required growth: {:.2}%/yr",
        report.crop,
        report.baseline.baseline_production,
        report.baseline.target_2040,
        report.indicators.import_dependency_pct,
        report.indicators.required_growth_rate_pct
    );
    println!(
        "Yield | multiplier: {:.2} | projected: {:.0} T | change: {:+.0}% | alerts: {:?}",
        report.yield_projection.multiplier,
        report.yield_projection.projected_production,
        report.yield_projection.yield_change_pct,
        report.yield_projection.alerts
    );
    if let Some(e) = &report.ensemble {
        println!(
            "Rainfall ensemble | n: {} | p10: {:.0} T | mean: {:.0} T | p90: {:.0} T | drought draws: {:.1}%",
            e.samples,
            e.p10,
            e.mean,
            e.p90,
            e.drought_alert_share * 100.0
        );
    }
    match &report.trajectory.outcome {
        SufficiencyOutcome::SelfSufficient { year, .. } => {
            println!("Trajectory | self-sufficient in {year} at {:.1}%/yr", cfg.growth_rate_pct)
        }
        SufficiencyOutcome::Deficit { gap_tonnes } => println!(
            "Trajectory | deficit of {gap_tonnes:.0} T in {} at {:.1}%/yr",
            report.trajectory.years.last().copied().unwrap_or_default(),
            cfg.growth_rate_pct
        ),
    }
    let b = &report.budget;
    println!(
        "Budget | seed: {} | fertilizer: {} | mechanization: {} | gain: +{} T ({:.1}%) | FX saved: ${} | efficiency: {:.2}x",
        b.allocation.seed,
        b.allocation.fertilizer,
        b.allocation.mechanization,
        b.gain_tonnes.round(),
        report.gain_share_of_baseline.unwrap_or(0.0) * 100.0,
        b.fx_savings_usd.round(),
        b.capital_efficiency.round_dp(2)
    );
    let l = &report.post_harvest;
    println!(
        "Post-harvest | lost: {:.0} T | recoverable: {:.0} T | available: {:.0} T",
        l.lost_tonnes, l.recoverable_tonnes, l.available_tonnes
    );
    for r in &report.regions {
        println!(
            "Region {:<14} | production: {:>10.0} T | efficiency: {:.0}/100",
            r.region.name(),
            r.production,
            r.efficiency_score
        );
    }
    Ok(())
}
