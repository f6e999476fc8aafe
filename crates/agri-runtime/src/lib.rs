#![deny(warnings)]

//! Scenario runtime: feeds one crop selection and a set of policy levers
//! through every model and collects the results into a single report.

pub mod config;

pub use config::{BudgetConfig, EnsembleConfig, LossConfig, ScenarioConfig};

use agri_core::{CropBaseline, CropCatalog, CropSelection, SimError};
use agri_econ::budget::{self, BudgetOutcome};
use agri_econ::regional::{self, InvestmentScenario, RegionalShare};
use agri_models::loss::{self, LossOutcome};
use agri_models::trajectory::{self, Horizon, Trajectory};
use agri_models::yield_model::{self, EnsembleSummary, SensitivityPoint, YieldProjection};
use serde::Serialize;
use tracing::{info, info_span};

/// Headline indicators derived from reference data alone.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Indicators {
    pub target_gap_pct: f64,
    pub import_dependency_pct: f64,
    pub required_growth_rate_pct: f64,
}

impl Indicators {
    fn of(baseline: &CropBaseline) -> Self {
        Self {
            target_gap_pct: baseline.target_gap_pct(),
            import_dependency_pct: baseline.import_dependency_pct(),
            required_growth_rate_pct: baseline.required_growth_rate_pct(),
        }
    }
}

/// Everything a presentation layer needs for one scenario.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationReport {
    pub crop: CropSelection,
    pub investment: InvestmentScenario,
    pub baseline: CropBaseline,
    pub indicators: Indicators,
    pub yield_projection: YieldProjection,
    pub sensitivity: Vec<SensitivityPoint>,
    pub ensemble: Option<EnsembleSummary>,
    pub trajectory: Trajectory,
    pub budget: BudgetOutcome,
    pub gain_share_of_baseline: Option<f64>,
    pub post_harvest: LossOutcome,
    pub regions: Vec<RegionalShare>,
}

impl SimulationReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Run every model for the configured crop selection.
pub fn run_scenario(
    catalog: &CropCatalog,
    config: &ScenarioConfig,
) -> Result<SimulationReport, SimError> {
    let _span = info_span!("scenario", crop = %config.crop).entered();
    let baseline = catalog.select(config.crop)?;
    let base = baseline.baseline_production;

    let yield_projection = yield_model::project(base, &config.yield_scenario)?;
    let sensitivity =
        yield_model::sensitivity_curve(base, &config.yield_scenario, &config.sensitivity)?;
    let ensemble = config
        .ensemble
        .as_ref()
        .map(|e| {
            yield_model::rainfall_ensemble(
                base,
                &config.yield_scenario,
                e.samples,
                e.spread_pct,
                e.seed,
            )
        })
        .transpose()?;
    let trajectory = trajectory::project(&baseline, config.growth_rate_pct, Horizon::default())?;
    let allocation = config.budget.allocation()?;
    let budget = budget::evaluate(&allocation, baseline.roi_coefficient)?;
    let post_harvest = loss::compute(
        base,
        config.post_harvest.loss_rate_pct,
        config.post_harvest.industrialization,
    )?;
    let regions = regional::apportion(config.crop, base, allocation.total, config.investment)?;

    info!(
        self_sufficiency_year = ?trajectory.self_sufficiency_year(),
        gain_tonnes = %budget.gain_tonnes,
        "scenario complete"
    );
    Ok(SimulationReport {
        crop: config.crop,
        investment: config.investment,
        indicators: Indicators::of(&baseline),
        gain_share_of_baseline: budget.gain_share_of_baseline(base),
        baseline,
        yield_projection,
        sensitivity,
        ensemble,
        trajectory,
        budget,
        post_harvest,
        regions,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GrowthSweepPoint {
    pub growth_rate_pct: f64,
    pub self_sufficiency_year: Option<i32>,
    /// Production minus demand in the last horizon year.
    pub final_balance_tonnes: f64,
}

/// Self-sufficiency year for each candidate growth rate.
pub fn sweep_growth_rates(
    catalog: &CropCatalog,
    selection: CropSelection,
    rates_pct: &[f64],
) -> Result<Vec<GrowthSweepPoint>, SimError> {
    let baseline = catalog.select(selection)?;
    rates_pct
        .iter()
        .map(|&g| -> Result<GrowthSweepPoint, SimError> {
            let t = trajectory::project(&baseline, g, Horizon::default())?;
            let last = t.years.len() - 1;
            Ok(GrowthSweepPoint {
                growth_rate_pct: g,
                self_sufficiency_year: t.self_sufficiency_year(),
                final_balance_tonnes: t.production[last] - t.demand[last],
            })
        })
        .collect()
}
