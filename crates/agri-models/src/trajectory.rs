//! Supply and demand trajectories over the planning horizon.
//!
//! Production compounds at the policy growth rate; demand starts at
//! `baseline × import_need_ratio` and compounds with population growth.

use agri_core::{
    check_baseline, CropBaseline, SimError, HORIZON_END, HORIZON_START, POPULATION_GROWTH,
    REFERENCE_POPULATION,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MIN_GROWTH_PCT: f64 = 1.0;
pub const MAX_GROWTH_PCT: f64 = 15.0;
/// Share of production that reaches direct human consumption.
pub const CONSUMPTION_SHARE: f64 = 0.7;
/// Longest horizon a projection accepts, in years.
pub const MAX_HORIZON_YEARS: i64 = 100;

/// Inclusive range of projection years.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    pub start: i32,
    pub end: i32,
}

impl Default for Horizon {
    fn default() -> Self {
        Self {
            start: HORIZON_START,
            end: HORIZON_END,
        }
    }
}

impl Horizon {
    /// Ensure the horizon is ordered and spans at most [`MAX_HORIZON_YEARS`].
    pub fn validate(&self) -> Result<(), SimError> {
        let span = i64::from(self.end) - i64::from(self.start);
        if !(0..MAX_HORIZON_YEARS).contains(&span) {
            return Err(SimError::InvalidScenario(format!(
                "horizon {}..={} must be ordered and span at most {MAX_HORIZON_YEARS} years",
                self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn years(&self) -> Vec<i32> {
        (self.start..=self.end).collect()
    }
}

/// How the horizon ends for a crop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SufficiencyOutcome {
    /// Production first meets demand in `year`.
    SelfSufficient { year: i32, year_index: usize },
    /// No crossover; shortfall in the final horizon year.
    Deficit { gap_tonnes: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub years: Vec<i32>,
    pub production: Vec<f64>,
    pub demand: Vec<f64>,
    /// Food available per person, kg/year.
    pub per_capita_kg: Vec<f64>,
    /// Whether per-capita availability meets the crop's nutrition threshold.
    pub nutrition_met: Vec<bool>,
    pub outcome: SufficiencyOutcome,
}

impl Trajectory {
    pub fn self_sufficiency_year(&self) -> Option<i32> {
        match self.outcome {
            SufficiencyOutcome::SelfSufficient { year, .. } => Some(year),
            SufficiencyOutcome::Deficit { .. } => None,
        }
    }

    pub fn crossover_index(&self) -> Option<usize> {
        match self.outcome {
            SufficiencyOutcome::SelfSufficient { year_index, .. } => Some(year_index),
            SufficiencyOutcome::Deficit { .. } => None,
        }
    }
}

/// Reject growth rates outside [1, 15] % or non-finite values.
///
/// Example: `validate_growth_rate(6.0)` is `Ok`, `validate_growth_rate(0.5)`
/// is `InvalidScenario`.
pub fn validate_growth_rate(growth_rate_pct: f64) -> Result<(), SimError> {
    if !growth_rate_pct.is_finite() || !(MIN_GROWTH_PCT..=MAX_GROWTH_PCT).contains(&growth_rate_pct)
    {
        return Err(SimError::InvalidScenario(format!(
            "growth rate must be within [1, 15] %, got {growth_rate_pct}"
        )));
    }
    Ok(())
}

fn check_demand_inputs(crop: &CropBaseline) -> Result<(), SimError> {
    let ratio = crop.import_need_ratio;
    if !ratio.is_finite() || ratio < 1.0 {
        return Err(SimError::InvalidScenario(format!(
            "import need ratio must be finite and >= 1, got {ratio}"
        )));
    }
    let threshold = crop.nutrition_threshold;
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(SimError::InvalidScenario(format!(
            "nutrition threshold must be finite and >= 0, got {threshold}"
        )));
    }
    Ok(())
}

/// Project production, demand and per-capita availability for a crop.
///
/// Demand never falls below production's starting point (ratio >= 1), so a
/// deficit gap is always positive.
pub fn project(
    crop: &CropBaseline,
    growth_rate_pct: f64,
    horizon: Horizon,
) -> Result<Trajectory, SimError> {
    check_baseline(crop.baseline_production)?;
    check_demand_inputs(crop)?;
    validate_growth_rate(growth_rate_pct)?;
    horizon.validate()?;
    let years = horizon.years();
    let growth = 1.0 + growth_rate_pct / 100.0;
    let base = crop.baseline_production;

    let mut production = Vec::with_capacity(years.len());
    let mut demand = Vec::with_capacity(years.len());
    let mut per_capita_kg = Vec::with_capacity(years.len());
    let mut nutrition_met = Vec::with_capacity(years.len());
    for i in 0..years.len() {
        let exp = i as i32;
        let pop_factor = POPULATION_GROWTH.powi(exp);
        let p = base * growth.powi(exp);
        let kg = p * CONSUMPTION_SHARE * 1000.0 / (REFERENCE_POPULATION * pop_factor);
        production.push(p);
        demand.push(base * crop.import_need_ratio * pop_factor);
        per_capita_kg.push(kg);
        nutrition_met.push(kg >= crop.nutrition_threshold);
    }

    let outcome = match production.iter().zip(&demand).position(|(p, d)| p >= d) {
        Some(i) => SufficiencyOutcome::SelfSufficient {
            year: years[i],
            year_index: i,
        },
        None => {
            let last = years.len() - 1;
            SufficiencyOutcome::Deficit {
                gap_tonnes: demand[last] - production[last],
            }
        }
    };
    debug!(growth_rate_pct, ?outcome, "trajectory projected");
    Ok(Trajectory {
        years,
        production,
        demand,
        per_capita_kg,
        nutrition_met,
        outcome,
    })
}
