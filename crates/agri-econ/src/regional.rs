//! Regional apportionment of national production.
//!
//! Weight tables are empirical production shares per administrative region.
//! Rows are not renormalized; a row summing below 1 models production
//! outside the four regions.

use agri_core::{check_baseline, CropId, CropSelection, SimError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Budget (billions) at which the budget factor equals 1.
pub const REFERENCE_BUDGET: f64 = 2_500.0;
/// Scale bringing weight × factors onto a 0–100 score.
pub const EFFICIENCY_SCALE: f64 = 150.0;
pub const MAX_EFFICIENCY: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    LowerGuinea,
    MiddleGuinea,
    UpperGuinea,
    ForestGuinea,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::LowerGuinea,
        Region::MiddleGuinea,
        Region::UpperGuinea,
        Region::ForestGuinea,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::LowerGuinea => "Lower Guinea",
            Region::MiddleGuinea => "Middle Guinea",
            Region::UpperGuinea => "Upper Guinea",
            Region::ForestGuinea => "Forest Guinea",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Declared policy ambition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvestmentScenario {
    Stagnation,
    /// National agricultural investment plan, moderate pathway.
    Pniasan,
    /// Ambitious 2040 pathway.
    #[serde(rename = "vision-2040", alias = "vision2040")]
    Vision2040,
}

impl InvestmentScenario {
    pub fn multiplier(self) -> f64 {
        match self {
            InvestmentScenario::Stagnation => 0.8,
            InvestmentScenario::Pniasan => 1.1,
            InvestmentScenario::Vision2040 => 1.4,
        }
    }
}

impl FromStr for InvestmentScenario {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stagnation" => Ok(InvestmentScenario::Stagnation),
            "pniasan" | "moderate" => Ok(InvestmentScenario::Pniasan),
            "vision-2040" | "vision2040" | "ambitious" => Ok(InvestmentScenario::Vision2040),
            _ => Err(SimError::InvalidScenario(format!(
                "unrecognized investment scenario: {s:?}"
            ))),
        }
    }
}

/// Production share per region, in [`Region::ALL`] order.
pub fn weights(selection: CropSelection) -> [f64; 4] {
    match selection {
        CropSelection::Single(CropId::Rice) | CropSelection::All => [0.20, 0.15, 0.40, 0.25],
        CropSelection::Single(CropId::Maize) => [0.10, 0.20, 0.45, 0.20],
        CropSelection::Single(CropId::Fonio) => [0.05, 0.55, 0.30, 0.10],
        CropSelection::Single(CropId::Cassava) => [0.35, 0.10, 0.15, 0.40],
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionalShare {
    pub region: Region,
    pub weight: f64,
    pub production: f64,
    /// Execution efficiency score, capped at 100.
    pub efficiency_score: f64,
}

/// Split national production by region and score regional execution
/// efficiency for a budget and investment scenario.
pub fn apportion(
    selection: CropSelection,
    baseline_production: f64,
    total_budget: Decimal,
    scenario: InvestmentScenario,
) -> Result<Vec<RegionalShare>, SimError> {
    check_baseline(baseline_production)?;
    if total_budget <= Decimal::ZERO {
        return Err(SimError::InvalidAllocation(format!(
            "total budget must be > 0, got {total_budget}"
        )));
    }
    let budget = total_budget.to_f64().ok_or_else(|| {
        SimError::InvalidAllocation(format!("budget {total_budget} not representable"))
    })?;
    let budget_factor = budget / REFERENCE_BUDGET;
    let shares: Vec<RegionalShare> = Region::ALL
        .iter()
        .zip(weights(selection))
        .map(|(&region, weight)| RegionalShare {
            region,
            weight,
            production: baseline_production * weight,
            efficiency_score: (weight * budget_factor * scenario.multiplier() * EFFICIENCY_SCALE)
                .min(MAX_EFFICIENCY),
        })
        .collect();
    debug!(%selection, ?scenario, budget_factor, "regional apportionment");
    Ok(shares)
}
