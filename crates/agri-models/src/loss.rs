//! Post-harvest losses: production → loss → availability, with the share of
//! losses that processing capacity can recover.

use agri_core::{check_baseline, Industrialization, SimError};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MIN_LOSS_RATE_PCT: f64 = 5.0;
pub const MAX_LOSS_RATE_PCT: f64 = 50.0;

/// Fraction of lost tonnage recovered by each processing level.
pub fn recovery_efficiency(level: Industrialization) -> f64 {
    match level {
        Industrialization::Manual => 0.05,
        Industrialization::Artisanal => 0.15,
        Industrialization::Industrial => 0.30,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LossOutcome {
    pub baseline_production: f64,
    pub loss_rate_pct: f64,
    pub industrialization: Industrialization,
    pub lost_tonnes: f64,
    pub recoverable_tonnes: f64,
    pub available_tonnes: f64,
}

/// Split production into lost and available tonnage for a loss rate in
/// [5, 50] %, and estimate how much of the loss processing can recover.
///
/// `available_tonnes + lost_tonnes` reproduces `baseline_production`
/// exactly: `lost` is taken back from `available`, and with a rate of at
/// most 50 % the subtraction `baseline - available` is exact.
///
/// Example: `compute(1_200_000.0, 30.0, Industrialization::Industrial)`
/// loses 360 000 t, recovers 108 000 t and leaves 840 000 t available.
pub fn compute(
    baseline_production: f64,
    loss_rate_pct: f64,
    industrialization: Industrialization,
) -> Result<LossOutcome, SimError> {
    check_baseline(baseline_production)?;
    if !loss_rate_pct.is_finite()
        || !(MIN_LOSS_RATE_PCT..=MAX_LOSS_RATE_PCT).contains(&loss_rate_pct)
    {
        return Err(SimError::InvalidScenario(format!(
            "post-harvest loss rate must be within [5, 50] %, got {loss_rate_pct}"
        )));
    }
    let available_tonnes = baseline_production - baseline_production * loss_rate_pct / 100.0;
    let lost_tonnes = baseline_production - available_tonnes;
    let outcome = LossOutcome {
        baseline_production,
        loss_rate_pct,
        industrialization,
        lost_tonnes,
        recoverable_tonnes: lost_tonnes * recovery_efficiency(industrialization),
        available_tonnes,
    };
    debug!(lost = lost_tonnes, ?industrialization, "post-harvest losses");
    Ok(outcome)
}
