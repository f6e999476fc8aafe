//! Yield response to soil, input intensification, irrigation and rainfall.
//!
//! The model produces a dimensionless production multiplier:
//! - base boost = intensification boost × soil factor (+0.3 if irrigated)
//! - excess rain adds `deviation / 100` flat
//! - drought losses are divided by 3 under irrigation, otherwise scaled by
//!   the soil's drought sensitivity
//! - the result never drops below [`MULTIPLIER_FLOOR`]

use agri_core::{check_baseline, Intensification, SimError, SoilType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lowest multiplier the model will report.
pub const MULTIPLIER_FLOOR: f64 = 0.1;
/// Flat boost added by controlled irrigation.
pub const IRRIGATION_BONUS: f64 = 0.3;
/// Irrigation divides drought losses by this factor.
pub const IRRIGATED_DROUGHT_DAMPING: f64 = 3.0;
/// Rainfall deviation domain is [-LIMIT, +LIMIT] percent.
pub const RAINFALL_LIMIT_PCT: f64 = 50.0;
/// Widest ensemble spread: draws beyond it clamp to the domain edges anyway.
pub const MAX_ENSEMBLE_SPREAD_PCT: f64 = 2.0 * RAINFALL_LIMIT_PCT;
pub const MAX_ENSEMBLE_SAMPLES: usize = 1_000_000;

const DROUGHT_ALERT_PCT: f64 = -20.0;
const FLOOD_ALERT_PCT: f64 = 30.0;

/// Fertility factor applied to the technical boost.
pub fn soil_factor(soil: SoilType) -> f64 {
    match soil {
        SoilType::FertileAlluvial => 1.2,
        SoilType::FerraliticLateritic => 0.8,
        SoilType::SandyLoamy => 0.9,
    }
}

/// Amplification of drought losses on non-irrigated land.
pub fn drought_sensitivity(soil: SoilType) -> f64 {
    match soil {
        SoilType::FertileAlluvial => 1.0,
        SoilType::FerraliticLateritic => 1.3,
        SoilType::SandyLoamy => 1.6,
    }
}

/// Technical boost from mechanization and inputs.
pub fn intensification_boost(level: Intensification) -> f64 {
    match level {
        Intensification::Traditional => 1.0,
        Intensification::SemiMechanized => 1.4,
        Intensification::Intensive => 1.8,
    }
}

/// Environmental and technical choices for one yield projection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct YieldScenario {
    pub soil: SoilType,
    pub intensification: Intensification,
    pub irrigation: bool,
    /// Rainfall deviation from the seasonal norm, percent in [-50, 50].
    pub rainfall_deviation_pct: f64,
}

impl Default for YieldScenario {
    fn default() -> Self {
        Self {
            soil: SoilType::FertileAlluvial,
            intensification: Intensification::Traditional,
            irrigation: false,
            rainfall_deviation_pct: 0.0,
        }
    }
}

impl YieldScenario {
    pub fn validate(&self) -> Result<(), SimError> {
        let dev = self.rainfall_deviation_pct;
        if !dev.is_finite() || dev.abs() > RAINFALL_LIMIT_PCT {
            return Err(SimError::InvalidScenario(format!(
                "rainfall deviation must be within [-50, 50] %, got {dev}"
            )));
        }
        Ok(())
    }

    fn with_rainfall(self, rainfall_deviation_pct: f64) -> Self {
        Self {
            rainfall_deviation_pct,
            ..self
        }
    }
}

/// Advisory observations; never errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum YieldAlert {
    /// Rainfall below -20 % on non-irrigated land.
    Drought,
    /// Rainfall above +30 %.
    FloodRisk,
}

/// Alerts raised by a scenario's rainfall: drought below -20 % unless
/// irrigated, flood risk above +30 %. Thresholds are exclusive.
///
/// Example: -25 % on dry land gives `[Drought]`; the same rain with
/// irrigation gives no alert.
pub fn alerts(scenario: &YieldScenario) -> Vec<YieldAlert> {
    let mut out = Vec::new();
    if scenario.rainfall_deviation_pct < DROUGHT_ALERT_PCT && !scenario.irrigation {
        out.push(YieldAlert::Drought);
    }
    if scenario.rainfall_deviation_pct > FLOOD_ALERT_PCT {
        out.push(YieldAlert::FloodRisk);
    }
    out
}

/// Boost before rainfall: intensification × soil, plus the irrigation bonus.
pub fn base_boost(scenario: &YieldScenario) -> f64 {
    let mut boost = intensification_boost(scenario.intensification) * soil_factor(scenario.soil);
    if scenario.irrigation {
        boost += IRRIGATION_BONUS;
    }
    boost
}

/// Additive rainfall effect on the multiplier (negative under drought).
pub fn rainfall_impact(scenario: &YieldScenario) -> f64 {
    let impact = scenario.rainfall_deviation_pct / 100.0;
    if scenario.rainfall_deviation_pct >= 0.0 {
        impact
    } else if scenario.irrigation {
        impact / IRRIGATED_DROUGHT_DAMPING
    } else {
        impact * drought_sensitivity(scenario.soil)
    }
}

fn raw_multiplier(scenario: &YieldScenario) -> f64 {
    (base_boost(scenario) + rainfall_impact(scenario)).max(MULTIPLIER_FLOOR)
}

/// Production multiplier for a scenario, floored at 0.1.
pub fn multiplier(scenario: &YieldScenario) -> Result<f64, SimError> {
    scenario.validate()?;
    Ok(raw_multiplier(scenario))
}

/// Result of a single yield projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YieldProjection {
    pub multiplier: f64,
    pub projected_production: f64,
    /// Change relative to current production, in percent.
    pub yield_change_pct: f64,
    pub alerts: Vec<YieldAlert>,
}

/// Project production for a baseline under a scenario.
pub fn project(
    baseline_production: f64,
    scenario: &YieldScenario,
) -> Result<YieldProjection, SimError> {
    check_baseline(baseline_production)?;
    let m = multiplier(scenario)?;
    let projection = YieldProjection {
        multiplier: m,
        projected_production: baseline_production * m,
        yield_change_pct: (m - 1.0) * 100.0,
        alerts: alerts(scenario),
    };
    debug!(multiplier = m, alerts = ?projection.alerts, "yield projection");
    Ok(projection)
}

/// Evenly spaced rainfall deviations, endpoints included.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RainfallRange {
    pub min_pct: f64,
    pub max_pct: f64,
    pub steps: usize,
}

impl Default for RainfallRange {
    fn default() -> Self {
        Self {
            min_pct: -RAINFALL_LIMIT_PCT,
            max_pct: RAINFALL_LIMIT_PCT,
            steps: 21,
        }
    }
}

impl RainfallRange {
    /// Deviations `min + step * i` for `i` in `0..steps`, with the last
    /// point pinned to `max` so rounding never drops the upper endpoint.
    ///
    /// Example: the default range gives -50, -45, ..., 45, 50.
    pub fn points(&self) -> Result<Vec<f64>, SimError> {
        let in_domain = |v: f64| v.is_finite() && v.abs() <= RAINFALL_LIMIT_PCT;
        if !in_domain(self.min_pct) || !in_domain(self.max_pct) || self.min_pct >= self.max_pct {
            return Err(SimError::InvalidScenario(format!(
                "rainfall range [{}, {}] must be increasing and within [-50, 50]",
                self.min_pct, self.max_pct
            )));
        }
        if self.steps < 2 {
            return Err(SimError::InvalidScenario(
                "rainfall range needs at least 2 steps".to_string(),
            ));
        }
        let step = (self.max_pct - self.min_pct) / (self.steps - 1) as f64;
        Ok((0..self.steps)
            .map(|i| {
                if i + 1 == self.steps {
                    self.max_pct
                } else {
                    self.min_pct + step * i as f64
                }
            })
            .collect())
    }
}

/// Production at one rainfall deviation of a sensitivity curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub rainfall_pct: f64,
    pub production: f64,
}

/// Production across a rainfall range, all other scenario fields held.
pub fn sensitivity_curve(
    baseline_production: f64,
    scenario: &YieldScenario,
    range: &RainfallRange,
) -> Result<Vec<SensitivityPoint>, SimError> {
    check_baseline(baseline_production)?;
    let points = range.points()?;
    Ok(points
        .into_iter()
        .map(|rainfall_pct| SensitivityPoint {
            rainfall_pct,
            production: baseline_production * raw_multiplier(&scenario.with_rainfall(rainfall_pct)),
        })
        .collect())
}

/// Distribution of production under random rainfall around a scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSummary {
    pub samples: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub p90: f64,
    /// Fraction of draws that raised a drought alert.
    pub drought_alert_share: f64,
}

/// Seeded Monte-Carlo over rainfall deviations drawn uniformly in
/// `[deviation - spread, deviation + spread]`, clamped to [-50, 50].
pub fn rainfall_ensemble(
    baseline_production: f64,
    scenario: &YieldScenario,
    samples: usize,
    spread_pct: f64,
    seed: u64,
) -> Result<EnsembleSummary, SimError> {
    check_baseline(baseline_production)?;
    scenario.validate()?;
    if samples == 0 || samples > MAX_ENSEMBLE_SAMPLES {
        return Err(SimError::InvalidScenario(format!(
            "ensemble samples must be within [1, {MAX_ENSEMBLE_SAMPLES}], got {samples}"
        )));
    }
    if !spread_pct.is_finite() || !(0.0..=MAX_ENSEMBLE_SPREAD_PCT).contains(&spread_pct) {
        return Err(SimError::InvalidScenario(format!(
            "rainfall spread must be within [0, {MAX_ENSEMBLE_SPREAD_PCT}] %, got {spread_pct}"
        )));
    }
    let center = scenario.rainfall_deviation_pct;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut productions = Vec::with_capacity(samples);
    let mut droughts = 0usize;
    for _ in 0..samples {
        let drawn = if spread_pct == 0.0 {
            center
        } else {
            rng.gen_range(center - spread_pct..=center + spread_pct)
        };
        let dev = drawn.clamp(-RAINFALL_LIMIT_PCT, RAINFALL_LIMIT_PCT);
        let draw = scenario.with_rainfall(dev);
        if alerts(&draw).contains(&YieldAlert::Drought) {
            droughts += 1;
        }
        productions.push(baseline_production * raw_multiplier(&draw));
    }
    productions.sort_by(|a, b| a.total_cmp(b));
    let n = productions.len();
    let percentile = |p: f64| productions[(p * (n - 1) as f64).round() as usize];
    let summary = EnsembleSummary {
        samples: n,
        mean: productions.iter().sum::<f64>() / n as f64,
        min: productions[0],
        max: productions[n - 1],
        p10: percentile(0.1),
        p90: percentile(0.9),
        drought_alert_share: droughts as f64 / n as f64,
    };
    debug!(samples = n, seed, mean = summary.mean, "rainfall ensemble");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scenario(soil: SoilType, level: Intensification, irrigation: bool, dev: f64) -> YieldScenario {
        YieldScenario {
            soil,
            intensification: level,
            irrigation,
            rainfall_deviation_pct: dev,
        }
    }

    #[test]
    fn neutral_rain_traditional_fertile() {
        let s = scenario(SoilType::FertileAlluvial, Intensification::Traditional, false, 0.0);
        assert!((multiplier(&s).unwrap() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn excess_rain_is_flat_additive() {
        let s = scenario(SoilType::FertileAlluvial, Intensification::Intensive, true, 10.0);
        // 1.8 * 1.2 + 0.3 + 0.1
        assert!((multiplier(&s).unwrap() - 2.56).abs() < 1e-12);
        let sandy = scenario(SoilType::SandyLoamy, Intensification::Intensive, true, 10.0);
        assert!((rainfall_impact(&sandy) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn irrigation_dampens_drought() {
        let s = scenario(SoilType::FertileAlluvial, Intensification::Traditional, true, -30.0);
        // 1.2 + 0.3 - 0.3 / 3
        assert!((multiplier(&s).unwrap() - 1.4).abs() < 1e-12);
        let dry = scenario(SoilType::SandyLoamy, Intensification::Traditional, false, -30.0);
        assert!((rainfall_impact(&dry) + 0.48).abs() < 1e-12);
    }

    #[test]
    fn multiplier_is_floored() {
        let s = scenario(SoilType::SandyLoamy, Intensification::Traditional, false, -50.0);
        assert_eq!(multiplier(&s).unwrap(), MULTIPLIER_FLOOR);
    }

    #[test]
    fn rainfall_outside_domain_is_rejected() {
        let s = scenario(SoilType::SandyLoamy, Intensification::Traditional, false, -60.0);
        assert!(matches!(multiplier(&s), Err(SimError::InvalidScenario(_))));
        let nan = scenario(SoilType::SandyLoamy, Intensification::Traditional, false, f64::NAN);
        assert!(project(1000.0, &nan).is_err());
        assert!(project(0.0, &YieldScenario::default()).is_err());
    }

    #[test]
    fn alerts_follow_thresholds() {
        let dry = scenario(SoilType::FertileAlluvial, Intensification::Traditional, false, -25.0);
        assert_eq!(alerts(&dry), vec![YieldAlert::Drought]);
        let irrigated = YieldScenario { irrigation: true, ..dry };
        assert!(alerts(&irrigated).is_empty());
        let at_edge = scenario(SoilType::FertileAlluvial, Intensification::Traditional, false, -20.0);
        assert!(alerts(&at_edge).is_empty());
        let wet = scenario(SoilType::FertileAlluvial, Intensification::Traditional, false, 35.0);
        assert_eq!(alerts(&wet), vec![YieldAlert::FloodRisk]);
    }

    #[test]
    fn project_scales_baseline() {
        let s = scenario(SoilType::FerraliticLateritic, Intensification::SemiMechanized, false, 0.0);
        let p = project(1_000_000.0, &s).unwrap();
        // 1.4 * 0.8
        assert!((p.multiplier - 1.12).abs() < 1e-12);
        assert!((p.projected_production - 1_120_000.0).abs() < 1e-6);
        assert!((p.yield_change_pct - 12.0).abs() < 1e-9);
    }

    #[test]
    fn default_curve_has_21_points() {
        let s = YieldScenario::default();
        let curve = sensitivity_curve(1000.0, &s, &RainfallRange::default()).unwrap();
        assert_eq!(curve.len(), 21);
        assert_eq!(curve[0].rainfall_pct, -50.0);
        assert_eq!(curve[10].rainfall_pct, 0.0);
        assert_eq!(curve[20].rainfall_pct, 50.0);
        assert!((curve[10].production - 1200.0).abs() < 1e-9);
        for w in curve.windows(2) {
            assert!(w[0].production <= w[1].production);
        }
    }

    #[test]
    fn bad_range_is_rejected() {
        let s = YieldScenario::default();
        let single = RainfallRange { steps: 1, ..RainfallRange::default() };
        assert!(sensitivity_curve(1000.0, &s, &single).is_err());
        let reversed = RainfallRange { min_pct: 10.0, max_pct: -10.0, steps: 5 };
        assert!(sensitivity_curve(1000.0, &s, &reversed).is_err());
    }

    #[test]
    fn ensemble_is_seeded_and_bounded() {
        let s = scenario(SoilType::SandyLoamy, Intensification::SemiMechanized, false, -10.0);
        let a = rainfall_ensemble(1000.0, &s, 500, 30.0, 42).unwrap();
        let b = rainfall_ensemble(1000.0, &s, 500, 30.0, 42).unwrap();
        assert_eq!(a, b);
        assert!(a.min <= a.p10 && a.p10 <= a.mean && a.mean <= a.max);
        assert!(a.p10 <= a.p90);
        assert!(a.drought_alert_share > 0.0 && a.drought_alert_share < 1.0);
        let flat = rainfall_ensemble(1000.0, &s, 10, 0.0, 7).unwrap();
        assert_eq!(flat.min, flat.max);
        assert!(rainfall_ensemble(1000.0, &s, 0, 10.0, 1).is_err());
    }

    #[test]
    fn ensemble_bounds_are_enforced() {
        let s = YieldScenario::default();
        for spread in [f64::MAX, 100.5, -1.0, f64::INFINITY] {
            assert!(matches!(
                rainfall_ensemble(1000.0, &s, 10, spread, 1),
                Err(SimError::InvalidScenario(_))
            ));
        }
        assert!(matches!(
            rainfall_ensemble(1000.0, &s, MAX_ENSEMBLE_SAMPLES + 1, 10.0, 1),
            Err(SimError::InvalidScenario(_))
        ));
        let widest = rainfall_ensemble(1000.0, &s, 200, MAX_ENSEMBLE_SPREAD_PCT, 3).unwrap();
        assert!(widest.min >= 1000.0 * MULTIPLIER_FLOOR);
        assert!(widest.max <= 1000.0 * (1.2 + 0.5) + 1e-9);
    }

    proptest! {
        #[test]
        fn sandier_soils_lose_more_to_drought(dev in -50.0f64..-0.001) {
            let level = Intensification::Traditional;
            let fertile = rainfall_impact(&scenario(SoilType::FertileAlluvial, level, false, dev));
            let ferralitic = rainfall_impact(&scenario(SoilType::FerraliticLateritic, level, false, dev));
            let sandy = rainfall_impact(&scenario(SoilType::SandyLoamy, level, false, dev));
            prop_assert!(fertile > ferralitic);
            prop_assert!(ferralitic > sandy);
        }

        #[test]
        fn multiplier_is_idempotent_and_floored(dev in -50.0f64..=50.0, irrigation in any::<bool>()) {
            let s = scenario(SoilType::SandyLoamy, Intensification::Intensive, irrigation, dev);
            let a = multiplier(&s).unwrap();
            let b = multiplier(&s).unwrap();
            prop_assert_eq!(a.to_bits(), b.to_bits());
            prop_assert!(a >= MULTIPLIER_FLOOR);
        }
    }
}
