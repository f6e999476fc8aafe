//! Budget allocation across the three production levers.
//!
//! Money is kept in exact decimals so that the three allocations always add
//! back to the total without rounding leakage.

use agri_core::SimError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fertilizer converts capital to yield 1.2× faster than seed.
pub fn fertilizer_efficiency() -> Decimal {
    Decimal::new(12, 1)
}

/// Mechanization converts capital to yield at 0.8× the seed rate.
pub fn mechanization_efficiency() -> Decimal {
    Decimal::new(8, 1)
}

/// Reference import price of staple grain, USD per tonne.
pub fn import_unit_price_usd() -> Decimal {
    Decimal::new(550, 0)
}

/// Local currency units per USD.
pub fn exchange_rate() -> Decimal {
    Decimal::new(8_600, 0)
}

/// Budgets are expressed in billions of local currency.
pub fn unit_scale() -> Decimal {
    Decimal::new(1_000_000_000, 0)
}

fn invalid(msg: impl Into<String>) -> SimError {
    SimError::InvalidAllocation(msg.into())
}

fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, SimError> {
    a.checked_mul(b).ok_or_else(|| invalid("amount overflow"))
}

fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, SimError> {
    a.checked_add(b).ok_or_else(|| invalid("amount overflow"))
}

/// A validated split of the total budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAllocation {
    pub total: Decimal,
    pub seed: Decimal,
    pub fertilizer: Decimal,
    /// Residual of the total after seed and fertilizer.
    pub mechanization: Decimal,
}

impl BudgetAllocation {
    /// Validate the two explicit levers and assign the residual to
    /// mechanization.
    pub fn new(total: Decimal, seed: Decimal, fertilizer: Decimal) -> Result<Self, SimError> {
        if total <= Decimal::ZERO {
            return Err(invalid(format!("total budget must be > 0, got {total}")));
        }
        if seed < Decimal::ZERO || fertilizer < Decimal::ZERO {
            return Err(invalid("allocations must be non-negative"));
        }
        let committed = checked_add(seed, fertilizer)?;
        if committed > total {
            warn!(%total, %seed, %fertilizer, "allocations exceed budget");
            return Err(invalid(format!(
                "seed + fertilizer ({committed}) exceeds total budget ({total})"
            )));
        }
        let mechanization = (total - seed - fertilizer).max(Decimal::ZERO);
        Ok(Self {
            total,
            seed,
            fertilizer,
            mechanization,
        })
    }

    /// 30 % seed, 40 % fertilizer, remainder to mechanization.
    pub fn default_split(total: Decimal) -> Result<Self, SimError> {
        if total <= Decimal::ZERO {
            return Err(invalid(format!("total budget must be > 0, got {total}")));
        }
        let seed = total * Decimal::new(3, 1);
        let fertilizer = total * Decimal::new(4, 1);
        Self::new(total, seed, fertilizer)
    }
}

/// Tonnage contributed by each lever.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverImpact {
    pub seed_tonnes: Decimal,
    pub fertilizer_tonnes: Decimal,
    pub mechanization_tonnes: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetOutcome {
    pub allocation: BudgetAllocation,
    pub roi_coefficient: Decimal,
    pub levers: LeverImpact,
    /// Total production gain in tonnes.
    pub gain_tonnes: Decimal,
    /// Import bill avoided by the gain, USD.
    pub fx_savings_usd: Decimal,
    /// FX savings in local currency per unit of budget spent.
    pub capital_efficiency: Decimal,
}

impl BudgetOutcome {
    /// Gain as a fraction of current production.
    pub fn gain_share_of_baseline(&self, baseline_production: f64) -> Option<f64> {
        if baseline_production <= 0.0 {
            return None;
        }
        Some(self.gain_tonnes.to_f64()? / baseline_production)
    }
}

/// Evaluate an allocation of `total` with explicit seed and fertilizer
/// amounts for a crop's ROI coefficient.
pub fn allocate(
    total: Decimal,
    seed: Decimal,
    fertilizer: Decimal,
    roi_coefficient: Decimal,
) -> Result<BudgetOutcome, SimError> {
    let allocation = BudgetAllocation::new(total, seed, fertilizer)?;
    evaluate(&allocation, roi_coefficient)
}

/// Evaluate an already validated allocation.
pub fn evaluate(
    allocation: &BudgetAllocation,
    roi_coefficient: Decimal,
) -> Result<BudgetOutcome, SimError> {
    if roi_coefficient < Decimal::ZERO {
        return Err(invalid(format!(
            "ROI coefficient must be >= 0, got {roi_coefficient}"
        )));
    }
    let levers = LeverImpact {
        seed_tonnes: checked_mul(allocation.seed, roi_coefficient)?,
        fertilizer_tonnes: checked_mul(
            allocation.fertilizer,
            checked_mul(roi_coefficient, fertilizer_efficiency())?,
        )?,
        mechanization_tonnes: checked_mul(
            allocation.mechanization,
            checked_mul(roi_coefficient, mechanization_efficiency())?,
        )?,
    };
    let gain_tonnes = checked_add(
        checked_add(levers.seed_tonnes, levers.fertilizer_tonnes)?,
        levers.mechanization_tonnes,
    )?;
    let fx_savings_usd = checked_mul(gain_tonnes, import_unit_price_usd())?;
    let spent = checked_mul(allocation.total, unit_scale())?;
    let capital_efficiency = checked_mul(fx_savings_usd, exchange_rate())? / spent;
    debug!(%gain_tonnes, %fx_savings_usd, "budget evaluated");
    Ok(BudgetOutcome {
        allocation: *allocation,
        roi_coefficient,
        levers,
        gain_tonnes,
        fx_savings_usd,
        capital_efficiency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn rice_reference_allocation() {
        let o = allocate(d(2500), d(750), d(1000), d(850)).unwrap();
        assert_eq!(o.allocation.mechanization, d(750));
        assert_eq!(o.levers.seed_tonnes, d(637_500));
        assert_eq!(o.levers.fertilizer_tonnes, d(1_020_000));
        assert_eq!(o.levers.mechanization_tonnes, d(510_000));
        assert_eq!(o.gain_tonnes, d(2_167_500));
        assert_eq!(o.fx_savings_usd, d(1_192_125_000));
        // 1_192_125_000 * 8_600 / 2_500e9
        assert_eq!(o.capital_efficiency, Decimal::new(410_091, 5));
    }

    #[test]
    fn gain_share_of_baseline() {
        let o = allocate(d(2500), d(750), d(1000), d(850)).unwrap();
        let share = o.gain_share_of_baseline(2_250_000.0).unwrap();
        assert!((share - 0.963_333).abs() < 1e-6);
        assert_eq!(o.gain_share_of_baseline(0.0), None);
    }

    #[test]
    fn default_split_matches_dashboard_defaults() {
        let a = BudgetAllocation::default_split(d(2500)).unwrap();
        assert_eq!(a.seed, d(750));
        assert_eq!(a.fertilizer, d(1000));
        assert_eq!(a.mechanization, d(750));
    }

    #[test]
    fn overcommitted_budget_is_rejected() {
        assert!(matches!(
            allocate(d(1000), d(600), d(500), d(100)),
            Err(SimError::InvalidAllocation(_))
        ));
        assert!(allocate(d(1000), d(-1), d(500), d(100)).is_err());
        assert!(allocate(d(0), d(0), d(0), d(100)).is_err());
        assert!(BudgetAllocation::default_split(d(-5)).is_err());
    }

    #[test]
    fn fully_committed_budget_leaves_no_mechanization() {
        let o = allocate(d(1000), d(400), d(600), d(10)).unwrap();
        assert_eq!(o.allocation.mechanization, Decimal::ZERO);
        assert_eq!(o.levers.mechanization_tonnes, Decimal::ZERO);
    }

    #[test]
    fn serde_roundtrip_outcome() {
        let o = allocate(d(2500), d(750), d(1000), d(850)).unwrap();
        let s = serde_json::to_string(&o).unwrap();
        let back: BudgetOutcome = serde_json::from_str(&s).unwrap();
        assert_eq!(back, o);
    }

    proptest! {
        #[test]
        fn allocations_sum_to_total(total in 1i64..10_000_000, seed_pct in 0i64..=100, fert_pct in 0i64..=100) {
            let total = Decimal::new(total, 2);
            let seed = total * Decimal::new(seed_pct, 2);
            let remaining = total - seed;
            let fertilizer = remaining * Decimal::new(fert_pct, 2);
            let a = BudgetAllocation::new(total, seed, fertilizer).unwrap();
            prop_assert_eq!(a.seed + a.fertilizer + a.mechanization, total);
            prop_assert!(a.mechanization >= Decimal::ZERO);
        }

        #[test]
        fn gain_is_monotonic_in_roi(roi in 1i64..5_000) {
            let lo = allocate(d(2500), d(750), d(1000), d(roi)).unwrap();
            let hi = allocate(d(2500), d(750), d(1000), d(roi + 1)).unwrap();
            prop_assert!(hi.gain_tonnes > lo.gain_tonnes);
            let again = allocate(d(2500), d(750), d(1000), d(roi)).unwrap();
            prop_assert_eq!(lo, again);
        }
    }
}
