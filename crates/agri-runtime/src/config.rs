//! Scenario configuration loaded from YAML files.
//!
//! Every field has a default, so a file only needs to name what differs from
//! the reference scenario (rice, moderate investment plan, 6 % growth,
//! budget of 2 500 split 30/40/30).

use agri_core::{CropId, CropSelection, Industrialization, SimError};
use agri_econ::budget::BudgetAllocation;
use agri_econ::InvestmentScenario;
use agri_models::yield_model::{RainfallRange, YieldScenario};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BudgetConfig {
    /// Total budget, billions of local currency.
    pub total: Decimal,
    /// Defaults to 30 % of the total.
    pub seed: Option<Decimal>,
    /// Defaults to 40 % of the total, capped at what seed leaves over.
    pub fertilizer: Option<Decimal>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            total: Decimal::new(2_500, 0),
            seed: None,
            fertilizer: None,
        }
    }
}

impl BudgetConfig {
    pub fn allocation(&self) -> Result<BudgetAllocation, SimError> {
        let seed = self.seed.unwrap_or(self.total * Decimal::new(3, 1));
        let fertilizer = match self.fertilizer {
            Some(f) => f,
            None => (self.total * Decimal::new(4, 1))
                .min(self.total - seed)
                .max(Decimal::ZERO),
        };
        BudgetAllocation::new(self.total, seed, fertilizer)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LossConfig {
    pub loss_rate_pct: f64,
    pub industrialization: Industrialization,
}

impl Default for LossConfig {
    fn default() -> Self {
        Self {
            loss_rate_pct: 30.0,
            industrialization: Industrialization::Manual,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnsembleConfig {
    pub samples: usize,
    pub spread_pct: f64,
    pub seed: u64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            samples: 1_000,
            spread_pct: 20.0,
            seed: 42,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub crop: CropSelection,
    pub investment: InvestmentScenario,
    /// Targeted annual production growth, percent in [1, 15].
    pub growth_rate_pct: f64,
    pub budget: BudgetConfig,
    #[serde(rename = "yield")]
    pub yield_scenario: YieldScenario,
    pub post_harvest: LossConfig,
    pub sensitivity: RainfallRange,
    /// Rainfall Monte-Carlo; skipped when absent.
    pub ensemble: Option<EnsembleConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            crop: CropSelection::Single(CropId::Rice),
            investment: InvestmentScenario::Pniasan,
            growth_rate_pct: 6.0,
            budget: BudgetConfig::default(),
            yield_scenario: YieldScenario::default(),
            post_harvest: LossConfig::default(),
            sensitivity: RainfallRange::default(),
            ensemble: None,
        }
    }
}

impl ScenarioConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("invalid scenario YAML")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scenario file {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("loading {}", path.display()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serializing scenario")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_core::SoilType;
    use std::path::PathBuf;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = ScenarioConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, ScenarioConfig::default());
    }

    #[test]
    fn partial_blocks_are_filled() {
        let cfg = ScenarioConfig::from_yaml_str(
            "crop: all\nyield:\n  soil: sandy-loamy\nbudget:\n  total: 1000\n",
        )
        .unwrap();
        assert_eq!(cfg.crop, CropSelection::All);
        assert_eq!(cfg.yield_scenario.soil, SoilType::SandyLoamy);
        assert!(!cfg.yield_scenario.irrigation);
        assert_eq!(cfg.budget.total, Decimal::new(1_000, 0));
        assert_eq!(cfg.growth_rate_pct, 6.0);
    }

    #[test]
    fn unknown_values_fail_closed() {
        assert!(ScenarioConfig::from_yaml_str("crop: sorghum").is_err());
        assert!(ScenarioConfig::from_yaml_str("yield:\n  soil: volcanic").is_err());
        assert!(ScenarioConfig::from_yaml_str("investment: utopia").is_err());
        assert!(ScenarioConfig::from_yaml_str("growth: 5").is_err());
    }

    #[test]
    fn misspelled_nested_keys_fail_closed() {
        let typos = [
            "yield:\n  rainfall_deviation: -40\n  irigation: true\n",
            "sensitivity:\n  min: -20\n",
            "budget:\n  totl: 100\n",
            "post_harvest:\n  rate: 20\n",
            "ensemble:\n  sample: 10\n",
        ];
        for text in typos {
            assert!(ScenarioConfig::from_yaml_str(text).is_err(), "{text}");
        }
        let ok = ScenarioConfig::from_yaml_str("yield:\n  rainfall_deviation_pct: -40\n").unwrap();
        assert_eq!(ok.yield_scenario.rainfall_deviation_pct, -40.0);
    }

    #[test]
    fn budget_defaults_follow_split() {
        let a = BudgetConfig::default().allocation().unwrap();
        assert_eq!(a.seed, Decimal::new(750, 0));
        assert_eq!(a.fertilizer, Decimal::new(1_000, 0));
        assert_eq!(a.mechanization, Decimal::new(750, 0));

        let heavy_seed = BudgetConfig {
            seed: Some(Decimal::new(2_000, 0)),
            ..BudgetConfig::default()
        };
        let a = heavy_seed.allocation().unwrap();
        assert_eq!(a.fertilizer, Decimal::new(500, 0));
        assert_eq!(a.mechanization, Decimal::ZERO);
    }

    #[test]
    fn sample_scenario_loads() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../assets/scenarios/vision-2040.yaml");
        let cfg = ScenarioConfig::load(&path).unwrap();
        assert_eq!(cfg.crop, CropSelection::Single(CropId::Rice));
        assert_eq!(cfg.investment, InvestmentScenario::Vision2040);
        assert!(cfg.yield_scenario.irrigation);
        assert_eq!(cfg.post_harvest.industrialization, Industrialization::Industrial);
        assert_eq!(cfg.ensemble.as_ref().map(|e| e.seed), Some(42));
    }

    #[test]
    fn yaml_roundtrip() {
        let cfg = ScenarioConfig {
            ensemble: Some(EnsembleConfig::default()),
            ..ScenarioConfig::default()
        };
        let text = cfg.to_yaml().unwrap();
        assert_eq!(ScenarioConfig::from_yaml_str(&text).unwrap(), cfg);
    }
}
