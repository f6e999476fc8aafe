#![deny(warnings)]

//! Core domain models and invariants for the food-sovereignty simulator.
//!
//! This crate defines the crop reference catalog, the closed scenario enums
//! shared by every model, and the error taxonomy surfaced to callers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// First year of the projection horizon.
pub const HORIZON_START: i32 = 2026;
/// Last year of the projection horizon (inclusive).
pub const HORIZON_END: i32 = 2041;
/// Year the national production targets refer to.
pub const TARGET_YEAR: i32 = 2040;
/// Annual population growth factor (2.5 %/year).
pub const POPULATION_GROWTH: f64 = 1.025;
/// National population in the first horizon year.
pub const REFERENCE_POPULATION: f64 = 14_000_000.0;

/// Errors surfaced by simulation operations.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// Crop id not present in the catalog.
    #[error("unknown crop: {0}")]
    UnknownCrop(String),
    /// Budget allocations are negative or exceed the total budget.
    #[error("invalid allocation: {0}")]
    InvalidAllocation(String),
    /// Unrecognized enum value or out-of-domain scenario parameter.
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
    /// Catalog entry violates a reference-data invariant.
    #[error(transparent)]
    InvalidProfile(#[from] ValidationError),
}

/// Validation errors for crop reference data.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0}: non-finite numeric value encountered")]
    NonFinite(CropId),
    #[error("{0}: baseline production must be > 0")]
    NonPositiveBaseline(CropId),
    #[error("{0}: 2040 target must be >= baseline production")]
    TargetBelowBaseline(CropId),
    #[error("{0}: import need ratio must be >= 1.0")]
    ImportRatioBelowOne(CropId),
    #[error("{0}: ROI coefficient must be >= 0")]
    NegativeRoi(CropId),
    #[error("{0}: nutrition threshold must be >= 0")]
    NegativeThreshold(CropId),
    #[error("duplicate crop in catalog: {0}")]
    DuplicateCrop(CropId),
    #[error("catalog must contain at least one crop")]
    EmptyCatalog,
}

/// Crops tracked by the national programme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CropId {
    Rice,
    Maize,
    Fonio,
    Cassava,
}

impl CropId {
    pub const ALL: [CropId; 4] = [CropId::Rice, CropId::Maize, CropId::Fonio, CropId::Cassava];

    pub fn as_str(self) -> &'static str {
        match self {
            CropId::Rice => "rice",
            CropId::Maize => "maize",
            CropId::Fonio => "fonio",
            CropId::Cassava => "cassava",
        }
    }
}

impl fmt::Display for CropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CropId {
    type Err = SimError;

    /// Accepts English ids and the French labels used in programme documents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rice" | "riz" => Ok(CropId::Rice),
            "maize" | "mais" | "maïs" => Ok(CropId::Maize),
            "fonio" => Ok(CropId::Fonio),
            "cassava" | "cassave" | "manioc" => Ok(CropId::Cassava),
            _ => Err(SimError::UnknownCrop(s.to_string())),
        }
    }
}

/// A single crop or the "all crops" aggregate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CropSelection {
    Single(CropId),
    All,
}

impl fmt::Display for CropSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropSelection::Single(id) => f.pad(id.as_str()),
            CropSelection::All => f.pad("all"),
        }
    }
}

impl FromStr for CropSelection {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "all-crops" | "toutes" => Ok(CropSelection::All),
            other => other.parse().map(CropSelection::Single),
        }
    }
}

impl TryFrom<String> for CropSelection {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CropSelection> for String {
    fn from(sel: CropSelection) -> Self {
        sel.to_string()
    }
}

/// Soil classes with distinct fertility and drought sensitivity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoilType {
    FertileAlluvial,
    FerraliticLateritic,
    SandyLoamy,
}

/// Level of mechanization and input use on the farm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intensification {
    Traditional,
    SemiMechanized,
    Intensive,
}

/// Post-harvest processing capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Industrialization {
    Manual,
    Artisanal,
    Industrial,
}

fn unrecognized(kind: &str, value: &str) -> SimError {
    SimError::InvalidScenario(format!("unrecognized {kind}: {value:?}"))
}

impl FromStr for SoilType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fertile-alluvial" | "fertile" | "alluvial" => Ok(SoilType::FertileAlluvial),
            "ferralitic-lateritic" | "ferralitic" | "lateritic" => {
                Ok(SoilType::FerraliticLateritic)
            }
            "sandy-loamy" | "sandy" => Ok(SoilType::SandyLoamy),
            _ => Err(unrecognized("soil type", s)),
        }
    }
}

impl FromStr for Intensification {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "traditional" => Ok(Intensification::Traditional),
            "semi-mechanized" | "semi" => Ok(Intensification::SemiMechanized),
            "intensive" => Ok(Intensification::Intensive),
            _ => Err(unrecognized("intensification level", s)),
        }
    }
}

impl FromStr for Industrialization {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(Industrialization::Manual),
            "artisanal" => Ok(Industrialization::Artisanal),
            "industrial" => Ok(Industrialization::Industrial),
            _ => Err(unrecognized("industrialization level", s)),
        }
    }
}

/// Reference numbers for a crop or an aggregate of crops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropBaseline {
    /// Current national production in tonnes (> 0).
    pub baseline_production: f64,
    /// National production target for 2040 in tonnes (>= baseline).
    pub target_2040: f64,
    /// Demand over current production (>= 1.0; above 1 means imports).
    pub import_need_ratio: f64,
    /// Tonnes gained per currency unit invested in certified seed.
    pub roi_coefficient: Decimal,
    /// Reference consumption in kg/person/year.
    pub nutrition_threshold: f64,
}

impl CropBaseline {
    /// Distance from current production to the 2040 target, in percent of
    /// current production.
    pub fn target_gap_pct(&self) -> f64 {
        (self.target_2040 - self.baseline_production) / self.baseline_production * 100.0
    }

    /// Share of demand covered by imports, in percent of production.
    pub fn import_dependency_pct(&self) -> f64 {
        (self.import_need_ratio - 1.0) * 100.0
    }

    /// Compound annual growth rate (percent) that reaches the 2040 target
    /// starting from the first horizon year.
    pub fn required_growth_rate_pct(&self) -> f64 {
        let years = f64::from(TARGET_YEAR - HORIZON_START);
        ((self.target_2040 / self.baseline_production).powf(1.0 / years) - 1.0) * 100.0
    }
}

/// Reference data for one crop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub id: CropId,
    #[serde(flatten)]
    pub data: CropBaseline,
}

/// Derived "all crops" view: sums for tonnages, means for coefficients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateProfile {
    pub constituents: Vec<CropId>,
    #[serde(flatten)]
    pub data: CropBaseline,
}

/// Reject non-finite or non-positive tonnages handed to a model.
pub fn check_baseline(baseline_production: f64) -> Result<(), SimError> {
    if !baseline_production.is_finite() || baseline_production <= 0.0 {
        return Err(SimError::InvalidScenario(format!(
            "baseline production must be finite and > 0, got {baseline_production}"
        )));
    }
    Ok(())
}

/// Validate one crop profile.
pub fn validate_profile(p: &CropProfile) -> Result<(), ValidationError> {
    let d = &p.data;
    if !(d.baseline_production.is_finite()
        && d.target_2040.is_finite()
        && d.import_need_ratio.is_finite()
        && d.nutrition_threshold.is_finite())
    {
        return Err(ValidationError::NonFinite(p.id));
    }
    if d.baseline_production <= 0.0 {
        return Err(ValidationError::NonPositiveBaseline(p.id));
    }
    if d.target_2040 < d.baseline_production {
        return Err(ValidationError::TargetBelowBaseline(p.id));
    }
    if d.import_need_ratio < 1.0 {
        return Err(ValidationError::ImportRatioBelowOne(p.id));
    }
    if d.roi_coefficient < Decimal::ZERO {
        return Err(ValidationError::NegativeRoi(p.id));
    }
    if d.nutrition_threshold < 0.0 {
        return Err(ValidationError::NegativeThreshold(p.id));
    }
    Ok(())
}

fn profile(
    id: CropId,
    baseline: f64,
    target: f64,
    ratio: f64,
    roi: i64,
    nutrition: f64,
) -> CropProfile {
    CropProfile {
        id,
        data: CropBaseline {
            baseline_production: baseline,
            target_2040: target,
            import_need_ratio: ratio,
            roi_coefficient: Decimal::new(roi, 0),
            nutrition_threshold: nutrition,
        },
    }
}

/// Read-only crop reference catalog.
#[derive(Clone, Debug)]
pub struct CropCatalog {
    profiles: BTreeMap<CropId, CropProfile>,
}

impl CropCatalog {
    /// National programme reference data.
    pub fn builtin() -> Self {
        let profiles = [
            profile(CropId::Rice, 2_250_000.0, 5_000_000.0, 1.6, 850, 100.0),
            profile(CropId::Maize, 850_000.0, 2_000_000.0, 1.4, 650, 40.0),
            profile(CropId::Fonio, 550_000.0, 1_300_000.0, 1.2, 450, 15.0),
            profile(CropId::Cassava, 1_200_000.0, 3_000_000.0, 1.3, 550, 60.0),
        ];
        Self {
            profiles: profiles.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    /// Build a catalog from caller-supplied profiles, validating each entry.
    pub fn from_profiles(profiles: Vec<CropProfile>) -> Result<Self, ValidationError> {
        if profiles.is_empty() {
            return Err(ValidationError::EmptyCatalog);
        }
        let mut map = BTreeMap::new();
        for p in profiles {
            validate_profile(&p)?;
            let id = p.id;
            if map.insert(id, p).is_some() {
                return Err(ValidationError::DuplicateCrop(id));
            }
        }
        Ok(Self { profiles: map })
    }

    /// Look up a crop by its textual id.
    pub fn get(&self, crop_id: &str) -> Result<&CropProfile, SimError> {
        let id: CropId = crop_id.parse()?;
        self.profile(id)
    }

    /// Look up a crop by id; catalogs built from caller data may omit crops.
    pub fn profile(&self, id: CropId) -> Result<&CropProfile, SimError> {
        self.profiles
            .get(&id)
            .ok_or_else(|| SimError::UnknownCrop(id.to_string()))
    }

    /// Catalog ids in stable order.
    pub fn list_ids(&self) -> Vec<CropId> {
        self.profiles.keys().copied().collect()
    }

    /// Sum of tonnages and mean of coefficients over every entry.
    pub fn get_aggregate(&self) -> AggregateProfile {
        let n = self.profiles.len();
        let mut baseline_production = 0.0;
        let mut target_2040 = 0.0;
        let mut ratio_sum = 0.0;
        let mut roi_sum = Decimal::ZERO;
        let mut nutrition_sum = 0.0;
        for p in self.profiles.values() {
            baseline_production += p.data.baseline_production;
            target_2040 += p.data.target_2040;
            ratio_sum += p.data.import_need_ratio;
            roi_sum += p.data.roi_coefficient;
            nutrition_sum += p.data.nutrition_threshold;
        }
        // from_profiles rejects empty catalogs, so n >= 1
        let nf = n as f64;
        let aggregate = AggregateProfile {
            constituents: self.list_ids(),
            data: CropBaseline {
                baseline_production,
                target_2040,
                import_need_ratio: ratio_sum / nf,
                roi_coefficient: roi_sum / Decimal::from(n),
                nutrition_threshold: nutrition_sum / nf,
            },
        };
        debug!(crops = n, baseline = baseline_production, "aggregate profile");
        aggregate
    }

    /// Reference numbers for a single crop or the aggregate.
    pub fn select(&self, selection: CropSelection) -> Result<CropBaseline, SimError> {
        match selection {
            CropSelection::Single(id) => Ok(self.profile(id)?.data.clone()),
            CropSelection::All => Ok(self.get_aggregate().data),
        }
    }
}

impl Default for CropCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
