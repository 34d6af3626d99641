//! Editable settings for the benchmark calculator.
//!
//! A `BenchmarkConfig` is a plain value: each session owns its copy, edits
//! go through the setters, and `reset` hands back a fresh copy of the
//! defaults. Nothing in here is shared between sessions.

use crate::errors::{EstimateError, EstimateResult};
use crate::types::{BuildingType, FinishingQuality};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_RESIDENTIAL_BASE: f64 = 1800.0;
pub const DEFAULT_COMMERCIAL_BASE: f64 = 2200.0;
pub const DEFAULT_RESIDENTIAL_LUXURY_SURCHARGE: f64 = 1.4;
pub const DEFAULT_COMMERCIAL_LUXURY_SURCHARGE: f64 = 1.3;

pub static DEFAULT_CITY_MULTIPLIERS: Lazy<BTreeMap<String, f64>> = Lazy::new(|| {
    [
        ("Riyadh", 1.0),
        ("Jeddah", 1.05),
        ("Dammam", 0.95),
        ("Dubai", 1.2),
    ]
    .into_iter()
    .map(|(city, m)| (city.to_string(), m))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LuxurySurcharge {
    pub residential: f64,
    pub commercial: f64,
}

impl LuxurySurcharge {
    pub fn for_type(&self, building_type: BuildingType) -> f64 {
        match building_type {
            BuildingType::Residential => self.residential,
            BuildingType::Commercial => self.commercial,
        }
    }
}

impl Default for LuxurySurcharge {
    fn default() -> Self {
        LuxurySurcharge {
            residential: DEFAULT_RESIDENTIAL_LUXURY_SURCHARGE,
            commercial: DEFAULT_COMMERCIAL_LUXURY_SURCHARGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// SAR per m2.
    pub residential_base: f64,
    /// SAR per m2.
    pub commercial_base: f64,
    pub city_multipliers: BTreeMap<String, f64>,
    #[serde(default)]
    pub luxury_surcharge: LuxurySurcharge,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl BenchmarkConfig {
    pub fn defaults() -> Self {
        BenchmarkConfig {
            residential_base: DEFAULT_RESIDENTIAL_BASE,
            commercial_base: DEFAULT_COMMERCIAL_BASE,
            city_multipliers: DEFAULT_CITY_MULTIPLIERS.clone(),
            luxury_surcharge: LuxurySurcharge::default(),
        }
    }

    /// Discard every edit.
    pub fn reset(&mut self) {
        *self = Self::defaults();
    }

    pub fn base(&self, building_type: BuildingType) -> f64 {
        match building_type {
            BuildingType::Residential => self.residential_base,
            BuildingType::Commercial => self.commercial_base,
        }
    }

    /// Base rate after the luxury surcharge. Computed on every call; the
    /// stored base is never modified.
    pub fn effective_base(&self, building_type: BuildingType, quality: FinishingQuality) -> f64 {
        let base = self.base(building_type);
        match quality {
            FinishingQuality::Standard => base,
            FinishingQuality::Luxury => base * self.luxury_surcharge.for_type(building_type),
        }
    }

    pub fn city_multiplier(&self, location: &str) -> EstimateResult<f64> {
        self.city_multipliers
            .get(location.trim())
            .copied()
            .ok_or_else(|| EstimateError::UnknownCityMultiplier {
                location: location.trim().to_string(),
            })
    }

    pub fn set_base(&mut self, building_type: BuildingType, value: f64) -> EstimateResult<()> {
        let field = match building_type {
            BuildingType::Residential => "residential_base",
            BuildingType::Commercial => "commercial_base",
        };
        let value = positive(field, value)?;
        match building_type {
            BuildingType::Residential => self.residential_base = value,
            BuildingType::Commercial => self.commercial_base = value,
        }
        Ok(())
    }

    pub fn set_city_multiplier(&mut self, location: &str, value: f64) -> EstimateResult<()> {
        let location = location.trim();
        if location.is_empty() {
            return Err(EstimateError::invalid_input(
                "city_multiplier",
                "",
                "location must not be empty",
            ));
        }
        let value = positive("city_multiplier", value)?;
        self.city_multipliers.insert(location.to_string(), value);
        Ok(())
    }

    pub fn validate(&self) -> EstimateResult<()> {
        positive("residential_base", self.residential_base)?;
        positive("commercial_base", self.commercial_base)?;
        positive("luxury_surcharge.residential", self.luxury_surcharge.residential)?;
        positive("luxury_surcharge.commercial", self.luxury_surcharge.commercial)?;
        for (city, m) in &self.city_multipliers {
            positive(&format!("city_multipliers.{}", city), *m)?;
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> EstimateResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EstimateError::invalid_input(
            field,
            value.to_string(),
            "must be a positive number",
        ))
    }
}
