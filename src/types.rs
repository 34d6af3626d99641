use crate::currency::Currency;
use crate::errors::{EstimateError, EstimateResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

pub const MIN_AREA_M2: f64 = 500.0;
pub const MAX_AREA_M2: f64 = 10_000.0;
pub const MIN_FLOORS: u32 = 1;
pub const MAX_FLOORS: u32 = 10;
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// One line of a rate table CSV, before numeric cleanup.
#[derive(Debug, Deserialize)]
pub struct RawRateRow {
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Cement (SAR/ton)")]
    pub cement: Option<String>,
    #[serde(rename = "Steel (SAR/ton)")]
    pub steel: Option<String>,
    #[serde(rename = "Concrete (SAR/m3)")]
    pub concrete: Option<String>,
    #[serde(rename = "Blocks (SAR/1000)")]
    pub blocks: Option<String>,
    #[serde(rename = "Tiles (SAR/m2)")]
    pub tiles: Option<String>,
    #[serde(rename = "Paint (SAR/m2)")]
    pub paint: Option<String>,
    #[serde(rename = "Glass (SAR/m2)")]
    pub glass: Option<String>,
    #[serde(rename = "Wood (SAR/m2)")]
    pub wood: Option<String>,
    #[serde(rename = "Labor (SAR/hour)")]
    pub labor: Option<String>,
    #[serde(rename = "Equipment (SAR/day)")]
    pub equipment: Option<String>,
}

/// The ten priced items of a line-item estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Cement,
    Steel,
    Concrete,
    Blocks,
    Tiles,
    Paint,
    Glass,
    Wood,
    Labor,
    Equipment,
}

impl Material {
    pub const ALL: [Material; 10] = [
        Material::Cement,
        Material::Steel,
        Material::Concrete,
        Material::Blocks,
        Material::Tiles,
        Material::Paint,
        Material::Glass,
        Material::Wood,
        Material::Labor,
        Material::Equipment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Material::Cement => "Cement",
            Material::Steel => "Steel",
            Material::Concrete => "Concrete",
            Material::Blocks => "Blocks",
            Material::Tiles => "Tiles",
            Material::Paint => "Paint",
            Material::Glass => "Glass",
            Material::Wood => "Wood",
            Material::Labor => "Labor",
            Material::Equipment => "Equipment",
        }
    }

    /// Unit the quantity is measured in (prices are SAR per this unit).
    pub fn unit(self) -> &'static str {
        match self {
            Material::Cement | Material::Steel => "ton",
            Material::Concrete => "m3",
            Material::Blocks => "1000 blocks",
            Material::Tiles | Material::Paint | Material::Glass | Material::Wood => "m2",
            Material::Labor => "hour",
            Material::Equipment => "day",
        }
    }
}

/// SAR unit prices for one (year, location) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPrices {
    pub cement: f64,
    pub steel: f64,
    pub concrete: f64,
    pub blocks: f64,
    pub tiles: f64,
    pub paint: f64,
    pub glass: f64,
    pub wood: f64,
    pub labor: f64,
    pub equipment: f64,
}

impl UnitPrices {
    pub fn get(&self, material: Material) -> f64 {
        match material {
            Material::Cement => self.cement,
            Material::Steel => self.steel,
            Material::Concrete => self.concrete,
            Material::Blocks => self.blocks,
            Material::Tiles => self.tiles,
            Material::Paint => self.paint,
            Material::Glass => self.glass,
            Material::Wood => self.wood,
            Material::Labor => self.labor,
            Material::Equipment => self.equipment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    pub year: i32,
    pub location: String,
    pub unit_prices: UnitPrices,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingType {
    Residential,
    Commercial,
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildingType::Residential => write!(f, "Residential"),
            BuildingType::Commercial => write!(f, "Commercial"),
        }
    }
}

impl FromStr for BuildingType {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "residential" => Ok(BuildingType::Residential),
            "commercial" => Ok(BuildingType::Commercial),
            _ => Err(EstimateError::invalid_input(
                "building_type",
                s,
                "expected Residential or Commercial",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinishingQuality {
    Standard,
    Luxury,
}

impl fmt::Display for FinishingQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishingQuality::Standard => write!(f, "Standard"),
            FinishingQuality::Luxury => write!(f, "Luxury"),
        }
    }
}

impl FromStr for FinishingQuality {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(FinishingQuality::Standard),
            "luxury" => Ok(FinishingQuality::Luxury),
            _ => Err(EstimateError::invalid_input(
                "finishing_quality",
                s,
                "expected Standard or Luxury",
            )),
        }
    }
}

/// Everything the user picks on the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub location: String,
    pub year: i32,
    pub building_type: BuildingType,
    pub area: f64,
    pub floors: u32,
    pub finishing_quality: FinishingQuality,
    pub currency: Currency,
}

impl ProjectInput {
    /// Check the numeric bounds of the form. Whether the year/location pair
    /// is actually priced is decided by the rate table lookup.
    pub fn validate(&self) -> EstimateResult<()> {
        if self.location.trim().is_empty() {
            return Err(EstimateError::invalid_input(
                "location",
                "",
                "location must not be empty",
            ));
        }
        if !self.area.is_finite() || !(MIN_AREA_M2..=MAX_AREA_M2).contains(&self.area) {
            return Err(EstimateError::invalid_input(
                "area",
                self.area.to_string(),
                format!("area must be between {} and {} m2", MIN_AREA_M2, MAX_AREA_M2),
            ));
        }
        if !(MIN_FLOORS..=MAX_FLOORS).contains(&self.floors) {
            return Err(EstimateError::invalid_input(
                "floors",
                self.floors.to_string(),
                format!("floors must be between {} and {}", MIN_FLOORS, MAX_FLOORS),
            ));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(EstimateError::invalid_input(
                "year",
                self.year.to_string(),
                format!("year must be between {} and {}", MIN_YEAR, MAX_YEAR),
            ));
        }
        Ok(())
    }
}

/// The six reporting categories shared by both calculators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Structural,
    Finishing,
    Mep,
    Labor,
    Equipment,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Structural,
        Category::Finishing,
        Category::Mep,
        Category::Labor,
        Category::Equipment,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Structural => "Structural",
            Category::Finishing => "Finishing",
            Category::Mep => "MEP",
            Category::Labor => "Labor",
            Category::Equipment => "Equipment",
            Category::Other => "Other",
        }
    }
}

/// Cost per category. Amounts are in SAR unless the breakdown came out of
/// [`CostBreakdown::converted`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub structural: f64,
    pub finishing: f64,
    pub mep: f64,
    pub labor: f64,
    pub equipment: f64,
    pub other: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.structural + self.finishing + self.mep + self.labor + self.equipment + self.other
    }

    pub fn cost_per_area(&self, area: f64) -> f64 {
        if area > 0.0 {
            self.total() / area
        } else {
            0.0
        }
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Structural => self.structural,
            Category::Finishing => self.finishing,
            Category::Mep => self.mep,
            Category::Labor => self.labor,
            Category::Equipment => self.equipment,
            Category::Other => self.other,
        }
    }

    pub fn categories(&self) -> [(Category, f64); 6] {
        Category::ALL.map(|c| (c, self.get(c)))
    }

    /// Every category scaled by the SAR rate of `currency`.
    pub fn converted(&self, currency: Currency) -> CostBreakdown {
        CostBreakdown {
            structural: currency.convert(self.structural),
            finishing: currency.convert(self.finishing),
            mep: currency.convert(self.mep),
            labor: currency.convert(self.labor),
            equipment: currency.convert(self.equipment),
            other: currency.convert(self.other),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct BreakdownRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct LineItemRow {
    #[serde(rename = "Item")]
    #[tabled(rename = "Item")]
    pub item: String,
    #[serde(rename = "Quantity")]
    #[tabled(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "UnitPrice")]
    #[tabled(rename = "UnitPrice")]
    pub unit_price: String,
    #[serde(rename = "Cost")]
    #[tabled(rename = "Cost")]
    pub cost: String,
}

/// Spreadsheet export row; the sheet is always two columns.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ParameterRow {
    #[serde(rename = "Parameter")]
    #[tabled(rename = "Parameter")]
    pub parameter: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

impl ParameterRow {
    pub fn new(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        ParameterRow {
            parameter: parameter.into(),
            value: value.into(),
        }
    }
}
