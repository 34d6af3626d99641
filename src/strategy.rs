//! The two cost calculators.
//!
//! `LineItemStrategy` prices estimated quantities and adds MEP and
//! contingency on top of structural + finishing. `BenchmarkStrategy` derives
//! a total from a flat rate and splits it by fixed shares. The breakdowns
//! mean different things and are kept apart.

use crate::benchmark::BenchmarkConfig;
use crate::errors::EstimateResult;
use crate::loader::RateTables;
use crate::quantities::{estimate_quantities, QuantitySet};
use crate::types::{CostBreakdown, Material, ProjectInput, UnitPrices};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const MEP_OVERHEAD: f64 = 0.15;
const CONTINGENCY: f64 = 0.05;

/// Benchmark split of the total, in category order.
pub const BENCHMARK_SHARES: [f64; 6] = [0.50, 0.30, 0.10, 0.07, 0.02, 0.01];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    LineItem,
    Benchmark,
}

impl StrategyKind {
    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::LineItem => "Line-item",
            StrategyKind::Benchmark => "Benchmark",
        }
    }
}

/// Command-line spelling, accepted back by `from_str`.
impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::LineItem => f.write_str("line-item"),
            StrategyKind::Benchmark => f.write_str("benchmark"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = crate::errors::EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "lineitem" => Ok(StrategyKind::LineItem),
            "benchmark" => Ok(StrategyKind::Benchmark),
            _ => Err(crate::errors::EstimateError::invalid_input(
                "strategy",
                s,
                "expected line-item or benchmark",
            )),
        }
    }
}

/// Per-item SAR costs (quantity x unit price).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineItemCosts {
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

impl LineItemCosts {
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

/// Quantities, prices and item costs behind a line-item breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineItemDetail {
    pub quantities: QuantitySet,
    pub unit_prices: UnitPrices,
    pub costs: LineItemCosts,
}

/// Result of one strategy run, in SAR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyOutput {
    pub breakdown: CostBreakdown,
    pub line_items: Option<LineItemDetail>,
}

pub trait CostStrategy {
    fn kind(&self) -> StrategyKind;

    fn compute(&self, input: &ProjectInput) -> EstimateResult<StrategyOutput>;
}

pub fn compute_line_items(
    quantities: &QuantitySet,
    prices: &UnitPrices,
) -> (LineItemCosts, CostBreakdown) {
    let cost = |m: Material| quantities.get(m) * prices.get(m);
    let costs = LineItemCosts {
        cement: cost(Material::Cement),
        steel: cost(Material::Steel),
        concrete: cost(Material::Concrete),
        blocks: cost(Material::Blocks),
        tiles: cost(Material::Tiles),
        paint: cost(Material::Paint),
        glass: cost(Material::Glass),
        wood: cost(Material::Wood),
        labor: cost(Material::Labor),
        equipment: cost(Material::Equipment),
    };
    let structural = costs.cement + costs.steel + costs.concrete + costs.blocks;
    let finishing = costs.tiles + costs.paint + costs.glass + costs.wood;
    let breakdown = CostBreakdown {
        structural,
        finishing,
        mep: MEP_OVERHEAD * (structural + finishing),
        labor: costs.labor,
        equipment: costs.equipment,
        other: CONTINGENCY * (structural + finishing),
    };
    (costs, breakdown)
}

/// Split a benchmark total across the six categories.
pub fn split_benchmark_total(total: f64) -> CostBreakdown {
    let [structural, finishing, mep, labor, equipment, other] = BENCHMARK_SHARES.map(|s| s * total);
    CostBreakdown {
        structural,
        finishing,
        mep,
        labor,
        equipment,
        other,
    }
}

pub struct LineItemStrategy<'a> {
    tables: &'a RateTables,
}

impl<'a> LineItemStrategy<'a> {
    pub fn new(tables: &'a RateTables) -> Self {
        LineItemStrategy { tables }
    }
}

impl CostStrategy for LineItemStrategy<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LineItem
    }

    fn compute(&self, input: &ProjectInput) -> EstimateResult<StrategyOutput> {
        let row = self
            .tables
            .lookup(input.year, &input.location, input.finishing_quality)?;
        let quantities = estimate_quantities(input.area, input.floors);
        let (costs, breakdown) = compute_line_items(&quantities, &row.unit_prices);
        debug!(
            target: "estimator.calc",
            location = %row.location,
            year = row.year,
            total = breakdown.total(),
            "Line-item breakdown computed"
        );
        Ok(StrategyOutput {
            breakdown,
            line_items: Some(LineItemDetail {
                quantities,
                unit_prices: row.unit_prices,
                costs,
            }),
        })
    }
}

pub struct BenchmarkStrategy<'a> {
    config: &'a BenchmarkConfig,
}

impl<'a> BenchmarkStrategy<'a> {
    pub fn new(config: &'a BenchmarkConfig) -> Self {
        BenchmarkStrategy { config }
    }

    pub fn total(&self, input: &ProjectInput) -> EstimateResult<f64> {
        let base = self
            .config
            .effective_base(input.building_type, input.finishing_quality);
        let multiplier = self.config.city_multiplier(&input.location)?;
        Ok(base * input.area * multiplier)
    }
}

impl CostStrategy for BenchmarkStrategy<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Benchmark
    }

    fn compute(&self, input: &ProjectInput) -> EstimateResult<StrategyOutput> {
        let total = self.total(input)?;
        debug!(
            target: "estimator.calc",
            location = %input.location,
            building_type = %input.building_type,
            total,
            "Benchmark total computed"
        );
        Ok(StrategyOutput {
            breakdown: split_benchmark_total(total),
            line_items: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::loader::RateTable;
    use crate::types::{BuildingType, FinishingQuality, RateRow};

    fn prices(cement: f64) -> UnitPrices {
        UnitPrices {
            cement,
            steel: 3200.0,
            concrete: 250.0,
            blocks: 2200.0,
            tiles: 85.0,
            paint: 25.0,
            glass: 350.0,
            wood: 180.0,
            labor: 30.0,
            equipment: 1200.0,
        }
    }

    fn tables() -> RateTables {
        let row = |year, cement| RateRow {
            year,
            location: "Riyadh".to_string(),
            unit_prices: prices(cement),
        };
        RateTables {
            standard: RateTable::from_rows(
                FinishingQuality::Standard,
                vec![row(2023, 280.0), row(2024, 290.0), row(2025, 300.0)],
            )
            .unwrap(),
            luxury: RateTable::from_rows(FinishingQuality::Luxury, vec![row(2025, 330.0)]).unwrap(),
        }
    }

    fn input() -> ProjectInput {
        ProjectInput {
            location: "Riyadh".to_string(),
            year: 2025,
            building_type: BuildingType::Residential,
            area: 3000.0,
            floors: 4,
            finishing_quality: FinishingQuality::Standard,
            currency: Currency::Sar,
        }
    }

    #[test]
    fn cement_cost_for_reference_project() {
        let tables = tables();
        let out = LineItemStrategy::new(&tables).compute(&input()).unwrap();
        let detail = out.line_items.unwrap();
        assert!((detail.quantities.cement_tons - 1800.0).abs() < 1e-9);
        assert!((detail.costs.cement - 540_000.0).abs() < 1e-6);
    }

    #[test]
    fn line_item_overheads_sit_on_top() {
        let q = estimate_quantities(3000.0, 4);
        let (costs, b) = compute_line_items(&q, &prices(300.0));
        let base = b.structural + b.finishing;
        assert!((b.mep - 0.15 * base).abs() < 1e-6);
        assert!((b.other - 0.05 * base).abs() < 1e-6);
        assert_eq!(b.labor, costs.labor);
        assert_eq!(b.equipment, costs.equipment);
        let sum = b.structural + b.finishing + b.mep + b.labor + b.equipment + b.other;
        assert!((b.total() - sum).abs() <= 1e-9 * sum);
    }

    #[test]
    fn luxury_uses_luxury_table() {
        let tables = tables();
        let mut lux = input();
        lux.finishing_quality = FinishingQuality::Luxury;
        let out = LineItemStrategy::new(&tables).compute(&lux).unwrap();
        assert_eq!(out.line_items.unwrap().unit_prices.cement, 330.0);

        lux.year = 2024;
        let err = LineItemStrategy::new(&tables).compute(&lux).unwrap_err();
        assert_eq!(err.error_code(), "LOOKUP_MISS");
    }

    #[test]
    fn benchmark_reference_total_and_split() {
        let cfg = BenchmarkConfig::defaults();
        let out = BenchmarkStrategy::new(&cfg).compute(&input()).unwrap();
        assert!((out.breakdown.total() - 5_400_000.0).abs() < 1e-6);
        assert!((out.breakdown.structural - 2_700_000.0).abs() < 1e-6);
        assert!(out.line_items.is_none());
        let share_sum: f64 = BENCHMARK_SHARES.iter().sum();
        assert!((share_sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn benchmark_total_matches_formula() {
        let mut cfg = BenchmarkConfig::defaults();
        cfg.set_city_multiplier("Jeddah", 1.05).unwrap();
        let mut inp = input();
        inp.location = "Jeddah".to_string();
        inp.building_type = BuildingType::Commercial;
        inp.area = 1234.0;
        let strategy = BenchmarkStrategy::new(&cfg);
        assert_eq!(strategy.total(&inp).unwrap(), 2200.0 * 1234.0 * 1.05);
    }

    #[test]
    fn benchmark_luxury_is_not_reapplied() {
        let cfg = BenchmarkConfig::defaults();
        let mut inp = input();
        inp.finishing_quality = FinishingQuality::Luxury;
        let strategy = BenchmarkStrategy::new(&cfg);
        let first = strategy.total(&inp).unwrap();
        let second = strategy.total(&inp).unwrap();
        assert_eq!(first, second);
        assert!((first - 2520.0 * 3000.0).abs() < 1e-6);
    }

    #[test]
    fn parses_strategy_names() {
        assert_eq!("line-item".parse::<StrategyKind>().unwrap(), StrategyKind::LineItem);
        assert_eq!("Benchmark".parse::<StrategyKind>().unwrap(), StrategyKind::Benchmark);
        assert!("median".parse::<StrategyKind>().is_err());
    }
}
