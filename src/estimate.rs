use crate::benchmark::BenchmarkConfig;
use crate::errors::EstimateResult;
use crate::loader::RateTables;
use crate::strategy::{
    BenchmarkStrategy, CostStrategy, LineItemDetail, LineItemStrategy, StrategyKind,
};
use crate::types::{CostBreakdown, ProjectInput};
use serde::Serialize;
use tracing::info;

/// Output of one run of the pipeline. `breakdown` stays in SAR; the
/// `converted` fields are in `input.currency`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub input: ProjectInput,
    pub strategy: StrategyKind,
    pub breakdown: CostBreakdown,
    pub converted: CostBreakdown,
    pub converted_total: f64,
    pub converted_cost_per_area: f64,
    pub line_items: Option<LineItemDetail>,
}

impl Estimate {
    pub fn total_sar(&self) -> f64 {
        self.breakdown.total()
    }

    pub fn cost_per_area_sar(&self) -> f64 {
        self.breakdown.cost_per_area(self.input.area)
    }
}

/// Validate, run the strategy, convert to the display currency.
pub fn run_estimate(strategy: &dyn CostStrategy, input: &ProjectInput) -> EstimateResult<Estimate> {
    input.validate()?;
    let output = strategy.compute(input)?;
    let converted = output.breakdown.converted(input.currency);
    let estimate = Estimate {
        input: input.clone(),
        strategy: strategy.kind(),
        breakdown: output.breakdown,
        converted,
        converted_total: converted.total(),
        converted_cost_per_area: converted.cost_per_area(input.area),
        line_items: output.line_items,
    };
    info!(
        target: "estimator.calc",
        strategy = %estimate.strategy,
        location = %input.location,
        year = input.year,
        total_sar = estimate.total_sar(),
        currency = %input.currency,
        "Estimate complete"
    );
    Ok(estimate)
}

/// Rate tables plus the strategy selection for one session.
pub struct Estimator<'a> {
    tables: &'a RateTables,
    kind: StrategyKind,
}

impl<'a> Estimator<'a> {
    pub fn new(tables: &'a RateTables, kind: StrategyKind) -> Self {
        Estimator { tables, kind }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// `benchmark` is only read when the benchmark strategy is selected.
    pub fn estimate(
        &self,
        input: &ProjectInput,
        benchmark: &BenchmarkConfig,
    ) -> EstimateResult<Estimate> {
        match self.kind {
            StrategyKind::LineItem => run_estimate(&LineItemStrategy::new(self.tables), input),
            StrategyKind::Benchmark => run_estimate(&BenchmarkStrategy::new(benchmark), input),
        }
    }
}
