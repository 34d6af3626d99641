use crate::currency::Currency;
use crate::estimate::Estimate;
use crate::strategy::StrategyKind;
use crate::types::{
    BreakdownRow, BuildingType, Category, FinishingQuality, LineItemRow, Material, ParameterRow,
};
use crate::util::{format_money, format_number};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;

/// Bar fill per category, in category order.
pub const CHART_COLORS: [&str; 6] = [
    "#66b3ff", "#99ff99", "#ffcc99", "#ff9999", "#c2c2f0", "#f0e68c",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLine {
    pub category: Category,
    pub label: String,
    /// In the display currency.
    pub amount: f64,
    /// Fraction of the total, 0..=1.
    pub share: f64,
}

/// Everything a renderer needs, already converted to the display currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub strategy: StrategyKind,
    pub location: String,
    pub year: i32,
    pub building_type: BuildingType,
    pub area_m2: f64,
    pub floors: u32,
    pub finishing_quality: FinishingQuality,
    pub currency: Currency,
    pub total_cost: f64,
    pub cost_per_m2: f64,
    pub categories: Vec<CategoryLine>,
    pub line_items: Vec<LineItemRow>,
}

/// Labelled bar chart input: six bars with value annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub annotations: Vec<String>,
    pub colors: Vec<String>,
}

pub fn format_report(estimate: &Estimate, generated_at: DateTime<Utc>) -> ReportSummary {
    let input = &estimate.input;
    let currency = input.currency;
    let total = estimate.converted_total;
    let categories = estimate
        .converted
        .categories()
        .iter()
        .map(|(category, amount)| CategoryLine {
            category: *category,
            label: category.label().to_string(),
            amount: *amount,
            share: if total > 0.0 { amount / total } else { 0.0 },
        })
        .collect();

    let line_items = estimate
        .line_items
        .as_ref()
        .map(|detail| {
            Material::ALL
                .iter()
                .map(|m| LineItemRow {
                    item: m.label().to_string(),
                    quantity: format_number(detail.quantities.get(*m), 2),
                    unit: m.unit().to_string(),
                    unit_price: format_number(currency.convert(detail.unit_prices.get(*m)), 2),
                    cost: format_number(currency.convert(detail.costs.get(*m)), 0),
                })
                .collect()
        })
        .unwrap_or_default();

    ReportSummary {
        title: "Building Cost Estimate".to_string(),
        generated_at,
        strategy: estimate.strategy,
        location: input.location.clone(),
        year: input.year,
        building_type: input.building_type,
        area_m2: input.area,
        floors: input.floors,
        finishing_quality: input.finishing_quality,
        currency,
        total_cost: total,
        cost_per_m2: estimate.converted_cost_per_area,
        categories,
        line_items,
    }
}

impl ReportSummary {
    pub fn chart_data(&self) -> ChartData {
        ChartData {
            title: "Cost Breakdown by Category".to_string(),
            y_label: format!("Cost ({})", self.currency),
            labels: self.categories.iter().map(|c| c.label.clone()).collect(),
            values: self.categories.iter().map(|c| c.amount).collect(),
            annotations: self
                .categories
                .iter()
                .map(|c| format_number(c.amount, 0))
                .collect(),
            colors: CHART_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Rows of the two-column spreadsheet export.
    pub fn parameter_rows(&self) -> Vec<ParameterRow> {
        let mut rows = vec![
            ParameterRow::new("Location", self.location.clone()),
            ParameterRow::new("Year", self.year.to_string()),
            ParameterRow::new("Building Type", self.building_type.to_string()),
            ParameterRow::new("Area (m2)", format_number(self.area_m2, 0)),
            ParameterRow::new("Floors", self.floors.to_string()),
            ParameterRow::new("Finishing Quality", self.finishing_quality.to_string()),
            ParameterRow::new("Currency", self.currency.to_string()),
            ParameterRow::new("Method", self.strategy.label()),
            ParameterRow::new("Total Cost", format_money(self.total_cost, self.currency)),
            ParameterRow::new("Cost per m2", format_money(self.cost_per_m2, self.currency)),
        ];
        for line in &self.categories {
            rows.push(ParameterRow::new(
                format!("{} Cost", line.label),
                format_money(line.amount, self.currency),
            ));
        }
        rows
    }

    pub fn breakdown_rows(&self) -> Vec<BreakdownRow> {
        self.categories
            .iter()
            .map(|c| BreakdownRow {
                category: c.label.clone(),
                amount: format_money(c.amount, self.currency),
                share: format!("{}%", format_number(c.share * 100.0, 1)),
            })
            .collect()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", "=".repeat(self.title.len()));
        let _ = writeln!(out, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M UTC"));
        let _ = writeln!(out);
        let _ = writeln!(out, "Project Summary");
        let _ = writeln!(out, "---------------");
        let _ = writeln!(out, "Location:          {}", self.location);
        let _ = writeln!(out, "Year:              {}", self.year);
        let _ = writeln!(out, "Building Type:     {}", self.building_type);
        let _ = writeln!(out, "Area:              {} m2", format_number(self.area_m2, 0));
        let _ = writeln!(out, "Floors:            {}", self.floors);
        let _ = writeln!(out, "Finishing Quality: {}", self.finishing_quality);
        let _ = writeln!(out, "Method:            {}", self.strategy.label());
        let _ = writeln!(out);
        let _ = writeln!(out, "Estimated Total Cost: {}", format_money(self.total_cost, self.currency));
        let _ = writeln!(out, "Cost per m2:          {}", format_money(self.cost_per_m2, self.currency));
        let _ = writeln!(out);
        let _ = writeln!(out, "Cost Breakdown");
        let _ = writeln!(out, "--------------");
        for line in &self.categories {
            let _ = writeln!(
                out,
                "{:<12}{:>22}  ({}%)",
                line.label,
                format_money(line.amount, self.currency),
                format_number(line.share * 100.0, 1)
            );
        }
        if !self.line_items.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Line Items ({})", self.currency);
            let _ = writeln!(out, "----------");
            for item in &self.line_items {
                let _ = writeln!(
                    out,
                    "{:<10}{:>14} {:<12} @ {:>10} = {:>14}",
                    item.item, item.quantity, item.unit, item.unit_price, item.cost
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::BenchmarkConfig;
    use crate::estimate::run_estimate;
    use crate::strategy::BenchmarkStrategy;
    use crate::types::ProjectInput;
    use chrono::TimeZone;

    fn summary(currency: Currency) -> ReportSummary {
        let cfg = BenchmarkConfig::defaults();
        let input = ProjectInput {
            location: "Riyadh".to_string(),
            year: 2025,
            building_type: BuildingType::Residential,
            area: 3000.0,
            floors: 4,
            finishing_quality: FinishingQuality::Standard,
            currency,
        };
        let est = run_estimate(&BenchmarkStrategy::new(&cfg), &input).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        format_report(&est, at)
    }

    #[test]
    fn echoes_input_and_totals() {
        let s = summary(Currency::Sar);
        assert_eq!(s.location, "Riyadh");
        assert_eq!(s.floors, 4);
        assert!((s.total_cost - 5_400_000.0).abs() < 1e-6);
        assert_eq!(s.categories.len(), 6);
        let shares: f64 = s.categories.iter().map(|c| c.share).sum();
        assert!((shares - 1.0).abs() < 1e-9);
        assert!(s.line_items.is_empty());
    }

    #[test]
    fn same_input_formats_identically() {
        let a = summary(Currency::Sar);
        assert_eq!(a, summary(Currency::Sar));
        assert_eq!(a.breakdown_rows(), summary(Currency::Sar).breakdown_rows());
        assert_ne!(a, summary(Currency::Usd));
    }

    #[test]
    fn chart_has_six_labelled_bars() {
        let chart = summary(Currency::Aed).chart_data();
        assert_eq!(
            chart.labels,
            vec!["Structural", "Finishing", "MEP", "Labor", "Equipment", "Other"]
        );
        assert_eq!(chart.values.len(), 6);
        assert_eq!(chart.annotations[0], "2,646,000");
        assert_eq!(chart.y_label, "Cost (AED)");
    }

    #[test]
    fn parameter_rows_cover_summary() {
        let rows = summary(Currency::Sar).parameter_rows();
        assert_eq!(rows[0], ParameterRow::new("Location", "Riyadh"));
        assert!(rows.contains(&ParameterRow::new("Total Cost", "5,400,000 SAR")));
        assert!(rows.contains(&ParameterRow::new("Structural Cost", "2,700,000 SAR")));
        assert_eq!(rows.len(), 16);
    }

    #[test]
    fn text_report_lists_totals() {
        let text = summary(Currency::Usd).render_text();
        assert!(text.contains("Estimated Total Cost: 1,458,000 USD"));
        assert!(text.contains("Cost per m2:          486 USD"));
        assert!(text.contains("Generated: 2025-03-01 09:30 UTC"));
        assert!(text.contains("MEP"));
    }
}
