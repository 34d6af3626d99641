use crate::errors::{EstimateError, EstimateResult};
use crate::pdf;
use crate::reports::{ChartData, ReportSummary};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum ExportFormat {
    Text,
    Pdf,
    Csv,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Text,
        ExportFormat::Pdf,
        ExportFormat::Csv,
        ExportFormat::Json,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> EstimateResult<()> {
    let display = path.display().to_string();
    let mut wtr = csv::Writer::from_path(path).map_err(|e| EstimateError::export(&display, e))?;
    for r in rows {
        wtr.serialize(r).map_err(|e| EstimateError::export(&display, e))?;
    }
    wtr.flush().map_err(|e| EstimateError::export(&display, e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> EstimateResult<()> {
    let display = path.display().to_string();
    let s = serde_json::to_string_pretty(value).map_err(|e| EstimateError::export(&display, e))?;
    std::fs::write(path, s).map_err(|e| EstimateError::export(&display, e))?;
    Ok(())
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> EstimateResult<()> {
    std::fs::write(path, bytes).map_err(|e| EstimateError::export(path.display().to_string(), e))
}

/// Write `summary` to `<dir>/<stem>.<ext>` for each requested format.
pub fn export_report(
    summary: &ReportSummary,
    dir: &Path,
    stem: &str,
    formats: &[ExportFormat],
) -> EstimateResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .map_err(|e| EstimateError::export(dir.display().to_string(), e))?;
    let mut written = Vec::new();
    for format in formats {
        let path = dir.join(format!("{}.{}", stem, format.extension()));
        match format {
            ExportFormat::Text => write_bytes(&path, summary.render_text().as_bytes())?,
            ExportFormat::Pdf => write_bytes(&path, &pdf::render_report_pdf(summary)?)?,
            ExportFormat::Csv => write_csv(&path, &summary.parameter_rows())?,
            ExportFormat::Json => write_json(&path, summary)?,
        }
        info!(target: "estimator.export", path = %path.display(), format = ?format, "Report written");
        written.push(path);
    }
    Ok(written)
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Horizontal bar chart for the terminal, each bar annotated with its value.
pub fn render_bar_chart(chart: &ChartData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", chart.title, chart.y_label);
    let max = chart.values.iter().copied().fold(0.0_f64, f64::max);
    let label_width = chart.labels.iter().map(|l| l.len()).max().unwrap_or(0);
    for ((label, value), note) in chart
        .labels
        .iter()
        .zip(&chart.values)
        .zip(&chart.annotations)
    {
        let len = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "{:<width$} |{:<bar$}| {}",
            label,
            "#".repeat(len),
            note,
            width = label_width,
            bar = BAR_WIDTH
        );
    }
    out
}
