// Interactive menu session.
//
// A `Session` owns the current form values and its own copy of the
// benchmark configuration. Edits made in one session are invisible to any
// other session built from the same `AppConfig`.
use crate::benchmark::BenchmarkConfig;
use crate::config::AppConfig;
use crate::currency::Currency;
use crate::errors::{EstimateError, EstimateResult};
use crate::estimate::{Estimate, Estimator};
use crate::loader::RateTables;
use crate::output::{self, ExportFormat};
use crate::reports::format_report;
use crate::strategy::StrategyKind;
use crate::types::{BuildingType, FinishingQuality, ProjectInput};
use crate::util::format_money;
use chrono::Utc;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

pub struct Session<'a> {
    tables: &'a RateTables,
    pub input: ProjectInput,
    pub strategy: StrategyKind,
    pub benchmark: BenchmarkConfig,
    pub output_dir: PathBuf,
    last: Option<Estimate>,
}

impl<'a> Session<'a> {
    /// Form defaults: first location in the tables, latest year, 3,000 m2,
    /// 4 floors, standard finish.
    pub fn new(tables: &'a RateTables, cfg: &AppConfig) -> Self {
        let location = tables.locations().into_iter().next().unwrap_or_default();
        let year = tables.years().last().copied().unwrap_or(2025);
        Session {
            tables,
            input: ProjectInput {
                location,
                year,
                building_type: BuildingType::Residential,
                area: 3000.0,
                floors: 4,
                finishing_quality: FinishingQuality::Standard,
                currency: cfg.default_currency,
            },
            strategy: StrategyKind::LineItem,
            benchmark: cfg.benchmark.clone(),
            output_dir: cfg.output_dir.clone(),
            last: None,
        }
    }

    pub fn estimate(&mut self) -> EstimateResult<&Estimate> {
        let estimate =
            Estimator::new(self.tables, self.strategy).estimate(&self.input, &self.benchmark)?;
        Ok(self.last.insert(estimate))
    }

    pub fn last_estimate(&self) -> Option<&Estimate> {
        self.last.as_ref()
    }

    pub fn reset_benchmark(&mut self) {
        self.benchmark.reset();
    }

    /// Estimate the current form values and export the result.
    pub fn export(&mut self, formats: &[ExportFormat]) -> EstimateResult<Vec<PathBuf>> {
        let estimate =
            Estimator::new(self.tables, self.strategy).estimate(&self.input, &self.benchmark)?;
        let summary = format_report(&estimate, Utc::now());
        let paths =
            output::export_report(&summary, &self.output_dir, &report_stem(&estimate), formats)?;
        self.last = Some(estimate);
        Ok(paths)
    }
}

/// File name stem, e.g. `estimate_riyadh_2025_line-item`.
pub fn report_stem(estimate: &Estimate) -> String {
    let location: String = estimate
        .input
        .location
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("estimate_{}_{}_{}", location, estimate.input.year, estimate.strategy)
}

struct Console<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// `None` on end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }

    /// Prompt with the current value shown; an empty answer keeps it.
    fn edit<T>(&mut self, label: &str, current: T) -> io::Result<T>
    where
        T: FromStr + ToString,
        T::Err: std::fmt::Display,
    {
        let answer = self.read_line(&format!("{} [{}]: ", label, current.to_string()))?;
        match answer.as_deref() {
            None | Some("") => Ok(current),
            Some(text) => match text.parse::<T>() {
                Ok(v) => Ok(v),
                Err(e) => {
                    writeln!(self.out, "Invalid value ({}). Keeping {}.", e, current.to_string())?;
                    Ok(current)
                }
            },
        }
    }
}

fn print_menu<W: Write>(out: &mut W, session: &Session<'_>) -> io::Result<()> {
    writeln!(out, "\n=== Building Cost Estimator ===")?;
    writeln!(
        out,
        "{} | {} | {} | {} m2 x {} floors | {} | {} | {}",
        session.input.location,
        session.input.year,
        session.input.building_type,
        session.input.area,
        session.input.floors,
        session.input.finishing_quality,
        session.input.currency,
        session.strategy
    )?;
    writeln!(out, "[1] Project details")?;
    writeln!(out, "[2] Calculation method")?;
    writeln!(out, "[3] Edit benchmark rates")?;
    writeln!(out, "[4] Reset benchmark rates")?;
    writeln!(out, "[5] Estimate")?;
    writeln!(out, "[6] Export reports")?;
    writeln!(out, "[0] Exit\n")
}

fn edit_project<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &mut Session<'_>,
) -> io::Result<()> {
    writeln!(
        console.out,
        "Locations: {}  Years: {}",
        session.tables.locations().join(", "),
        session
            .tables
            .years()
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )?;
    let input = &mut session.input;
    input.location = console.edit("Location", input.location.clone())?;
    input.year = console.edit("Year", input.year)?;
    input.building_type = console.edit("Building type", input.building_type)?;
    input.area = console.edit("Area (m2)", input.area)?;
    input.floors = console.edit("Floors", input.floors)?;
    input.finishing_quality = console.edit("Finishing quality", input.finishing_quality)?;
    input.currency = console.edit::<Currency>("Currency", input.currency)?;
    Ok(())
}

fn edit_benchmark<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &mut Session<'_>,
) -> io::Result<()> {
    let cfg = &mut session.benchmark;
    for building_type in [BuildingType::Residential, BuildingType::Commercial] {
        let label = format!("{} base (SAR/m2)", building_type);
        let value = console.edit(&label, cfg.base(building_type))?;
        if let Err(e) = cfg.set_base(building_type, value) {
            writeln!(console.out, "{}", e)?;
        }
    }
    let cities: Vec<(String, f64)> = cfg
        .city_multipliers
        .iter()
        .map(|(c, m)| (c.clone(), *m))
        .collect();
    for (city, current) in cities {
        let value = console.edit(&format!("{} multiplier", city), current)?;
        if let Err(e) = cfg.set_city_multiplier(&city, value) {
            writeln!(console.out, "{}", e)?;
        }
    }
    Ok(())
}

fn show_estimate<W: Write>(out: &mut W, estimate: &Estimate) -> io::Result<()> {
    let summary = format_report(estimate, Utc::now());
    writeln!(out, "\nEstimation Results ({})", summary.strategy.label())?;
    writeln!(
        out,
        "Estimated Total Cost: {}",
        format_money(summary.total_cost, summary.currency)
    )?;
    writeln!(
        out,
        "Cost per m2: {}\n",
        format_money(summary.cost_per_m2, summary.currency)
    )?;
    write!(out, "{}", output::render_bar_chart(&summary.chart_data()))
}

fn report_error<W: Write>(out: &mut W, err: &EstimateError) -> io::Result<()> {
    writeln!(out, "Error: {}", err)?;
    if err.is_recoverable() {
        writeln!(out, "Adjust the project details and try again.")?;
    }
    Ok(())
}

/// Run the menu loop until the user exits or input ends.
pub fn run<R: BufRead, W: Write>(session: &mut Session<'_>, input: R, out: W) -> io::Result<()> {
    let mut console = Console { input, out };
    loop {
        print_menu(&mut console.out, session)?;
        let Some(choice) = console.read_line("Enter choice: ")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => edit_project(&mut console, session)?,
            "2" => {
                session.strategy = console.edit("Method (line-item/benchmark)", session.strategy)?;
            }
            "3" => edit_benchmark(&mut console, session)?,
            "4" => {
                session.reset_benchmark();
                writeln!(console.out, "Benchmark rates restored to defaults.")?;
            }
            "5" => match session.estimate() {
                Ok(estimate) => show_estimate(&mut console.out, estimate)?,
                Err(e) => report_error(&mut console.out, &e)?,
            },
            "6" => match session.export(&ExportFormat::ALL) {
                Ok(paths) => {
                    for p in paths {
                        writeln!(console.out, "Saved {}", p.display())?;
                    }
                }
                Err(e) => report_error(&mut console.out, &e)?,
            },
            "0" => {
                writeln!(console.out, "Exiting the program.")?;
                return Ok(());
            }
            _ => writeln!(console.out, "Invalid choice. Please enter 0-6.")?,
        }
    }
}
