// Entry point and CLI flow.
//
// - `estimate` runs one estimate from flags and optionally exports reports.
// - `locations` lists what the rate tables cover.
// - `benchmark` shows (or resets) the benchmark rates in the config file.
// - `interactive` runs the menu session on stdin/stdout.
use building_cost_estimator::app::{self, report_stem, Session};
use building_cost_estimator::benchmark::BenchmarkConfig;
use building_cost_estimator::config::{self, AppConfig, DEFAULT_CONFIG_FILE};
use building_cost_estimator::currency::Currency;
use building_cost_estimator::errors::EstimateError;
use building_cost_estimator::estimate::Estimator;
use building_cost_estimator::loader::{LoadReport, RateTables};
use building_cost_estimator::output::{self, ExportFormat};
use building_cost_estimator::reports::format_report;
use building_cost_estimator::strategy::StrategyKind;
use building_cost_estimator::types::{BuildingType, FinishingQuality, ProjectInput};
use building_cost_estimator::util::{format_int, format_money};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "building_cost_estimator")]
#[command(version, about = "Building cost estimator for Gulf region projects")]
struct Cli {
    /// Settings file (created with defaults when missing)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Standard rate table CSV (overrides the config file)
    #[arg(long, global = true)]
    standard_table: Option<PathBuf>,

    /// Luxury rate table CSV (overrides the config file)
    #[arg(long, global = true)]
    luxury_table: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate one project
    Estimate(EstimateArgs),
    /// List locations and years covered by the rate tables
    Locations,
    /// Show the benchmark rates from the config file
    Benchmark {
        /// Write the default benchmark rates back to the config file
        #[arg(long)]
        reset: bool,
    },
    /// Menu-driven session
    Interactive,
}

#[derive(Args)]
struct EstimateArgs {
    #[arg(long)]
    location: String,

    /// Defaults to the latest year in the tables
    #[arg(long)]
    year: Option<i32>,

    #[arg(long, default_value_t = BuildingType::Residential)]
    building_type: BuildingType,

    /// Floor area in m2
    #[arg(long, default_value_t = 3000.0)]
    area: f64,

    #[arg(long, default_value_t = 4)]
    floors: u32,

    #[arg(long, default_value_t = FinishingQuality::Standard)]
    quality: FinishingQuality,

    /// Display currency (SAR, AED, USD); defaults to the config file
    #[arg(long)]
    currency: Option<Currency>,

    /// line-item or benchmark
    #[arg(long, default_value_t = StrategyKind::LineItem)]
    method: StrategyKind,

    /// Benchmark residential base rate (SAR/m2)
    #[arg(long)]
    residential_base: Option<f64>,

    /// Benchmark commercial base rate (SAR/m2)
    #[arg(long)]
    commercial_base: Option<f64>,

    /// Benchmark city multiplier as CITY=FACTOR; repeatable
    #[arg(long = "city-multiplier", value_parser = parse_city_multiplier)]
    city_multipliers: Vec<(String, f64)>,

    /// Start from the default benchmark rates instead of the config file
    #[arg(long)]
    reset_benchmark: bool,

    /// Report formats to write
    #[arg(long, value_enum, value_delimiter = ',')]
    export: Vec<ExportFormat>,

    /// Directory for exported reports (overrides the config file)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the report summary as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn parse_city_multiplier(s: &str) -> Result<(String, f64), String> {
    let (city, factor) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CITY=FACTOR, got '{}'", s))?;
    let factor: f64 = factor
        .trim()
        .parse()
        .map_err(|_| format!("invalid factor '{}'", factor.trim()))?;
    Ok((city.trim().to_string(), factor))
}

/// Load both rate tables; skipped rows are noted on stderr.
fn load_tables(cli: &Cli, cfg: &AppConfig) -> Result<(RateTables, [LoadReport; 2]), EstimateError> {
    let standard = cli.standard_table.as_ref().unwrap_or(&cfg.standard_table);
    let luxury = cli.luxury_table.as_ref().unwrap_or(&cfg.luxury_table);
    let (tables, reports) = RateTables::load_with_reports(standard, luxury)?;
    for (name, report) in ["Standard", "Luxury"].iter().zip(&reports) {
        if report.parse_errors > 0 {
            eprintln!(
                "Note: {} rows skipped in the {} table due to parse/validation errors.",
                format_int(report.parse_errors),
                name
            );
        }
    }
    Ok((tables, reports))
}

fn handle_estimate(args: &EstimateArgs, tables: &RateTables, cfg: &AppConfig) -> Result<(), Box<dyn Error>> {
    let mut benchmark = if args.reset_benchmark {
        BenchmarkConfig::defaults()
    } else {
        cfg.benchmark.clone()
    };
    if let Some(v) = args.residential_base {
        benchmark.set_base(BuildingType::Residential, v)?;
    }
    if let Some(v) = args.commercial_base {
        benchmark.set_base(BuildingType::Commercial, v)?;
    }
    for (city, factor) in &args.city_multipliers {
        benchmark.set_city_multiplier(city, *factor)?;
    }

    let year = match args.year {
        Some(y) => y,
        None => tables
            .table(args.quality)
            .years()
            .last()
            .copied()
            .ok_or_else(|| EstimateError::invalid_input("year", "", "rate table has no years"))?,
    };
    let input = ProjectInput {
        location: args.location.clone(),
        year,
        building_type: args.building_type,
        area: args.area,
        floors: args.floors,
        finishing_quality: args.quality,
        currency: args.currency.unwrap_or(cfg.default_currency),
    };

    let estimate = Estimator::new(tables, args.method).estimate(&input, &benchmark)?;
    let summary = format_report(&estimate, Utc::now());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Estimation Results ({})\n", summary.strategy.label());
        println!("Estimated Total Cost: {}", format_money(summary.total_cost, summary.currency));
        println!("Cost per m2: {}\n", format_money(summary.cost_per_m2, summary.currency));
        output::preview_table_rows(&summary.breakdown_rows(), 6);
        print!("{}", output::render_bar_chart(&summary.chart_data()));
        if !summary.line_items.is_empty() {
            println!();
            output::preview_table_rows(&summary.line_items, summary.line_items.len());
        }
    }

    if !args.export.is_empty() {
        let dir = args.output_dir.as_ref().unwrap_or(&cfg.output_dir);
        let paths = output::export_report(&summary, dir, &report_stem(&estimate), &args.export)?;
        for p in paths {
            eprintln!("Saved {}", p.display());
        }
    }
    Ok(())
}

fn handle_locations(tables: &RateTables, reports: &[LoadReport; 2]) {
    let named = [("Standard", &tables.standard), ("Luxury", &tables.luxury)];
    for ((name, table), report) in named.into_iter().zip(reports) {
        let years: Vec<String> = table.years().iter().map(|y| y.to_string()).collect();
        println!(
            "{} ({} of {} rows loaded): {} | years {}",
            name,
            format_int(report.loaded_rows),
            format_int(report.total_rows),
            table.locations().join(", "),
            years.join(", ")
        );
    }
}

fn handle_benchmark(cli: &Cli, cfg: &mut AppConfig, reset: bool) -> Result<(), Box<dyn Error>> {
    if reset {
        cfg.benchmark.reset();
        cfg.save(&cli.config)?;
        println!("Benchmark rates reset in {}", cli.config.display());
    }
    print!("{}", toml::to_string_pretty(&cfg.benchmark)?);
    Ok(())
}

fn try_run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut cfg = config::load_or_default(&cli.config)?;
    match &cli.command {
        Commands::Benchmark { reset } => handle_benchmark(&cli, &mut cfg, *reset),
        Commands::Locations => {
            let (tables, reports) = load_tables(&cli, &cfg)?;
            handle_locations(&tables, &reports);
            Ok(())
        }
        Commands::Estimate(args) => {
            let (tables, _) = load_tables(&cli, &cfg)?;
            handle_estimate(args, &tables, &cfg)
        }
        Commands::Interactive => {
            let (tables, _) = load_tables(&cli, &cfg)?;
            let mut session = Session::new(&tables, &cfg);
            let stdin = io::stdin();
            app::run(&mut session, stdin.lock(), io::stdout())?;
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match try_run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            match e.downcast_ref::<EstimateError>() {
                Some(err) if err.is_recoverable() => ExitCode::from(1),
                _ => ExitCode::from(2),
            }
        }
    }
}
