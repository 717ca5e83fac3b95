//! Vitalog CLI
//!
//! Command-line interface for working with a local Apple Health export:
//! - List the metric catalog
//! - Inspect an export
//! - Print or save a metric's daily series and summary
//! - Generate a config file

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use vitalog::aggregate::{empty_csv, summarize, to_csv, DailyAggregator, DailySeries};
use vitalog::catalog::{display_name, MetricCatalog, SeriesField};
use vitalog::config::Config;
use vitalog::extract::{Dataset, RecordExtractor};

#[derive(Parser)]
#[command(name = "vitalog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily summaries from an Apple Health export")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List categories and metrics
    Catalog,

    /// Extract an export and show what it contains
    Inspect {
        /// export.xml or export.zip
        file: PathBuf,
    },

    /// Daily series and summary for one metric
    Daily {
        /// export.xml or export.zip
        file: PathBuf,
        /// Metric identifier or display name (e.g. StepCount)
        #[arg(short, long)]
        metric: String,
        /// First day, YYYY-MM-DD (default: export's first day)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day, YYYY-MM-DD (default: export's last day)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Field to summarize: mean, sum, min, max (default: total or average)
        #[arg(long)]
        field: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    vitalog::logging::init(&config.logging);

    let format = cli.format.to_lowercase();
    if !matches!(format.as_str(), "table" | "json" | "csv") {
        bail!("Invalid format: {}. Use: table, json, csv", cli.format);
    }

    match cli.command {
        Commands::Catalog => {
            let catalog = config.build_catalog()?;
            print_catalog(&catalog, &format)?;
        }

        Commands::Inspect { file } => {
            let catalog = config.build_catalog()?;
            let dataset = extract(&catalog, &file)?;

            if format == "json" {
                let categories: Vec<serde_json::Value> = dataset
                    .categories_present(&catalog)
                    .into_iter()
                    .map(|category| {
                        let metrics: Vec<serde_json::Value> = dataset
                            .metrics_available(&catalog, category)
                            .unwrap_or_default()
                            .into_iter()
                            .map(|m| {
                                serde_json::json!({
                                    "id": m,
                                    "observations": dataset.count_for(m),
                                    "date_range": dataset.metric_date_bounds(m),
                                })
                            })
                            .collect();
                        serde_json::json!({"name": category, "metrics": metrics})
                    })
                    .collect();

                let body = serde_json::json!({
                    "stats": dataset.extract_stats(),
                    "date_range": dataset.date_bounds(),
                    "categories": categories,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_inspect(&catalog, &dataset);
            }
        }

        Commands::Daily {
            file,
            metric,
            start,
            end,
            field,
            output,
        } => {
            let catalog = config.build_catalog()?;
            let metric = catalog.resolve(&metric)?.to_string();
            let policy = catalog.policy_of(&metric)?;
            let field = match field.as_deref() {
                Some(f) => match SeriesField::from_str(f) {
                    Some(field) if policy.fields().contains(&field) => field,
                    Some(_) => bail!("Field {} is not produced by the {} policy", f, policy),
                    None => bail!("Invalid field: {}. Use: mean, sum, min, max", f),
                },
                None => policy.primary_field(),
            };
            let dataset = extract(&catalog, &file)?;

            let bounds = dataset.date_bounds();
            let series = match (start.or(bounds.map(|b| b.0)), end.or(bounds.map(|b| b.1))) {
                (Some(start), Some(end)) => Some(
                    DailyAggregator::new(&catalog).aggregate(
                        dataset.observations(),
                        &metric,
                        start,
                        end,
                    )?,
                ),
                _ => None,
            };

            let rendered =
                render_daily(&catalog, &metric, &format, series.as_ref(), field, &file)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &rendered)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!(
                        "Wrote {} days to {:?}",
                        series.as_ref().map_or(0, DailySeries::len),
                        path
                    );
                }
                None => print!("{}", rendered),
            }
        }

        Commands::Config { output } => {
            let config = vitalog::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn extract(catalog: &MetricCatalog, path: &Path) -> anyhow::Result<Dataset> {
    let started = Instant::now();
    let dataset = RecordExtractor::new(catalog)
        .extract_path(path)
        .with_context(|| format!("Failed to read export {:?}", path))?;

    eprintln!(
        "Extracted {} in {:.1}s",
        dataset.extract_stats(),
        started.elapsed().as_secs_f64()
    );
    Ok(dataset)
}

fn print_catalog(catalog: &MetricCatalog, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => {
            let categories: Vec<serde_json::Value> = catalog
                .categories()
                .iter()
                .map(|category| {
                    let metrics: Vec<serde_json::Value> = category
                        .metrics
                        .iter()
                        .map(|id| {
                            serde_json::json!({
                                "id": id,
                                "name": display_name(id),
                                "policy": catalog.policy_of(id).unwrap_or_default(),
                            })
                        })
                        .collect();
                    serde_json::json!({"name": category.name, "metrics": metrics})
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
        "csv" => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["category", "metric", "policy"])?;
            for category in catalog.categories() {
                for id in &category.metrics {
                    let policy = catalog.policy_of(id).unwrap_or_default().to_string();
                    wtr.write_record([category.name.as_str(), id.as_str(), policy.as_str()])?;
                }
            }
            wtr.flush()?;
        }
        _ => {
            for category in catalog.categories() {
                println!("{}", category.name);
                for id in &category.metrics {
                    let policy = catalog.policy_of(id).unwrap_or_default();
                    println!("  {:<28} {:<14} {}", display_name(id), policy.to_string(), id);
                }
            }
        }
    }
    Ok(())
}

fn print_inspect(catalog: &MetricCatalog, dataset: &Dataset) {
    println!("{}", dataset.extract_stats());

    match dataset.date_bounds() {
        Some((start, end)) => println!("Dates: {} to {}", start, end),
        None => {
            println!("No recognized observations");
            return;
        }
    }

    for category in dataset.categories_present(catalog) {
        println!();
        println!("{}", category);
        for metric in dataset.metrics_available(catalog, category).unwrap_or_default() {
            let span = dataset
                .metric_date_bounds(metric)
                .map(|(first, last)| format!("{} to {}", first, last))
                .unwrap_or_default();
            println!(
                "  {:<28} {:>10}  {}",
                display_name(metric),
                dataset.count_for(metric),
                span
            );
        }
    }
}

/// Render a daily series, or an empty one when the export has no observations
fn render_daily(
    catalog: &MetricCatalog,
    metric: &str,
    format: &str,
    series: Option<&DailySeries>,
    field: SeriesField,
    source: &Path,
) -> anyhow::Result<String> {
    let policy = catalog.policy_of(metric)?;

    Ok(match (format, series) {
        ("csv", Some(series)) => to_csv(series)?,
        ("csv", None) => empty_csv(policy)?,
        ("json", Some(series)) => {
            let summary = if series.is_empty() {
                None
            } else {
                Some(summarize(&series.rows, field)?)
            };
            let body = serde_json::json!({"series": series, "summary": summary});
            format!("{}\n", serde_json::to_string_pretty(&body)?)
        }
        ("json", None) => {
            let body = serde_json::json!({
                "series": {
                    "metric_id": metric,
                    "category": catalog.category_of(metric)?,
                    "policy": policy,
                    "rows": [],
                },
                "summary": null,
            });
            format!("{}\n", serde_json::to_string_pretty(&body)?)
        }
        (_, Some(series)) => render_table(series, field)?,
        (_, None) => format!(
            "{}: no recognized observations in {}\n",
            display_name(metric),
            source.display()
        ),
    })
}

fn render_table(series: &DailySeries, field: SeriesField) -> anyhow::Result<String> {
    use std::fmt::Write;

    let mut out = String::new();
    writeln!(
        out,
        "{} ({}) {} to {}",
        display_name(&series.metric_id),
        series.category,
        series.range.start,
        series.range.end
    )?;

    if series.is_empty() {
        writeln!(out, "No data for the selected date range")?;
        return Ok(out);
    }

    let summary = summarize(&series.rows, field)?;
    for (label, value) in summary.display_values() {
        writeln!(out, "  {:<10} {}", label, value)?;
    }
    writeln!(out, "  {:<10} {}", "Total Days", summary.days)?;
    writeln!(out)?;

    // Header
    write!(out, "{:<12}", "Date")?;
    for field in series.fields() {
        write!(out, " | {:<10}", field.label())?;
    }
    writeln!(out)?;

    // Separator
    writeln!(out, "{}", "-".repeat(12 + series.fields().len() * 13))?;

    // Data rows
    for row in &series.rows {
        write!(out, "{:<12}", row.date.to_string())?;
        for field in series.fields() {
            let val = row
                .get(*field)
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "-".to_string());
            write!(out, " | {:<10}", val)?;
        }
        writeln!(out)?;
    }

    Ok(out)
}
