//! gold-tracker CLI: fetch, re-parse, summarize and export gold price data.
//!
//! Commands:
//! - `fetch`: fetch one or more categories (all by default) and save them
//! - `parse`: run the pipeline on a saved page without touching the network
//! - `summary` / `compare`: cross-category views of the latest files
//! - `export`: write the combined workbook
//! - `run`: fetch everything, print the report and views, export (scheduled use)

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use gold_tracker::{config, FetchOptions, GoldDataManager, GoldType, RunReport};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gold-tracker", about = "Sina Finance gold price tracker")]
struct Cli {
    /// Directory for all output files.
    #[arg(long, global = true, env = "GOLD_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch categories and save latest + snapshot files.
    Fetch {
        /// Categories to fetch (jewelry, physical, gold_bar). Defaults to all.
        categories: Vec<GoldType>,

        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Parse a saved page for one category and save the results.
    Parse {
        /// HTML file to parse.
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        category: GoldType,
    },
    /// Per-category record counts, latest dates and mean prices.
    Summary,
    /// Price range per category.
    Compare,
    /// Export all latest data into one workbook.
    Export {
        #[arg(long, default_value = config::COMBINED_WORKBOOK)]
        output: String,
    },
    /// Fetch all categories, report, and export.
    Run {
        #[command(flatten)]
        fetch: FetchArgs,
    },
}

#[derive(Args)]
struct FetchArgs {
    /// Start date (YYYY-MM-DD). Defaults to 30 days before the end date.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Override the endpoint URL.
    #[arg(long)]
    url: Option<String>,

    /// Brand-class parameter; requires --pz.
    #[arg(long, requires = "pz")]
    pp: Option<u32>,

    /// Product-class parameter; requires --pp.
    #[arg(long, requires = "pp")]
    pz: Option<u32>,
}

impl FetchArgs {
    fn options(&self) -> FetchOptions {
        FetchOptions {
            params: self.pp.zip(self.pz),
            start: self.start,
            end: self.end,
            url: self.url.clone(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut manager = GoldDataManager::builder()
        .data_dir(&cli.data_dir)
        .build()
        .context("failed to open data directory")?;

    match cli.command {
        Commands::Fetch { categories, fetch } => {
            let types = if categories.is_empty() {
                GoldType::ALL.to_vec()
            } else {
                categories
            };
            let report = manager.run(&types, &fetch.options());
            finish_run(&report)?;
        }
        Commands::Parse { input, category } => {
            let html = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let batch = manager.process_html(category, &html)?;
            println!(
                "{}: {} records ({} skipped) -> {}",
                category.name(),
                batch.records,
                batch.stats.skipped,
                batch.files.latest.display()
            );
        }
        Commands::Summary => print_summary(&manager)?,
        Commands::Compare => print_comparison(&manager)?,
        Commands::Export { output } => export(&manager, &output)?,
        Commands::Run { fetch } => {
            let report = manager.run_all(&fetch.options());
            print!("{report}");
            if report.all_failed() {
                bail!("every category failed");
            }
            print_summary(&manager)?;
            print_comparison(&manager)?;
            export(&manager, config::COMBINED_WORKBOOK)?;
        }
    }

    Ok(())
}

fn finish_run(report: &RunReport) -> Result<()> {
    print!("{report}");
    if report.all_failed() {
        bail!("every category failed");
    }
    Ok(())
}

fn print_summary(manager: &GoldDataManager) -> Result<()> {
    println!("Per-category data:");
    for s in manager.all_data_summary()? {
        println!(
            "  {:<6} {:>5} records, {:>3} brands, latest {}, avg {:.2} 元/克",
            s.name,
            s.count,
            s.brands,
            s.latest_date.as_deref().unwrap_or("无数据"),
            s.avg_price
        );
    }
    Ok(())
}

fn print_comparison(manager: &GoldDataManager) -> Result<()> {
    println!("Price comparison:");
    for c in manager.compare_gold_types()? {
        println!(
            "  {:<6} max {:.2}, min {:.2}, avg {:.2} 元/克 ({} prices)",
            c.name, c.max_price, c.min_price, c.avg_price, c.count
        );
    }
    Ok(())
}

#[cfg(feature = "xlsx")]
fn export(manager: &GoldDataManager, output: &str) -> Result<()> {
    let path = manager.export_combined_data(output)?;
    println!("Exported {}", path.display());
    Ok(())
}

#[cfg(not(feature = "xlsx"))]
fn export(_manager: &GoldDataManager, _output: &str) -> Result<()> {
    tracing::warn!("built without the `xlsx` feature; skipping workbook export");
    Ok(())
}
