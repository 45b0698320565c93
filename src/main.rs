use anyhow::{Context, Result};
use clap::Parser;
use evpop::{export::ExistingDestination, logging, Config, EvPopulation};
use std::path::PathBuf;
use tracing::info;

/// Answer the fixed population questions over an electric vehicle registration CSV.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// YAML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input CSV
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory for the per-year Parquet export
    #[arg(long)]
    out: Option<PathBuf>,

    /// Highest dense rank to report for popular vehicles
    #[arg(long)]
    top: Option<u32>,

    /// Replace an existing, non-empty export directory
    #[arg(long)]
    replace: bool,
}

impl Args {
    fn resolve(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_yaml_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(out) = self.out {
            config.export_dir = out;
        }
        if let Some(top) = self.top {
            config.top_n = top;
        }
        if self.replace {
            config.existing_destination = ExistingDestination::Replace;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let config = Args::parse().resolve()?;

    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init(&config.log_filter);
    info!(input = %config.input.display(), "startup");

    // ─── 2) open the dataset for the whole run ──────────────────────
    let mut evp = EvPopulation::from_config(&config);
    let session = evp
        .session()
        .with_context(|| format!("loading {}", config.input.display()))?;

    // ─── 3) per city ─────────────────────────────────────────────────
    println!("Count the number of electric cars per city.");
    for row in session.count_cars_by_city()? {
        println!("  {}: {}", row.city, row.count);
    }

    // ─── 4) top vehicles, grouped under their rank ───────────────────
    println!(
        "Find the top {} most popular electric vehicles.",
        config.top_n
    );
    let mut last_rank = None;
    for row in session.top_n_vehicles(config.top_n)? {
        if last_rank != Some(row.rank) {
            println!("  #{}", row.rank);
            last_rank = Some(row.rank);
        }
        println!("    {} ({})", row.vehicle, row.count);
    }

    // ─── 5) per postal code ──────────────────────────────────────────
    println!("Find the most popular electric vehicle in each postal code.");
    for (postal_code, vehicles) in session.most_popular_by_postal_code()? {
        let listed: Vec<String> = vehicles
            .iter()
            .map(|v| format!("{} ({})", v.vehicle, v.count))
            .collect();
        println!("  {}: {}", postal_code, listed.join(", "));
    }

    // ─── 6) per model year, exported ─────────────────────────────────
    println!("Count the number of electric cars by model year.");
    println!("Write out the answer as parquet files partitioned by year.");
    let by_year = session
        .count_cars_by_year(&config.export_dir)
        .with_context(|| format!("exporting to {}", config.export_dir.display()))?;
    for (year, count) in by_year {
        println!("  {}: {}", year, count);
    }

    info!(export_dir = %config.export_dir.display(), "all done");
    Ok(())
}
