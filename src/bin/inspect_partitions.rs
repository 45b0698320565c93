// src/bin/inspect_partitions.rs

use anyhow::{bail, Context, Result};
use clap::Parser;
use evpop::export::{partition_glob, read_partitions};
use evpop::logging;
use std::path::PathBuf;
use tracing::info;

/// Read back a per-year export and print every (model_year, count) pair.
#[derive(Parser, Debug)]
struct Args {
    /// Export directory written by `evpop`
    #[arg(default_value = "count_cars_by_year")]
    dir: PathBuf,
}

fn main() -> Result<()> {
    logging::init("info");
    let args = Args::parse();

    let pattern = partition_glob(&args.dir);
    info!(pattern = %pattern, "scanning partitions");

    let pairs = read_partitions(&args.dir)
        .with_context(|| format!("reading partitions under {}", args.dir.display()))?;
    if pairs.is_empty() {
        bail!("no partitions found matching '{}'", pattern);
    }

    println!("{: <12} {:>12}", "model_year", "count");
    println!("{:-<25}", "");
    for (year, count) in &pairs {
        println!("{: <12} {:>12}", year, count);
    }
    println!("{:-<25}", "");

    let total: u64 = pairs.iter().map(|(_, c)| c).sum();
    println!("{} partitions, {} vehicles", pairs.len(), total);
    Ok(())
}
