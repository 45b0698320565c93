// src/export/mod.rs

use arrow::{
    array::{Array, ArrayRef, UInt16Array, UInt64Array},
    datatypes::{DataType, Field, Schema as ArrowSchema},
    record_batch::RecordBatch,
};
use glob::{glob, Pattern};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Deserialize;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info, warn};

use crate::error::{EvError, Result};

pub const PARTITION_KEY: &str = "model_year";
pub const COUNT_COLUMN: &str = "count";
const PART_FILE: &str = "part-0.parquet";

/// What to do when the export destination already holds files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingDestination {
    /// Refuse to write into a non-empty directory.
    #[default]
    Fail,
    /// Remove the directory and everything under it first.
    Replace,
}

pub fn year_count_schema() -> Arc<ArrowSchema> {
    Arc::new(ArrowSchema::new(vec![
        Field::new(PARTITION_KEY, DataType::UInt16, false),
        Field::new(COUNT_COLUMN, DataType::UInt64, false),
    ]))
}

/// `<dest>/model_year=<year>`
pub fn partition_dir(dest: &Path, year: u16) -> PathBuf {
    dest.join(format!("{}={}", PARTITION_KEY, year))
}

/// Glob matching every partition file under `dest`. `dest` itself is matched literally.
pub fn partition_glob(dest: &Path) -> String {
    format!(
        "{}/{}=*/*.parquet",
        Pattern::escape(&dest.display().to_string()),
        PARTITION_KEY
    )
}

fn prepare_destination(dest: &Path, policy: ExistingDestination) -> Result<()> {
    if dest.exists() {
        let occupied = fs::read_dir(dest)?.next().is_some();
        if occupied {
            match policy {
                ExistingDestination::Fail => {
                    return Err(EvError::state(format!(
                        "export destination {} is not empty",
                        dest.display()
                    )));
                }
                ExistingDestination::Replace => {
                    warn!(dest = %dest.display(), "replacing existing export");
                    fs::remove_dir_all(dest)?;
                }
            }
        }
    }
    fs::create_dir_all(dest)?;
    Ok(())
}

/// Write one Parquet file per model year under `dest`, hive-style.
///
/// Each file holds that year's `(model_year, count)` rows. Files are written to a
/// `.tmp` sibling and renamed into place. Returns the written paths in year order.
#[tracing::instrument(level = "info", skip(counts, dest), fields(dest = %dest.as_ref().display()))]
pub fn write_partitioned<P: AsRef<Path>>(
    counts: &[(u16, u64)],
    dest: P,
    policy: ExistingDestination,
) -> Result<Vec<PathBuf>> {
    let dest = dest.as_ref();
    prepare_destination(dest, policy)?;

    let mut by_year: Vec<(u16, u64)> = counts.to_vec();
    by_year.sort_by_key(|(year, _)| *year);

    let schema = year_count_schema();
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut written = Vec::new();
    for chunk in by_year.chunk_by(|a, b| a.0 == b.0) {
        let year = chunk[0].0;
        let dir = partition_dir(dest, year);
        fs::create_dir_all(&dir)?;

        let arrays: Vec<ArrayRef> = vec![
            Arc::new(UInt16Array::from_iter_values(chunk.iter().map(|(y, _)| *y))),
            Arc::new(UInt64Array::from_iter_values(chunk.iter().map(|(_, c)| *c))),
        ];
        let batch = RecordBatch::try_new(schema.clone(), arrays)?;

        let final_path = dir.join(PART_FILE);
        if let Err(e) = write_part_file(&final_path, &batch, &props) {
            warn!(
                year,
                completed = written.len(),
                error = %e,
                "export aborted, earlier partitions left in place"
            );
            return Err(e);
        }

        debug!(year, rows = batch.num_rows(), path = %final_path.display(), "wrote partition");
        written.push(final_path);
    }

    info!(partitions = written.len(), "export complete");
    Ok(written)
}

/// Write `batch` to a `.tmp` sibling of `final_path`, then rename it into place.
/// On failure the temporary is removed and `final_path` is untouched.
fn write_part_file(final_path: &Path, batch: &RecordBatch, props: &WriterProperties) -> Result<()> {
    let tmp = final_path.with_extension("tmp");
    let result = encode_and_rename(&tmp, final_path, batch, props);
    if result.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %e, "could not remove temporary partition file");
        }
    }
    result
}

fn encode_and_rename(
    tmp: &Path,
    final_path: &Path,
    batch: &RecordBatch,
    props: &WriterProperties,
) -> Result<()> {
    let file = File::create(tmp)?;
    let mut writer =
        ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props.clone()))?;
    writer.write(batch)?;
    writer.close()?;
    fs::rename(tmp, final_path)?;
    Ok(())
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str, path: &Path) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| {
            EvError::format(
                0,
                name,
                path.display().to_string(),
                "partition file column missing or of the wrong type",
            )
        })
}

/// Read every partition under `dest` back into `(model_year, count)` pairs, sorted by year.
pub fn read_partitions<P: AsRef<Path>>(dest: P) -> Result<Vec<(u16, u64)>> {
    let dest = dest.as_ref();
    let mut pairs = Vec::new();

    for entry in glob(&partition_glob(dest))? {
        let path = entry?;
        let file = File::open(&path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(1024)
            .build()?;
        for batch in reader {
            let batch = batch?;
            let years = column::<UInt16Array>(&batch, PARTITION_KEY, &path)?;
            let counts = column::<UInt64Array>(&batch, COUNT_COLUMN, &path)?;
            for i in 0..batch.num_rows() {
                pairs.push((years.value(i), counts.value(i)));
            }
        }
    }

    pairs.sort_unstable();
    Ok(pairs)
}
