// src/session.rs

use std::{
    collections::BTreeMap,
    ops::Deref,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::aggregate::{self, CityCount, RankedVehicle, VehicleCount};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{EvError, Result};
use crate::export::{self, ExistingDestination};
use crate::load::{self, LoadOptions};

/// Handle over one CSV file. Closed until `open` (or `session`) loads the dataset.
///
/// Each handle owns its dataset; nothing is shared between handles.
#[derive(Debug)]
pub struct EvPopulation {
    csv_path: PathBuf,
    options: LoadOptions,
    export_policy: ExistingDestination,
    dataset: Option<Dataset>,
}

impl EvPopulation {
    pub fn new(csv_path: impl Into<PathBuf>, options: LoadOptions) -> Self {
        Self {
            csv_path: csv_path.into(),
            options,
            export_policy: ExistingDestination::default(),
            dataset: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.input, config.load_options())
            .with_export_policy(config.existing_destination)
    }

    pub fn with_export_policy(mut self, policy: ExistingDestination) -> Self {
        self.export_policy = policy;
        self
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn is_open(&self) -> bool {
        self.dataset.is_some()
    }

    /// Load the CSV. Fails if already open; a failed load leaves the handle closed.
    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(EvError::state(format!(
                "{} is already open",
                self.csv_path.display()
            )));
        }
        let dataset = load::load_path(&self.csv_path, &self.options)?;
        info!(path = %self.csv_path.display(), records = dataset.len(), "session opened");
        self.dataset = Some(dataset);
        Ok(())
    }

    /// Release the dataset. Closing a closed handle does nothing.
    pub fn close(&mut self) {
        if self.dataset.take().is_some() {
            debug!(path = %self.csv_path.display(), "session closed");
        }
    }

    /// Open and return a guard that closes the handle when dropped.
    pub fn session(&mut self) -> Result<Session<'_>> {
        self.open()?;
        Ok(Session { owner: self })
    }

    pub fn dataset(&self) -> Result<&Dataset> {
        self.dataset.as_ref().ok_or_else(|| {
            EvError::state(format!("{} is not open", self.csv_path.display()))
        })
    }

    pub fn count_cars_by_city(&self) -> Result<Vec<CityCount>> {
        Ok(aggregate::count_cars_by_city(self.dataset()?))
    }

    pub fn top_n_vehicles(&self, n: u32) -> Result<Vec<RankedVehicle>> {
        Ok(aggregate::top_n_vehicles(self.dataset()?, n))
    }

    pub fn top_3_electric_vehicles(&self) -> Result<Vec<RankedVehicle>> {
        self.top_n_vehicles(3)
    }

    pub fn most_popular_by_postal_code(&self) -> Result<BTreeMap<u32, Vec<VehicleCount>>> {
        Ok(aggregate::most_popular_vehicle_by_postal_code(
            self.dataset()?,
        ))
    }

    /// Count vehicles per model year and export the counts partitioned by year under `dest`.
    ///
    /// Writes to disk on every call; an occupied `dest` is handled per the export policy.
    pub fn count_cars_by_year<P: AsRef<Path>>(&self, dest: P) -> Result<BTreeMap<u16, u64>> {
        let counts = aggregate::count_cars_by_year(self.dataset()?);
        let pairs: Vec<(u16, u64)> = counts.iter().map(|(y, c)| (*y, *c)).collect();
        export::write_partitioned(&pairs, dest, self.export_policy)?;
        Ok(counts)
    }
}

/// An open `EvPopulation`. Dropping it closes the handle on every exit path.
pub struct Session<'a> {
    owner: &'a mut EvPopulation,
}

impl Deref for Session<'_> {
    type Target = EvPopulation;

    fn deref(&self) -> &EvPopulation {
        &*self.owner
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.owner.close();
    }
}
