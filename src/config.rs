// src/config.rs

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{EvError, Result};
use crate::export::ExistingDestination;
use crate::load::{DolVehicleIdSource, LoadOptions};

pub const DEFAULT_INPUT: &str = "data/Electric_Vehicle_Population_Data.csv";
pub const DEFAULT_EXPORT_DIR: &str = "count_cars_by_year";

/// Run settings. Every field has a default, so a YAML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: PathBuf,
    pub export_dir: PathBuf,
    pub top_n: u32,
    pub existing_destination: ExistingDestination,
    pub dol_vehicle_id: DolVehicleIdSource,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            top_n: 3,
            existing_destination: ExistingDestination::default(),
            dol_vehicle_id: DolVehicleIdSource::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| EvError::config("<inline>", e.to_string()))
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)?;
        serde_yaml::from_str(&text)
            .map_err(|e| EvError::config(path.as_ref().display().to_string(), e.to_string()))
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            dol_vehicle_id: self.dol_vehicle_id,
        }
    }
}
