// src/load/mod.rs
pub mod location;

use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
    str::FromStr,
    time::Instant,
};
use tracing::{debug, info, warn};

use crate::dataset::{Dataset, VehicleRecord};
use crate::error::{EvError, Result};
pub use location::parse_vehicle_location;

pub const COL_VIN: &str = "VIN (1-10)";
pub const COL_COUNTY: &str = "County";
pub const COL_CITY: &str = "City";
pub const COL_STATE: &str = "State";
pub const COL_POSTAL_CODE: &str = "Postal Code";
pub const COL_MODEL_YEAR: &str = "Model Year";
pub const COL_MAKE: &str = "Make";
pub const COL_MODEL: &str = "Model";
pub const COL_EV_TYPE: &str = "Electric Vehicle Type";
pub const COL_CAFV: &str = "Clean Alternative Fuel Vehicle (CAFV) Eligibility";
pub const COL_ELECTRIC_RANGE: &str = "Electric Range";
pub const COL_BASE_MSRP: &str = "Base MSRP";
pub const COL_LEGISLATIVE_DISTRICT: &str = "Legislative District";
pub const COL_DOL_VEHICLE_ID: &str = "DOL Vehicle ID";
pub const COL_VEHICLE_LOCATION: &str = "Vehicle Location";
pub const COL_ELECTRIC_UTILITY: &str = "Electric Utility";
pub const COL_CENSUS_TRACT: &str = "2020 Census Tract";

/// Where `dol_vehicle_id` is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DolVehicleIdSource {
    /// The `DOL Vehicle ID` column.
    #[default]
    Column,
    /// Copy of the legislative district value. Kept for parity with older exports
    /// that were produced this way.
    LegislativeDistrict,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub dol_vehicle_id: DolVehicleIdSource,
}

/// Header positions, resolved once per file.
struct Columns {
    vin: usize,
    county: usize,
    city: usize,
    state: usize,
    postal_code: usize,
    model_year: usize,
    make: usize,
    model: usize,
    ev_type: usize,
    cafv: usize,
    electric_range: usize,
    base_msrp: usize,
    legislative_district: usize,
    dol_vehicle_id: Option<usize>,
    location: usize,
    electric_utility: usize,
    census_tract: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord, options: &LoadOptions) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| EvError::format(0, name, "", "missing column in header"))
        };

        Ok(Self {
            vin: find(COL_VIN)?,
            county: find(COL_COUNTY)?,
            city: find(COL_CITY)?,
            state: find(COL_STATE)?,
            postal_code: find(COL_POSTAL_CODE)?,
            model_year: find(COL_MODEL_YEAR)?,
            make: find(COL_MAKE)?,
            model: find(COL_MODEL)?,
            ev_type: find(COL_EV_TYPE)?,
            cafv: find(COL_CAFV)?,
            electric_range: find(COL_ELECTRIC_RANGE)?,
            base_msrp: find(COL_BASE_MSRP)?,
            legislative_district: find(COL_LEGISLATIVE_DISTRICT)?,
            dol_vehicle_id: match options.dol_vehicle_id {
                DolVehicleIdSource::Column => Some(find(COL_DOL_VEHICLE_ID)?),
                DolVehicleIdSource::LegislativeDistrict => None,
            },
            location: find(COL_VEHICLE_LOCATION)?,
            electric_utility: find(COL_ELECTRIC_UTILITY)?,
            census_tract: find(COL_CENSUS_TRACT)?,
        })
    }
}

/// One CSV record plus its 1-based data row number, for error reporting.
struct Row<'a> {
    record: &'a StringRecord,
    number: usize,
}

impl Row<'_> {
    fn text(&self, idx: usize, column: &str) -> Result<&str> {
        self.record
            .get(idx)
            .ok_or_else(|| EvError::format(self.number, column, "", "field missing from row"))
    }

    fn int<T: FromStr>(&self, idx: usize, column: &str) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        let raw = self.text(idx, column)?;
        raw.trim()
            .parse::<T>()
            .map_err(|e| EvError::format(self.number, column, raw, e.to_string()))
    }

    /// Empty text is `None`; anything else must parse.
    fn opt_int<T: FromStr>(&self, idx: usize, column: &str) -> Result<Option<T>>
    where
        T::Err: std::fmt::Display,
    {
        if self.text(idx, column)?.is_empty() {
            return Ok(None);
        }
        self.int(idx, column).map(Some)
    }
}

fn parse_record(row: &Row<'_>, cols: &Columns) -> Result<VehicleRecord> {
    let legislative_district: Option<u16> =
        row.opt_int(cols.legislative_district, COL_LEGISLATIVE_DISTRICT)?;

    let dol_vehicle_id = match cols.dol_vehicle_id {
        Some(idx) => row.opt_int(idx, COL_DOL_VEHICLE_ID)?,
        None => legislative_district.map(u32::from),
    };

    let raw_location = row.text(cols.location, COL_VEHICLE_LOCATION)?;
    let location = if raw_location.is_empty() {
        None
    } else {
        let point = parse_vehicle_location(raw_location).map_err(|reason| {
            EvError::format(row.number, COL_VEHICLE_LOCATION, raw_location, reason)
        })?;
        Some(point)
    };

    Ok(VehicleRecord {
        vin: row.text(cols.vin, COL_VIN)?.to_string(),
        county: row.text(cols.county, COL_COUNTY)?.to_string(),
        city: row.text(cols.city, COL_CITY)?.to_string(),
        state: row.text(cols.state, COL_STATE)?.to_string(),
        postal_code: row.int(cols.postal_code, COL_POSTAL_CODE)?,
        model_year: row.int(cols.model_year, COL_MODEL_YEAR)?,
        make: row.text(cols.make, COL_MAKE)?.to_string(),
        model: row.text(cols.model, COL_MODEL)?.to_string(),
        electric_vehicle_type: row.text(cols.ev_type, COL_EV_TYPE)?.to_string(),
        cafv_eligibility: row.text(cols.cafv, COL_CAFV)?.to_string(),
        electric_range: row.int(cols.electric_range, COL_ELECTRIC_RANGE)?,
        base_msrp: row.int(cols.base_msrp, COL_BASE_MSRP)?,
        legislative_district,
        dol_vehicle_id,
        location,
        electric_utility: row.text(cols.electric_utility, COL_ELECTRIC_UTILITY)?.to_string(),
        census_tract_2020: row.int(cols.census_tract, COL_CENSUS_TRACT)?,
    })
}

/// Read every data row from `reader` (header first) into a `Dataset`.
///
/// The first bad field aborts the load; no partial dataset is returned.
pub fn load_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Dataset> {
    let start = Instant::now();
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let cols = Columns::resolve(&headers, options)?;
    if options.dol_vehicle_id == DolVehicleIdSource::LegislativeDistrict {
        warn!("dol_vehicle_id is copied from the legislative district column");
    }

    let mut records = Vec::new();
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record)? {
        let row = Row {
            record: &record,
            number: records.len() + 1,
        };
        records.push(parse_record(&row, &cols)?);
    }

    debug!(columns = headers.len(), "header resolved");
    info!(records = records.len(), elapsed = ?start.elapsed(), "loaded vehicle population");
    Ok(Dataset::from_records(records))
}

/// Open the CSV at `path` and load it.
#[tracing::instrument(level = "info", skip(path, options), fields(path = %path.as_ref().display()))]
pub fn load_path<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Dataset> {
    let file = File::open(&path)?;
    load_reader(BufReader::new(file), options)
}
