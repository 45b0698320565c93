// src/dataset.rs

use arrow::array::{
    ArrayRef, Float64Array, StringArray, UInt16Array, UInt32Array, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use crate::error::Result;

/// A `POINT (<lon> <lat>)` location. Longitude and latitude only ever travel together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
}

/// One registered electric vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRecord {
    pub vin: String,
    pub county: String,
    pub city: String,
    pub state: String,
    pub postal_code: u32,
    pub model_year: u16,
    pub make: String,
    pub model: String,
    pub electric_vehicle_type: String,
    pub cafv_eligibility: String,
    pub electric_range: u16,
    pub base_msrp: u32,
    pub legislative_district: Option<u16>,
    pub dol_vehicle_id: Option<u32>,
    pub location: Option<Point>,
    pub electric_utility: String,
    pub census_tract_2020: u64,
}

impl VehicleRecord {
    /// Make and model joined by a single space, e.g. `TESLA MODEL 3`.
    pub fn vehicle(&self) -> String {
        format!("{} {}", self.make, self.model)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|p| p.longitude)
    }

    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|p| p.latitude)
    }
}

/// The loaded table. Built once by the loader and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<VehicleRecord>,
}

impl Dataset {
    pub(crate) fn from_records(records: Vec<VehicleRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in file order.
    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleRecord> {
        self.records.iter()
    }

    /// Arrow schema of the columnar view, one field per record column plus the derived `Vehicle`.
    pub fn schema() -> Arc<ArrowSchema> {
        Arc::new(ArrowSchema::new(vec![
            Field::new("VIN_1_10", DataType::Utf8, false),
            Field::new("County", DataType::Utf8, false),
            Field::new("City", DataType::Utf8, false),
            Field::new("State", DataType::Utf8, false),
            Field::new("Postal_Code", DataType::UInt32, false),
            Field::new("Model_Year", DataType::UInt16, false),
            Field::new("Make", DataType::Utf8, false),
            Field::new("Model", DataType::Utf8, false),
            Field::new("Vehicle", DataType::Utf8, false),
            Field::new("Electric_Vehicle_Type", DataType::Utf8, false),
            Field::new(
                "Clean_Alternative_Fuel_Vehicle_CAFV_Eligibility",
                DataType::Utf8,
                false,
            ),
            Field::new("Electric_Range", DataType::UInt16, false),
            Field::new("Base_MSRP", DataType::UInt32, false),
            Field::new("Legislative_District", DataType::UInt16, true),
            Field::new("DOL_Vehicle_ID", DataType::UInt32, true),
            Field::new("Longitude", DataType::Float64, true),
            Field::new("Latitude", DataType::Float64, true),
            Field::new("Electric_Utility", DataType::Utf8, false),
            Field::new("y_2020_Census_Tract", DataType::UInt64, false),
        ]))
    }

    /// Columnar view of the whole table as a single record batch.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let r = &self.records;
        let strings = |f: fn(&VehicleRecord) -> &str| -> ArrayRef {
            Arc::new(StringArray::from_iter_values(r.iter().map(f)))
        };

        let columns: Vec<ArrayRef> = vec![
            strings(|v| &v.vin),
            strings(|v| &v.county),
            strings(|v| &v.city),
            strings(|v| &v.state),
            Arc::new(UInt32Array::from_iter_values(r.iter().map(|v| v.postal_code))),
            Arc::new(UInt16Array::from_iter_values(r.iter().map(|v| v.model_year))),
            strings(|v| &v.make),
            strings(|v| &v.model),
            Arc::new(StringArray::from_iter_values(r.iter().map(|v| v.vehicle()))),
            strings(|v| &v.electric_vehicle_type),
            strings(|v| &v.cafv_eligibility),
            Arc::new(UInt16Array::from_iter_values(
                r.iter().map(|v| v.electric_range),
            )),
            Arc::new(UInt32Array::from_iter_values(r.iter().map(|v| v.base_msrp))),
            Arc::new(UInt16Array::from_iter(
                r.iter().map(|v| v.legislative_district),
            )),
            Arc::new(UInt32Array::from_iter(r.iter().map(|v| v.dol_vehicle_id))),
            Arc::new(Float64Array::from_iter(r.iter().map(|v| v.longitude()))),
            Arc::new(Float64Array::from_iter(r.iter().map(|v| v.latitude()))),
            strings(|v| &v.electric_utility),
            Arc::new(UInt64Array::from_iter_values(
                r.iter().map(|v| v.census_tract_2020),
            )),
        ];

        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use arrow::array::Array;

    pub(crate) fn record(city: &str, postal_code: u32, year: u16, make: &str, model: &str) -> VehicleRecord {
        VehicleRecord {
            vin: "5YJ3E1EB4L".to_string(),
            county: "Yakima".to_string(),
            city: city.to_string(),
            state: "WA".to_string(),
            postal_code,
            model_year: year,
            make: make.to_string(),
            model: model.to_string(),
            electric_vehicle_type: "Battery Electric Vehicle (BEV)".to_string(),
            cafv_eligibility: "Clean Alternative Fuel Vehicle Eligible".to_string(),
            electric_range: 100,
            base_msrp: 0,
            legislative_district: None,
            dol_vehicle_id: None,
            location: None,
            electric_utility: String::new(),
            census_tract_2020: 53077000904,
        }
    }

    #[test]
    fn vehicle_joins_make_and_model() {
        let r = record("Yakima", 98908, 2020, "TESLA", "MODEL 3");
        assert_eq!(r.vehicle(), "TESLA MODEL 3");
        assert_eq!(r.longitude(), None);
        assert_eq!(r.latitude(), None);
    }

    #[test]
    fn record_batch_keeps_nulls_for_optional_columns() -> anyhow::Result<()> {
        let mut located = record("Yakima", 98908, 2020, "TESLA", "MODEL 3");
        located.location = Some(Point {
            longitude: -120.56916,
            latitude: 46.58514,
        });
        located.legislative_district = Some(14);
        let bare = record("Eugene", 98908, 2021, "VOLVO", "S60");
        let ds = Dataset::from_records(vec![located, bare]);

        let batch = ds.to_record_batch()?;
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), Dataset::schema().fields().len());

        let vehicle = batch
            .column_by_name("Vehicle")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(vehicle.value(1), "VOLVO S60");

        let lon = batch
            .column_by_name("Longitude")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(lon.value(0), -120.56916);
        assert!(lon.is_null(1));

        let district = batch
            .column_by_name("Legislative_District")
            .unwrap()
            .as_any()
            .downcast_ref::<UInt16Array>()
            .unwrap();
        assert_eq!(district.value(0), 14);
        assert!(district.is_null(1));
        Ok(())
    }
}
