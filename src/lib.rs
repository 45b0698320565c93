pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod load;
pub mod logging;
pub mod session;

pub use config::Config;
pub use dataset::{Dataset, Point, VehicleRecord};
pub use error::{EvError, Result};
pub use session::{EvPopulation, Session};
