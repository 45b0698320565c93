// src/load/location.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dataset::Point;

static POINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^POINT \(([^ ]+) ([^ ]+)\)$").expect("static regex"));

/// Parses a WKT-style `POINT (<lon> <lat>)` string.
///
/// Exactly one space separates the two coordinates and each must parse as a float.
/// Returns the reason on failure so the caller can attach row and column.
pub fn parse_vehicle_location(text: &str) -> Result<Point, String> {
    let caps = POINT_RE
        .captures(text)
        .ok_or_else(|| "invalid point string format".to_string())?;

    let longitude: f64 = caps[1]
        .parse()
        .map_err(|_| format!("invalid longitude {:?}", &caps[1]))?;
    let latitude: f64 = caps[2]
        .parse()
        .map_err(|_| format!("invalid latitude {:?}", &caps[2]))?;

    Ok(Point {
        longitude,
        latitude,
    })
}
