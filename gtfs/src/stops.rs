use serde::{Deserialize, Serialize};

use crate::{Error, Result, StopID, Table, TableName};

/// A stop as read from stops.txt. Coordinates stay text until a stop is actually shown, so one bad
/// row elsewhere in the file doesn't break every query.
#[derive(Clone, Debug, Deserialize)]
pub struct Stop {
    /// Exactly as written in stops.txt
    pub stop_id: String,
    #[serde(default)]
    pub stop_name: Option<String>,
    #[serde(default)]
    stop_lat: String,
    #[serde(default)]
    stop_lon: String,
}

/// A stop ready for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StopRecord {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Stop {
    /// For matching against stop_times.txt
    pub fn key(&self) -> StopID {
        StopID::new(&self.stop_id)
    }

    pub fn to_record(&self) -> Result<StopRecord> {
        Ok(StopRecord {
            id: self.stop_id.clone(),
            name: self.stop_name.clone().unwrap_or_default(),
            lat: parse_coordinate(TableName::Stops, &self.stop_id, &self.stop_lat)?,
            lng: parse_coordinate(TableName::Stops, &self.stop_id, &self.stop_lon)?,
        })
    }
}

pub fn load(table: &Table) -> Result<Vec<Stop>> {
    table.deserialize()
}

/// Latitudes and longitudes are never defaulted; a stop drawn at (0, 0) is worse than an error.
pub fn parse_coordinate(table: TableName, id: &str, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(x),
        _ => Err(Error::MalformedCoordinate {
            table,
            id: id.to_string(),
            value: value.to_string(),
        }),
    }
}
