use serde::Deserialize;

use crate::{Result, StopID, Table, TripID};

/// Only the part of stop_times.txt needed to find which stops a trip visits.
#[derive(Clone, Debug, Deserialize)]
pub struct StopTime {
    pub trip_id: TripID,
    pub stop_id: StopID,
}

pub fn load(table: &Table) -> Result<Vec<StopTime>> {
    table.deserialize()
}
