use thiserror::Error;

use crate::{RouteID, TableName};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Required GTFS file missing: {}", .0.file_name())]
    MissingRequiredTable(TableName),
    #[error("No trips found for route ID: {0}. This may be due to a data mismatch between routes.txt and trips.txt, or the route is not active on the selected date.")]
    NoTripsForRoute(RouteID),
    #[error("No trips scheduled for route ID {route_id} on {when}")]
    NoTripsForDate { route_id: RouteID, when: String },
    #[error("{} has an unreadable coordinate {value:?} for {id}", .table.file_name())]
    MalformedCoordinate {
        table: TableName,
        id: String,
        value: String,
    },
    #[error("'{0}' is not a valid datetime; YYYY-MM-DD HH:MM is expected")]
    InvalidDateTime(String),
    #[error("{} is malformed: {reason}", .table.file_name())]
    InvalidTable { table: TableName, reason: String },
    #[error("impossible to read csv file '{}'", .table.file_name())]
    Csv {
        table: TableName,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for a query that ran fine but found nothing to show. Callers present these as an
    /// explanation, not as a failure of the system.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Error::NoTripsForRoute(_) | Error::NoTripsForDate { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
