#[macro_use]
extern crate log;

mod calendar;
mod error;
mod ids;
mod routes;
mod shapes;
mod stop_times;
mod stops;
mod table;
mod trips;

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;

pub use calendar::{
    active_services, ActiveServices, Calendar, CalendarException, DaysOfWeek, ExceptionType,
    Service,
};
pub use error::{Error, Result};
pub use ids::{normalize_id, AgencyID, RouteID, ServiceID, ShapeID, StopID, TripID};
pub use routes::{find_route, join_agencies, load_with_agencies};
pub use shapes::{LatLng, ShapePoint};
pub use stop_times::StopTime;
pub use stops::{Stop, StopRecord};
pub use table::{missing_required_tables, Fields, Table, TableName};
pub use trips::{filter_trips, Trip};

/// The format of the datetime a route is queried at.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Everything needed to answer a route query, read fresh from one dataset directory.
pub struct GTFS {
    pub routes: Table,
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    pub stops: Vec<Stop>,
    pub calendar: Option<Calendar>,
    pub calendar_exceptions: Option<Vec<CalendarException>>,
    pub shapes: Option<Vec<ShapePoint>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RouteDetails {
    pub route: Fields,
    pub shape: Vec<LatLng>,
    pub stops: Vec<StopRecord>,
}

impl GTFS {
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        if let Some(table) = missing_required_tables(path).into_iter().next() {
            return Err(Error::MissingRequiredTable(table));
        }

        let routes = Table::load_required(path, TableName::Routes)?;
        let trips = trips::load(&Table::load_required(path, TableName::Trips)?)?;
        let stop_times = stop_times::load(&Table::load_required(path, TableName::StopTimes)?)?;
        let stops = stops::load(&Table::load_required(path, TableName::Stops)?)?;
        info!(
            "Loaded {} routes, {} trips, {} stop times, {} stops",
            routes.len(),
            trips.len(),
            stop_times.len(),
            stops.len()
        );

        let calendar = match Table::load(path, TableName::Calendar)? {
            Some(table) => Some(calendar::load(&table)?),
            None => None,
        };
        let calendar_exceptions = match Table::load(path, TableName::CalendarDates)? {
            Some(table) => Some(calendar::load_exceptions(&table)?),
            None => None,
        };
        let shapes = match Table::load(path, TableName::Shapes)? {
            Some(table) => Some(shapes::load(&table)?),
            None => None,
        };

        Ok(Self {
            routes,
            trips,
            stop_times,
            stops,
            calendar,
            calendar_exceptions,
            shapes,
        })
    }

    pub fn active_services(&self, when: NaiveDateTime) -> ActiveServices {
        active_services(
            self.calendar.as_ref(),
            self.calendar_exceptions.as_deref(),
            when.date(),
        )
    }

    /// The route's fields, the shape of its first running trip, and every stop visited by any of
    /// its running trips.
    pub fn route_details(&self, route_id: &str, when: NaiveDateTime) -> Result<RouteDetails> {
        let route_id = RouteID::new(route_id);
        let services = self.active_services(when);
        match services {
            ActiveServices::Unconstrained => {
                info!("No service information for {}, not filtering by service", when.date())
            }
            ActiveServices::Active(ref ids) => {
                info!("{} services active on {}", ids.len(), when.date())
            }
        }
        let running = filter_trips(
            &self.trips,
            &route_id,
            &services,
            &when.format(DATETIME_FORMAT).to_string(),
        )?;
        info!("{} trips for route {route_id} are running", running.len());

        let shape = self.shape_of(running[0])?;

        let trip_ids: BTreeSet<&TripID> = running.iter().map(|t| &t.trip_id).collect();
        let stop_ids: BTreeSet<&StopID> = self
            .stop_times
            .iter()
            .filter(|st| trip_ids.contains(&st.trip_id))
            .map(|st| &st.stop_id)
            .collect();
        // Distinct stops.txt rows can share a key ("01" and "1"), and each is its own stop
        let mut stops = Vec::new();
        let mut seen = BTreeSet::new();
        let mut found = BTreeSet::new();
        for stop in &self.stops {
            let key = stop.key();
            if stop_ids.contains(&key) && seen.insert(stop.stop_id.as_str()) {
                stops.push(stop.to_record()?);
                found.insert(key);
            }
        }
        if found.len() < stop_ids.len() {
            warn!(
                "{} stops visited by route {route_id} aren't in stops.txt",
                stop_ids.len() - found.len()
            );
        }

        Ok(RouteDetails {
            route: find_route(&self.routes, &route_id),
            shape,
            stops,
        })
    }

    // Assumes all the running trips share one shape
    fn shape_of(&self, trip: &Trip) -> Result<Vec<LatLng>> {
        let Some(ref shape_id) = trip.shape_id else {
            debug!("{} has no shape_id", trip.trip_id);
            return Ok(Vec::new());
        };
        let Some(ref points) = self.shapes else {
            debug!("No shapes.txt");
            return Ok(Vec::new());
        };
        let pl = shapes::polyline(points, shape_id)?;
        debug!("{} points for {shape_id}", pl.len());
        Ok(pl)
    }
}

pub fn parse_datetime(x: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(x.trim(), DATETIME_FORMAT)
        .map_err(|_| Error::InvalidDateTime(x.to_string()))
}
