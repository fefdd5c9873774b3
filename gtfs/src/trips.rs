use serde::Deserialize;

use crate::{ActiveServices, Error, Result, RouteID, ServiceID, ShapeID, Table, TripID};

#[derive(Clone, Debug, Deserialize)]
pub struct Trip {
    pub trip_id: TripID,
    pub route_id: RouteID,
    pub service_id: ServiceID,
    #[serde(default)]
    pub shape_id: Option<ShapeID>,
}

pub fn load(table: &Table) -> Result<Vec<Trip>> {
    table.deserialize()
}

/// The trips of one route running under the active services, in file order. `when` only
/// describes the date in the error.
pub fn filter_trips<'a>(
    trips: &'a [Trip],
    route_id: &RouteID,
    services: &ActiveServices,
    when: &str,
) -> Result<Vec<&'a Trip>> {
    let route_trips: Vec<&Trip> = trips.iter().filter(|t| &t.route_id == route_id).collect();
    if route_trips.is_empty() {
        let mut known: Vec<&str> = trips.iter().map(|t| t.route_id.as_str()).collect();
        known.sort_unstable();
        known.dedup();
        debug!("No trips for {route_id}. Route IDs in trips.txt: {known:?}");
        return Err(Error::NoTripsForRoute(route_id.clone()));
    }
    debug!("Found {} trips for route {route_id}", route_trips.len());

    if let ActiveServices::Active(ref ids) = services {
        debug!("Filtering by {} active services", ids.len());
    }
    let running: Vec<&Trip> = route_trips
        .into_iter()
        .filter(|t| services.allows(&t.service_id))
        .collect();
    if running.is_empty() {
        return Err(Error::NoTripsForDate {
            route_id: route_id.clone(),
            when: when.to_string(),
        });
    }
    Ok(running)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TableName;

    fn trips(contents: &str) -> Vec<Trip> {
        load(&Table::from_reader(TableName::Trips, contents.as_bytes()).unwrap()).unwrap()
    }

    fn ids(trips: &[&Trip]) -> Vec<String> {
        trips.iter().map(|t| t.trip_id.to_string()).collect()
    }

    fn active(ids: &[&str]) -> ActiveServices {
        ActiveServices::Active(ids.iter().map(|x| ServiceID::new(x)).collect())
    }

    #[test]
    fn route_matching_ignores_id_representation() {
        let text = trips("route_id,service_id,trip_id\n42,wk,t1\nR1,wk,t2\n");
        let numeric = trips("route_id,service_id,trip_id\n42.0,wk,t1\n042,wk,t3\n");
        let route = RouteID::new("42");
        let services = ActiveServices::Unconstrained;

        let found = filter_trips(&text, &route, &services, "").unwrap();
        assert_eq!(ids(&found), vec!["t1"]);
        let found = filter_trips(&numeric, &route, &services, "").unwrap();
        assert_eq!(ids(&found), vec!["t1", "t3"]);
    }

    #[test]
    fn unknown_route_vs_inactive_day() {
        let all = trips("route_id,service_id,trip_id,shape_id\n1,wk,t1,s1\n1,sat,t2,\n2,sat,t3,s3\n");
        assert_eq!(all[1].shape_id, None);

        let err = filter_trips(&all, &RouteID::new("9"), &active(&["wk"]), "x").unwrap_err();
        assert!(matches!(err, Error::NoTripsForRoute(_)));
        assert!(err.is_empty_result());

        let err = filter_trips(&all, &RouteID::new("2"), &active(&["wk"]), "2024-06-17 08:00")
            .unwrap_err();
        assert!(matches!(err, Error::NoTripsForDate { .. }));
        assert_eq!(
            err.to_string(),
            "No trips scheduled for route ID 2 on 2024-06-17 08:00"
        );

        let err = filter_trips(&all, &RouteID::new("1"), &active(&[]), "x").unwrap_err();
        assert!(matches!(err, Error::NoTripsForDate { .. }));
    }

    #[test]
    fn service_filter() {
        let all = trips("route_id,service_id,trip_id\n1,wk,t1\n1,sat,t2\n1,1,t3\n");
        let found = filter_trips(&all, &RouteID::new("1"), &active(&["sat", "1.0"]), "").unwrap();
        assert_eq!(ids(&found), vec!["t2", "t3"]);
        let found =
            filter_trips(&all, &RouteID::new("1"), &ActiveServices::Unconstrained, "").unwrap();
        assert_eq!(ids(&found), vec!["t1", "t2", "t3"]);
    }
}
