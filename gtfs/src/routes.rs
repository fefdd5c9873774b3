use std::path::Path;

use crate::{AgencyID, Fields, Result, RouteID, Table, TableName};

/// Every row of routes.txt. If agency.txt exists and both tables have an `agency_id` column, each
/// route also gets the columns of its agency. Routes whose agency can't be found get empty values
/// for those columns. When both tables have a column with the same name, the route's value wins.
pub fn load_with_agencies(dir: &Path) -> Result<Vec<Fields>> {
    let routes = Table::load_required(dir, TableName::Routes)?;
    let agency = Table::load(dir, TableName::Agency)?;
    Ok(join_agencies(&routes, agency.as_ref()))
}

pub fn join_agencies(routes: &Table, agency: Option<&Table>) -> Vec<Fields> {
    let join = agency.and_then(|agency| {
        let route_col = routes.column("agency_id")?;
        let agency_col = agency.column("agency_id")?;
        Some((agency, route_col, agency_col))
    });
    let Some((agency, route_col, agency_col)) = join else {
        return routes.rows().collect();
    };
    info!("Merging routes with agency info");

    let mut results = Vec::with_capacity(routes.len());
    for row in 0..routes.len() {
        let mut fields = routes.fields(row);
        let key = AgencyID::new(routes.value(row, route_col));
        let matching_agency =
            (0..agency.len()).find(|a| AgencyID::new(agency.value(*a, agency_col)) == key);
        for (column, header) in agency.headers().enumerate() {
            let value = match matching_agency {
                Some(a) => agency.value(a, column).to_string(),
                None => String::new(),
            };
            fields.push(header.to_string(), value);
        }
        results.push(fields);
    }
    results
}

/// The first route with this ID, or empty fields if there's none.
pub fn find_route(routes: &Table, route_id: &RouteID) -> Fields {
    let Some(column) = routes.column("route_id") else {
        return Fields::default();
    };
    (0..routes.len())
        .find(|row| &RouteID::new(routes.value(*row, column)) == route_id)
        .map(|row| routes.fields(row))
        .unwrap_or_default()
}
