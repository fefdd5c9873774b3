//! Datasets live on disk as `{root}/{group}/{snapshot}/{table}.txt`. Each upload gets a fresh
//! group, and each extraction a timestamped snapshot within it. Nothing is modified once written,
//! so any number of readers can share a `Store`.

#[macro_use]
extern crate log;

mod error;
mod ingest;
pub mod payload;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use gtfs::{missing_required_tables, Fields, RouteDetails, Table, TableName, GTFS};

pub use self::error::{Error, Result};

/// Set once when the process starts.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Holds every dataset
    pub root: PathBuf,
}

pub struct Store {
    config: StoreConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetID {
    pub group: String,
    pub snapshot: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct DatasetSummary {
    pub id: DatasetID,
    /// The first agency's name, or the snapshot if there's none
    pub name: String,
    pub path: PathBuf,
}

impl DatasetID {
    pub fn new(group: String, snapshot: String) -> Self {
        Self { group, snapshot }
    }

    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.group).join(&self.snapshot)
    }
}

impl fmt::Display for DatasetID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.snapshot)
    }
}

impl FromStr for DatasetID {
    type Err = Error;

    fn from_str(x: &str) -> Result<Self> {
        let parts: Vec<&str> = x.split('/').collect();
        if parts.len() != 2 || !parts.iter().all(|part| is_safe_component(part)) {
            return Err(Error::NotFound(x.to_string()));
        }
        Ok(Self::new(parts[0].to_string(), parts[1].to_string()))
    }
}

impl Serialize for DatasetID {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// IDs come from requests, so they mustn't be able to point outside the root
fn is_safe_component(x: &str) -> bool {
    !x.is_empty() && x != "." && x != ".." && !x.contains(|c| c == '\\' || c == '\0')
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Every valid dataset, sorted by ID. A missing root just means nothing has been uploaded.
    pub fn list_datasets(&self) -> Result<Vec<DatasetSummary>> {
        let mut results = Vec::new();
        if !self.root().is_dir() {
            warn!("Storage root {} doesn't exist", self.root().display());
            return Ok(results);
        }

        info!("Scanning {}", self.root().display());
        for group in fs_err::read_dir(self.root())? {
            let group = group?;
            // Follows symlinks
            if !group.path().is_dir() {
                continue;
            }
            for snapshot in fs_err::read_dir(group.path())? {
                let snapshot = snapshot?;
                if !snapshot.path().is_dir() {
                    continue;
                }
                let path = snapshot.path();
                let missing = missing_required_tables(&path);
                if !missing.is_empty() {
                    debug!("Skipping {}, missing {:?}", path.display(), missing);
                    continue;
                }
                let id = DatasetID::new(
                    group.file_name().to_string_lossy().into_owned(),
                    snapshot.file_name().to_string_lossy().into_owned(),
                );
                let name = agency_name(&path).unwrap_or_else(|| id.snapshot.clone());
                results.push(DatasetSummary { id, name, path });
            }
        }
        results.sort_by(|a, b| a.id.cmp(&b.id));
        info!("Found {} valid datasets", results.len());
        Ok(results)
    }

    pub fn resolve_path(&self, id: &str) -> Result<PathBuf> {
        let id: DatasetID = id.parse()?;
        let path = self.root().join(id.relative_path());
        if !path.is_dir() {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(path)
    }

    /// Every route, with its agency's fields when possible.
    pub fn get_routes(&self, id: &str) -> Result<Vec<Fields>> {
        let path = self.resolve_path(id)?;
        let routes = gtfs::load_with_agencies(&path)?;
        info!("{} routes in {id}", routes.len());
        Ok(routes)
    }

    /// `datetime` is in the form "YYYY-MM-DD HH:MM".
    pub fn get_route_details(
        &self,
        id: &str,
        route_id: &str,
        datetime: &str,
    ) -> Result<RouteDetails> {
        info!("Route details for {route_id} in {id} at {datetime}");
        let path = self.resolve_path(id)?;
        let when = gtfs::parse_datetime(datetime)?;
        let gtfs = GTFS::load_from_dir(&path)?;
        let details = gtfs.route_details(route_id, when)?;
        info!(
            "Returning {} shape points and {} stops",
            details.shape.len(),
            details.stops.len()
        );
        Ok(details)
    }
}

// Any problem reading agency.txt just means there's no name to show
fn agency_name(dir: &Path) -> Option<String> {
    let table = match Table::load(dir, TableName::Agency) {
        Ok(table) => table?,
        Err(err) => {
            warn!("Can't read agency name from {}: {err}", dir.display());
            return None;
        }
    };
    let column = table.column("agency_name")?;
    if table.is_empty() {
        return None;
    }
    Some(table.value(0, column).to_string()).filter(|name| !name.is_empty())
}
