use std::path::Path;

use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableName {
    Agency,
    Routes,
    Trips,
    StopTimes,
    Stops,
    Calendar,
    CalendarDates,
    Shapes,
}

impl TableName {
    /// A dataset is usable only if all of these are present.
    pub const REQUIRED: [TableName; 4] = [
        TableName::Routes,
        TableName::Stops,
        TableName::Trips,
        TableName::StopTimes,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            TableName::Agency => "agency.txt",
            TableName::Routes => "routes.txt",
            TableName::Trips => "trips.txt",
            TableName::StopTimes => "stop_times.txt",
            TableName::Stops => "stops.txt",
            TableName::Calendar => "calendar.txt",
            TableName::CalendarDates => "calendar_dates.txt",
            TableName::Shapes => "shapes.txt",
        }
    }
}

/// Lists the required tables missing from a dataset directory.
pub fn missing_required_tables(dir: &Path) -> Vec<TableName> {
    TableName::REQUIRED
        .into_iter()
        .filter(|table| !dir.join(table.file_name()).is_file())
        .collect()
}

/// One GTFS file, read without interpreting any field. Column order is preserved.
pub struct Table {
    name: TableName,
    headers: csv::StringRecord,
    records: Vec<csv::StringRecord>,
}

impl Table {
    /// Returns `None` if the file doesn't exist. That's normal for optional tables; use
    /// `load_required` for the rest.
    pub fn load(dir: &Path, name: TableName) -> Result<Option<Table>> {
        let path = dir.join(name.file_name());
        if !path.is_file() {
            debug!("{} absent from {}", name.file_name(), dir.display());
            return Ok(None);
        }
        let file = fs_err::File::open(path)?;
        Self::from_reader(name, file).map(Some)
    }

    pub fn load_required(dir: &Path, name: TableName) -> Result<Table> {
        match Self::load(dir, name)? {
            Some(table) => Ok(table),
            None => Err(Error::MissingRequiredTable(name)),
        }
    }

    pub fn from_reader<R: std::io::Read>(name: TableName, reader: R) -> Result<Table> {
        let csv_err = |source| Error::Csv {
            table: name,
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut headers = reader.headers().map_err(csv_err)?.clone();
        // The csv crate keeps a UTF-8 BOM as part of the first header
        if let Some(first) = headers.get(0) {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                let mut fixed = csv::StringRecord::new();
                fixed.push_field(stripped);
                for field in headers.iter().skip(1) {
                    fixed.push_field(field);
                }
                headers = fixed;
            }
        }

        let mut records = Vec::new();
        for rec in reader.records() {
            let rec = rec.map_err(csv_err)?;
            // Trailing blank lines
            if rec.iter().all(|field| field.is_empty()) {
                continue;
            }
            records.push(rec);
        }
        Ok(Table {
            name,
            headers,
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    /// The value of one column in one row. Missing cells in ragged rows are empty.
    pub fn value(&self, row: usize, column: usize) -> &str {
        self.records[row].get(column).unwrap_or("")
    }

    pub fn rows(&self) -> impl Iterator<Item = Fields> + '_ {
        (0..self.records.len()).map(move |row| self.fields(row))
    }

    pub fn fields(&self, row: usize) -> Fields {
        Fields(
            self.headers
                .iter()
                .enumerate()
                .map(|(column, header)| (header.to_string(), self.value(row, column).to_string()))
                .collect(),
        )
    }

    /// Interpret every row as a typed record. Columns the record doesn't name are ignored.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let mut results = Vec::with_capacity(self.records.len());
        for rec in &self.records {
            let rec: T = rec
                .deserialize(Some(&self.headers))
                .map_err(|source| Error::Csv {
                    table: self.name,
                    source,
                })?;
            results.push(rec);
        }
        Ok(results)
    }
}

/// A row as ordered `(column, value)` pairs. Serializes as a JSON object in column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Appends a column, unless one with the same name is already present.
    pub fn push(&mut self, column: String, value: String) {
        if !self.contains(&column) {
            self.0.push((column, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: TableName, contents: &str) -> Table {
        Table::from_reader(name, contents.as_bytes()).unwrap()
    }

    #[test]
    fn missing_optional_table_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Table::load(dir.path(), TableName::Shapes).unwrap().is_none());
        assert!(matches!(
            Table::load_required(dir.path(), TableName::Routes),
            Err(Error::MissingRequiredTable(TableName::Routes))
        ));
    }

    #[test]
    fn preserves_column_order_and_raw_values() {
        let t = table(
            TableName::Routes,
            "\u{feff}route_id, route_short_name,route_type\n 042 ,Red,3\n7,Blue\n\n",
        );
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.headers().collect::<Vec<_>>(),
            vec!["route_id", "route_short_name", "route_type"]
        );
        let rows: Vec<Fields> = t.rows().collect();
        assert_eq!(rows[0].get("route_id"), Some("042"));
        assert_eq!(rows[1].get("route_type"), Some(""));
        assert_eq!(
            serde_json::to_string(&rows[0]).unwrap(),
            r#"{"route_id":"042","route_short_name":"Red","route_type":"3"}"#
        );
    }

    #[test]
    fn fields_keep_the_first_value_for_a_column() {
        let mut fields = Fields::default();
        fields.push("agency_id".to_string(), "a".to_string());
        fields.push("agency_id".to_string(), "b".to_string());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("agency_id"), Some("a"));
    }
}
