use chrono::Local;
use uuid::Uuid;
use zip::ZipArchive;

use gtfs::missing_required_tables;

use crate::{DatasetID, Error, Result, Store};

impl Store {
    /// Stores and unpacks an uploaded GTFS zip as a new dataset. If the archive turns out not to
    /// be GTFS, the extracted files stay on disk and `InvalidGTFS` is returned.
    pub fn ingest(&self, archive: &[u8]) -> Result<DatasetID> {
        let id = DatasetID::new(
            Uuid::new_v4().to_string(),
            Local::now().format("%Y%m%d%H%M%S").to_string(),
        );
        let group_dir = self.root().join(&id.group);
        let extract_dir = self.root().join(id.relative_path());
        info!("Creating {}", extract_dir.display());
        fs_err::create_dir_all(&extract_dir)?;

        let zip_path = group_dir.join("gtfs.zip");
        info!("Saving {} bytes to {}", archive.len(), zip_path.display());
        fs_err::write(&zip_path, archive)?;

        // If extraction fails, the zip stays next to the snapshot for debugging
        {
            let mut zip = ZipArchive::new(fs_err::File::open(&zip_path)?)?;
            info!("Extracting {} files to {}", zip.len(), extract_dir.display());
            zip.extract(&extract_dir)?;
        }
        fs_err::remove_file(&zip_path)?;

        let missing = missing_required_tables(&extract_dir);
        if !missing.is_empty() {
            let missing = missing
                .into_iter()
                .map(|table| table.file_name())
                .collect::<Vec<_>>()
                .join(", ");
            warn!("{id} isn't valid GTFS, missing {missing}. Keeping it for inspection.");
            return Err(Error::InvalidGTFS {
                dataset: id,
                missing,
            });
        }

        info!("GTFS data successfully extracted to {id}");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    use super::*;
    use crate::StoreConfig;

    fn zip(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, contents) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    const ROUTES: &str = "route_id,route_short_name,route_type\n1,Red,3\n2,Blue,3\n3,Green,0\n";

    fn valid_files() -> Vec<(&'static str, &'static str)> {
        vec![
            ("agency.txt", "agency_id,agency_name\na,Metro\n"),
            ("routes.txt", ROUTES),
            ("trips.txt", "route_id,service_id,trip_id\n1,s,t1\n"),
            ("stop_times.txt", "trip_id,stop_id,stop_sequence\nt1,A,1\n"),
            ("stops.txt", "stop_id,stop_name,stop_lat,stop_lon\nA,Alder,1.0,2.0\n"),
        ]
    }

    fn store(root: &std::path::Path) -> Store {
        Store::new(StoreConfig {
            root: root.to_path_buf(),
        })
    }

    #[test]
    fn ingest_then_query() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        let id = s.ingest(&zip(&valid_files())).unwrap();

        assert_eq!(id.snapshot.len(), 14);
        assert!(id.snapshot.chars().all(|c| c.is_ascii_digit()));
        assert!(!root.path().join(&id.group).join("gtfs.zip").exists());

        let routes = s.get_routes(&id.to_string()).unwrap();
        assert_eq!(routes.len(), 3);

        let list = s.list_datasets().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);
        assert_eq!(list[0].name, "Metro");
    }

    #[test]
    fn every_ingest_gets_its_own_group() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        let a = s.ingest(&zip(&valid_files())).unwrap();
        let b = s.ingest(&zip(&valid_files())).unwrap();
        assert_ne!(a.group, b.group);
        assert_eq!(s.list_datasets().unwrap().len(), 2);
    }

    #[test]
    fn invalid_gtfs_is_kept() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        let err = s
            .ingest(&zip(&[("routes.txt", ROUTES), ("readme.md", "hi")]))
            .unwrap_err();
        let (dataset, missing) = match err {
            Error::InvalidGTFS { dataset, missing } => (dataset, missing),
            other => panic!("unexpected {other}"),
        };
        assert_eq!(missing, "stops.txt, trips.txt, stop_times.txt");

        let dir = root.path().join(dataset.relative_path());
        assert!(dir.join("routes.txt").is_file());
        assert!(!root.path().join(&dataset.group).join("gtfs.zip").exists());
        assert!(s.list_datasets().unwrap().is_empty());
    }

    #[test]
    fn corrupt_archive() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        assert!(matches!(s.ingest(b"not a zip"), Err(Error::Zip(_))));
    }
}
