use thiserror::Error;

use crate::DatasetID;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Dataset {0} not found")]
    NotFound(String),
    /// The extracted files are kept for inspection.
    #[error("Uploaded file does not contain valid GTFS data; {dataset} is missing {missing}")]
    InvalidGTFS { dataset: DatasetID, missing: String },
    #[error(transparent)]
    Gtfs(#[from] gtfs::Error),
    #[error("impossible to read the uploaded archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// See `gtfs::Error::is_empty_result`.
    pub fn is_empty_result(&self) -> bool {
        match self {
            Error::Gtfs(err) => err.is_empty_result(),
            _ => false,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
