#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::path::PathBuf;

use anyhow::Result;
use structopt::StructOpt;

use store::payload::{render, Payload};
use store::{Store, StoreConfig};

#[derive(StructOpt)]
#[structopt(name = "gtfs-viewer", about = "Browse the routes of uploaded GTFS datasets")]
struct Args {
    /// The directory holding every dataset
    #[structopt(long, default_value = "data", parse(from_os_str))]
    data_dir: PathBuf,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt)]
enum Command {
    /// List the valid datasets
    List,
    /// List the routes of one dataset
    Routes {
        /// In the form group/snapshot
        #[structopt(long)]
        dataset: String,
    },
    /// Show the shape and stops of a route running at some time
    RouteDetails {
        /// In the form group/snapshot
        #[structopt(long)]
        dataset: String,
        #[structopt(long)]
        route: String,
        /// In the form "YYYY-MM-DD HH:MM"
        #[structopt(long)]
        datetime: String,
    },
    /// Import a GTFS .zip file as a new dataset
    Ingest {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
}

impl Args {
    fn run(self) -> Result<Payload> {
        let store = Store::new(StoreConfig {
            root: self.data_dir,
        });
        Ok(match self.cmd {
            Command::List => render(store.list_datasets()),
            Command::Routes { dataset } => render(store.get_routes(&dataset)),
            Command::RouteDetails {
                dataset,
                route,
                datetime,
            } => render(store.get_route_details(&dataset, &route, &datetime)),
            Command::Ingest { path } => {
                if path.extension().and_then(|x| x.to_str()) != Some("zip") {
                    bail!("{} must be a ZIP archive", path.display());
                }
                info!("Processing GTFS upload: {}", path.display());
                let bytes = fs_err::read(&path)?;
                render(store.ingest(&bytes).map(|id| {
                    serde_json::json!({ "success": true, "folder_id": id.to_string() })
                }))
            }
        })
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let payload = match Args::from_args().run() {
        Ok(payload) => payload,
        Err(err) => {
            error!("{err:#}");
            Payload {
                body: store::payload::error_body(err.to_string()),
                is_error: true,
            }
        }
    };
    match serde_json::to_string_pretty(&payload.body) {
        Ok(out) => println!("{out}"),
        Err(err) => {
            eprintln!("Can't print the result: {err}");
            std::process::exit(2);
        }
    }
    if payload.is_error {
        std::process::exit(1);
    }
}
