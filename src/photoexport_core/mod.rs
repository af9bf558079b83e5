pub mod cli;
pub mod database;
pub mod dates;
pub mod error;
pub mod export;
pub mod library;
pub mod photo;
pub mod request;

pub use cli::Cli;
pub use database::Database;
pub use dates::{DateRange, ParsedDate, get_current_time, get_local_tz, parse_date};
pub use error::ExportError;
pub use export::{ExportReport, destination_dir, export};
pub use library::{PhotoLibrary, PhotosLibrary, QueryOptions};
pub use photo::Photo;
pub use request::ExportRequest;
