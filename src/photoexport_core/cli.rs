use clap::Parser;
use simplelog::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Export photos from a macOS Photos library into a YYYY/YYYY-MM-DD folder tree"
)]
pub struct Cli {
    /// Existing directory the photos are exported to
    pub export_path: String,

    /// The date to start exporting photos from. Defaults to one week ago.
    #[arg(long)]
    pub from_date: Option<String>,

    /// The date to end exporting photos at (inclusive). Defaults to today.
    #[arg(long)]
    pub to_date: Option<String>,

    /// Path to the Photos library. Defaults to the system Photos library.
    #[arg(long)]
    pub library_path: Option<String>,

    /// Show what would be exported without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Enable file logging to photoexport.log
    #[arg(long = "log")]
    pub log: bool,

    /// Log level for file logging (debug, info, warn, error)
    #[arg(long, default_value_t = LevelFilter::Debug)]
    pub log_level: LevelFilter,
}
