use anyhow::Result;
use clap::Parser;
use photoexport::photoexport_core::dates::format_moment;
use photoexport::photoexport_core::{Cli, ExportRequest, PhotosLibrary, export, get_current_time};
use simplelog::{CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, WriteLogger};
use std::fs::File;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize loggers
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )];

    if cli.log {
        loggers.push(WriteLogger::new(
            cli.log_level,
            Config::default(),
            File::create("photoexport.log")?,
        ));
    }

    CombinedLogger::init(loggers)?;

    // Defaults are relative to the day the command runs
    let today = get_current_time().date();

    let request = ExportRequest::resolve(
        &cli.export_path,
        cli.from_date.as_deref(),
        cli.to_date.as_deref(),
        cli.library_path.as_deref(),
        today,
    )?;

    println!("export path: {}", request.export_path.display());
    println!("from: {}", format_moment(request.range.from));
    println!("to: {}", format_moment(request.range.to));

    let library = PhotosLibrary::open(request.library_path.as_deref())?;
    export(&library, &request, cli.dry_run)?;

    Ok(())
}
