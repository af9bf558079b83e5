use crate::photoexport_core::error::Result;
use crate::photoexport_core::library::{PhotoLibrary, QueryOptions};
use crate::photoexport_core::request::ExportRequest;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Format of the year directory under the export root.
pub const YEAR_DIR_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]");

/// Format of the day directory under the year directory.
pub const DAY_DIR_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// What an export run did, in library order.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Files written (or that would be written in a dry run).
    pub exported: Vec<PathBuf>,
    /// Filenames of photos skipped because their original is missing.
    pub skipped: Vec<String>,
}

/// Directory a photo captured at `date` is exported to: `export_path/YYYY/YYYY-MM-DD`.
pub fn destination_dir(export_path: &Path, date: &OffsetDateTime) -> Result<PathBuf> {
    let year = date.format(YEAR_DIR_FORMAT)?;
    let day = date.format(DAY_DIR_FORMAT)?;
    Ok(export_path.join(year).join(day))
}

/// Export every photo in the request's date range from `library`.
///
/// Missing originals are skipped with a notice. Any other failure aborts the run;
/// files already written stay on disk.
pub fn export<L: PhotoLibrary>(
    library: &L,
    request: &ExportRequest,
    dry_run: bool,
) -> Result<ExportReport> {
    let options = QueryOptions {
        range: request.range,
        photos_only: true,
    };
    let photos = library.query(&options)?;
    log::info!(
        "Exporting {} photos to {}{}",
        photos.len(),
        request.export_path.display(),
        if dry_run { " (dry run)" } else { "" }
    );

    let mut report = ExportReport::default();
    for photo in photos {
        if photo.is_missing {
            println!("Skipping missing photo {}", photo.filename);
            report.skipped.push(photo.filename);
            continue;
        }

        let target = destination_dir(&request.export_path, &photo.date)?;

        if dry_run {
            println!(
                "[DRY RUN] Would export photo {} to {}",
                photo.original_filename,
                target.display()
            );
            report.exported.push(target.join(&photo.original_filename));
            continue;
        }

        if !target.is_dir() {
            log::debug!("Creating {}", target.display());
            fs::create_dir_all(&target)?;
        }

        let written = photo.export(&target, true)?;
        println!(
            "Exported photo {} to {}",
            photo.original_filename,
            target.display()
        );
        report.exported.push(written);
    }

    log::info!(
        "Export finished: {} written, {} missing",
        report.exported.len(),
        report.skipped.len()
    );
    Ok(report)
}
