use crate::photoexport_core::dates::{DateRange, get_local_tz, wall_clock};
use crate::photoexport_core::error::{ExportError, Result};
use crate::photoexport_core::Photo;
use crate::photoexport_core::photo::is_plain_filename;
use rusqlite::{Connection, OpenFlags, params};
use std::path::{Component, Path, PathBuf};
use time::{Duration, OffsetDateTime, UtcOffset};

/// Seconds between the Unix epoch and the Core Data reference date (2001-01-01T00:00:00Z).
pub const CORE_DATA_EPOCH_OFFSET: i64 = 978_307_200;

/// `ZKIND` value for still photos.
pub const KIND_PHOTO: i64 = 0;

/// `ZKIND` value for videos.
pub const KIND_VIDEO: i64 = 1;

/// Widening applied to the SQL pre-filter so any capture offset is covered.
const PREFILTER_MARGIN: i64 = 86_400;

/// Asset table names across Photos versions, newest first.
const ASSET_TABLES: &[&str] = &["ZASSET", "ZGENERICASSET"];

/// Read-only view of a library's `Photos.sqlite`.
pub struct Database {
    conn: Connection,
    asset_table: &'static str,
}

/// One row of the asset query, before it becomes a `Photo`.
struct AssetRow {
    uuid: Option<String>,
    filename: Option<String>,
    directory: Option<String>,
    date_created: f64,
    original_filename: Option<String>,
    timezone_offset: Option<i64>,
}

impl Database {
    /// Open the database read-only and detect which asset table it uses.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let mut asset_table = None;
        for table in ASSET_TABLES {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get(0),
            )?;
            if count > 0 {
                asset_table = Some(*table);
                break;
            }
        }
        let asset_table = asset_table.ok_or_else(|| ExportError::InvalidLibrary(path.to_path_buf()))?;

        log::debug!("Opened {} (asset table {})", path.display(), asset_table);
        Ok(Database { conn, asset_table })
    }

    pub fn asset_table(&self) -> &'static str {
        self.asset_table
    }

    /// Fetch the non-trashed assets whose wall-clock capture time falls in `range`.
    ///
    /// Original file paths are resolved against `originals`.
    pub fn assets_between(
        &self,
        range: &DateRange,
        photos_only: bool,
        originals: &Path,
    ) -> Result<Vec<Photo>> {
        if range.is_empty() {
            log::info!("Date range {} is empty, nothing to query", range);
            return Ok(Vec::new());
        }

        let lower = range.from.assume_utc().unix_timestamp() - CORE_DATA_EPOCH_OFFSET - PREFILTER_MARGIN;
        let upper = range.to.assume_utc().unix_timestamp() - CORE_DATA_EPOCH_OFFSET + PREFILTER_MARGIN;

        let sql = format!(
            "SELECT a.ZUUID, a.ZFILENAME, a.ZDIRECTORY, a.ZDATECREATED,
                    attr.ZORIGINALFILENAME, attr.ZTIMEZONEOFFSET
             FROM {} a
             LEFT JOIN ZADDITIONALASSETATTRIBUTES attr ON attr.ZASSET = a.Z_PK
             WHERE a.ZDATECREATED IS NOT NULL
               AND a.ZDATECREATED BETWEEN ?1 AND ?2
               AND COALESCE(a.ZTRASHEDSTATE, 0) = 0
               AND (?3 = 0 OR a.ZKIND = ?4)
             ORDER BY a.Z_PK",
            self.asset_table
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![lower as f64, upper as f64, photos_only, KIND_PHOTO],
            |row| {
                Ok(AssetRow {
                    uuid: row.get(0)?,
                    filename: row.get(1)?,
                    directory: row.get(2)?,
                    date_created: row.get(3)?,
                    original_filename: row.get(4)?,
                    timezone_offset: row.get(5)?,
                })
            },
        )?;

        let mut photos = Vec::new();
        for row in rows {
            let row = row?;
            let Some(date) = capture_date(row.date_created, row.timezone_offset) else {
                log::warn!(
                    "Skipping asset {:?} with unrepresentable date {}",
                    row.uuid,
                    row.date_created
                );
                continue;
            };
            if range.contains(wall_clock(date)) {
                photos.push(row.into_photo(date, originals));
            }
        }

        Ok(photos)
    }
}

impl AssetRow {
    fn into_photo(self, date: OffsetDateTime, originals: &Path) -> Photo {
        let uuid = self.uuid.unwrap_or_default();
        let path: Option<PathBuf> = match (&self.directory, &self.filename) {
            (Some(directory), Some(filename))
                if is_originals_subdir(directory) && is_plain_filename(filename) =>
            {
                Some(originals.join(directory).join(filename))
            }
            (Some(directory), Some(filename)) => {
                log::warn!(
                    "Asset {} points outside the originals folder ({:?}/{:?}), treating it as missing",
                    uuid,
                    directory,
                    filename
                );
                None
            }
            _ => None,
        };
        let is_missing = !path.as_ref().is_some_and(|p| p.is_file());
        let filename = self.filename.unwrap_or_else(|| uuid.clone());
        let original_filename = match self.original_filename.filter(|name| !name.is_empty()) {
            Some(name) if is_plain_filename(&name) => name,
            Some(name) => {
                log::warn!(
                    "Asset {} has unusable original filename {:?}, using {}",
                    uuid,
                    name,
                    filename
                );
                filename.clone()
            }
            None => filename.clone(),
        };

        if is_missing {
            log::debug!("Asset {} has no original on disk ({:?})", uuid, path);
        }

        Photo {
            uuid,
            date,
            filename,
            original_filename,
            path,
            is_missing,
        }
    }
}

/// `ZDIRECTORY` may nest, but only downwards from `originals/`.
fn is_originals_subdir(directory: &str) -> bool {
    let path = Path::new(directory);
    path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Convert a Core Data timestamp and recorded offset (in seconds) to the capture time.
///
/// Without a recorded offset the local offset is assumed.
pub fn capture_date(seconds: f64, offset_seconds: Option<i64>) -> Option<OffsetDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as i64;
    let unix = (whole as i64).checked_add(CORE_DATA_EPOCH_OFFSET)?;
    let utc = OffsetDateTime::from_unix_timestamp(unix)
        .ok()?
        .checked_add(Duration::nanoseconds(nanos))?;

    let offset = offset_seconds
        .and_then(|s| i32::try_from(s).ok())
        .and_then(|s| UtcOffset::from_whole_seconds(s).ok())
        .unwrap_or_else(get_local_tz);

    Some(utc.to_offset(offset))
}
