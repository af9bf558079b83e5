// Each test crate uses a different subset of these helpers
#![allow(dead_code)]

use assert_fs::TempDir;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;
use photoexport::photoexport_core::database::{CORE_DATA_EPOCH_OFFSET, KIND_PHOTO, KIND_VIDEO};
use photoexport::photoexport_core::library::{DB_RELATIVE_PATH, ORIGINALS_DIR};
use rusqlite::{Connection, params};
use std::path::Path;
use time::OffsetDateTime;

/// An asset to insert into a fixture library.
pub struct Asset {
    pub uuid: String,
    pub original_filename: Option<String>,
    pub date: OffsetDateTime,
    pub kind: i64,
    pub trashed: bool,
    pub on_disk: bool,
}

impl Asset {
    pub fn photo(uuid: &str, original_filename: &str, date: OffsetDateTime) -> Self {
        Asset {
            uuid: uuid.to_string(),
            original_filename: Some(original_filename.to_string()),
            date,
            kind: KIND_PHOTO,
            trashed: false,
            on_disk: true,
        }
    }

    pub fn video(uuid: &str, original_filename: &str, date: OffsetDateTime) -> Self {
        Asset {
            kind: KIND_VIDEO,
            ..Asset::photo(uuid, original_filename, date)
        }
    }

    pub fn missing(mut self) -> Self {
        self.on_disk = false;
        self
    }

    pub fn trashed(mut self) -> Self {
        self.trashed = true;
        self
    }

    pub fn without_original_filename(mut self) -> Self {
        self.original_filename = None;
        self
    }

    /// Name of the asset file inside the library (`<uuid>.<ext>`).
    pub fn filename(&self) -> String {
        let ext = self
            .original_filename
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "jpeg".to_string());
        format!("{}.{}", self.uuid, ext)
    }

    fn directory(&self) -> String {
        self.uuid.chars().take(1).collect()
    }
}

/// Create an empty Photos library bundle using `asset_table` for assets.
pub fn create_library_with_table(temp_dir: &TempDir, name: &str, asset_table: &str) -> ChildPath {
    let library = temp_dir.child(name);
    let db_file = library.child(DB_RELATIVE_PATH);
    library.child("database").create_dir_all().unwrap();

    let conn = Connection::open(db_file.path()).unwrap();
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE {asset_table} (
            Z_PK INTEGER PRIMARY KEY,
            ZUUID VARCHAR,
            ZFILENAME VARCHAR,
            ZDIRECTORY VARCHAR,
            ZDATECREATED TIMESTAMP,
            ZKIND INTEGER,
            ZTRASHEDSTATE INTEGER
        );
        CREATE TABLE ZADDITIONALASSETATTRIBUTES (
            Z_PK INTEGER PRIMARY KEY,
            ZASSET INTEGER,
            ZORIGINALFILENAME VARCHAR,
            ZTIMEZONEOFFSET INTEGER
        );
        "#
    ))
    .unwrap();

    library
}

/// Create an empty Photos library bundle with the current schema.
pub fn create_library(temp_dir: &TempDir, name: &str) -> ChildPath {
    create_library_with_table(temp_dir, name, "ZASSET")
}

/// Insert `asset` into `library`, writing its original file unless it is missing.
pub fn add_asset(library: &ChildPath, asset: &Asset) {
    let conn = Connection::open(library.child(DB_RELATIVE_PATH).path()).unwrap();
    let table: String = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('ZASSET', 'ZGENERICASSET')",
            [],
            |row| row.get(0),
        )
        .unwrap();

    let seconds = (asset.date.unix_timestamp() - CORE_DATA_EPOCH_OFFSET) as f64;
    conn.execute(
        &format!(
            "INSERT INTO {table} (ZUUID, ZFILENAME, ZDIRECTORY, ZDATECREATED, ZKIND, ZTRASHEDSTATE)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        ),
        params![
            asset.uuid,
            asset.filename(),
            asset.directory(),
            seconds,
            asset.kind,
            asset.trashed as i64
        ],
    )
    .unwrap();
    let asset_pk = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO ZADDITIONALASSETATTRIBUTES (ZASSET, ZORIGINALFILENAME, ZTIMEZONEOFFSET)
         VALUES (?1, ?2, ?3)",
        params![
            asset_pk,
            asset.original_filename,
            asset.date.offset().whole_seconds()
        ],
    )
    .unwrap();

    if asset.on_disk {
        library
            .child(ORIGINALS_DIR)
            .child(asset.directory())
            .child(asset.filename())
            .write_str(&format!("original bytes of {}", asset.uuid))
            .unwrap();
    }
}
