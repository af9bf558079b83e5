use crate::photoexport_core::dates::DateRange;
use crate::photoexport_core::error::{ExportError, Result};
use crate::photoexport_core::{Database, Photo};
use std::path::{Path, PathBuf};

/// Location of the database inside a `.photoslibrary` bundle.
pub const DB_RELATIVE_PATH: &str = "database/Photos.sqlite";

/// Directory holding unedited originals inside a `.photoslibrary` bundle.
pub const ORIGINALS_DIR: &str = "originals";

/// Bundle name Photos uses for the system library.
pub const DEFAULT_LIBRARY_NAME: &str = "Photos Library.photoslibrary";

/// Filters for a library query.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    pub range: DateRange,
    /// Restrict to still photos, excluding videos.
    pub photos_only: bool,
}

/// A source of photos that can be queried by capture date.
pub trait PhotoLibrary {
    /// Return every asset captured within `options.range`, in library order.
    fn query(&self, options: &QueryOptions) -> Result<Vec<Photo>>;
}

/// A macOS Photos library opened read-only.
pub struct PhotosLibrary {
    root: PathBuf,
    db: Database,
}

impl PhotosLibrary {
    /// Open the library at `path`, or the active system library when `path` is `None`.
    ///
    /// `path` may name the `.photoslibrary` bundle or its `Photos.sqlite` directly.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let root = match path {
            Some(path) => library_root(path),
            None => active_library()?,
        };

        if !root.is_dir() {
            return Err(ExportError::LibraryNotFound(root));
        }

        let db_path = root.join(DB_RELATIVE_PATH);
        if !db_path.is_file() {
            return Err(ExportError::InvalidLibrary(db_path));
        }

        log::info!("Opening Photos library at {}", root.display());
        let db = Database::open(&db_path)?;

        Ok(PhotosLibrary { root, db })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl PhotoLibrary for PhotosLibrary {
    fn query(&self, options: &QueryOptions) -> Result<Vec<Photo>> {
        let originals = self.root.join(ORIGINALS_DIR);
        let photos = self
            .db
            .assets_between(&options.range, options.photos_only, &originals)?;
        log::info!(
            "Query {} matched {} assets in {}",
            options.range,
            photos.len(),
            self.root.display()
        );
        Ok(photos)
    }
}

/// Map a user-supplied library path to the bundle root.
fn library_root(path: &Path) -> PathBuf {
    if path.is_file() && path.ends_with(DB_RELATIVE_PATH) {
        if let Some(root) = path.parent().and_then(Path::parent) {
            return root.to_path_buf();
        }
    }
    path.to_path_buf()
}

/// The system Photos library in the user's Pictures folder.
fn active_library() -> Result<PathBuf> {
    let pictures = dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .ok_or(ExportError::NoActiveLibrary)?;
    let root = pictures.join(DEFAULT_LIBRARY_NAME);
    log::debug!("No library path given, using {}", root.display());
    Ok(root)
}
