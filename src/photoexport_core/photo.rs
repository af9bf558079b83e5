use crate::photoexport_core::error::{ExportError, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// A photo asset as recorded in a Photos library.
#[derive(Debug, Clone)]
pub struct Photo {
    pub uuid: String,
    /// Capture time in the offset the photo was taken in.
    pub date: OffsetDateTime,
    /// Name of the asset file inside the library.
    pub filename: String,
    /// Name of the file when it was imported into the library.
    pub original_filename: String,
    /// Location of the unedited original, if the library records one.
    pub path: Option<PathBuf>,
    /// The original file is not present on disk.
    pub is_missing: bool,
}

impl Photo {
    /// Copy the unedited original into `dest_dir` under its original filename.
    ///
    /// With `overwrite` an existing file of the same name is replaced. Without it the
    /// copy is written to the first free `name (n).ext`. Returns the written path.
    pub fn export(&self, dest_dir: &Path, overwrite: bool) -> Result<PathBuf> {
        let source = match (&self.path, self.is_missing) {
            (Some(path), false) => path,
            _ => return Err(ExportError::MissingAsset(self.filename.clone())),
        };

        if !is_plain_filename(&self.original_filename) {
            return Err(ExportError::UnsafeFilename(self.original_filename.clone()));
        }

        let mut destination = dest_dir.join(&self.original_filename);
        if !overwrite && destination.exists() {
            destination = next_free_name(dest_dir, &self.original_filename);
        }

        log::debug!("Copying {} -> {}", source.display(), destination.display());
        fs::copy(source, &destination)?;
        Ok(destination)
    }
}

/// `name` is a single file name: no separators, no root, not `.` or `..`.
pub fn is_plain_filename(name: &str) -> bool {
    Path::new(name).file_name() == Some(OsStr::new(name))
}

/// First `stem (n).ext` in `dir` that does not exist yet.
fn next_free_name(dir: &Path, filename: &str) -> PathBuf {
    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let ext = name.extension().map(|e| e.to_string_lossy().to_string());

    (1..)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| dir.join(filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use time::macros::datetime;

    fn photo_at(source: &Path) -> Photo {
        Photo {
            uuid: "A1B2".to_string(),
            date: datetime!(2020-02-14 10:00 UTC),
            filename: "A1B2.jpeg".to_string(),
            original_filename: "IMG_0051.jpeg".to_string(),
            path: Some(source.to_path_buf()),
            is_missing: false,
        }
    }

    #[test]
    fn test_export_uses_original_filename() {
        let temp = TempDir::new().unwrap();
        let source = temp.child("library/A1B2.jpeg");
        source.write_str("original").unwrap();
        let out = temp.child("out");
        out.create_dir_all().unwrap();

        let written = photo_at(source.path()).export(out.path(), true).unwrap();

        assert_eq!(written, out.path().join("IMG_0051.jpeg"));
        out.child("IMG_0051.jpeg").assert("original");
    }

    #[test]
    fn test_export_overwrite_replaces_existing() {
        let temp = TempDir::new().unwrap();
        let source = temp.child("A1B2.jpeg");
        source.write_str("new contents").unwrap();
        let out = temp.child("out");
        out.child("IMG_0051.jpeg").write_str("stale").unwrap();

        photo_at(source.path()).export(out.path(), true).unwrap();

        out.child("IMG_0051.jpeg").assert("new contents");
        assert!(!out.child("IMG_0051 (1).jpeg").exists());
    }

    #[test]
    fn test_export_without_overwrite_picks_free_name() {
        let temp = TempDir::new().unwrap();
        let source = temp.child("A1B2.jpeg");
        source.write_str("second").unwrap();
        let out = temp.child("out");
        out.child("IMG_0051.jpeg").write_str("first").unwrap();
        out.child("IMG_0051 (1).jpeg").write_str("first copy").unwrap();

        let written = photo_at(source.path()).export(out.path(), false).unwrap();

        assert_eq!(written, out.path().join("IMG_0051 (2).jpeg"));
        out.child("IMG_0051.jpeg").assert("first");
        out.child("IMG_0051 (2).jpeg").assert("second");
    }

    #[test]
    fn test_export_missing_photo_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut photo = photo_at(&temp.path().join("gone.jpeg"));
        photo.is_missing = true;

        let result = photo.export(temp.path(), true);
        assert!(matches!(result, Err(ExportError::MissingAsset(name)) if name == "A1B2.jpeg"));
    }

    #[test]
    fn test_plain_filename() {
        assert!(is_plain_filename("IMG_0051.jpeg"));
        assert!(is_plain_filename("..hidden.jpeg"));
        assert!(!is_plain_filename(""));
        assert!(!is_plain_filename(".."));
        assert!(!is_plain_filename("../IMG_0051.jpeg"));
        assert!(!is_plain_filename("/tmp/IMG_0051.jpeg"));
        assert!(!is_plain_filename("2020/IMG_0051.jpeg"));
    }

    #[test]
    fn test_export_refuses_names_leaving_dest_dir() {
        let temp = TempDir::new().unwrap();
        let source = temp.child("A1B2.jpeg");
        source.write_str("original").unwrap();
        let out = temp.child("out/2020/2020-02-14");
        out.create_dir_all().unwrap();

        for name in ["../../../escaped.jpeg", "/tmp/escaped.jpeg"] {
            let mut photo = photo_at(source.path());
            photo.original_filename = name.to_string();
            let result = photo.export(out.path(), true);
            assert!(matches!(result, Err(ExportError::UnsafeFilename(n)) if n == name));
        }
        temp.child("escaped.jpeg").assert(predicates::path::missing());
    }

    #[test]
    fn test_next_free_name_without_extension() {
        let temp = TempDir::new().unwrap();
        temp.child("README").touch().unwrap();
        assert_eq!(next_free_name(temp.path(), "README"), temp.path().join("README (1)"));
    }
}
