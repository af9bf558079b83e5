use crate::photoexport_core::dates::{DateRange, ParsedDate, parse_date};
use crate::photoexport_core::error::{ExportError, Result};
use std::path::{Component, Path, PathBuf, is_separator};
use time::Date;

/// Longest single path component accepted on any supported filesystem.
const MAX_COMPONENT_LEN: usize = 255;

/// Characters Windows refuses in path components.
#[cfg(windows)]
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// A validated export invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub export_path: PathBuf,
    pub range: DateRange,
    /// Library to read from. `None` means the active system library.
    pub library_path: Option<PathBuf>,
}

impl ExportRequest {
    /// Validate raw command-line values into a request.
    ///
    /// Missing dates default to the week ending `today`. The export path must
    /// already exist as a directory.
    pub fn resolve(
        export_path: &str,
        from_date: Option<&str>,
        to_date: Option<&str>,
        library_path: Option<&str>,
        today: Date,
    ) -> Result<Self> {
        let export_path = validate_export_path(export_path)?;

        let default = DateRange::default_window(today);
        let from = match from_date {
            Some(raw) => parse_date(raw, today)?,
            None => ParsedDate::from_date(default.from.date()),
        };
        let to = match to_date {
            Some(raw) => parse_date(raw, today)?,
            None => ParsedDate::from_date(default.to.date()),
        };
        let range = DateRange::new(from, to);
        if range.is_empty() {
            log::warn!("From date is after to date ({}), nothing will match", range);
        }

        let library_path = library_path.map(expand_home);

        Ok(ExportRequest {
            export_path,
            range,
            library_path,
        })
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(is_separator) => rest,
        _ => return PathBuf::from(raw),
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(is_separator)),
        None => {
            log::warn!("Could not determine home directory, leaving {} unexpanded", raw);
            PathBuf::from(raw)
        }
    }
}

/// Check that `raw` is a usable export destination and return it expanded.
pub fn validate_export_path(raw: &str) -> Result<PathBuf> {
    let invalid = |reason: &str| ExportError::InvalidExportPath {
        path: raw.to_string(),
        reason: reason.to_string(),
    };

    if raw.trim().is_empty() {
        return Err(invalid("path is empty"));
    }
    if raw.contains('\0') {
        return Err(invalid("path contains a NUL character"));
    }

    let path = expand_home(raw);
    check_components(&path).map_err(|reason| invalid(&reason))?;

    if !path.exists() {
        return Err(ExportError::PathNotFound(path));
    }
    if !path.is_dir() {
        return Err(ExportError::NotADirectory(path));
    }

    log::debug!("Export path {} is valid", path.display());
    Ok(path)
}

fn check_components(path: &Path) -> std::result::Result<(), String> {
    for component in path.components() {
        let Component::Normal(name) = component else {
            continue;
        };
        let name = name.to_string_lossy();
        if name.len() > MAX_COMPONENT_LEN {
            return Err(format!(
                "component '{}...' is longer than {} bytes",
                name.chars().take(16).collect::<String>(),
                MAX_COMPONENT_LEN
            ));
        }
        if let Some(c) = reserved_char(&name) {
            return Err(format!("component '{}' contains reserved character {:?}", name, c));
        }
    }
    Ok(())
}

#[cfg(windows)]
fn reserved_char(name: &str) -> Option<char> {
    name.chars().find(|c| RESERVED_CHARS.contains(c) || c.is_control())
}

#[cfg(not(windows))]
fn reserved_char(_name: &str) -> Option<char> {
    None
}
