//! Filesystem handling for published artifacts and media.
//!
//! Documents are rewritten whole: read, transform, write through a temp
//! file in the target directory. Media files are owned by their stem and
//! cleared before regeneration so republishing never leaves stale
//! figures behind.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use pressrun_shared::{PressrunError, Result, Stem};

/// Image extensions recognized when copying and clearing stem media.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Create a directory (and parents) if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| PressrunError::io(dir, e))
}

/// Read a whole document into memory.
pub fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| PressrunError::io(path, e))
}

/// Write a whole document through a temp file in the same directory, so
/// a crash mid-write never leaves a half-written artifact.
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp =
        tempfile::NamedTempFile::new_in(dir).map_err(|e| PressrunError::io(dir, e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| PressrunError::io(path, e))?;
    temp.persist(path)
        .map_err(|e| PressrunError::io(path, e.error))?;
    debug!(path = %path.display(), bytes = content.len(), "wrote document");
    Ok(())
}

/// Rewrite a document as read-whole, transform, write-whole.
///
/// Returns whether anything changed; an unchanged document is not
/// rewritten.
pub fn rewrite_document(path: &Path, transform: impl FnOnce(&str) -> String) -> Result<bool> {
    let original = read_document(path)?;
    let transformed = transform(&original);
    if transformed == original {
        return Ok(false);
    }
    write_document(path, &transformed)?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Media files
// ---------------------------------------------------------------------------

/// Whether `name` is a media file owned by `stem`: the stem followed by
/// `.` (the card image) or `_` (figures and formula images), with an
/// image extension. Plain prefix matching would claim files of a longer
/// stem that merely starts the same.
fn stem_owned(name: &str, stem: &str) -> bool {
    let Some(rest) = name.strip_prefix(stem) else {
        return false;
    };
    (rest.starts_with('.') || rest.starts_with('_')) && has_image_extension(name)
}

fn has_image_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Delete every media file owned by `stem`. A missing media directory
/// counts as zero deletions.
pub fn clean_stem_media(media_dir: &Path, stem: &Stem) -> Result<usize> {
    if !media_dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    let entries = std::fs::read_dir(media_dir).map_err(|e| PressrunError::io(media_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| PressrunError::io(media_dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if entry.path().is_file() && stem_owned(name, stem.as_str()) {
            std::fs::remove_file(entry.path()).map_err(|e| PressrunError::io(entry.path(), e))?;
            removed += 1;
        }
    }

    if removed > 0 {
        debug!(%stem, removed, "cleared stale stem media");
    }
    Ok(removed)
}

/// Copy hand-placed figures owned by `stem` from the raw-media staging
/// area into the media directory, names preserved. A missing staging
/// directory counts as zero copies.
pub fn copy_staged_figures(raw_media: &Path, media_dir: &Path, stem: &Stem) -> Result<usize> {
    if !raw_media.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    let entries = std::fs::read_dir(raw_media).map_err(|e| PressrunError::io(raw_media, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| PressrunError::io(raw_media, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if entry.path().is_file() && stem_owned(name, stem.as_str()) {
            let target = media_dir.join(name);
            std::fs::copy(entry.path(), &target)
                .map_err(|e| PressrunError::io(entry.path(), e))?;
            copied += 1;
        }
    }

    if copied > 0 {
        debug!(%stem, copied, "copied staged figures");
    }
    Ok(copied)
}

/// Copy every regular file from `src` into `dst`, names preserved.
/// A missing `src` counts as zero copies (a notebook with no figures
/// exports no folder).
pub fn copy_dir_files(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    let entries = std::fs::read_dir(src).map_err(|e| PressrunError::io(src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| PressrunError::io(src, e))?;
        if !entry.path().is_file() {
            debug!(path = %entry.path().display(), "skipping non-file in figures folder");
            continue;
        }
        let target = dst.join(entry.file_name());
        std::fs::copy(entry.path(), &target).map_err(|e| PressrunError::io(entry.path(), e))?;
        copied += 1;
    }

    Ok(copied)
}

/// Move a file into place. Rename fails across filesystems (the scratch
/// dir is often on tmpfs), so fall back to copy-then-remove.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to).map_err(|e| PressrunError::io(from, e))?;
    std::fs::remove_file(from).map_err(|e| PressrunError::io(from, e))?;
    Ok(())
}

/// Delete a file if it exists. Returns whether anything was deleted.
pub fn remove_if_present(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PressrunError::io(path, e)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
