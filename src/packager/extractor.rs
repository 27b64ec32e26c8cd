//! Extension extraction from archives and directories

use crate::error::{ConvertError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Recursively copy the contents of `src` into `dest`.
///
/// When `dest` lies inside `src` it is skipped, so the copy never walks into
/// its own output.
pub fn copy_directory(src: &Path, dest: &Path) -> Result<usize> {
    let src = fs::canonicalize(src).map_err(|e| ConvertError::io(src, e))?;
    let dest = fs::canonicalize(dest).map_err(|e| ConvertError::io(dest, e))?;
    let mut copied = 0;

    let walker = WalkDir::new(&src)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !entry.path().starts_with(&dest));

    for entry in walker {
        let entry = entry?;
        let relative_path = entry
            .path()
            .strip_prefix(&src)
            .map_err(|e| ConvertError::Internal(format!("Failed to get relative path: {}", e)))?;
        if relative_path.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(relative_path);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| ConvertError::io(&target, e))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| ConvertError::io(entry.path(), e))?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Unpack a ZIP or CRX archive into `dest`.
///
/// CRX files carry a header in front of the zip data; the archive reader
/// locates the central directory from the end, so both open the same way.
/// Entries that would land outside `dest` (absolute or `..` paths) fail the
/// whole archive before anything is written.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<usize> {
    let file = fs::File::open(archive_path).map_err(|e| ConvertError::io(archive_path, e))?;

    let mut archive = ZipArchive::new(file).map_err(|e| ConvertError::InputFormat {
        path: archive_path.to_path_buf(),
        reason: format!("not a zip or crx archive ({})", e),
    })?;

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.enclosed_name().is_none() {
            return Err(ConvertError::InputFormat {
                path: archive_path.to_path_buf(),
                reason: format!("unsafe entry path {:?}", entry.name()),
            });
        }
    }

    archive.extract(dest)?;
    Ok(archive.len())
}

/// Find the shallowest `manifest.json` under `root`, ties broken by path order
pub fn locate_manifest(root: &Path) -> Result<PathBuf> {
    let mut best: Option<(usize, PathBuf)> = None;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE_NAME {
            continue;
        }
        let depth = entry.depth();
        if best.as_ref().map_or(true, |(best_depth, _)| depth < *best_depth) {
            best = Some((depth, entry.into_path()));
        }
    }

    best.map(|(_, path)| path)
        .ok_or_else(|| ConvertError::ManifestMissing(root.to_path_buf()))
}
