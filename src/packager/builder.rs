//! Firefox extension package builder

use crate::error::{ConvertError, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path};
use walkdir::WalkDir;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Zip every file under `source_dir` into `xpi_path`.
///
/// Entry names are relative to `source_dir`, so it becomes the archive root.
/// If the destination cannot be opened it is left alone; a partially written
/// file is removed on failure.
pub fn create_xpi(source_dir: &Path, xpi_path: &Path) -> Result<usize> {
    let write_error = |source| ConvertError::Write {
        path: xpi_path.to_path_buf(),
        source,
    };

    let file = File::create(xpi_path).map_err(write_error)?;
    write_archive(source_dir, xpi_path, file).map_err(|source| {
        let _ = fs::remove_file(xpi_path);
        write_error(source)
    })
}

fn write_archive(source_dir: &Path, xpi_path: &Path, file: File) -> io::Result<usize> {
    let mut zip = ZipWriter::new(file);

    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut count = 0;
    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        // Never pack the destination into itself
        if path == xpi_path {
            continue;
        }

        let relative_path = path
            .strip_prefix(source_dir)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        zip.start_file(entry_name(relative_path), options)
            .map_err(zip_to_io)?;
        let mut content = File::open(path)?;
        io::copy(&mut content, &mut zip)?;
        count += 1;
    }

    zip.finish().map_err(zip_to_io)?;
    Ok(count)
}

/// Archive entry name with `/` separators regardless of platform
fn entry_name(relative_path: &Path) -> String {
    relative_path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn zip_to_io(err: zip::result::ZipError) -> io::Error {
    match err {
        zip::result::ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}
