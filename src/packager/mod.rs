//! Package extraction and building

pub mod extractor;
pub mod builder;

pub use builder::create_xpi;
pub use extractor::{locate_manifest, MANIFEST_FILE_NAME};

use crate::error::{ConvertError, Result};
use std::path::Path;

/// How the input was provided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Directory,
    Archive,
}

/// Copy or extract `input` into `work_dir`
pub fn unpack(input: &Path, work_dir: &Path) -> Result<InputKind> {
    if input.is_dir() {
        extractor::copy_directory(input, work_dir)?;
        Ok(InputKind::Directory)
    } else if input.is_file() {
        extractor::extract_archive(input, work_dir)?;
        Ok(InputKind::Archive)
    } else {
        Err(ConvertError::InputFormat {
            path: input.to_path_buf(),
            reason: "path does not exist".to_string(),
        })
    }
}
