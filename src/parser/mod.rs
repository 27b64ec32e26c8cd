//! Manifest parsing

pub mod manifest;

pub use manifest::{parse_manifest, parse_manifest_from_file, serialize_manifest, write_manifest};
