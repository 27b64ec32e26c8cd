//! Manifest transformation for Firefox

pub mod gecko_id;
pub mod manifest;

pub use gecko_id::gecko_id;
pub use manifest::{
    ManifestTransformer, Rule, RuleChange, TransformReport, BLOCKED_PERMISSIONS, UNSUPPORTED_KEYS,
};

use crate::models::ManifestDocument;

/// Apply every rule to `manifest`, injecting `shim_filename` when given
pub fn transform(manifest: ManifestDocument, shim_filename: Option<&str>) -> ManifestDocument {
    ManifestTransformer::new(shim_filename).transform(manifest)
}
