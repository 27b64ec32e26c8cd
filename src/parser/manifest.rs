//! Manifest parsing and serialization

use crate::error::{ConvertError, Result};
use crate::models::ManifestDocument;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Parse manifest.json from bytes
pub fn parse_manifest(content: &[u8]) -> Result<ManifestDocument> {
    let content_str = std::str::from_utf8(content)
        .map_err(|e| ConvertError::ManifestParse(format!("invalid UTF-8: {}", e)))?;
    // Tolerate a UTF-8 BOM, which some packers emit
    let content_str = content_str.trim_start_matches('\u{feff}');

    // Strict JSON first; json5 only as a fallback for manifests with comments
    let value: Value = match serde_json::from_str(content_str) {
        Ok(value) => value,
        Err(strict_err) => json5::from_str(content_str)
            .map_err(|_| ConvertError::ManifestParse(strict_err.to_string()))?,
    };

    match value {
        Value::Object(fields) => Ok(ManifestDocument::new(fields)),
        other => Err(ConvertError::ManifestParse(format!(
            "expected a JSON object at top level, found {}",
            json_kind(&other)
        ))),
    }
}

/// Parse manifest.json from file path
pub fn parse_manifest_from_file(path: impl AsRef<Path>) -> Result<ManifestDocument> {
    let path = path.as_ref();
    let content = fs::read(path).map_err(|e| ConvertError::io(path, e))?;
    parse_manifest(&content)
}

/// Parse manifest.json from string
pub fn parse_manifest_from_str(content: &str) -> Result<ManifestDocument> {
    parse_manifest(content.as_bytes())
}

/// Pretty-print with two-space indentation, non-ASCII left unescaped
pub fn serialize_manifest(manifest: &ManifestDocument) -> Result<String> {
    let mut out = serde_json::to_string_pretty(manifest.fields())
        .map_err(|e| ConvertError::Internal(format!("manifest serialization: {}", e)))?;
    out.push('\n');
    Ok(out)
}

/// Overwrite `path` with the serialized manifest
pub fn write_manifest(manifest: &ManifestDocument, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let content = serialize_manifest(manifest)?;
    fs::write(path, content).map_err(|source| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_manifest() {
        let json = r#"{
            "manifest_version": 3,
            "name": "Test Extension",
            "version": "1.0.0"
        }"#;

        let manifest = parse_manifest_from_str(json).unwrap();
        assert_eq!(manifest.get("manifest_version"), Some(&Value::from(3)));
        assert_eq!(manifest.display_name(), "Test Extension");
    }

    #[test]
    fn test_parse_keeps_key_order() {
        let json = r#"{"version": "1", "name": "x", "action": {}, "icons": {}}"#;
        let manifest = parse_manifest_from_str(json).unwrap();
        let keys: Vec<_> = manifest.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["version", "name", "action", "icons"]);
    }

    #[test]
    fn test_parse_with_comments() {
        let json = r#"{
            // This is a comment
            "manifest_version": 3,
            "name": "Test Extension", // inline comment
            /* Block comment */
            "version": "1.0.0"
        }"#;

        let manifest = parse_manifest_from_str(json).unwrap();
        assert_eq!(manifest.display_name(), "Test Extension");
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_manifest_from_str("{ \"name\": ").unwrap_err();
        assert!(matches!(err, ConvertError::ManifestParse(_)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_manifest_from_str("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ConvertError::ManifestParse(msg) if msg.contains("an array")));
    }

    #[test]
    fn test_serialize_keeps_non_ascii() {
        let manifest = parse_manifest_from_str(r#"{"name": "확장 프로그램 ✓"}"#).unwrap();
        let out = serialize_manifest(&manifest).unwrap();
        assert!(out.contains("확장 프로그램 ✓"));
        assert!(out.starts_with("{\n  \"name\""));
        assert!(out.ends_with("}\n"));
    }
}
