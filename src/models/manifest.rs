//! Manifest data structures for Chrome and Firefox extensions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name used when a manifest does not declare one
pub const UNKNOWN_APP_NAME: &str = "Unknown App";

/// A parsed `manifest.json`, kept as an ordered JSON object.
///
/// Only the keys a rule touches are interpreted; everything else passes
/// through untouched and in its original position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManifestDocument {
    fields: Map<String, Value>,
}

impl ManifestDocument {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    /// Remove a key while keeping the order of the remaining ones
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    /// Declared extension name, or [`UNKNOWN_APP_NAME`]
    pub fn display_name(&self) -> &str {
        self.fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_APP_NAME)
    }

    /// `permissions` as a mutable list, if present and a list
    pub fn permissions_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.fields.get_mut("permissions").and_then(Value::as_array_mut)
    }

    /// `background.scripts`, if present
    pub fn background_scripts(&self) -> Option<&Vec<Value>> {
        self.fields
            .get("background")
            .and_then(|bg| bg.get("scripts"))
            .and_then(Value::as_array)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl From<Map<String, Value>> for ManifestDocument {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserSpecificSettings {
    pub gecko: GeckoSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeckoSettings {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_min_version: Option<String>,
}

/// Firefox `sidebar_action`, synthesized from Chrome's `side_panel`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarAction {
    pub default_panel: String,
    pub default_title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_icon: Option<Value>,
}
