//! Manifest transformation for Firefox compatibility

use super::gecko_id::gecko_id;
use crate::config::DEFAULT_STRICT_MIN_VERSION;
use crate::models::{BrowserSpecificSettings, GeckoSettings, ManifestDocument, SidebarAction};
use serde_json::Value;
use std::fmt;

/// Chrome-only permissions Firefox rejects
pub const BLOCKED_PERMISSIONS: &[&str] = &[
    "gcm",
    "background",
    "experimental",
    "ttsEngine",
    "declarativeContent",
    "pageCapture",
    "system.cpu",
    "system.memory",
];

/// Top-level keys with no meaning in Firefox
pub const UNSUPPORTED_KEYS: &[&str] = &[
    "update_url",
    "key",
    "oauth2",
    "minimum_chrome_version",
    "requirements",
    "nacl_modules",
];

// Both the manifest key spelling and Chrome's permission spelling show up in the wild
const SIDE_PANEL_PERMISSIONS: &[&str] = &["side_panel", "sidePanel"];

/// A single named edit. Rules run in the order of [`Rule::ALL`]; several
/// of them depend on what an earlier one left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    GeckoIdentity,
    BackgroundScripts,
    SidebarAction,
    IncognitoMode,
    ShimInjection,
    PermissionFilter,
    UnsupportedKeys,
}

impl Rule {
    pub const ALL: [Rule; 7] = [
        Rule::GeckoIdentity,
        Rule::BackgroundScripts,
        Rule::SidebarAction,
        Rule::IncognitoMode,
        Rule::ShimInjection,
        Rule::PermissionFilter,
        Rule::UnsupportedKeys,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rule::GeckoIdentity => "gecko-identity",
            Rule::BackgroundScripts => "background-scripts",
            Rule::SidebarAction => "sidebar-action",
            Rule::IncognitoMode => "incognito-mode",
            Rule::ShimInjection => "shim-injection",
            Rule::PermissionFilter => "permission-filter",
            Rule::UnsupportedKeys => "unsupported-keys",
        }
    }

    /// Apply this rule in place. Returns a description when something changed.
    pub fn apply(self, transformer: &ManifestTransformer, manifest: &mut ManifestDocument) -> Option<String> {
        match self {
            Rule::GeckoIdentity => add_gecko_identity(manifest, &transformer.strict_min_version),
            Rule::BackgroundScripts => convert_service_worker(manifest),
            Rule::SidebarAction => convert_side_panel(manifest),
            Rule::IncognitoMode => fix_incognito(manifest),
            Rule::ShimInjection => transformer
                .shim_filename
                .as_deref()
                .and_then(|shim| inject_shim(manifest, shim)),
            Rule::PermissionFilter => filter_permissions(manifest),
            Rule::UnsupportedKeys => remove_unsupported_keys(manifest),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleChange {
    pub rule: Rule,
    pub description: String,
}

/// What a transformation actually changed, in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub changes: Vec<RuleChange>,
}

impl TransformReport {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Rewrites a Chrome MV3 manifest into one Firefox accepts. Pure: no I/O.
#[derive(Debug, Clone)]
pub struct ManifestTransformer {
    shim_filename: Option<String>,
    strict_min_version: String,
}

impl ManifestTransformer {
    pub fn new(shim_filename: Option<&str>) -> Self {
        Self {
            shim_filename: shim_filename.map(str::to_string),
            strict_min_version: DEFAULT_STRICT_MIN_VERSION.to_string(),
        }
    }

    pub fn with_strict_min_version(mut self, version: impl Into<String>) -> Self {
        self.strict_min_version = version.into();
        self
    }

    pub fn transform(&self, manifest: ManifestDocument) -> ManifestDocument {
        let mut result = manifest;
        self.transform_in_place(&mut result);
        result
    }

    /// Run every rule in order, collecting what changed
    pub fn transform_in_place(&self, manifest: &mut ManifestDocument) -> TransformReport {
        let mut report = TransformReport::default();
        for rule in Rule::ALL {
            if let Some(description) = rule.apply(self, manifest) {
                report.changes.push(RuleChange { rule, description });
            }
        }
        report
    }
}

fn add_gecko_identity(manifest: &mut ManifestDocument, strict_min_version: &str) -> Option<String> {
    if manifest.contains_key("browser_specific_settings") {
        return None;
    }

    let settings = BrowserSpecificSettings {
        gecko: GeckoSettings {
            id: gecko_id(manifest.display_name()),
            strict_min_version: Some(strict_min_version.to_string()),
        },
    };
    let description = format!("Added browser_specific_settings.gecko.id {}", settings.gecko.id);
    let value = serde_json::to_value(&settings).ok()?;
    manifest.insert("browser_specific_settings", value);
    Some(description)
}

fn convert_service_worker(manifest: &mut ManifestDocument) -> Option<String> {
    let background = manifest.get_mut("background")?.as_object_mut()?;
    let worker = background.shift_remove("service_worker")?;

    let scripts = background
        .entry("scripts")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !scripts.is_array() {
        *scripts = Value::Array(Vec::new());
    }
    if let Value::Array(list) = scripts {
        if !list.contains(&worker) {
            list.push(worker.clone());
        }
    }

    Some(format!(
        "Converted service worker {} to background scripts",
        worker
    ))
}

fn convert_side_panel(manifest: &mut ManifestDocument) -> Option<String> {
    let side_panel = manifest.remove("side_panel")?;

    let default_path = side_panel
        .get("default_path")
        .and_then(Value::as_str)
        .filter(|path| !path.is_empty());

    let mut description = String::from("Removed side_panel");
    if let Some(path) = default_path {
        let action = SidebarAction {
            default_panel: path.to_string(),
            default_title: manifest.display_name().to_string(),
            default_icon: manifest.get("icons").cloned(),
        };
        if let Ok(value) = serde_json::to_value(&action) {
            manifest.insert("sidebar_action", value);
            description = format!("Converted side_panel to sidebar_action ({})", path);
        }
    }

    if let Some(perms) = manifest.permissions_mut() {
        perms.retain(|p| !matches!(p.as_str(), Some(s) if SIDE_PANEL_PERMISSIONS.contains(&s)));
    }

    Some(description)
}

fn fix_incognito(manifest: &mut ManifestDocument) -> Option<String> {
    if manifest.get("incognito").and_then(Value::as_str) != Some("split") {
        return None;
    }
    manifest.insert("incognito", Value::from("spanning"));
    Some("Fixed: 'incognito: split' -> 'spanning'".to_string())
}

fn inject_shim(manifest: &mut ManifestDocument, shim: &str) -> Option<String> {
    let shim_value = Value::from(shim);
    let mut targets = Vec::new();

    let background_scripts = manifest
        .get_mut("background")
        .and_then(|bg| bg.get_mut("scripts"))
        .and_then(Value::as_array_mut);
    if let Some(scripts) = background_scripts {
        if prepend_once(scripts, &shim_value) {
            targets.push("background".to_string());
        }
    }

    let content_scripts = manifest
        .get_mut("content_scripts")
        .and_then(Value::as_array_mut);
    if let Some(entries) = content_scripts {
        for (index, entry) in entries.iter_mut().enumerate() {
            if let Some(js) = entry.get_mut("js").and_then(Value::as_array_mut) {
                if prepend_once(js, &shim_value) {
                    targets.push(format!("content_scripts[{}]", index));
                }
            }
        }
    }

    if targets.is_empty() {
        None
    } else {
        Some(format!("Injected {} into {}", shim, targets.join(", ")))
    }
}

fn prepend_once(list: &mut Vec<Value>, item: &Value) -> bool {
    if list.contains(item) {
        return false;
    }
    list.insert(0, item.clone());
    true
}

fn filter_permissions(manifest: &mut ManifestDocument) -> Option<String> {
    let perms = manifest.permissions_mut()?;

    let mut removed = Vec::new();
    perms.retain(|p| match p.as_str() {
        Some(name) if BLOCKED_PERMISSIONS.contains(&name) => {
            removed.push(name.to_string());
            false
        }
        _ => true,
    });

    if removed.is_empty() {
        None
    } else {
        Some(format!("Removed unsupported permissions: {}", removed.join(", ")))
    }
}

fn remove_unsupported_keys(manifest: &mut ManifestDocument) -> Option<String> {
    let removed: Vec<&str> = UNSUPPORTED_KEYS
        .iter()
        .copied()
        .filter(|key| manifest.remove(key).is_some())
        .collect();

    if removed.is_empty() {
        None
    } else {
        Some(format!("Removed unsupported keys: {}", removed.join(", ")))
    }
}
