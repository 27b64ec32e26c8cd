//! Deterministic Firefox extension identifiers

use uuid::Uuid;

/// Namespace the identifier is derived in (RFC 4122 DNS namespace)
pub const GECKO_ID_NAMESPACE: Uuid = Uuid::NAMESPACE_DNS;

/// Build a `{uuid}` style Gecko ID from the extension name.
///
/// Uses a name-based UUID v5, so the same name always maps to the same ID
/// and Firefox keeps treating a re-converted extension as an update.
pub fn gecko_id(extension_name: &str) -> String {
    let id = Uuid::new_v5(&GECKO_ID_NAMESPACE, extension_name.as_bytes());
    format!("{{{}}}", id.hyphenated())
}
