//! Pluggable post-processing of rendered log lines.
//!
//! Modifiers are registered process-wide by name and looked up on every
//! render. An unknown name is a pass-through. A modifier must be total:
//! whatever it cannot handle it returns unchanged, never an error.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Registry name of the built-in JSON pretty-printing modifier.
pub const JSON_PRETTY: &str = "json-pretty";

/// A line transformation applied after a log line is assembled.
pub trait LogModifier: Send + Sync {
    /// Transform a rendered line. Must fail open: if the line cannot be
    /// handled, return it unchanged.
    fn modify(&self, line: &[u8]) -> Vec<u8>;
}

static MODIFIERS: Lazy<RwLock<HashMap<String, Arc<dyn LogModifier>>>> = Lazy::new(|| {
    let mut modifiers: HashMap<String, Arc<dyn LogModifier>> = HashMap::new();
    modifiers.insert(JSON_PRETTY.to_string(), Arc::new(JsonPrettyModifier));
    RwLock::new(modifiers)
});

/// Register a modifier under a name, replacing any previous registration.
///
/// The registry lock makes registration safe against concurrent renders,
/// though the expected pattern is still to register everything at startup.
pub fn register_modifier(name: impl Into<String>, modifier: Arc<dyn LogModifier>) {
    MODIFIERS.write().insert(name.into(), modifier);
}

/// Look up a modifier by name. Unknown names yield `None`.
pub(crate) fn modifier_for(name: &str) -> Option<Arc<dyn LogModifier>> {
    MODIFIERS.read().get(name).cloned()
}

/// Reformats single-line JSON log output into indented multi-line form.
pub struct JsonPrettyModifier;

impl LogModifier for JsonPrettyModifier {
    fn modify(&self, line: &[u8]) -> Vec<u8> {
        let Ok(text) = std::str::from_utf8(line) else {
            return line.to_vec();
        };
        let trimmed = text.trim();
        if !trimmed.starts_with('{') {
            return line.to_vec();
        }
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(value) if value.is_object() => match serde_json::to_string_pretty(&value) {
                Ok(pretty) => pretty.into_bytes(),
                Err(_) => line.to_vec(),
            },
            _ => line.to_vec(),
        }
    }
}
