//! Extra build dependency resolution
//!
//! Transitive packages can ask the consuming build for additional
//! repositories or pods through the project's own build property files:
//! `android/gradle.properties` on the Android side and
//! `ios/Podfile.properties.json` on the Apple side. This is optional
//! enrichment: a missing file, a missing key, or an unparseable value
//! all resolve to "no extra dependencies" and never fail the run.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::platforms::Platform;

pub const ANDROID_PROPERTIES_FILE: &str = "android/gradle.properties";
pub const ANDROID_EXTRA_DEPENDENCIES_KEY: &str = "android.extraMavenRepos";

pub const APPLE_PROPERTIES_FILE: &str = "ios/Podfile.properties.json";
pub const APPLE_EXTRA_DEPENDENCIES_KEY: &str = "apple.extraPods";

/// Arbitrary repository/dependency declarations passed through unmodified
/// to the consuming build system.
pub type ExtraDependencies = Value;

/// Resolves extra build dependencies declared in the project's property
/// files. Returns `Value::Null` when there are none.
pub async fn resolve_extra_dependencies(
    project_root: &Path,
    platform: Platform,
) -> ExtraDependencies {
    match platform {
        Platform::Android => {
            let path = project_root.join(ANDROID_PROPERTIES_FILE);
            let Ok(contents) = tokio::fs::read_to_string(&path).await else {
                debug!(path = %path.display(), "no Android property file");
                return Value::Null;
            };
            match find_property(&contents, ANDROID_EXTRA_DEPENDENCIES_KEY) {
                Some(raw) => parse_property_value(raw),
                None => Value::Null,
            }
        }
        Platform::Apple => {
            let path = project_root.join(APPLE_PROPERTIES_FILE);
            let Ok(contents) = tokio::fs::read_to_string(&path).await else {
                debug!(path = %path.display(), "no Apple property file");
                return Value::Null;
            };
            let Ok(store) = serde_json::from_str::<Value>(&contents) else {
                debug!(path = %path.display(), "Apple property store is not valid JSON");
                return Value::Null;
            };
            match store.get(APPLE_EXTRA_DEPENDENCIES_KEY) {
                Some(Value::String(raw)) => parse_property_value(raw),
                Some(value) => value.clone(),
                None => Value::Null,
            }
        }
    }
}

/// Looks up `key` in `key=value` property file contents.
///
/// Comment (`#`) and blank lines are skipped, the key is matched exactly
/// against the text before the first `=`, and the **first** match wins,
/// mirroring how the platform's own property loader resolves duplicate
/// keys. A later redefinition must not shadow an earlier one.
pub fn find_property<'a>(contents: &'a str, key: &str) -> Option<&'a str> {
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((candidate_key, value)) = line.split_once('=') else {
            continue;
        };
        if candidate_key.trim() == key {
            return Some(value.trim());
        }
    }
    None
}

/// A property value carrying embedded structured data (a JSON-encoded
/// array or object) is parsed; anything else is passed through as a raw
/// string. `enabled=1` is a string property, not the number one.
fn parse_property_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Array(_) | Value::Object(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}
