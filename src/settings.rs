//! Persisted key-value settings: table coordinates and link-type visibility.

use crate::graph::EnabledLinkTypes;
use crate::layout::CoordinateMap;
use serde_json::Value;

pub const COORDINATES_PATH: &[&str] = &["tableCoordinates"];
pub const ENABLED_LINK_TYPES_PATH: &[&str] = &["enabledLinkTypes"];

/// Narrow interface over the host's persisted settings store. Writes are
/// best-effort: an implementation must silently no-op (never error) when
/// the user lacks write permission.
pub trait SettingsStore {
    fn get(&self, path: &[&str]) -> Option<Value>;
    fn set(&mut self, path: &[&str], value: Value);
    fn has_write_permission(&self) -> bool;
}

/// In-memory store, used in tests and standalone embeddings.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    root: Value,
    writable: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            root: Value::Object(Default::default()),
            writable: true,
        }
    }
}

impl MemoryStore {
    pub fn read_only() -> Self {
        Self {
            root: Value::Object(Default::default()),
            writable: false,
        }
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, path: &[&str]) -> Option<Value> {
        let mut current = &self.root;
        for segment in path {
            current = current.as_object()?.get(*segment)?;
        }
        Some(current.clone())
    }

    fn set(&mut self, path: &[&str], value: Value) {
        if !self.writable {
            return;
        }
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut current = &mut self.root;
        for segment in parents {
            if !current.is_object() {
                *current = Value::Object(Default::default());
            }
            let Some(map) = current.as_object_mut() else {
                return;
            };
            current = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Default::default()));
        }
        if !current.is_object() {
            *current = Value::Object(Default::default());
        }
        if let Some(map) = current.as_object_mut() {
            map.insert(last.to_string(), value);
        }
    }

    fn has_write_permission(&self) -> bool {
        self.writable
    }
}

/// Previously persisted table positions; malformed values degrade to an
/// empty map rather than failing the panel.
pub fn load_coordinates(store: &dyn SettingsStore) -> CoordinateMap {
    let Some(value) = store.get(COORDINATES_PATH) else {
        return CoordinateMap::new();
    };
    serde_json::from_value(value).unwrap_or_else(|err| {
        log::warn!("discarding malformed persisted coordinates: {}", err);
        CoordinateMap::new()
    })
}

pub fn save_coordinates(store: &mut dyn SettingsStore, coords: &CoordinateMap) {
    if let Ok(value) = serde_json::to_value(coords) {
        store.set(COORDINATES_PATH, value);
    }
}

pub fn load_enabled_link_types(store: &dyn SettingsStore) -> EnabledLinkTypes {
    let Some(value) = store.get(ENABLED_LINK_TYPES_PATH) else {
        return EnabledLinkTypes::default();
    };
    serde_json::from_value(value).unwrap_or_else(|err| {
        log::warn!("discarding malformed persisted link-type flags: {}", err);
        EnabledLinkTypes::default()
    })
}

pub fn save_enabled_link_types(store: &mut dyn SettingsStore, enabled: &EnabledLinkTypes) {
    if let Ok(value) = serde_json::to_value(enabled) {
        store.set(ENABLED_LINK_TYPES_PATH, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Coordinate;
    use serde_json::json;

    #[test]
    fn test_get_set_nested_path() {
        let mut store = MemoryStore::default();
        store.set(&["a", "b"], json!(42));
        assert_eq!(store.get(&["a", "b"]), Some(json!(42)));
        assert_eq!(store.get(&["a"]), Some(json!({ "b": 42 })));
        assert_eq!(store.get(&["a", "missing"]), None);
    }

    #[test]
    fn test_read_only_set_is_silent_noop() {
        let mut store = MemoryStore::read_only();
        store.set(&["a"], json!(1));
        assert_eq!(store.get(&["a"]), None);
        assert!(!store.has_write_permission());
    }

    #[test]
    fn test_coordinates_round_trip() {
        let mut store = MemoryStore::default();
        let mut coords = CoordinateMap::new();
        coords.insert("tbl1".to_string(), Coordinate { x: 10.0, y: 20.0 });
        save_coordinates(&mut store, &coords);
        assert_eq!(load_coordinates(&store), coords);
    }

    #[test]
    fn test_malformed_coordinates_degrade_to_empty() {
        let mut store = MemoryStore::default();
        store.set(COORDINATES_PATH, json!("not a map"));
        assert!(load_coordinates(&store).is_empty());
    }

    #[test]
    fn test_enabled_link_types_default_when_unset() {
        let store = MemoryStore::default();
        assert_eq!(load_enabled_link_types(&store), EnabledLinkTypes::default());
    }

    #[test]
    fn test_enabled_link_types_round_trip() {
        let mut store = MemoryStore::default();
        let mut enabled = EnabledLinkTypes::default();
        enabled.formula = false;
        save_enabled_link_types(&mut store, &enabled);
        assert_eq!(load_enabled_link_types(&store), enabled);
    }
}
