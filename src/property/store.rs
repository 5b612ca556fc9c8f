//! Authoritative local copies of the device's properties

use sensor_node_shared::{twin, WireValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Value of a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Int(i64),
    Bool(bool),
    /// Only used for reported-only facts such as device information
    Text(String),
}

impl PropertyValue {
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Int(_) => "integer",
            PropertyValue::Bool(_) => "boolean",
            PropertyValue::Text(_) => "text",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn same_kind(&self, other: &PropertyValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Desired values arrive as JSON; only integers and booleans are accepted
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(PropertyValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_i64().map(PropertyValue::Int),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Text(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<&PropertyValue> for WireValue {
    fn from(value: &PropertyValue) -> Self {
        match value {
            PropertyValue::Int(v) => WireValue::int(*v),
            PropertyValue::Bool(v) => WireValue::bool(*v),
            PropertyValue::Text(v) => WireValue::text(v.clone()),
        }
    }
}

/// Catalogue entry a property is created from
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: &'static str,
    pub default: PropertyValue,
    /// Whether the remote endpoint may set it through desired properties
    pub writable: bool,
    /// Whether a change must interrupt the scheduler's wait
    pub affects_cadence: bool,
}

impl PropertyDef {
    /// The node's properties, with the telemetry interval starting at `interval_secs`
    pub fn catalogue(interval_secs: i64) -> Vec<PropertyDef> {
        vec![
            PropertyDef {
                name: twin::TELEMETRY_INTERVAL,
                default: PropertyValue::Int(interval_secs),
                writable: true,
                affects_cadence: true,
            },
            PropertyDef {
                name: twin::LED_STATE,
                default: PropertyValue::Bool(false),
                writable: false,
                affects_cadence: false,
            },
        ]
    }
}

/// Current state of one property
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
    /// Last remote version accepted; 0 until the first desired update
    pub version: u64,
    /// Whether the current value has been confirmed to the remote endpoint
    pub acknowledged: bool,
    pub writable: bool,
    pub affects_cadence: bool,
}

/// Result of offering a remote update to the store
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteUpdate {
    /// Committed; carries the new state
    Accepted(Property),
    /// Version not newer than the stored one
    Stale { stored_version: u64 },
    /// No property of that name
    Unknown,
    /// Property exists but is not remotely writable
    NotWritable,
    /// Value kind differs from the property's kind
    TypeMismatch { expected: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown property: {0}")]
    Unknown(String),

    #[error("Property {name} holds {expected} values, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Shared property table.
///
/// Each `(value, version)` pair is read and written under one lock, so a
/// reader never pairs a value with another update's version.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    properties: Arc<RwLock<HashMap<String, Property>>>,
}

impl PropertyStore {
    pub fn new(defs: impl IntoIterator<Item = PropertyDef>) -> Self {
        let properties = defs
            .into_iter()
            .map(|def| {
                let property = Property {
                    name: def.name.to_string(),
                    value: def.default,
                    version: 0,
                    acknowledged: false,
                    writable: def.writable,
                    affects_cadence: def.affects_cadence,
                };
                (def.name.to_string(), property)
            })
            .collect();

        Self {
            properties: Arc::new(RwLock::new(properties)),
        }
    }

    /// Snapshot of one property
    pub async fn get(&self, name: &str) -> Option<Property> {
        self.properties.read().await.get(name).cloned()
    }

    pub async fn value(&self, name: &str) -> Option<PropertyValue> {
        self.properties.read().await.get(name).map(|p| p.value.clone())
    }

    /// Snapshot of every property, sorted by name
    pub async fn snapshot(&self) -> Vec<Property> {
        let mut all: Vec<Property> = self.properties.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Apply a desired update from the remote endpoint.
    ///
    /// Commits only when `version` is strictly newer than the stored version.
    pub async fn apply_remote(&self, name: &str, value: PropertyValue, version: u64) -> RemoteUpdate {
        let mut properties = self.properties.write().await;
        let Some(property) = properties.get_mut(name) else {
            return RemoteUpdate::Unknown;
        };

        if !property.writable {
            return RemoteUpdate::NotWritable;
        }
        if !property.value.same_kind(&value) {
            return RemoteUpdate::TypeMismatch {
                expected: property.value.kind(),
            };
        }
        if version <= property.version {
            return RemoteUpdate::Stale {
                stored_version: property.version,
            };
        }

        property.value = value;
        property.version = version;
        property.acknowledged = false;
        RemoteUpdate::Accepted(property.clone())
    }

    /// Change a property on the device's own initiative.
    ///
    /// The remote version is left untouched: a later desired update with any
    /// version newer than the last accepted one still applies.
    pub async fn set_local(&self, name: &str, value: PropertyValue) -> Result<Property, StoreError> {
        let mut properties = self.properties.write().await;
        let property = properties
            .get_mut(name)
            .ok_or_else(|| StoreError::Unknown(name.to_string()))?;

        if !property.value.same_kind(&value) {
            return Err(StoreError::TypeMismatch {
                name: name.to_string(),
                expected: property.value.kind(),
                actual: value.kind(),
            });
        }

        property.value = value;
        property.acknowledged = false;
        Ok(property.clone())
    }

    /// Record that `(value, version)` reached the remote endpoint.
    ///
    /// Does nothing if the property changed in the meantime.
    pub async fn mark_acknowledged(&self, name: &str, version: u64, value: &PropertyValue) -> bool {
        let mut properties = self.properties.write().await;
        match properties.get_mut(name) {
            Some(property) if property.version == version && &property.value == value => {
                property.acknowledged = true;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PropertyStore {
        PropertyStore::new(PropertyDef::catalogue(10))
    }

    #[tokio::test]
    async fn test_catalogue_defaults() {
        let store = store();
        let interval = store.get(twin::TELEMETRY_INTERVAL).await.unwrap();
        assert_eq!(interval.value, PropertyValue::Int(10));
        assert_eq!(interval.version, 0);
        assert!(!interval.acknowledged);
        assert_eq!(store.value(twin::LED_STATE).await, Some(PropertyValue::Bool(false)));
    }

    #[tokio::test]
    async fn test_highest_version_wins_in_either_order() {
        for order in [[(3, 5), (7, 2)], [(7, 2), (3, 5)]] {
            let store = store();
            for (version, value) in order {
                store
                    .apply_remote(twin::TELEMETRY_INTERVAL, PropertyValue::Int(value), version)
                    .await;
            }
            let interval = store.get(twin::TELEMETRY_INTERVAL).await.unwrap();
            assert_eq!(interval.value, PropertyValue::Int(2));
            assert_eq!(interval.version, 7);
        }
    }

    #[tokio::test]
    async fn test_stale_and_duplicate_versions_change_nothing() {
        let store = store();
        let accepted = store
            .apply_remote(twin::TELEMETRY_INTERVAL, PropertyValue::Int(4), 5)
            .await;
        assert!(matches!(accepted, RemoteUpdate::Accepted(_)));

        for version in [5, 4, 0] {
            let outcome = store
                .apply_remote(twin::TELEMETRY_INTERVAL, PropertyValue::Int(99), version)
                .await;
            assert_eq!(outcome, RemoteUpdate::Stale { stored_version: 5 });
        }

        let interval = store.get(twin::TELEMETRY_INTERVAL).await.unwrap();
        assert_eq!((interval.value, interval.version), (PropertyValue::Int(4), 5));
    }

    #[tokio::test]
    async fn test_version_zero_never_applies() {
        let store = store();
        let outcome = store
            .apply_remote(twin::TELEMETRY_INTERVAL, PropertyValue::Int(3), 0)
            .await;
        assert_eq!(outcome, RemoteUpdate::Stale { stored_version: 0 });
    }

    #[tokio::test]
    async fn test_rejected_remote_updates() {
        let store = store();
        assert_eq!(
            store.apply_remote("fanSpeed", PropertyValue::Int(3), 1).await,
            RemoteUpdate::Unknown
        );
        assert_eq!(
            store.apply_remote(twin::LED_STATE, PropertyValue::Bool(true), 1).await,
            RemoteUpdate::NotWritable
        );
        assert_eq!(
            store
                .apply_remote(twin::TELEMETRY_INTERVAL, PropertyValue::Bool(true), 1)
                .await,
            RemoteUpdate::TypeMismatch { expected: "integer" }
        );
        assert_eq!(store.get(twin::TELEMETRY_INTERVAL).await.unwrap().version, 0);
    }

    #[tokio::test]
    async fn test_set_local_keeps_version() {
        let store = store();
        store
            .apply_remote(twin::TELEMETRY_INTERVAL, PropertyValue::Int(4), 6)
            .await;

        let updated = store
            .set_local(twin::TELEMETRY_INTERVAL, PropertyValue::Int(30))
            .await
            .unwrap();
        assert_eq!(updated.value, PropertyValue::Int(30));
        assert_eq!(updated.version, 6);

        // A newer remote version still overrides the local change
        let outcome = store
            .apply_remote(twin::TELEMETRY_INTERVAL, PropertyValue::Int(8), 7)
            .await;
        assert!(matches!(outcome, RemoteUpdate::Accepted(_)));
    }

    #[tokio::test]
    async fn test_set_local_errors() {
        let store = store();
        assert_eq!(
            store.set_local("fanSpeed", PropertyValue::Int(1)).await,
            Err(StoreError::Unknown("fanSpeed".into()))
        );
        assert!(matches!(
            store.set_local(twin::LED_STATE, PropertyValue::Int(1)).await,
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_acknowledgment_tracks_current_pair() {
        let store = store();
        store
            .apply_remote(twin::TELEMETRY_INTERVAL, PropertyValue::Int(4), 2)
            .await;
        store
            .apply_remote(twin::TELEMETRY_INTERVAL, PropertyValue::Int(6), 3)
            .await;

        // Ack for the superseded update must not mark the newer one
        assert!(
            !store
                .mark_acknowledged(twin::TELEMETRY_INTERVAL, 2, &PropertyValue::Int(4))
                .await
        );
        assert!(
            store
                .mark_acknowledged(twin::TELEMETRY_INTERVAL, 3, &PropertyValue::Int(6))
                .await
        );
        assert!(store.get(twin::TELEMETRY_INTERVAL).await.unwrap().acknowledged);
    }

    #[test]
    fn test_json_values() {
        use serde_json::json;
        assert_eq!(PropertyValue::from_json(&json!(5)), Some(PropertyValue::Int(5)));
        assert_eq!(PropertyValue::from_json(&json!(false)), Some(PropertyValue::Bool(false)));
        assert_eq!(PropertyValue::from_json(&json!(2.5)), None);
        assert_eq!(PropertyValue::from_json(&json!("5")), None);
        assert_eq!(PropertyValue::from_json(&json!(null)), None);
    }

    #[test]
    fn test_wire_conversion() {
        use sensor_node_shared::wire_value::Kind;
        assert_eq!(
            WireValue::from(&PropertyValue::Bool(true)).kind,
            Some(Kind::BoolValue(true))
        );
        assert_eq!(
            WireValue::from(&PropertyValue::Int(-3)).kind,
            Some(Kind::IntValue(-3))
        );
    }
}
