//! Firestore REST typed-value encoding
//!
//! The REST API wraps every field in a single-key object naming its type,
//! e.g. `{"stringValue": "hi"}` or `{"integerValue": "1"}`. Integers travel
//! as decimal strings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A typed Firestore field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    #[serde(with = "integer_string")]
    IntegerValue(i64),
    #[serde(with = "double_repr")]
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::StringValue(s.into())
    }

    /// Second-precision UTC timestamp, e.g. `2024-05-01T12:00:00Z`.
    pub fn timestamp(at: DateTime<Utc>) -> Self {
        Value::TimestampValue(at.format("%Y-%m-%dT%H:%M:%SZ").to_string())
    }

    pub fn map(fields: BTreeMap<String, Value>) -> Self {
        Value::MapValue(MapValue { fields })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::StringValue(s) => Some(s),
            _ => None,
        }
    }
}

/// A Firestore document as sent to and returned by the REST API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.fields.insert(field.to_string(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String field, treating an empty string as absent.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Field names, in the order they go into an update mask.
    pub fn field_paths(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

mod integer_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(i64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(D::Error::custom),
            Repr::Number(n) => Ok(n),
        }
    }
}

/// Finite doubles travel as JSON numbers; NaN and the infinities as the
/// strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
mod double_repr {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if *value == f64::INFINITY {
            serializer.serialize_str("Infinity")
        } else if *value == f64::NEG_INFINITY {
            serializer.serialize_str("-Infinity")
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => other.parse().map_err(D::Error::custom),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_integer_is_sent_as_string() {
        let v = serde_json::to_value(Value::IntegerValue(1)).unwrap();
        assert_eq!(v, json!({"integerValue": "1"}));
    }

    #[test]
    fn test_integer_accepts_string_or_number() {
        let a: Value = serde_json::from_value(json!({"integerValue": "42"})).unwrap();
        let b: Value = serde_json::from_value(json!({"integerValue": 42})).unwrap();
        assert_eq!(a, Value::IntegerValue(42));
        assert_eq!(b, Value::IntegerValue(42));
    }

    #[test]
    fn test_timestamp_second_precision() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap();
        assert_eq!(
            Value::timestamp(at),
            Value::TimestampValue("2024-05-01T12:30:05Z".to_string())
        );
    }

    #[test]
    fn test_nested_map_serialization() {
        let mut inner = BTreeMap::new();
        inner.insert("text".to_string(), Value::string("hello"));
        let doc = Document::new()
            .with("lastMessage", Value::map(inner))
            .with("read", Value::BooleanValue(false));

        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            v,
            json!({
                "fields": {
                    "lastMessage": {"mapValue": {"fields": {"text": {"stringValue": "hello"}}}},
                    "read": {"booleanValue": false}
                }
            })
        );
    }

    #[test]
    fn test_parse_server_document_with_mixed_kinds() {
        let body = json!({
            "name": "projects/p/databases/(default)/documents/users/u1",
            "fields": {
                "fcmToken": {"stringValue": "tok"},
                "lastSeen": {"timestampValue": "2024-01-01T00:00:00.123456Z"},
                "avatar": {"nullValue": null},
                "tags": {"arrayValue": {}},
                "score": {"doubleValue": 1.5},
                "home": {"geoPointValue": {"latitude": 1.0, "longitude": 2.0}},
                "profile": {"mapValue": {}}
            },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-02T00:00:00Z"
        });

        let doc: Document = serde_json::from_value(body).unwrap();
        assert_eq!(doc.get_str("fcmToken"), Some("tok"));
        assert_eq!(doc.get("avatar"), Some(&Value::NullValue(())));
        assert_eq!(
            doc.get("tags"),
            Some(&Value::ArrayValue(ArrayValue::default()))
        );
        assert!(doc.get_str("profile").is_none());
    }

    #[test]
    fn test_non_finite_doubles_do_not_break_document() {
        let body = json!({
            "fields": {
                "fcmToken": {"stringValue": "tok"},
                "ratio": {"doubleValue": "NaN"},
                "ceiling": {"doubleValue": "Infinity"},
                "floor": {"doubleValue": "-Infinity"}
            }
        });

        let doc: Document = serde_json::from_value(body).unwrap();
        assert_eq!(doc.get_str("fcmToken"), Some("tok"));
        assert!(matches!(doc.get("ratio"), Some(Value::DoubleValue(v)) if v.is_nan()));
        assert_eq!(
            doc.get("ceiling"),
            Some(&Value::DoubleValue(f64::INFINITY))
        );
        assert_eq!(
            doc.get("floor"),
            Some(&Value::DoubleValue(f64::NEG_INFINITY))
        );
    }

    #[test]
    fn test_double_serialization() {
        assert_eq!(
            serde_json::to_value(Value::DoubleValue(2.5)).unwrap(),
            json!({"doubleValue": 2.5})
        );
        assert_eq!(
            serde_json::to_value(Value::DoubleValue(f64::NAN)).unwrap(),
            json!({"doubleValue": "NaN"})
        );
        assert_eq!(
            serde_json::to_value(Value::DoubleValue(f64::NEG_INFINITY)).unwrap(),
            json!({"doubleValue": "-Infinity"})
        );
    }

    #[test]
    fn test_empty_string_treated_as_missing() {
        let doc = Document::new().with("fcmToken", Value::string(""));
        assert!(doc.get_str("fcmToken").is_none());
    }

    #[test]
    fn test_document_without_fields() {
        let doc: Document = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert!(doc.fields.is_empty());
        assert!(doc.field_paths().is_empty());
    }
}
