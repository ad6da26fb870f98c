use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A value bound into a parametrized SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Canonical encoding used to track uniqueness collisions.
    pub fn collision_key(&self) -> String {
        match self {
            Value::Null => "<null>".to_string(),
            Value::Bool(value) => value.to_string(),
            Value::Int(value) => value.to_string(),
            Value::UInt(value) => value.to_string(),
            Value::Float(value) => value.to_string(),
            Value::Text(value) => value.clone(),
            Value::Bytes(value) => {
                let mut key = String::with_capacity(value.len() * 2);
                for byte in value {
                    key.push_str(&format!("{byte:02x}"));
                }
                key
            }
            Value::Date(value) => value.format("%Y-%m-%d").to_string(),
            Value::Time(value) => value.format("%H:%M:%S").to_string(),
            Value::DateTime(value) => value.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Value::Json(value) => value.to_string(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::UInt(value as u64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_keys_distinguish_values() {
        assert_eq!(Value::Int(7).collision_key(), "7");
        assert_eq!(Value::UInt(7).collision_key(), "7");
        assert_eq!(Value::Text("abc".to_string()).collision_key(), "abc");
        assert_eq!(Value::Bytes(vec![0xab, 0x01]).collision_key(), "ab01");
        assert_eq!(Value::Null.collision_key(), "<null>");
        assert_ne!(
            Value::Text("a".to_string()).collision_key(),
            Value::Text("b".to_string()).collision_key()
        );
    }

    #[test]
    fn from_conversions_produce_expected_variants() {
        assert_eq!(Value::from(3_i32), Value::Int(3));
        assert_eq!(Value::from("x"), Value::Text("x".to_string()));
        assert_eq!(Value::from(vec![1_u8]), Value::Bytes(vec![1]));
        assert!(!Value::from(false).is_null());
    }
}
