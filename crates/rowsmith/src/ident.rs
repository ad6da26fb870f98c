use uuid::Uuid;

use rowsmith_core::Value;

/// A single scalar component of an identifier, decodable from one raw
/// key value.
pub trait IdComponent: Sized {
    fn decode(value: &Value) -> Option<Self>;
}

impl IdComponent for i32 {
    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Int(raw) => i32::try_from(*raw).ok(),
            Value::UInt(raw) => i32::try_from(*raw).ok(),
            _ => None,
        }
    }
}

impl IdComponent for i64 {
    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Int(raw) => Some(*raw),
            Value::UInt(raw) => i64::try_from(*raw).ok(),
            _ => None,
        }
    }
}

impl IdComponent for u32 {
    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Int(raw) => u32::try_from(*raw).ok(),
            Value::UInt(raw) => u32::try_from(*raw).ok(),
            _ => None,
        }
    }
}

impl IdComponent for u64 {
    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Int(raw) => u64::try_from(*raw).ok(),
            Value::UInt(raw) => Some(*raw),
            _ => None,
        }
    }
}

impl IdComponent for String {
    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Text(raw) if !raw.trim().is_empty() => Some(raw.clone()),
            _ => None,
        }
    }
}

impl IdComponent for Uuid {
    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(raw) if raw.len() == 16 => Uuid::from_slice(raw).ok(),
            Value::Text(raw) => Uuid::parse_str(raw).ok(),
            _ => None,
        }
    }
}

/// The caller's requested identifier shape: a scalar, or a tuple decoded
/// positionally from the primary-key columns of one row.
pub trait FixtureId: Sized {
    fn decode_row(values: &[Value]) -> Option<Self>;
}

impl FixtureId for i32 {
    fn decode_row(values: &[Value]) -> Option<Self> {
        values.first().and_then(IdComponent::decode)
    }
}

impl FixtureId for i64 {
    fn decode_row(values: &[Value]) -> Option<Self> {
        values.first().and_then(IdComponent::decode)
    }
}

impl FixtureId for u32 {
    fn decode_row(values: &[Value]) -> Option<Self> {
        values.first().and_then(IdComponent::decode)
    }
}

impl FixtureId for u64 {
    fn decode_row(values: &[Value]) -> Option<Self> {
        values.first().and_then(IdComponent::decode)
    }
}

impl FixtureId for String {
    fn decode_row(values: &[Value]) -> Option<Self> {
        values.first().and_then(IdComponent::decode)
    }
}

impl FixtureId for Uuid {
    fn decode_row(values: &[Value]) -> Option<Self> {
        values.first().and_then(IdComponent::decode)
    }
}

impl<A: IdComponent, B: IdComponent> FixtureId for (A, B) {
    fn decode_row(values: &[Value]) -> Option<Self> {
        match values {
            [a, b, ..] => Some((A::decode(a)?, B::decode(b)?)),
            _ => None,
        }
    }
}

impl<A: IdComponent, B: IdComponent, C: IdComponent> FixtureId for (A, B, C) {
    fn decode_row(values: &[Value]) -> Option<Self> {
        match values {
            [a, b, c, ..] => Some((A::decode(a)?, B::decode(b)?, C::decode(c)?)),
            _ => None,
        }
    }
}

impl<A: IdComponent, B: IdComponent, C: IdComponent, D: IdComponent> FixtureId for (A, B, C, D) {
    fn decode_row(values: &[Value]) -> Option<Self> {
        match values {
            [a, b, c, d, ..] => Some((A::decode(a)?, B::decode(b)?, C::decode(c)?, D::decode(d)?)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_widen_across_raw_representations() {
        assert_eq!(i32::decode_row(&[Value::UInt(7)]), Some(7));
        assert_eq!(i64::decode_row(&[Value::UInt(7)]), Some(7));
        assert_eq!(u64::decode_row(&[Value::Int(7)]), Some(7));
        assert_eq!(i32::decode_row(&[Value::Int(i64::MAX)]), None);
        assert_eq!(u32::decode_row(&[Value::Int(-1)]), None);
    }

    #[test]
    fn strings_reject_blank_values() {
        assert_eq!(
            String::decode_row(&[Value::Text("abc".to_string())]),
            Some("abc".to_string())
        );
        assert_eq!(String::decode_row(&[Value::Text("  ".to_string())]), None);
        assert_eq!(String::decode_row(&[Value::Int(1)]), None);
    }

    #[test]
    fn uuids_decode_from_bytes_and_text() {
        let id = Uuid::from_u128(0x1234_5678_9abc_def0_1234_5678_9abc_def0);
        assert_eq!(
            Uuid::decode_row(&[Value::Bytes(id.as_bytes().to_vec())]),
            Some(id)
        );
        assert_eq!(Uuid::decode_row(&[Value::Text(id.to_string())]), Some(id));
        assert_eq!(Uuid::decode_row(&[Value::Bytes(vec![0; 4])]), None);
    }

    #[test]
    fn tuples_decode_positionally() {
        let values = [Value::Int(1), Value::Text("left".to_string()), Value::UInt(9)];
        assert_eq!(
            <(i32, String)>::decode_row(&values),
            Some((1, "left".to_string()))
        );
        assert_eq!(
            <(i32, String, u64)>::decode_row(&values),
            Some((1, "left".to_string(), 9))
        );
        assert_eq!(<(i32, String)>::decode_row(&values[..1]), None);
        assert_eq!(<(i32, i32)>::decode_row(&values), None);
    }

    #[test]
    fn nulls_never_decode() {
        assert_eq!(i32::decode_row(&[Value::Null]), None);
        assert_eq!(<(i64, i64)>::decode_row(&[Value::Int(1), Value::Null]), None);
    }
}
