//! Per-field boolean codec table
//!
//! The node API encodes boolean interface attributes inconsistently:
//! `autostart` travels as the strings `"1"`/`"0"` while `bridge_vlan_ports`
//! travels as the integers `1`/`0`. The convention is kept here as data, one
//! encode/decode pair per field, instead of scattered conditionals.

use serde_json::Value;

/// Encode/decode pair for one boolean wire field
pub struct BoolCodec {
    pub field: &'static str,
    pub encode: fn(bool) -> Value,
    pub decode: fn(&Value) -> Option<bool>,
}

/// Every boolean-encoded field the node API knows about
pub const BOOL_FIELDS: &[BoolCodec] = &[
    BoolCodec {
        field: "autostart",
        encode: encode_as_string,
        decode: decode_loose,
    },
    BoolCodec {
        field: "bridge_vlan_ports",
        encode: encode_as_integer,
        decode: decode_loose,
    },
];

/// Codec for a wire field, if that field is boolean-encoded
pub fn codec_for(field: &str) -> Option<&'static BoolCodec> {
    BOOL_FIELDS.iter().find(|c| c.field == field)
}

fn encode_as_string(value: bool) -> Value {
    Value::String(if value { "1" } else { "0" }.to_string())
}

fn encode_as_integer(value: bool) -> Value {
    Value::from(if value { 1 } else { 0 })
}

/// Accepts every 0/1 spelling the node emits; a real boolean passes through
/// unchanged so decoding is idempotent. Unrecognized values yield `None`.
fn decode_loose(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autostart_encodes_as_string() {
        let codec = codec_for("autostart").unwrap();
        assert_eq!((codec.encode)(true), Value::String("1".to_string()));
        assert_eq!((codec.encode)(false), Value::String("0".to_string()));
    }

    #[test]
    fn bridge_vlan_ports_encodes_as_integer() {
        let codec = codec_for("bridge_vlan_ports").unwrap();
        assert_eq!((codec.encode)(true), Value::from(1));
        assert_eq!((codec.encode)(false), Value::from(0));
    }

    #[test]
    fn decode_accepts_every_spelling() {
        let codec = codec_for("autostart").unwrap();
        assert_eq!((codec.decode)(&Value::from(1)), Some(true));
        assert_eq!((codec.decode)(&Value::from(0)), Some(false));
        assert_eq!((codec.decode)(&Value::String("1".into())), Some(true));
        assert_eq!((codec.decode)(&Value::Bool(true)), Some(true));
        assert_eq!((codec.decode)(&Value::String("yes".into())), None);
    }

    #[test]
    fn non_boolean_fields_have_no_codec() {
        assert!(codec_for("cidr").is_none());
        assert!(codec_for("iface").is_none());
    }
}
