//! The transport codec: msgpack binary layer wrapped in URL-safe base64.
//!
//! `pack` serializes a [`Value`] tree to a compact text token suitable
//! for URLs and QR codes. `unpack` reverses it and reconstructs the
//! shapes msgpack flattens: byte strings that were serialized as
//! integer-keyed maps, absent fields that were serialized as null, and
//! amount fields that must stay arbitrary-precision.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use num_bigint::BigUint;

use crate::error::CodecError;
use crate::value::Value;

/// Map keys whose null values mean "absent" and are dropped on unpack.
const NULLABLE_KEYS: [&str; 2] = ["token", "nft"];

/// Map keys whose integer values are amounts and are widened to
/// arbitrary precision on unpack, at any depth.
const AMOUNT_KEYS: [&str; 2] = ["valueSatoshis", "amount"];

/// Serialize a value tree to a URL-safe base64 transport token.
///
/// The tree is encoded as msgpack and the binary is base64-encoded with
/// the URL-safe alphabet, unpadded.
///
/// # Arguments
/// * `value` - The value tree to serialize.
///
/// # Returns
/// The transport token, or a `CodecError` if the tree contains an
/// integer msgpack cannot carry (a `BigInt` above `u64::MAX`).
pub fn pack(value: &Value) -> Result<String, CodecError> {
    let encoded = to_msgpack(value)?;
    let mut binary = Vec::new();
    rmpv::encode::write_value(&mut binary, &encoded)
        .map_err(|e| CodecError::InvalidBinary(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(binary))
}

/// Deserialize a transport token back into a value tree.
///
/// Reconstruction rules applied bottom-up after msgpack decoding:
/// * a map whose keys are all textual non-negative integers (at most
///   20 digits, the u64 range) and whose values are all plain integers
///   becomes a byte string (values taken in index order, truncated to
///   8 bits) — note this can reinterpret a genuine integer-keyed map
///   that happens to match the pattern;
/// * `"token"` and `"nft"` entries holding null are dropped;
/// * integer values under `"valueSatoshis"` or `"amount"` keys become
///   arbitrary-precision, at any depth;
/// * any other unsigned integer above `i64::MAX` becomes
///   arbitrary-precision.
///
/// # Arguments
/// * `token` - The transport token produced by [`pack`].
///
/// # Returns
/// The reconstructed value tree, or a `CodecError` if the token or its
/// binary payload is malformed.
pub fn unpack(token: &str) -> Result<Value, CodecError> {
    let binary = URL_SAFE_NO_PAD
        .decode(token.trim_end_matches('='))
        .map_err(|e| CodecError::MalformedToken(e.to_string()))?;
    let mut cursor: &[u8] = &binary;
    let decoded = rmpv::decode::read_value(&mut cursor)
        .map_err(|e| CodecError::InvalidBinary(e.to_string()))?;
    if !cursor.is_empty() {
        return Err(CodecError::InvalidBinary(format!(
            "{} trailing byte(s) after document",
            cursor.len()
        )));
    }
    from_msgpack(decoded)
}

// -----------------------------------------------------------------------
// Value tree -> msgpack
// -----------------------------------------------------------------------

fn to_msgpack(value: &Value) -> Result<rmpv::Value, CodecError> {
    Ok(match value {
        Value::Null => rmpv::Value::Nil,
        Value::Bool(b) => rmpv::Value::Boolean(*b),
        Value::Int(i) => rmpv::Value::from(*i),
        Value::BigInt(big) => {
            let as_u64 = u64::try_from(big).map_err(|_| {
                CodecError::Unrepresentable(format!("integer {} exceeds 64 bits", big))
            })?;
            rmpv::Value::from(as_u64)
        }
        Value::Float(f) => rmpv::Value::F64(*f),
        Value::Text(s) => rmpv::Value::String(s.clone().into()),
        Value::Bytes(b) => rmpv::Value::Binary(b.clone()),
        Value::Array(items) => rmpv::Value::Array(
            items
                .iter()
                .map(to_msgpack)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(entries) => rmpv::Value::Map(
            entries
                .iter()
                .map(|(k, v)| Ok((rmpv::Value::String(k.clone().into()), to_msgpack(v)?)))
                .collect::<Result<Vec<_>, CodecError>>()?,
        ),
    })
}

// -----------------------------------------------------------------------
// msgpack -> value tree, with shape reconstruction
// -----------------------------------------------------------------------

fn from_msgpack(value: rmpv::Value) -> Result<Value, CodecError> {
    Ok(match value {
        rmpv::Value::Nil => Value::Null,
        rmpv::Value::Boolean(b) => Value::Bool(b),
        rmpv::Value::Integer(i) => integer_value(i),
        rmpv::Value::F32(f) => Value::Float(f as f64),
        rmpv::Value::F64(f) => Value::Float(f),
        rmpv::Value::String(s) => Value::Text(utf8_string(s)?),
        rmpv::Value::Binary(b) => Value::Bytes(b),
        rmpv::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(from_msgpack)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        rmpv::Value::Map(entries) => {
            let mut rebuilt = Vec::with_capacity(entries.len());
            for (key, val) in entries {
                let key = match key {
                    rmpv::Value::String(s) => utf8_string(s)?,
                    other => {
                        return Err(CodecError::InvalidBinary(format!(
                            "non-string map key: {}",
                            other
                        )))
                    }
                };
                rebuilt.push((key, from_msgpack(val)?));
            }
            reconstruct_map(rebuilt)
        }
        rmpv::Value::Ext(tag, _) => {
            return Err(CodecError::InvalidBinary(format!(
                "unsupported extension type {}",
                tag
            )))
        }
    })
}

fn integer_value(i: rmpv::Integer) -> Value {
    if let Some(v) = i.as_i64() {
        Value::Int(v)
    } else {
        // An unsigned value above i64::MAX; as_u64 cannot fail here.
        Value::BigInt(BigUint::from(i.as_u64().unwrap_or(u64::MAX)))
    }
}

fn utf8_string(s: rmpv::Utf8String) -> Result<String, CodecError> {
    s.into_str()
        .ok_or_else(|| CodecError::InvalidBinary("invalid UTF-8 in string".to_string()))
}

/// Apply the map-level reconstruction rules to already-rebuilt entries.
fn reconstruct_map(entries: Vec<(String, Value)>) -> Value {
    if entries
        .iter()
        .all(|(k, v)| is_index_key(k) && matches!(v, Value::Int(_)))
    {
        let mut indexed: Vec<(u64, u8)> = entries
            .iter()
            .map(|(k, v)| {
                let index = k.parse::<u64>().unwrap_or(u64::MAX);
                let byte = match v {
                    Value::Int(n) => *n as u8,
                    _ => 0,
                };
                (index, byte)
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);
        return Value::Bytes(indexed.into_iter().map(|(_, byte)| byte).collect());
    }

    let mut rebuilt = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        if NULLABLE_KEYS.contains(&key.as_str()) && value == Value::Null {
            continue;
        }
        let value = if AMOUNT_KEYS.contains(&key.as_str()) {
            widen_amount(value)
        } else {
            value
        };
        rebuilt.push((key, value));
    }
    Value::Map(rebuilt)
}

/// A key counts as an index when it is a textual non-negative integer.
///
/// Keys longer than 20 digits (past the u64 range, so never a real byte
/// index) do not count; such a map stays a map instead of being
/// reinterpreted as a byte string.
fn is_index_key(key: &str) -> bool {
    !key.is_empty() && key.len() <= 20 && key.bytes().all(|b| b.is_ascii_digit())
}

fn widen_amount(value: Value) -> Value {
    match value {
        Value::Int(n) if n >= 0 => Value::BigInt(BigUint::from(n as u64)),
        other => other,
    }
}
