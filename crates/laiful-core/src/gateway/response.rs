//! Ordered-fallback accessors for gateway responses.
//!
//! The gateway does not commit to one schema: results may sit under `data` or
//! `result`, prices under `price` or `harga`, and so on. Every read goes
//! through these helpers with an explicit key order. A key counts as present
//! only when its value is "truthy": not null, `false`, `0` or `""`.

use serde_json::Value;

/// Keys that may wrap a response payload, in lookup order.
pub const PAYLOAD_KEYS: &[&str] = &["data", "result"];
/// Gateway transaction id aliases.
pub const TRANSACTION_ID_KEYS: &[&str] = &["id", "trxid", "transaction_id"];
/// Gateway deposit id aliases.
pub const DEPOSIT_ID_KEYS: &[&str] = &["id", "deposit_id"];
/// Gateway transfer id aliases.
pub const TRANSFER_ID_KEYS: &[&str] = &["id", "transfer_id"];
/// Charged amount aliases.
pub const PRICE_KEYS: &[&str] = &["price", "amount"];
/// Deposit/transfer nominal aliases.
pub const NOMINAL_KEYS: &[&str] = &["nominal", "amount"];

/// Whether a value would pass a loose truthiness check.
#[must_use]
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First present value among `keys`.
#[must_use]
pub fn first<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| is_present(v))
}

/// Record payload: `data` when present, otherwise the whole response.
#[must_use]
pub fn record(response: &Value) -> &Value {
    response
        .get("data")
        .filter(|v| is_present(v))
        .unwrap_or(response)
}

/// List payload: `data`, then `result`, otherwise empty.
#[must_use]
pub fn list(response: &Value) -> &[Value] {
    first(response, PAYLOAD_KEYS)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

/// First present value among `keys`, rendered as text.
#[must_use]
pub fn text(value: &Value, keys: &[&str]) -> Option<String> {
    first(value, keys).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// First present value among `keys`, read as a number.
///
/// Numeric strings are accepted; anything else yields `None`.
#[must_use]
pub fn amount(value: &Value, keys: &[&str]) -> Option<f64> {
    first(value, keys).and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Status line: the payload's `status`, then the envelope's `message`, then `default`.
#[must_use]
pub fn status(response: &Value, default: &str) -> String {
    text(record(response), &["status"])
        .or_else(|| text(response, &["message"]))
        .unwrap_or_else(|| default.to_string())
}

/// Message line: the envelope's `message`, then the payload's `status`, then `default`.
#[must_use]
pub fn message(response: &Value, default: &str) -> String {
    text(response, &["message"])
        .or_else(|| text(record(response), &["status"]))
        .unwrap_or_else(|| default.to_string())
}
