//! Composite identity keys.
//!
//! A key is the JSON encoding of the tuple of a record's canonical values at
//! the key columns. JSON string escaping keeps the encoding collision-free,
//! and canonical numbers make `30` and `30.0` key identically.

use crate::Record;
use serde_json::Value;

/// Build the composite key of `record` over `key_columns`.
///
/// An absent key column encodes the same as a `Null` cell.
pub fn make_key<S: AsRef<str>>(record: &Record, key_columns: &[S]) -> String {
    let tuple: Vec<Value> = key_columns
        .iter()
        .map(|column| {
            record
                .get(column.as_ref())
                .map_or(Value::Null, |cell| cell.canonical())
        })
        .collect();
    Value::Array(tuple).to_string()
}
