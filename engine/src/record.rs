//! Cell values and row-shaped records.

use crate::{ColumnId, Error, RowId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Name of the column carrying remote row identity.
pub const ID_COLUMN: &str = "id";

/// A single cell of a table.
///
/// Tagged values are compound cells such as references or lists. On the wire
/// they are arrays whose first element is the tag: `["L", 1, 2]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Tagged { tag: String, args: Vec<Value> },
}

impl CellValue {
    /// Build a tagged compound value.
    pub fn tagged(tag: impl Into<String>, args: Vec<Value>) -> Self {
        CellValue::Tagged {
            tag: tag.into(),
            args,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// The value as a row identifier, if it is an integral number.
    pub fn as_row_id(&self) -> Option<RowId> {
        match self {
            CellValue::Int(n) => Some(*n),
            CellValue::Float(f) => integral(*f),
            _ => None,
        }
    }

    /// Canonical JSON form used for structural comparison and key encoding.
    ///
    /// Integral floats collapse onto integers so that `30` and `30.0` are the
    /// same value. Object keys are sorted, and non-finite floats become a
    /// `{"$float": ..}` marker that no JSON cell can produce.
    pub fn canonical(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Int(n) => Value::from(*n),
            CellValue::Float(f) => canonical_float(*f),
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Tagged { tag, args } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(tag.clone()));
                items.extend(args.iter().map(canonical_json));
                Value::Array(items)
            }
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    // i64::MAX is not representable; the upper bound is exclusive
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn canonical_float(f: f64) -> Value {
    if let Some(n) = integral(f) {
        return Value::from(n);
    }
    match serde_json::Number::from_f64(f) {
        Some(n) => Value::Number(n),
        None => {
            let name = if f.is_nan() {
                "nan"
            } else if f > 0.0 {
                "inf"
            } else {
                "-inf"
            };
            serde_json::json!({ "$float": name })
        }
    }
}

fn canonical_json(value: &Value) -> Value {
    match value {
        Value::Number(n) if !n.is_i64() && !n.is_u64() => {
            n.as_f64().map(canonical_float).unwrap_or(Value::Null)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_json).collect()),
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonical_json(v)))
                    .collect(),
            )
        }
        other => other.clone(),
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        use CellValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (Int(_) | Float(_), Int(_) | Float(_)) | (Tagged { .. }, Tagged { .. }) => {
                self.canonical() == other.canonical()
            }
            _ => false,
        }
    }
}

impl TryFrom<Value> for CellValue {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(CellValue::Null),
            Value::Bool(b) => Ok(CellValue::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(CellValue::Int(i)),
                None => n
                    .as_f64()
                    .map(CellValue::Float)
                    .ok_or_else(|| Error::InvalidValue(format!("unsupported number {n}"))),
            },
            Value::String(s) => Ok(CellValue::Text(s)),
            Value::Array(mut items) => {
                if items.is_empty() {
                    return Err(Error::InvalidValue(
                        "compound value must not be empty".into(),
                    ));
                }
                match items.remove(0) {
                    Value::String(tag) => Ok(CellValue::Tagged { tag, args: items }),
                    other => Err(Error::InvalidValue(format!(
                        "compound value must start with a string tag, got {other}"
                    ))),
                }
            }
            Value::Object(_) => Err(Error::InvalidValue(
                "objects are not valid cell values".into(),
            )),
        }
    }
}

impl From<CellValue> for Value {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(b),
            CellValue::Int(n) => Value::from(n),
            CellValue::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Text(s) => Value::String(s),
            CellValue::Tagged { tag, mut args } => {
                args.insert(0, Value::String(tag));
                Value::Array(args)
            }
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Int(n.into())
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// A row: column id to cell value, in insertion order.
///
/// A column missing from the map is absent, which is not the same as a
/// present [`CellValue::Null`]. Absent cells are never written and never
/// count as changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    cells: IndexMap<ColumnId, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<ColumnId>, value: impl Into<CellValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a cell, returning the previous value if any.
    pub fn set(
        &mut self,
        column: impl Into<ColumnId>,
        value: impl Into<CellValue>,
    ) -> Option<CellValue> {
        self.cells.insert(column.into(), value.into())
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<CellValue> {
        self.cells.shift_remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Populated column ids, in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnId> {
        self.cells.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnId, &CellValue)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Remote row identity, if the record carries a numeric `id`.
    pub fn id(&self) -> Option<RowId> {
        self.get(ID_COLUMN).and_then(CellValue::as_row_id)
    }

    /// The set of populated columns, as a sorted list.
    pub fn shape(&self) -> Vec<&str> {
        let mut shape: Vec<&str> = self.cells.keys().map(String::as_str).collect();
        shape.sort_unstable();
        shape
    }
}

impl FromIterator<(ColumnId, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (ColumnId, CellValue)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (ColumnId, CellValue);
    type IntoIter = indexmap::map::IntoIter<ColumnId, CellValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(column, cell)| Ok::<_, Error>((column, CellValue::try_from(cell)?)))
                .collect(),
            other => Err(Error::InvalidValue(format!(
                "record must be a JSON object, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(CellValue::Int(30), CellValue::Float(30.0));
        assert_ne!(CellValue::Int(30), CellValue::Float(30.5));
        assert_ne!(CellValue::Int(1), CellValue::Bool(true));
        assert_ne!(CellValue::Text("1".into()), CellValue::Int(1));
    }

    #[test]
    fn tagged_values_compare_structurally() {
        let a = CellValue::tagged("L", vec![json!(1), json!(2)]);
        let b = CellValue::tagged("L", vec![json!(1.0), json!(2)]);
        let c = CellValue::tagged("R", vec![json!(1), json!(2)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn object_payloads_ignore_key_order() {
        let a = CellValue::tagged("O", vec![json!({"a": 1, "b": {"y": 2, "x": 1}})]);
        let b = CellValue::tagged("O", vec![json!({"b": {"x": 1, "y": 2.0}, "a": 1})]);
        assert_eq!(a, b);
        assert_eq!(a.canonical().to_string(), b.canonical().to_string());
    }

    #[test]
    fn non_finite_floats_stay_distinct() {
        let inf = CellValue::Float(f64::INFINITY);
        let neg_inf = CellValue::Float(f64::NEG_INFINITY);
        let nan = CellValue::Float(f64::NAN);
        assert_ne!(inf, neg_inf);
        assert_ne!(nan, CellValue::Null);
        assert_ne!(nan.canonical(), CellValue::Null.canonical());
        assert_eq!(nan, CellValue::Float(f64::NAN));
        assert_eq!(inf, CellValue::Float(f64::INFINITY));
    }

    #[test]
    fn parse_cells_from_json() {
        let cell: CellValue = serde_json::from_value(json!(["L", 3, 4])).unwrap();
        assert_eq!(cell, CellValue::tagged("L", vec![json!(3), json!(4)]));

        let cell: CellValue = serde_json::from_value(json!(null)).unwrap();
        assert!(cell.is_null());

        assert!(serde_json::from_value::<CellValue>(json!([])).is_err());
        assert!(serde_json::from_value::<CellValue>(json!([1, 2])).is_err());
        assert!(serde_json::from_value::<CellValue>(json!({"a": 1})).is_err());
    }

    #[test]
    fn cells_serialize_as_plain_json() {
        let record = Record::new()
            .with("Name", "John")
            .with("Age", 30)
            .with("Ref", CellValue::tagged("R", vec![json!("People"), json!(4)]))
            .with("Note", CellValue::Null);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"Name": "John", "Age": 30, "Ref": ["R", "People", 4], "Note": null})
        );
    }

    #[test]
    fn absent_is_not_null() {
        let record = Record::try_from(json!({"a": null})).unwrap();
        assert!(record.contains("a"));
        assert_eq!(record.get("a"), Some(&CellValue::Null));
        assert!(!record.contains("b"));
        assert_eq!(record.get("b"), None);
    }

    #[test]
    fn record_identity() {
        let record = Record::try_from(json!({"id": 7, "Name": "x"})).unwrap();
        assert_eq!(record.id(), Some(7));

        let record = Record::try_from(json!({"id": "7"})).unwrap();
        assert_eq!(record.id(), None);

        assert_eq!(Record::new().id(), None);
    }

    #[test]
    fn shape_ignores_column_order() {
        let a = Record::new().with("a", 1).with("b", 2);
        let b = Record::new().with("b", 3).with("a", 4);
        assert_eq!(a.shape(), b.shape());
        assert_eq!(a.shape(), vec!["a", "b"]);
    }
}
