//! Column-oriented table payloads.
//!
//! Bulk reads and writes move tables as `{column: [value per row]}`. Every
//! column list has the same length and position `i` is the same row in each.

use crate::{record::ID_COLUMN, CellValue, ColumnId, Error, Record, Result, RowId};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A column-oriented table.
///
/// `None` marks a cell the row did not specify. It travels as `null`, so
/// payloads built for updates should come from shape-grouped records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnarTable {
    columns: IndexMap<ColumnId, Vec<Option<CellValue>>>,
}

impl ColumnarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode row-shaped records.
    ///
    /// Columns appear in order of first appearance across `records`.
    pub fn encode(records: &[Record]) -> Self {
        let mut columns: IndexMap<ColumnId, Vec<Option<CellValue>>> = IndexMap::new();
        for record in records {
            for column in record.columns() {
                if !columns.contains_key(column) {
                    columns.insert(column.clone(), Vec::with_capacity(records.len()));
                }
            }
        }
        for (column, values) in columns.iter_mut() {
            values.extend(records.iter().map(|r| r.get(column).cloned()));
        }
        Self { columns }
    }

    /// Decode a fetched table into records.
    ///
    /// The `id` column is required and must hold an integer for every row;
    /// it defines row count and order. Absent cells are left out of the
    /// resulting records. A table with no columns at all decodes as empty.
    pub fn decode(&self) -> Result<Vec<Record>> {
        if self.columns.is_empty() {
            return Ok(Vec::new());
        }
        let ids = self
            .columns
            .get(ID_COLUMN)
            .ok_or_else(|| Error::MalformedTable("missing 'id' column".into()))?;

        for (row, id) in ids.iter().enumerate() {
            if id.as_ref().and_then(CellValue::as_row_id).is_none() {
                return Err(Error::MalformedTable(format!(
                    "'id' at row {row} is not an integer"
                )));
            }
        }

        self.rows(ids.len())
    }

    /// Records for every row, without requiring an `id` column.
    pub fn to_records(&self) -> Result<Vec<Record>> {
        self.rows(self.num_rows())
    }

    fn rows(&self, expected: usize) -> Result<Vec<Record>> {
        for (column, values) in &self.columns {
            if values.len() != expected {
                return Err(Error::MalformedTable(format!(
                    "column '{column}' has {} values, expected {expected}",
                    values.len()
                )));
            }
        }

        Ok((0..expected)
            .map(|row| {
                self.columns
                    .iter()
                    .filter_map(|(column, values)| {
                        values[row].clone().map(|cell| (column.clone(), cell))
                    })
                    .collect::<Record>()
            })
            .collect())
    }

    /// Row count, taken from the first column.
    pub fn num_rows(&self) -> usize {
        self.columns.values().next().map_or(0, Vec::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<CellValue>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &ColumnId> {
        self.columns.keys()
    }

    /// Replace or add a column.
    pub fn insert_column(&mut self, name: impl Into<ColumnId>, values: Vec<Option<CellValue>>) {
        self.columns.insert(name.into(), values);
    }

    /// Row ids from the `id` column, skipping cells that are not integers.
    pub fn ids(&self) -> Vec<RowId> {
        self.column(ID_COLUMN)
            .unwrap_or_default()
            .iter()
            .filter_map(|cell| cell.as_ref().and_then(CellValue::as_row_id))
            .collect()
    }
}

impl FromIterator<(ColumnId, Vec<Option<CellValue>>)> for ColumnarTable {
    fn from_iter<I: IntoIterator<Item = (ColumnId, Vec<Option<CellValue>>)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ColumnarTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.columns.serialize(serializer)
    }
}

// The wire has no absent marker, so every incoming cell is present
impl<'de> Deserialize<'de> for ColumnarTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let columns = IndexMap::<ColumnId, Vec<CellValue>>::deserialize(deserializer)?;
        Ok(columns
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().map(Some).collect()))
            .collect())
    }
}
