//! Column-value allow-list filters.

use crate::{CellValue, ColumnId, Record};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Restricts a sync to records whose value in every named column is one of
/// the allowed values. Serializes as `{"Age": [25, 30]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    allowed: IndexMap<ColumnId, Vec<CellValue>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: allow `values` for `column`.
    pub fn allow<V: Into<CellValue>>(
        mut self,
        column: impl Into<ColumnId>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.allowed
            .entry(column.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnId> {
        self.allowed.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Whether `record` satisfies every column of the filter.
    ///
    /// An absent cell only matches if `Null` is allowed.
    pub fn matches(&self, record: &Record) -> bool {
        self.allowed.iter().all(|(column, values)| {
            let cell = record.get(column).unwrap_or(&CellValue::Null);
            values.iter().any(|allowed| allowed == cell)
        })
    }
}

/// Filter check where no filter means everything matches.
pub fn matches(record: &Record, filter: Option<&FilterSpec>) -> bool {
    filter.map_or(true, |f| f.matches(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_filter_matches_everything() {
        assert!(matches(&Record::new(), None));
        assert!(matches(&Record::new(), Some(&FilterSpec::new())));
    }

    #[test]
    fn every_column_must_match() {
        let filter = FilterSpec::new()
            .allow("Age", [25, 30])
            .allow("Team", ["red"]);

        let ok = Record::new().with("Age", 30).with("Team", "red");
        let wrong_age = Record::new().with("Age", 31).with("Team", "red");
        let wrong_team = Record::new().with("Age", 25).with("Team", "blue");
        assert!(filter.matches(&ok));
        assert!(!filter.matches(&wrong_age));
        assert!(!filter.matches(&wrong_team));
    }

    #[test]
    fn membership_is_structural() {
        let filter = FilterSpec::new().allow("Age", [30.0]);
        assert!(filter.matches(&Record::new().with("Age", 30)));

        let filter = FilterSpec::new().allow(
            "Tags",
            [crate::CellValue::tagged("L", vec![json!("a")])],
        );
        let record = Record::try_from(json!({"Tags": ["L", "a"]})).unwrap();
        assert!(filter.matches(&record));
    }

    #[test]
    fn absent_cell_matches_only_null() {
        let filter = FilterSpec::new().allow("Age", [30]);
        assert!(!filter.matches(&Record::new()));

        let filter = FilterSpec::new().allow("Age", [CellValue::Null]);
        assert!(filter.matches(&Record::new()));
    }

    #[test]
    fn serializes_as_query_object() {
        let filter = FilterSpec::new().allow("Age", [25, 30]);
        assert_eq!(serde_json::to_value(&filter).unwrap(), json!({"Age": [25, 30]}));
    }
}
