//! Defines the raw record type returned by the remote store and the typed
//! accessors used to normalize it into the domain [models](crate::models).

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The unique identifier the remote store assigns to each record.
pub type RecordId = i64;

/// The storage column holding the record identifier.
pub const ID_COLUMN: &str = "Id";

/// The system display-name column the remote store maintains on every table.
pub const NAME_COLUMN: &str = "Name";

/// One row-like unit in a remote table: a JSON object keyed by storage
/// column name.
///
/// Records are the raw wire shape. Each entity normalizes a record into its
/// domain fields with [Entity::from_record](crate::repository::Entity), and
/// builds records from draft and patch inputs for create and update calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record, used when building create and patch payloads.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// The record identifier, if the store included one.
    pub fn id(&self) -> Option<RecordId> {
        self.0.get(ID_COLUMN).and_then(Value::as_i64)
    }

    /// The raw value stored under `column`, if any.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// The string stored under `column`, if the column is present and holds
    /// a string.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(Value::as_str)
    }

    /// The number stored under `column`, if the column is present and holds
    /// a number.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.0.get(column).and_then(Value::as_f64)
    }

    /// The reference stored under `column`, preferring the expanded display
    /// name over the bare foreign key when the store returned both.
    pub fn reference(&self, column: &str) -> Option<Reference> {
        match self.0.get(column)? {
            Value::Object(link) => link
                .get(NAME_COLUMN)
                .and_then(Value::as_str)
                .map(|name| Reference::Named(name.to_owned())),
            Value::Number(id) => id.as_i64().map(Reference::Id),
            Value::String(name) => Some(Reference::Named(name.clone())),
            _ => None,
        }
    }

    /// Store `value` under `column`, replacing any existing value.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        self.0.insert(column.to_owned(), value.into());
    }

    /// Store `value` under `column` only if it is `Some`.
    pub fn set_if_some(&mut self, column: &str, value: Option<impl Into<Value>>) {
        if let Some(value) = value {
            self.set(column, value);
        }
    }

    /// Iterate over the columns present in this record.
    pub fn columns(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Copy every column of `patch` into this record, replacing existing
    /// values. Columns absent from `patch` are untouched.
    pub fn merge(&mut self, patch: &Record) {
        for (column, value) in patch.columns() {
            self.0.insert(column.clone(), value.clone());
        }
    }
}

/// A link from one record to another, e.g. the category of a budget.
///
/// The remote store returns either an expanded object carrying the linked
/// record's display name, or the bare numeric foreign key. Callers must
/// tolerate both shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// The link was expanded by the store and resolved to a display name.
    Named(String),
    /// The raw foreign key of the linked record.
    Id(RecordId),
}

impl Reference {
    /// The wire value written when this reference is sent back to the store:
    /// the numeric key when known, otherwise the display name.
    pub fn to_value(&self) -> Value {
        match self {
            Reference::Named(name) => Value::String(name.clone()),
            Reference::Id(id) => Value::Number((*id).into()),
        }
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reference::Named(name) => write!(f, "{name}"),
            Reference::Id(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for Reference {
    fn from(name: &str) -> Self {
        Reference::Named(name.to_owned())
    }
}

impl From<RecordId> for Reference {
    fn from(id: RecordId) -> Self {
        Reference::Id(id)
    }
}

#[cfg(test)]
mod record_tests {
    use serde_json::json;

    use super::{Record, Reference};

    fn record_from(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn reference_prefers_expanded_display_name() {
        let record = record_from(json!({
            "category_c": { "Id": 7, "Name": "Groceries" }
        }));

        assert_eq!(
            record.reference("category_c"),
            Some(Reference::Named("Groceries".to_owned()))
        );
    }

    #[test]
    fn reference_passes_through_raw_key() {
        let record = record_from(json!({ "category_c": 7 }));

        assert_eq!(record.reference("category_c"), Some(Reference::Id(7)));
    }

    #[test]
    fn reference_accepts_plain_string() {
        let record = record_from(json!({ "category_c": "Groceries" }));

        assert_eq!(
            record.reference("category_c"),
            Some(Reference::Named("Groceries".to_owned()))
        );
    }

    #[test]
    fn set_if_some_skips_absent_values() {
        let mut record = Record::new();

        record.set_if_some("spent_c", None::<f64>);
        record.set_if_some("month_c", Some("2024-01"));

        assert_eq!(record.get("spent_c"), None);
        assert_eq!(record.text("month_c"), Some("2024-01"));
    }

    #[test]
    fn text_rejects_non_string_values() {
        let record = record_from(json!({ "amount_c": 12.5 }));

        assert_eq!(record.text("amount_c"), None);
        assert_eq!(record.number("amount_c"), Some(12.5));
    }
}
