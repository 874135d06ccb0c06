//! The fixed contract of the hosted record store: the five primitive table
//! operations and the exact JSON shapes of their parameters and envelopes.
//!
//! The store itself is an opaque network collaborator. This module pins down
//! its wire format so the rest of the crate can map responses exhaustively
//! instead of duck-typing over untyped payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Error,
    record::{Record, RecordId},
};

/// The five primitive operations every remote table supports.
///
/// Implementations perform one independent round trip per call; there is no
/// shared state, retry, or coordination between calls. Errors returned here
/// are transport-tier failures only. Remote-reported failures travel inside
/// the response envelopes.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Fetch the records of `table` selected and ordered by `params`.
    async fn fetch_records(&self, table: &str, params: &FetchParams)
    -> Result<QueryResponse, Error>;

    /// Fetch a single record of `table` by its identifier.
    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        params: &FetchParams,
    ) -> Result<RecordResponse, Error>;

    /// Create the records in `batch`, reporting one outcome per record.
    async fn create_record(&self, table: &str, batch: &RecordBatch)
    -> Result<BatchResponse, Error>;

    /// Update the records in `batch`. Only the columns present in each
    /// record are changed; omitted columns keep their remote values.
    async fn update_record(&self, table: &str, batch: &RecordBatch)
    -> Result<BatchResponse, Error>;

    /// Delete the records identified by `batch`.
    async fn delete_record(&self, table: &str, batch: &DeleteBatch)
    -> Result<BatchResponse, Error>;
}

/// Field selection, filtering, and ordering for a fetch call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchParams {
    /// The storage columns to include in returned records.
    pub fields: Vec<FieldSpec>,
    /// Filters combined conjunctively; empty means no filtering.
    #[serde(rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    /// Sort keys applied in order; empty means store order.
    #[serde(rename = "orderBy", skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderSpec>,
}

impl FetchParams {
    /// Select the given storage columns.
    pub fn select(columns: &[&str]) -> Self {
        Self {
            fields: columns
                .iter()
                .map(|column| FieldSpec {
                    field: FieldName {
                        name: (*column).to_owned(),
                    },
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Keep only records whose `column` equals `value`.
    pub fn filter_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field_name: column.to_owned(),
            operator: FilterOperator::EqualTo,
            values: vec![value.into()],
        });
        self
    }

    /// Order results by `key`.
    pub fn order(mut self, key: SortKey) -> Self {
        self.order_by.push(OrderSpec {
            field_name: key.column.to_owned(),
            sort_type: key.direction,
        });
        self
    }
}

/// One entry of a field selection: `{"field": {"Name": "<column>"}}`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    /// The wrapped column name.
    pub field: FieldName,
}

/// The inner object of a [FieldSpec].
#[derive(Debug, Clone, Serialize)]
pub struct FieldName {
    /// The storage column name.
    #[serde(rename = "Name")]
    pub name: String,
}

/// One entry of a where clause.
#[derive(Debug, Clone, Serialize)]
pub struct Filter {
    /// The storage column the filter applies to.
    #[serde(rename = "FieldName")]
    pub field_name: String,
    /// How the column is compared against `values`.
    #[serde(rename = "Operator")]
    pub operator: FilterOperator,
    /// The comparison operands.
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
}

/// The comparison operators the remote store accepts in a where clause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FilterOperator {
    /// The column value equals one of the operands.
    EqualTo,
}

/// One entry of an order-by clause.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSpec {
    /// The storage column to sort on.
    #[serde(rename = "fieldName")]
    pub field_name: String,
    /// The sort direction.
    #[serde(rename = "sorttype")]
    pub sort_type: SortDirection,
}

/// The direction of a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SortDirection {
    /// Smallest values first.
    #[serde(rename = "ASC")]
    Ascending,
    /// Largest values first.
    #[serde(rename = "DESC")]
    Descending,
}

/// A sort key declared statically by an entity, e.g. transactions by date
/// descending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortKey {
    /// The storage column to sort on.
    pub column: &'static str,
    /// The sort direction.
    pub direction: SortDirection,
}

/// The records submitted to a create or update call.
#[derive(Debug, Clone, Serialize)]
pub struct RecordBatch {
    /// The records to create or the patches to apply.
    pub records: Vec<Record>,
}

/// The identifiers submitted to a delete call.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteBatch {
    /// The identifiers of the records to delete.
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<RecordId>,
}

/// The envelope of a fetch call.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    /// Whether the store accepted and executed the query.
    pub success: bool,
    /// The matching records, when the query succeeded.
    #[serde(default)]
    pub data: Option<Vec<Record>>,
    /// The store's failure message, when it did not.
    #[serde(default)]
    pub message: Option<String>,
}

/// The envelope of a get-by-id call. Absent `data` means the table has no
/// such record.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordResponse {
    /// The requested record, if it exists.
    #[serde(default)]
    pub data: Option<Record>,
}

/// The envelope of a create, update, or delete call.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchResponse {
    /// Whether the store accepted the batch at all.
    pub success: bool,
    /// One outcome per submitted record, in submission order.
    #[serde(default)]
    pub results: Option<Vec<RecordOutcome>>,
    /// The store's failure message when the whole batch was refused.
    #[serde(default)]
    pub message: Option<String>,
}

/// The outcome of one record within a batch.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordOutcome {
    /// Whether this record was created, updated, or deleted.
    pub success: bool,
    /// The stored record, for successful creates and updates.
    #[serde(default)]
    pub data: Option<Record>,
    /// The store's reason for rejecting this record.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod fetch_params_tests {
    use serde_json::json;

    use super::{FetchParams, SortDirection, SortKey};

    #[test]
    fn select_serializes_nested_field_names() {
        let params = FetchParams::select(&["Id", "name_c"]);

        let serialized = serde_json::to_value(&params).unwrap();

        assert_eq!(
            serialized,
            json!({
                "fields": [
                    { "field": { "Name": "Id" } },
                    { "field": { "Name": "name_c" } },
                ]
            })
        );
    }

    #[test]
    fn filter_and_order_use_remote_casing() {
        let params = FetchParams::select(&["Id"])
            .filter_eq("type_c", "expense")
            .order(SortKey {
                column: "date_c",
                direction: SortDirection::Descending,
            });

        let serialized = serde_json::to_value(&params).unwrap();

        assert_eq!(
            serialized["where"],
            json!([{
                "FieldName": "type_c",
                "Operator": "EqualTo",
                "Values": ["expense"],
            }])
        );
        assert_eq!(
            serialized["orderBy"],
            json!([{ "fieldName": "date_c", "sorttype": "DESC" }])
        );
    }

    #[test]
    fn empty_clauses_are_omitted_from_the_wire() {
        let params = FetchParams::select(&["Id"]);

        let serialized = serde_json::to_value(&params).unwrap();

        assert!(serialized.get("where").is_none());
        assert!(serialized.get("orderBy").is_none());
    }
}
