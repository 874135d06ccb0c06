//! Substitute collaborators for tests: an in-memory record store and a
//! notifier that captures messages for assertion.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use serde_json::Value;

use crate::{
    Error,
    notify::Notifier,
    record::{Record, RecordId},
    remote::{
        BatchResponse, DeleteBatch, FetchParams, QueryResponse, RecordBatch, RecordOutcome,
        RecordResponse, RecordStore, SortDirection,
    },
};

/// An in-memory [RecordStore] that mimics the hosted service: it assigns
/// identifiers, honors where-filters and ordering, merges partial updates,
/// and reports failures through the same envelopes as the real store.
///
/// Failures can be scripted with [fail_requests](FakeRecordStore::fail_requests)
/// (the whole response is refused) and
/// [reject_records](FakeRecordStore::reject_records) (each submitted record
/// fails individually).
#[derive(Debug, Clone, Default)]
pub struct FakeRecordStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, BTreeMap<RecordId, Record>>,
    next_id: RecordId,
    fail_message: Option<String>,
    reject_message: Option<String>,
}

impl FakeRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every subsequent request at the top level with `message`.
    pub fn fail_requests(&self, message: &str) {
        self.lock().fail_message = Some(message.to_owned());
    }

    /// Reject every subsequently submitted record with `message`.
    pub fn reject_records(&self, message: &str) {
        self.lock().reject_message = Some(message.to_owned());
    }

    /// The number of records currently stored in `table`.
    pub fn record_count(&self, table: &str) -> usize {
        self.lock().tables.get(table).map_or(0, BTreeMap::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }
}

impl Inner {
    fn assign_id(&mut self) -> RecordId {
        self.next_id += 1;
        self.next_id
    }

    fn table_mut(&mut self, table: &str) -> &mut BTreeMap<RecordId, Record> {
        self.tables.entry(table.to_owned()).or_default()
    }
}

impl RecordStore for FakeRecordStore {
    async fn fetch_records(
        &self,
        table: &str,
        params: &FetchParams,
    ) -> Result<QueryResponse, Error> {
        let inner = self.lock();

        if let Some(message) = &inner.fail_message {
            return Ok(QueryResponse {
                success: false,
                data: None,
                message: Some(message.clone()),
            });
        }

        let mut records: Vec<Record> = inner
            .tables
            .get(table)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default();

        for filter in &params.filters {
            records.retain(|record| {
                filter
                    .values
                    .iter()
                    .any(|value| record.get(&filter.field_name) == Some(value))
            });
        }

        for order in params.order_by.iter().rev() {
            records.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.field_name), b.get(&order.field_name));
                match order.sort_type {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        Ok(QueryResponse {
            success: true,
            data: Some(records),
            message: None,
        })
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        _params: &FetchParams,
    ) -> Result<RecordResponse, Error> {
        let inner = self.lock();

        let data = match &inner.fail_message {
            Some(_) => None,
            None => inner
                .tables
                .get(table)
                .and_then(|records| records.get(&id))
                .cloned(),
        };

        Ok(RecordResponse { data })
    }

    async fn create_record(
        &self,
        table: &str,
        batch: &RecordBatch,
    ) -> Result<BatchResponse, Error> {
        let mut inner = self.lock();

        if let Some(message) = inner.fail_message.clone() {
            return Ok(refused_batch(message));
        }

        let results = batch
            .records
            .iter()
            .map(|record| match inner.reject_message.clone() {
                Some(message) => rejected_outcome(message),
                None => {
                    let id = inner.assign_id();
                    let mut stored = record.clone();
                    stored.set("Id", id);
                    inner.table_mut(table).insert(id, stored.clone());

                    accepted_outcome(stored)
                }
            })
            .collect();

        Ok(accepted_batch(results))
    }

    async fn update_record(
        &self,
        table: &str,
        batch: &RecordBatch,
    ) -> Result<BatchResponse, Error> {
        let mut inner = self.lock();

        if let Some(message) = inner.fail_message.clone() {
            return Ok(refused_batch(message));
        }

        let results = batch
            .records
            .iter()
            .map(|patch| {
                if let Some(message) = inner.reject_message.clone() {
                    return rejected_outcome(message);
                }

                let stored = match patch.id() {
                    Some(id) => inner.table_mut(table).get_mut(&id),
                    None => None,
                };
                match stored {
                    Some(record) => {
                        record.merge(patch);
                        accepted_outcome(record.clone())
                    }
                    None => rejected_outcome("record not found".to_owned()),
                }
            })
            .collect();

        Ok(accepted_batch(results))
    }

    async fn delete_record(
        &self,
        table: &str,
        batch: &DeleteBatch,
    ) -> Result<BatchResponse, Error> {
        let mut inner = self.lock();

        if let Some(message) = inner.fail_message.clone() {
            return Ok(refused_batch(message));
        }

        let results = batch
            .record_ids
            .iter()
            .map(|id| {
                if let Some(message) = inner.reject_message.clone() {
                    return rejected_outcome(message);
                }

                match inner.table_mut(table).remove(id) {
                    Some(_) => RecordOutcome {
                        success: true,
                        data: None,
                        message: None,
                    },
                    None => rejected_outcome("record not found".to_owned()),
                }
            })
            .collect();

        Ok(accepted_batch(results))
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn accepted_batch(results: Vec<RecordOutcome>) -> BatchResponse {
    BatchResponse {
        success: true,
        results: Some(results),
        message: None,
    }
}

fn refused_batch(message: String) -> BatchResponse {
    BatchResponse {
        success: false,
        results: None,
        message: Some(message),
    }
}

fn accepted_outcome(record: Record) -> RecordOutcome {
    RecordOutcome {
        success: true,
        data: Some(record),
        message: None,
    }
}

fn rejected_outcome(message: String) -> RecordOutcome {
    RecordOutcome {
        success: false,
        data: None,
        message: Some(message),
    }
}

/// A [Notifier] that records every message it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    /// Create a notifier with no recorded messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// The messages received so far, in order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_owned());
    }
}
