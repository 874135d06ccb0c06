//! The generic record repository: uniform create/read/update/delete access
//! to one remote table, with consistent normalization, partial-batch
//! handling, and failure reporting.
//!
//! Each domain entity configures the repository through the [Entity] trait:
//! its table name, the storage columns to select, an optional default
//! ordering, and the mappings between storage records and domain values.

use std::marker::PhantomData;

use serde_json::Value;

use crate::{
    Error,
    notify::{LogNotifier, Notifier},
    record::{Record, RecordId},
    remote::{
        BatchResponse, DeleteBatch, FetchParams, RecordBatch, RecordOutcome, RecordStore, SortKey,
    },
};

/// Configures the repository for one domain entity.
///
/// Implementations declare the field mapping between domain and storage and
/// must map records exhaustively: a record that does not match the declared
/// shape is an error, never a silently coerced value.
pub trait Entity: Sized {
    /// The remote table holding this entity.
    const TABLE: &'static str;

    /// The storage columns requested on every read.
    const FIELDS: &'static [&'static str];

    /// The default ordering applied when listing, if any.
    const SORT: Option<SortKey> = None;

    /// The input for creating a new entity. Optional fields omitted from the
    /// draft receive the entity's documented defaults.
    type Draft;

    /// The input for updating an entity. Only fields present in the patch
    /// are sent; the rest keep their remote values.
    type Patch;

    /// Normalize a storage record into the domain shape.
    ///
    /// # Errors
    /// Returns an error if a required column is missing or has the wrong
    /// type.
    fn from_record(record: &Record) -> Result<Self, Error>;

    /// Map a draft onto storage columns, applying defaults for omitted
    /// optional fields.
    fn create_record(draft: &Self::Draft) -> Record;

    /// Build the patch sent to the store: the identifier plus only the
    /// fields present in `patch`.
    fn patch_record(id: RecordId, patch: &Self::Patch) -> Record;
}

/// Uniform data access for one entity type backed by a remote table.
///
/// Every operation is a single independent request/response round trip; the
/// repository holds no state besides its collaborators, so clones and
/// concurrent calls need no coordination. Same-record races are
/// last-write-wins, and there is no retry, backoff, or cancellation at this
/// layer.
///
/// Each operation comes in two tiers. The `try_` methods return a [Result]
/// whose error distinguishes transport failures, remote-reported failures,
/// and shape mismatches. The sentinel methods ([list](Repository::list),
/// [get](Repository::get), ...) collapse every failure to an empty, absent,
/// or false value after logging it, for callers that must never observe an
/// error. Remote-reported failures are additionally pushed to the
/// [Notifier], one message per failed record.
#[derive(Debug, Clone)]
pub struct Repository<E, S, N = LogNotifier> {
    store: S,
    notifier: N,
    entity: PhantomData<E>,
}

impl<E, S> Repository<E, S>
where
    E: Entity,
    S: RecordStore,
{
    /// Create a repository that reports remote failures to the log only.
    pub fn new(store: S) -> Self {
        Self::with_notifier(store, LogNotifier)
    }
}

impl<E, S, N> Repository<E, S, N>
where
    E: Entity,
    S: RecordStore,
    N: Notifier,
{
    /// Create a repository that reports remote failures to `notifier`.
    pub fn with_notifier(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            entity: PhantomData,
        }
    }

    /// Fetch all records of the entity's table, applying its default
    /// ordering.
    ///
    /// # Errors
    /// Returns an error if the request fails, the store refuses the query,
    /// or a returned record does not match the entity's shape.
    pub async fn try_list(&self) -> Result<Vec<E>, Error> {
        self.run_query(Self::list_params()).await
    }

    /// Fetch the records whose `column` equals `value`, applying the
    /// entity's default ordering.
    ///
    /// # Errors
    /// Same conditions as [try_list](Repository::try_list).
    pub async fn try_list_where(
        &self,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<E>, Error> {
        self.run_query(Self::list_params().filter_eq(column, value))
            .await
    }

    /// Fetch a single record by its identifier. `Ok(None)` means the table
    /// has no such record.
    ///
    /// # Errors
    /// Returns an error if the request fails or the record does not match
    /// the entity's shape.
    pub async fn try_get(&self, id: RecordId) -> Result<Option<E>, Error> {
        let params = FetchParams::select(E::FIELDS);
        let response = self.store.get_record_by_id(E::TABLE, id, &params).await?;

        match response.data {
            Some(record) => E::from_record(&record).map(Some),
            None => Ok(None),
        }
    }

    /// Create one record from `draft` and return it as stored, identifier
    /// included.
    ///
    /// # Errors
    /// Returns an error if the request fails, the store refuses the batch,
    /// or the record was rejected.
    pub async fn try_create(&self, draft: &E::Draft) -> Result<E, Error> {
        let batch = RecordBatch {
            records: vec![E::create_record(draft)],
        };
        let response = self.store.create_record(E::TABLE, &batch).await?;
        let record = self.first_success(response)?;

        E::from_record(&record)
    }

    /// Apply `patch` to the record with `id` and return the updated record.
    /// Fields absent from the patch keep their remote values.
    ///
    /// # Errors
    /// Same conditions as [try_create](Repository::try_create).
    pub async fn try_update(&self, id: RecordId, patch: &E::Patch) -> Result<E, Error> {
        let batch = RecordBatch {
            records: vec![E::patch_record(id, patch)],
        };
        let response = self.store.update_record(E::TABLE, &batch).await?;
        let record = self.first_success(response)?;

        E::from_record(&record)
    }

    /// Delete the record with `id`.
    ///
    /// # Errors
    /// Returns an error if the request fails, the store refuses the batch,
    /// or the deletion was rejected.
    pub async fn try_delete(&self, id: RecordId) -> Result<(), Error> {
        let batch = DeleteBatch {
            record_ids: vec![id],
        };
        let response = self.store.delete_record(E::TABLE, &batch).await?;

        let results = self.check_batch(response)?;
        let failures: Vec<_> = results.into_iter().filter(|r| !r.success).collect();

        for outcome in &failures {
            if let Some(message) = &outcome.message {
                self.notifier.notify(message);
            }
        }

        if failures.is_empty() {
            return Ok(());
        }

        Err(Error::Rejected(
            failures
                .into_iter()
                .find_map(|outcome| outcome.message)
                .unwrap_or_else(|| "the record store rejected the deletion".to_owned()),
        ))
    }

    /// Fetch all records, returning an empty vec on any failure.
    pub async fn list(&self) -> Vec<E> {
        self.try_list().await.unwrap_or_else(|error| {
            tracing::error!("could not fetch {} records: {error}", E::TABLE);
            Vec::new()
        })
    }

    /// Fetch the records whose `column` equals `value`, returning an empty
    /// vec on any failure.
    pub async fn list_where(&self, column: &str, value: impl Into<Value>) -> Vec<E> {
        self.try_list_where(column, value)
            .await
            .unwrap_or_else(|error| {
                tracing::error!("could not fetch {} records: {error}", E::TABLE);
                Vec::new()
            })
    }

    /// Fetch a single record, returning `None` both when it does not exist
    /// and when the request fails.
    pub async fn get(&self, id: RecordId) -> Option<E> {
        self.try_get(id).await.unwrap_or_else(|error| {
            tracing::error!("could not fetch {} record {id}: {error}", E::TABLE);
            None
        })
    }

    /// Create one record from `draft`, returning `None` on any failure.
    pub async fn create(&self, draft: &E::Draft) -> Option<E> {
        self.try_create(draft)
            .await
            .map_err(|error| {
                tracing::error!("could not create {} record: {error}", E::TABLE);
            })
            .ok()
    }

    /// Apply `patch` to the record with `id`, returning `None` on any
    /// failure.
    pub async fn update(&self, id: RecordId, patch: &E::Patch) -> Option<E> {
        self.try_update(id, patch)
            .await
            .map_err(|error| {
                tracing::error!("could not update {} record {id}: {error}", E::TABLE);
            })
            .ok()
    }

    /// Delete the record with `id`, returning whether the store reported no
    /// failure for it.
    pub async fn delete(&self, id: RecordId) -> bool {
        match self.try_delete(id).await {
            Ok(()) => true,
            Err(error) => {
                tracing::error!("could not delete {} record {id}: {error}", E::TABLE);
                false
            }
        }
    }

    fn list_params() -> FetchParams {
        let params = FetchParams::select(E::FIELDS);
        match E::SORT {
            Some(key) => params.order(key),
            None => params,
        }
    }

    async fn run_query(&self, params: FetchParams) -> Result<Vec<E>, Error> {
        let response = self.store.fetch_records(E::TABLE, &params).await?;

        if !response.success {
            return Err(self.remote_failure(response.message));
        }

        response
            .data
            .unwrap_or_default()
            .iter()
            .map(E::from_record)
            .collect()
    }

    /// Partition a batch response and return the first successful record.
    ///
    /// Every per-record failure is surfaced through the notifier, but a
    /// mixed batch is not treated as a hard failure as long as one record
    /// succeeded. Calls in this crate submit a single record, so in practice
    /// this degenerates to all-or-nothing; the contract supports mixed
    /// batches because the store reports them.
    fn first_success(&self, response: BatchResponse) -> Result<Record, Error> {
        let results = self.check_batch(response)?;
        let (successes, failures): (Vec<_>, Vec<_>) =
            results.into_iter().partition(|outcome| outcome.success);

        for outcome in &failures {
            if let Some(message) = &outcome.message {
                self.notifier.notify(message);
            }
        }

        match successes.into_iter().next() {
            Some(outcome) => outcome.data.ok_or(Error::MissingData),
            None => Err(Error::Rejected(
                failures
                    .into_iter()
                    .find_map(|outcome| outcome.message)
                    .unwrap_or_else(|| "the record store rejected the record".to_owned()),
            )),
        }
    }

    /// Reject a refused batch and unwrap its per-record outcomes.
    fn check_batch(&self, response: BatchResponse) -> Result<Vec<RecordOutcome>, Error> {
        if !response.success {
            return Err(self.remote_failure(response.message));
        }

        response.results.ok_or(Error::MissingData)
    }

    fn remote_failure(&self, message: Option<String>) -> Error {
        let message =
            message.unwrap_or_else(|| "the record store reported an unknown error".to_owned());
        self.notifier.notify(&message);
        Error::Remote(message)
    }
}

#[cfg(test)]
mod repository_tests {
    use time::macros::date;

    use crate::{
        Error,
        models::{
            Budget, BudgetPatch, NewBudget, NewTransaction, Transaction,
            budget::{DEFAULT_ALERT_THRESHOLD, default_alert_methods},
        },
        record::Reference,
        test_utils::{FakeRecordStore, RecordingNotifier},
    };

    use super::Repository;

    fn budget_repository(
        store: &FakeRecordStore,
    ) -> (
        Repository<Budget, FakeRecordStore, RecordingNotifier>,
        RecordingNotifier,
    ) {
        let notifier = RecordingNotifier::new();
        (
            Repository::with_notifier(store.clone(), notifier.clone()),
            notifier,
        )
    }

    fn transaction_repository(
        store: &FakeRecordStore,
    ) -> Repository<Transaction, FakeRecordStore, RecordingNotifier> {
        Repository::with_notifier(store.clone(), RecordingNotifier::new())
    }

    fn sample_budget() -> NewBudget {
        NewBudget {
            category: Reference::Named("Groceries".to_owned()),
            monthly_limit: 500.0,
            spent: None,
            month: "2024-01".to_owned(),
            alert_threshold: None,
            alert_methods: None,
        }
    }

    fn sample_transaction(day: u8, amount: f64) -> NewTransaction {
        NewTransaction {
            kind: "expense".to_owned(),
            amount,
            category: Reference::Named("Groceries".to_owned()),
            date: date!(2024 - 01 - 01).replace_day(day).unwrap(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_fields_and_defaults() {
        let store = FakeRecordStore::new();
        let (repository, _) = budget_repository(&store);

        let created = repository.try_create(&sample_budget()).await.unwrap();
        let fetched = repository.try_get(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.category, Reference::Named("Groceries".to_owned()));
        assert_eq!(fetched.monthly_limit, 500.0);
        assert_eq!(fetched.month, "2024-01");
        // Omitted optional fields read back as the documented defaults.
        assert_eq!(fetched.spent, 0.0);
        assert_eq!(fetched.alert_threshold, DEFAULT_ALERT_THRESHOLD);
        assert_eq!(fetched.alert_methods, default_alert_methods());
    }

    #[tokio::test]
    async fn update_patches_only_provided_fields() {
        let store = FakeRecordStore::new();
        let (repository, _) = budget_repository(&store);
        let created = repository.try_create(&sample_budget()).await.unwrap();

        let patch = BudgetPatch {
            spent: Some(123.45),
            ..BudgetPatch::default()
        };
        let updated = repository.try_update(created.id, &patch).await.unwrap();

        assert_eq!(updated.spent, 123.45);
        assert_eq!(updated.monthly_limit, created.monthly_limit);
        assert_eq!(updated.month, created.month);
        assert_eq!(updated.alert_threshold, created.alert_threshold);
        assert_eq!(updated.alert_methods, created.alert_methods);
        assert_eq!(updated.category, created.category);
    }

    #[tokio::test]
    async fn get_after_delete_is_absent() {
        let store = FakeRecordStore::new();
        let (repository, _) = budget_repository(&store);
        let created = repository.try_create(&sample_budget()).await.unwrap();

        assert!(repository.delete(created.id).await);

        assert_eq!(repository.try_get(created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn refused_query_yields_empty_list_and_one_notification() {
        let store = FakeRecordStore::new();
        store.fail_requests("table is unavailable");
        let (repository, notifier) = budget_repository(&store);

        let budgets = repository.list().await;

        assert!(budgets.is_empty());
        assert_eq!(
            notifier.messages(),
            vec!["table is unavailable".to_owned()]
        );
    }

    #[tokio::test]
    async fn refused_query_is_distinguishable_through_try_list() {
        let store = FakeRecordStore::new();
        let (repository, _) = budget_repository(&store);

        assert_eq!(repository.try_list().await.unwrap(), Vec::new());

        store.fail_requests("table is unavailable");

        assert_eq!(
            repository.try_list().await,
            Err(Error::Remote("table is unavailable".to_owned()))
        );
    }

    #[tokio::test]
    async fn rejected_create_returns_absent_and_notifies_once() {
        let store = FakeRecordStore::new();
        store.reject_records("X");
        let (repository, notifier) = budget_repository(&store);

        let created = repository.create(&sample_budget()).await;

        assert_eq!(created, None);
        assert_eq!(notifier.messages(), vec!["X".to_owned()]);
    }

    #[tokio::test]
    async fn rejected_delete_returns_false() {
        let store = FakeRecordStore::new();
        let (repository, notifier) = budget_repository(&store);
        let created = repository.try_create(&sample_budget()).await.unwrap();

        store.reject_records("record is locked");

        assert!(!repository.delete(created.id).await);
        assert_eq!(
            notifier.messages(),
            vec!["record is locked".to_owned()]
        );
    }

    #[tokio::test]
    async fn transactions_list_newest_first() {
        let store = FakeRecordStore::new();
        let repository = transaction_repository(&store);
        for day in [3, 28, 15] {
            repository
                .try_create(&sample_transaction(day, day as f64))
                .await
                .unwrap();
        }

        let transactions = repository.list().await;

        let days: Vec<_> = transactions
            .iter()
            .map(|transaction| transaction.date.day())
            .collect();
        assert_eq!(days, vec![28, 15, 3]);
    }

    #[tokio::test]
    async fn list_where_filters_on_the_given_column() {
        let store = FakeRecordStore::new();
        let repository = transaction_repository(&store);
        repository
            .try_create(&sample_transaction(1, 10.0))
            .await
            .unwrap();
        let mut income = sample_transaction(2, 250.0);
        income.kind = "income".to_owned();
        repository.try_create(&income).await.unwrap();

        let incomes = repository.list_where("type_c", "income").await;

        assert_eq!(incomes.len(), 1);
        assert_eq!(incomes[0].kind, "income");
    }
}
