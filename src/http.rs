//! HTTP implementation of the remote record store contract.
//!
//! Every table operation is a single POST carrying a JSON body and returning
//! one of the envelopes in [remote](crate::remote). Failures at this layer
//! (connection errors, timeouts, non-success statuses, unparseable bodies)
//! are all transport-tier: the store's own failure reporting travels inside
//! the envelopes.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::{
    Error,
    record::RecordId,
    remote::{
        BatchResponse, DeleteBatch, FetchParams, QueryResponse, RecordBatch, RecordResponse,
        RecordStore,
    },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection details for the hosted record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// The base URL of the hosted store, e.g. "https://records.example.com".
    pub base_url: String,
    /// The project identifier, sent as a header with every request.
    pub project_id: String,
    /// The public API key, sent as a header with every request.
    pub public_key: String,
}

/// A reqwest-backed [RecordStore].
///
/// Cheap to clone; one instance is shared by the repositories of all four
/// entity types. There is no retry, backoff, or caching here: each call is
/// one round trip.
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    http: reqwest::Client,
    config: StoreConfig,
}

impl HttpRecordStore {
    /// Create a store client for the service described by `config`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: StoreConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, config })
    }

    fn call(&self, table: &str, operation: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!(
                "{}/api/tables/{table}/{operation}",
                self.config.base_url
            ))
            .header("X-Project-Id", &self.config.project_id)
            .header("X-Api-Key", &self.config.public_key)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "record store returned {status}: {body}"
            )));
        }

        response.json().await.map_err(Error::from)
    }
}

impl RecordStore for HttpRecordStore {
    async fn fetch_records(
        &self,
        table: &str,
        params: &FetchParams,
    ) -> Result<QueryResponse, Error> {
        tracing::debug!("fetching records from {table}");
        self.send(self.call(table, "fetch").json(params)).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        params: &FetchParams,
    ) -> Result<RecordResponse, Error> {
        tracing::debug!("fetching record {id} from {table}");
        self.send(self.call(table, &format!("get/{id}")).json(params))
            .await
    }

    async fn create_record(
        &self,
        table: &str,
        batch: &RecordBatch,
    ) -> Result<BatchResponse, Error> {
        tracing::debug!("creating {} record(s) in {table}", batch.records.len());
        self.send(self.call(table, "create").json(batch)).await
    }

    async fn update_record(
        &self,
        table: &str,
        batch: &RecordBatch,
    ) -> Result<BatchResponse, Error> {
        tracing::debug!("updating {} record(s) in {table}", batch.records.len());
        self.send(self.call(table, "update").json(batch)).await
    }

    async fn delete_record(
        &self,
        table: &str,
        batch: &DeleteBatch,
    ) -> Result<BatchResponse, Error> {
        tracing::debug!("deleting {} record(s) from {table}", batch.record_ids.len());
        self.send(self.call(table, "delete").json(batch)).await
    }
}
