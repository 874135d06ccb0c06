//! pocketledger is the data-access layer of a personal-finance app whose
//! records live in a hosted record store.
//!
//! The store exposes generic tabular CRUD endpoints; this crate maps them
//! onto typed domain entities (budgets, categories, savings goals, and
//! transactions) through a single generic [Repository]. Each entity
//! configures the repository with its table name, field mapping, and
//! defaults; the repository takes care of normalization, partial-batch
//! handling, and failure reporting.

#![warn(missing_docs)]

pub mod http;
pub mod models;
pub mod notify;
pub mod record;
pub mod remote;
pub mod repository;
pub mod test_utils;

pub use record::{Record, RecordId, Reference};
pub use repository::{Entity, Repository};

/// The errors that may occur while talking to the record store.
///
/// The first two variants are the two failure tiers of the remote store:
/// [Transport](Error::Transport) covers everything that prevented a usable
/// response, while [Remote](Error::Remote) and [Rejected](Error::Rejected)
/// are failures the store itself reported. The rest are shape mismatches
/// caught while normalizing records, which fail closed instead of coercing.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request never produced a usable response: connection failure,
    /// timeout, non-success HTTP status, or an unparseable body.
    #[error("request to the record store failed: {0}")]
    Transport(String),

    /// The store refused the whole request and said why.
    #[error("the record store reported a failure: {0}")]
    Remote(String),

    /// The store accepted the batch but rejected the targeted record.
    #[error("the record store rejected the record: {0}")]
    Rejected(String),

    /// A record was missing a required column or held the wrong type.
    #[error("record column \"{0}\" is missing or malformed")]
    MalformedField(&'static str),

    /// A response omitted the payload it is required to carry.
    #[error("the record store response did not include the expected data")]
    MissingData,

    /// A date column did not hold a date in the store's wire format.
    #[error("could not parse \"{1}\" as a date: {0}")]
    InvalidDate(String, String),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Transport(error.to_string())
    }
}
