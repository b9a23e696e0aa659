//! # contract: collaborator interfaces for the publish engine
//!
//! This module defines the traits the engine consumes and the plain data types that cross
//! them. Nothing in here knows about transport, credentials storage or the file system.
//!
//! ## Interface & Extensibility
//! - Implement [`DataBackend`] and [`Authenticator`] to publish against a new backend.
//! - Implement [`ContentLoader`] to read local content from somewhere other than disk.
//! - Implement [`PublishHandler`] and register it on a [`crate::dispatch::Dispatcher`] to change
//!   how a content type is written.
//! - All collaborator failures are boxed into [`BackendError`].
//!
//! ## Mocking & Testing
//! - The traits are annotated for `mockall`; mocks are exported under the `test-export-mocks` feature.

use std::collections::BTreeMap;

use async_trait::async_trait;

use mockall::automock;

use crate::item::PublishItem;

/// Error type for all collaborator calls.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Identifies a record (or the set of records) in a data object of a backend article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub domain: String,
    pub hostname: String,
    /// The backend article that owns the data object.
    pub article_id: String,
    pub data_object_id: String,
    /// Field/value equality pairs, all of which must hold.
    pub criteria: Vec<(String, String)>,
}

impl RecordDescriptor {
    /// Renders the criteria as a backend filter expression.
    pub fn filter(&self) -> String {
        self.criteria
            .iter()
            .map(|(field, value)| format!("[{}] = '{}'", field, value.replace('\'', "''")))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Returns true when every criterion matches the given field map.
    pub fn matches(&self, fields: &BTreeMap<String, String>) -> bool {
        self.criteria
            .iter()
            .all(|(field, value)| fields.get(field) == Some(value))
    }
}

/// A record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub primary_key: String,
    pub fields: BTreeMap<String, String>,
}

/// A stored text document that carries externally-sourced stylesheet blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledDocument {
    pub body: String,
    pub primary_key: String,
}

impl StyledDocument {
    /// Builds the document from the given field of a record. A missing field is an empty body.
    pub fn from_record(record: &StoredRecord, field_name: &str) -> Self {
        Self {
            body: record.fields.get(field_name).cloned().unwrap_or_default(),
            primary_key: record.primary_key.clone(),
        }
    }
}

/// Trait for establishing a session with the backend.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns `Ok(true)` when the credentials were accepted for the domain.
    async fn login(&self, domain: &str, user: &str, password: &str) -> Result<bool, BackendError>;
}

/// Trait for the raw read/write primitives against the backend.
///
/// The implementor is responsible for transport and for mapping backend rows to [`StoredRecord`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DataBackend: Send + Sync {
    /// Fetch the first record matching the descriptor, if any.
    async fn fetch_record_if_exists(
        &self,
        descriptor: &RecordDescriptor,
    ) -> Result<Option<StoredRecord>, BackendError>;

    /// Update a single field of the record with the given primary key.
    ///
    /// Returns the backend's status: `false` means the write was not applied.
    async fn write_field(
        &self,
        descriptor: &RecordDescriptor,
        field_name: &str,
        data: &str,
        primary_key: &str,
    ) -> Result<bool, BackendError>;

    /// Create a new record in the descriptor's data object.
    async fn insert_record(
        &self,
        descriptor: &RecordDescriptor,
        fields: BTreeMap<String, String>,
    ) -> Result<bool, BackendError>;
}

/// Trait for retrieving local content by path or identifier.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait ContentLoader: Send + Sync {
    fn load(&self, source: &str) -> Result<String, BackendError>;
}

/// Trait for a type-specific publish step.
///
/// Handlers own their error handling: failures are logged and reported as `false`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PublishHandler: Send + Sync {
    async fn publish(&self, item: &PublishItem) -> bool;
}
