#![doc = "Local JSON record store: an offline stand-in for an appframe host."]
//!
//! # LocalStore
//!
//! [`LocalStore`] keeps appframe-style records in a single JSON file and implements both
//! [`DataBackend`] and [`Authenticator`], so the CLI can publish without a remote host.
//!
//! - Records are keyed by data object. The article id of a descriptor is the backend's
//!   access route, so a record created through one article is found through another.
//! - Every write rewrites the file. The in-memory state changes only once the file is written.
//! - Inserted records get a UUID v4 primary key.
//! - Login accepts any credentials for a non-empty domain.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use appframe_publish_core::contract::{
    Authenticator, BackendError, DataBackend, RecordDescriptor, StoredRecord,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    records: Vec<StoreRecord>,
}

/// One record as persisted in the store file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreRecord {
    pub data_object_id: String,
    pub primary_key: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

pub struct LocalStore {
    path: PathBuf,
    state: Mutex<StoreFile>,
}

impl LocalStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let state: StoreFile = serde_json::from_str(&content)?;
            info!(path = %path.display(), records = state.records.len(), "Opened record store");
            state
        } else {
            info!(path = %path.display(), "Record store does not exist yet, starting empty");
            StoreFile::default()
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Snapshot of all records.
    pub fn records(&self) -> Result<Vec<StoreRecord>, BackendError> {
        Ok(self.lock()?.records.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreFile>, BackendError> {
        self.state
            .lock()
            .map_err(|_| "record store lock poisoned".into())
    }

    /// Writes `records` to disk, then makes them the in-memory state. A failed write leaves
    /// the state untouched.
    fn commit(&self, state: &mut StoreFile, records: Vec<StoreRecord>) -> Result<(), BackendError> {
        let next = StoreFile { records };
        let json = serde_json::to_string_pretty(&next)?;
        if let Err(e) = std::fs::write(&self.path, json) {
            error!(error = ?e, path = %self.path.display(), "Failed to write record store");
            return Err(Box::new(e));
        }
        *state = next;
        debug!(path = %self.path.display(), "Record store written");
        Ok(())
    }
}

#[async_trait]
impl Authenticator for LocalStore {
    async fn login(&self, domain: &str, user: &str, _password: &str) -> Result<bool, BackendError> {
        if domain.is_empty() {
            warn!("Login without a domain refused");
            return Ok(false);
        }
        info!(domain = domain, user = user, "Local store login");
        Ok(true)
    }
}

#[async_trait]
impl DataBackend for LocalStore {
    async fn fetch_record_if_exists(
        &self,
        descriptor: &RecordDescriptor,
    ) -> Result<Option<StoredRecord>, BackendError> {
        let state = self.lock()?;
        let found = state
            .records
            .iter()
            .find(|r| r.data_object_id == descriptor.data_object_id && descriptor.matches(&r.fields))
            .map(|r| StoredRecord {
                primary_key: r.primary_key.clone(),
                fields: r.fields.clone(),
            });
        debug!(filter = %descriptor.filter(), found = found.is_some(), "Fetched record");
        Ok(found)
    }

    async fn write_field(
        &self,
        descriptor: &RecordDescriptor,
        field_name: &str,
        data: &str,
        primary_key: &str,
    ) -> Result<bool, BackendError> {
        let mut state = self.lock()?;
        let Some(index) = state.records.iter().position(|r| {
            r.data_object_id == descriptor.data_object_id && r.primary_key == primary_key
        }) else {
            warn!(primary_key = primary_key, "No record with this primary key");
            return Ok(false);
        };
        let mut records = state.records.clone();
        records[index]
            .fields
            .insert(field_name.to_string(), data.to_string());
        self.commit(&mut state, records)?;
        Ok(true)
    }

    async fn insert_record(
        &self,
        descriptor: &RecordDescriptor,
        fields: BTreeMap<String, String>,
    ) -> Result<bool, BackendError> {
        let mut state = self.lock()?;
        let primary_key = uuid::Uuid::new_v4().to_string();
        info!(
            data_object_id = %descriptor.data_object_id,
            primary_key = %primary_key,
            "Inserting record"
        );
        let mut records = state.records.clone();
        records.push(StoreRecord {
            data_object_id: descriptor.data_object_id.clone(),
            primary_key,
            fields,
        });
        self.commit(&mut state, records)?;
        Ok(true)
    }
}
