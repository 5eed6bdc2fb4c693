//! Saved-peptide repository contracts and key-value implementation.
//!
//! # Responsibility
//! - Persist the ordered saved list as one JSON array under one fixed key.
//! - Provide read-modify-write mutations over that single blob.
//!
//! # Invariants
//! - Insertion order is save order; `delete_by_id` keeps relative order.
//! - An absent blob reads as an empty list.
//! - A blob that does not decode is an error; it is never overwritten by a
//!   read.
//! - Plain repositories do not lock across the read and the write. Wrap them
//!   in `SerializedPeptideRepository` when calls can overlap.

use crate::kv::{KeyValueStore, KvError};
use crate::model::peptide::{SavedPeptide, SavedPeptideValidationError};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Fixed key holding the saved list.
pub const SAVED_PEPTIDES_KEY: &str = "savedPeptides";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for saved-list persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(SavedPeptideValidationError),
    Storage(KvError),
    /// Persisted blob or a record inside it is malformed.
    InvalidData(String),
    /// The list could not be encoded for write-back.
    Encode(String),
    /// A record with the same id is already saved.
    DuplicateId(String),
    /// A serialized repository's lock was poisoned by a panicking caller.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid saved peptide data: {message}"),
            Self::Encode(message) => write!(f, "failed to encode saved peptides: {message}"),
            Self::DuplicateId(id) => write!(f, "saved peptide id already exists: {id}"),
            Self::LockPoisoned => write!(f, "saved peptide repository lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SavedPeptideValidationError> for RepoError {
    fn from(value: SavedPeptideValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<KvError> for RepoError {
    fn from(value: KvError) -> Self {
        Self::Storage(value)
    }
}

/// Repository interface for the saved calculation list.
pub trait SavedPeptideRepository {
    /// Returns the full list in save order.
    fn load_all(&self) -> RepoResult<Vec<SavedPeptide>>;
    /// Appends one record at the end of the list.
    fn append(&self, record: &SavedPeptide) -> RepoResult<()>;
    /// Removes the record with `id` and returns the resulting list.
    fn delete_by_id(&self, id: &str) -> RepoResult<Vec<SavedPeptide>>;
}

/// Saved list stored as a JSON blob in a key-value store.
pub struct KvSavedPeptideRepository<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> KvSavedPeptideRepository<S> {
    /// Uses `SAVED_PEPTIDES_KEY`.
    pub fn new(store: S) -> Self {
        Self::with_key(store, SAVED_PEPTIDES_KEY)
    }

    /// Uses a caller-provided key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn write_all(&self, records: &[SavedPeptide]) -> RepoResult<()> {
        let blob = encode_saved_list(records)?;
        self.store.set_item(&self.key, &blob)?;
        Ok(())
    }
}

impl<S: KeyValueStore> SavedPeptideRepository for KvSavedPeptideRepository<S> {
    fn load_all(&self) -> RepoResult<Vec<SavedPeptide>> {
        match self.store.get_item(&self.key)? {
            Some(blob) => decode_saved_list(&blob).map_err(|err| {
                error!(
                    "event=saved_load module=repo status=error error_code=decode_failed blob_len={}",
                    blob.len()
                );
                err
            }),
            None => {
                debug!("event=saved_load module=repo status=ok blob=absent");
                Ok(Vec::new())
            }
        }
    }

    fn append(&self, record: &SavedPeptide) -> RepoResult<()> {
        record.validate()?;

        let mut records = self.load_all()?;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(RepoError::DuplicateId(record.id.clone()));
        }
        records.push(record.clone());
        self.write_all(&records)?;

        info!(
            "event=saved_append module=repo status=ok count={}",
            records.len()
        );
        Ok(())
    }

    fn delete_by_id(&self, id: &str) -> RepoResult<Vec<SavedPeptide>> {
        let mut records = self.load_all()?;
        let before = records.len();
        records.retain(|record| record.id != id);

        if records.len() == before {
            debug!("event=saved_delete module=repo status=noop count={before}");
            return Ok(records);
        }

        self.write_all(&records)?;
        info!(
            "event=saved_delete module=repo status=ok count={}",
            records.len()
        );
        Ok(records)
    }
}

/// Opt-in wrapper that runs every call under one lock.
///
/// Each read-modify-write of the inner repository completes before the next
/// call starts, so overlapping mutations cannot lose updates.
pub struct SerializedPeptideRepository<R: SavedPeptideRepository> {
    inner: Mutex<R>,
}

impl<R: SavedPeptideRepository> SerializedPeptideRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn into_inner(self) -> RepoResult<R> {
        self.inner.into_inner().map_err(|_| RepoError::LockPoisoned)
    }

    fn with_inner<T>(&self, f: impl FnOnce(&R) -> RepoResult<T>) -> RepoResult<T> {
        let guard = self.inner.lock().map_err(|_| RepoError::LockPoisoned)?;
        f(&guard)
    }
}

impl<R: SavedPeptideRepository> SavedPeptideRepository for SerializedPeptideRepository<R> {
    fn load_all(&self) -> RepoResult<Vec<SavedPeptide>> {
        self.with_inner(|repo| repo.load_all())
    }

    fn append(&self, record: &SavedPeptide) -> RepoResult<()> {
        self.with_inner(|repo| repo.append(record))
    }

    fn delete_by_id(&self, id: &str) -> RepoResult<Vec<SavedPeptide>> {
        self.with_inner(|repo| repo.delete_by_id(id))
    }
}

/// Decodes a persisted saved list and validates every record.
pub fn decode_saved_list(blob: &str) -> RepoResult<Vec<SavedPeptide>> {
    let records: Vec<SavedPeptide> = serde_json::from_str(blob)
        .map_err(|err| RepoError::InvalidData(format!("saved list does not decode: {err}")))?;

    for (index, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|err| RepoError::InvalidData(format!("record {index}: {err}")))?;
    }
    Ok(records)
}

/// Encodes a saved list into its persisted JSON form.
pub fn encode_saved_list(records: &[SavedPeptide]) -> RepoResult<String> {
    serde_json::to_string(records).map_err(|err| RepoError::Encode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{decode_saved_list, RepoError};

    #[test]
    fn decode_accepts_empty_array() {
        assert!(decode_saved_list("[]").unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_truncated_blob() {
        let err = decode_saved_list(r#"[{"id":"1","name":"#).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    #[test]
    fn decode_rejects_blank_name_record() {
        let blob = r#"[{
            "id": "1700000000000",
            "name": "   ",
            "date": "1/2/2026",
            "peptideAmount": 5,
            "peptideUnit": "mg",
            "bacteriostaticWater": 2,
            "syringeSize": "1",
            "desiredDose": 0.25,
            "desiredDoseUnit": "mg",
            "drawAmount": 0.1,
            "units": 10
        }]"#;
        let err = decode_saved_list(blob).unwrap_err();
        assert!(err.to_string().contains("record 0"), "unexpected: {err}");
    }
}
