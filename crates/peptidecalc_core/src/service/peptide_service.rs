//! Calculate/save/list/delete use-cases for saved calculations.
//!
//! # Responsibility
//! - Assign id and display date to new saved calculations.
//! - Serve the saved list through a read-through cache held per service
//!   instance.
//!
//! # Invariants
//! - The cache is a view of the repository, never a second source of truth:
//!   every mutation drops it, whether or not the mutation succeeded.
//! - The cache only spans calls made on one instance. Writes made through
//!   another instance stay invisible until `refresh` or the next mutation.
//! - Callers always receive owned snapshots of the list.
//! - New ids are issued above every id seen in the loaded list.

use crate::calc::dosage::compute_dosage;
use crate::model::dosage::{DosageInput, DosageResult, DosageValidationError};
use crate::model::peptide::{
    format_display_date, next_peptide_id, observe_peptide_id, SavedPeptide,
    SavedPeptideValidationError,
};
use crate::repo::peptide_repo::{RepoError, RepoResult, SavedPeptideRepository};
use chrono::{DateTime, Local, TimeZone};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

/// Service error for the save use-case.
#[derive(Debug)]
pub enum PeptideServiceError {
    Validation(SavedPeptideValidationError),
    Repo(RepoError),
}

impl Display for PeptideServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PeptideServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<SavedPeptideValidationError> for PeptideServiceError {
    fn from(value: SavedPeptideValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for PeptideServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Use-case facade over a saved-peptide repository.
pub struct PeptideService<R: SavedPeptideRepository> {
    repo: R,
    cache: Mutex<Option<Vec<SavedPeptide>>>,
}

impl<R: SavedPeptideRepository> PeptideService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            cache: Mutex::new(None),
        }
    }

    /// Runs the dosage calculation. Never touches storage.
    pub fn calculate(&self, input: &DosageInput) -> Result<DosageResult, DosageValidationError> {
        compute_dosage(input)
    }

    /// Saves a calculated snapshot under `name`, stamped with the current
    /// local time.
    pub fn save_calculation(
        &self,
        name: &str,
        input: &DosageInput,
        result: &DosageResult,
    ) -> Result<SavedPeptide, PeptideServiceError> {
        self.save_calculation_at(name, input, result, Local::now())
    }

    /// Saves a calculated snapshot using `now` for id and display date.
    ///
    /// # Contract
    /// - `name` must be non-empty after trimming; it is stored as entered.
    /// - The record is appended at the end of the list.
    /// - `result` is stored as given and never recomputed.
    /// - The id is greater than every id in the stored list, even when the
    ///   clock is behind the one that issued them.
    pub fn save_calculation_at<Tz: TimeZone>(
        &self,
        name: &str,
        input: &DosageInput,
        result: &DosageResult,
        now: DateTime<Tz>,
    ) -> Result<SavedPeptide, PeptideServiceError> {
        if name.trim().is_empty() {
            return Err(SavedPeptideValidationError::EmptyName.into());
        }
        self.list()?;

        let record = SavedPeptide::new(
            next_peptide_id(now.timestamp_millis()),
            name,
            format_display_date(now.date_naive()),
            input,
            result,
        )?;

        let appended = self.repo.append(&record);
        self.invalidate();
        appended?;

        info!("event=calculation_saved module=service status=ok");
        Ok(record)
    }

    /// Returns the saved list, loading it on first use after a mutation.
    pub fn list(&self) -> RepoResult<Vec<SavedPeptide>> {
        let mut cache = self.lock_cache();
        if let Some(records) = cache.as_ref() {
            return Ok(records.clone());
        }

        let records = self.repo.load_all()?;
        for record in &records {
            observe_peptide_id(&record.id);
        }
        *cache = Some(records.clone());
        Ok(records)
    }

    /// Drops the cache and reloads the full list.
    pub fn refresh(&self) -> RepoResult<Vec<SavedPeptide>> {
        self.invalidate();
        self.list()
    }

    /// Deletes by id and returns the resulting list. Unknown ids are a no-op.
    pub fn delete(&self, id: &str) -> RepoResult<Vec<SavedPeptide>> {
        let deleted = self.repo.delete_by_id(id);
        self.invalidate();
        let records = deleted?;

        *self.lock_cache() = Some(records.clone());
        Ok(records)
    }

    /// Looks up one saved calculation by id.
    pub fn find(&self, id: &str) -> RepoResult<Option<SavedPeptide>> {
        Ok(self.list()?.into_iter().find(|record| record.id == id))
    }

    fn invalidate(&self) {
        *self.lock_cache() = None;
    }

    fn lock_cache(&self) -> MutexGuard<'_, Option<Vec<SavedPeptide>>> {
        // A poisoned cache only holds a stale view; recover and keep going.
        self.cache.lock().unwrap_or_else(|poisoned| {
            warn!("event=cache_poisoned module=service status=recovered");
            let mut guard = poisoned.into_inner();
            *guard = None;
            guard
        })
    }
}
