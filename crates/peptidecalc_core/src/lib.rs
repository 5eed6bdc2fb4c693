//! Core domain logic for the peptide reconstitution calculator.
//! This crate is the single source of truth for calculation and storage
//! invariants; UI layers reach it through the FFI crate.

pub mod calc;
pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use calc::dosage::{compute_dosage, round_half_away};
pub use kv::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::dosage::{
    parse_decimal_field, DosageField, DosageInput, DosageResult, DosageValidationError,
    RawDosageInput,
};
pub use model::peptide::{PeptideId, SavedPeptide, SavedPeptideValidationError};
pub use model::syringe::{resolve_units_per_ml, syringe_label, SyringeSize, DEFAULT_UNITS_PER_ML};
pub use repo::peptide_repo::{
    KvSavedPeptideRepository, RepoError, RepoResult, SavedPeptideRepository,
    SerializedPeptideRepository, SAVED_PEPTIDES_KEY,
};
pub use service::peptide_service::{PeptideService, PeptideServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
