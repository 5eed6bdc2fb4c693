//! Saved-record repository layer.
//!
//! # Responsibility
//! - Define the `load_all`/`append`/`delete_by_id` contract for saved
//!   calculations.
//! - Own JSON encode/decode of the saved list on top of key-value storage.
//!
//! # Invariants
//! - Write paths validate records before persistence.
//! - Read paths reject malformed blobs instead of resetting the list.

pub mod peptide_repo;
