//! Domain model for dosage calculation and saved calculations.
//!
//! # Responsibility
//! - Define the transient calculator shapes (`DosageInput`, `DosageResult`).
//! - Define the persisted `SavedPeptide` snapshot and its wire naming.
//! - Own the fixed syringe catalog.
//!
//! # Invariants
//! - A `SavedPeptide` is immutable after creation; it is only ever deleted.
//! - Unit tags are opaque display strings and never enter arithmetic.

pub mod dosage;
pub mod peptide;
pub mod syringe;
