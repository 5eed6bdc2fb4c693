//! Dosage arithmetic.
//!
//! # Responsibility
//! - Convert a reconstitution recipe into a draw volume and unit reading.
//!
//! # Invariants
//! - Pure: no I/O, no shared state.

pub mod dosage;
