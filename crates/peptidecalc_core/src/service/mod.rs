//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate calculator and repository calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod peptide_service;
