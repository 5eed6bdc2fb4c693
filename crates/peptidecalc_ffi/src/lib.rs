//! Flutter-facing bindings for the peptide calculator core.
//!
//! `flutter_rust_bridge_codegen` reads `api` and generates the Dart side.

pub mod api;
