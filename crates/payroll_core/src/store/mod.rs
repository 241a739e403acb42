//! In-memory record storage.
//!
//! # Responsibility
//! - Hold the authoritative employee collection behind locked entry points.
//!
//! # Invariants
//! - No caller ever mutates records except through `RecordStore` methods.

pub mod record_store;
