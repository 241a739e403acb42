//! Concurrent raise processing.
//!
//! # Responsibility
//! - Orchestrate snapshot → parallel compute → ordered write → store update.

pub mod parallel_raise;
