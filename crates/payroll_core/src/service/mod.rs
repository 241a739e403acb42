//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate codec, store and processor calls into use-case level APIs.
//! - Keep API/CLI layers decoupled from concurrency details.

pub mod payroll_service;
