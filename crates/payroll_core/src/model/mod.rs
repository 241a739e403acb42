//! Employee domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every record is identified by a unique `EmployeeId`.
//! - Roles form a closed set; there is no free-form role text past parsing.

pub mod employee;
