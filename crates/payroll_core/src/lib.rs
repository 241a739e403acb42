//! Core domain logic for the payroll raise processor.
//! This crate is the single source of truth for record invariants, the raise
//! formula and the concurrent store/processing discipline.

pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod processor;
pub mod raise;
pub mod service;
pub mod store;
pub mod writer;

pub use codec::record_codec::{format_line, parse_bytes, parse_document, parse_line, CodecError};
pub use config::{ConfigError, PayrollConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::employee::{Employee, EmployeeId, EmployeeValidationError, Role};
pub use processor::parallel_raise::{ParallelRaiseProcessor, ProcessError, WorkerFault};
pub use raise::calculator::{compute, RaiseError, RaiseEvaluator, StandardRaise};
pub use service::payroll_service::{PayrollError, PayrollResult, PayrollService};
pub use store::record_store::{RecordStore, StaleSnapshot, StoreSnapshot};
pub use writer::file_writer::FileWriter;

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
