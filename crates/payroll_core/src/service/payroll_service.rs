//! Payroll use-case service.
//!
//! # Responsibility
//! - Provide the use-case entry points: upload, list, preview, apply.
//! - Wire codec, store, calculator and processor together.
//!
//! # Invariants
//! - A failed upload leaves the previously loaded records in place.
//! - Preview never mutates the store.
//! - Every evaluation date is passed in by the caller.

use crate::codec::record_codec::{parse_bytes, CodecError};
use crate::config::PayrollConfig;
use crate::model::employee::{Employee, EmployeeValidationError};
use crate::processor::parallel_raise::{ParallelRaiseProcessor, ProcessError};
use crate::raise::calculator::{compute, RaiseError};
use crate::store::record_store::RecordStore;
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;

pub type PayrollResult<T> = Result<T, PayrollError>;

/// Service-level error for payroll use-cases.
#[derive(Debug)]
pub enum PayrollError {
    Codec(CodecError),
    InvalidEmployee(EmployeeValidationError),
    Raise(RaiseError),
    Process(ProcessError),
}

impl Display for PayrollError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codec(err) => write!(f, "{err}"),
            Self::InvalidEmployee(err) => write!(f, "invalid employee: {err}"),
            Self::Raise(err) => write!(f, "{err}"),
            Self::Process(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PayrollError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::InvalidEmployee(err) => Some(err),
            Self::Raise(err) => Some(err),
            Self::Process(err) => Some(err),
        }
    }
}

impl From<CodecError> for PayrollError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<EmployeeValidationError> for PayrollError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::InvalidEmployee(value)
    }
}

impl From<RaiseError> for PayrollError {
    fn from(value: RaiseError) -> Self {
        Self::Raise(value)
    }
}

impl From<ProcessError> for PayrollError {
    fn from(value: ProcessError) -> Self {
        Self::Process(value)
    }
}

/// Use-case service over one process-wide store.
pub struct PayrollService {
    store: Arc<RecordStore>,
    processor: ParallelRaiseProcessor,
}

impl PayrollService {
    /// Creates a service with an empty store.
    pub fn new(config: &PayrollConfig) -> Self {
        Self::with_store(Arc::new(RecordStore::new()), config)
    }

    /// Creates a service around an existing store.
    pub fn with_store(store: Arc<RecordStore>, config: &PayrollConfig) -> Self {
        let processor = ParallelRaiseProcessor::new(Arc::clone(&store), config);
        Self { store, processor }
    }

    /// Creates a service around a pre-built processor sharing `store`.
    pub fn from_parts(store: Arc<RecordStore>, processor: ParallelRaiseProcessor) -> Self {
        Self { store, processor }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn output_path(&self) -> &Path {
        self.processor.writer().path()
    }

    /// Parses an uploaded file and replaces the store with its records.
    ///
    /// Returns the decoded records in file order.
    pub fn load_bytes(&self, bytes: &[u8]) -> PayrollResult<Vec<Employee>> {
        let records = match parse_bytes(bytes) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "event=upload module=service status=error error_code=parse_failed line={} bytes={}",
                    err.line().unwrap_or(0),
                    bytes.len()
                );
                return Err(err.into());
            }
        };
        self.store.load(records.clone());
        info!(
            "event=upload module=service status=ok records={}",
            records.len()
        );
        Ok(records)
    }

    /// Returns a copy of the current records.
    pub fn list(&self) -> Vec<Employee> {
        self.store.snapshot()
    }

    /// Computes one record's new salary without touching the store.
    pub fn preview_raise(&self, employee: &Employee, today: NaiveDate) -> PayrollResult<f64> {
        employee.validate()?;
        Ok(compute(employee, today)?)
    }

    /// Recomputes all raises, writes the output file and updates the store.
    ///
    /// Returns the persisted lines in canonical order.
    pub fn apply_raises(&self, today: NaiveDate) -> PayrollResult<Vec<String>> {
        Ok(self.processor.run(today)?)
    }

    /// Upload followed by apply, as one call.
    pub fn load_and_apply(&self, bytes: &[u8], today: NaiveDate) -> PayrollResult<Vec<String>> {
        self.load_bytes(bytes)?;
        self.apply_raises(today)
    }
}
