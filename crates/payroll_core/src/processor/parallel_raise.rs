//! Parallel raise pipeline.
//!
//! # Responsibility
//! - Fan raise computation out over a bounded pool of worker threads.
//! - Fan results back in, restore canonical id order, persist and publish.
//!
//! # Invariants
//! - Workers claim records through one shared atomic cursor; no record is
//!   processed twice and none is skipped unless the run is cancelled.
//! - Output order is ascending by id for every worker count.
//! - Any worker fault or a timeout fails the whole run; the store and the
//!   output file are left exactly as they were.
//! - The output file and the store are updated together under the store's
//!   exclusive lock, and only for the generation that was processed.

use crate::codec::record_codec::format_line;
use crate::config::PayrollConfig;
use crate::model::employee::{Employee, EmployeeId};
use crate::raise::calculator::{RaiseEvaluator, StandardRaise};
use crate::store::record_store::{RecordStore, StaleSnapshot};
use crate::writer::file_writer::FileWriter;
use chrono::NaiveDate;
use crossbeam_channel::RecvTimeoutError;
use crossbeam_queue::SegQueue;
use log::{error, info, warn};
use std::any::Any;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub type ProcessResult<T> = Result<T, ProcessError>;

/// One failed raise computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFault {
    pub id: EmployeeId,
    pub message: String,
}

impl Display for WorkerFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "employee {}: {}", self.id, self.message)
    }
}

#[derive(Debug)]
pub enum ProcessError {
    /// Workers did not all finish within the configured bound.
    ProcessingTimeout {
        timeout: Duration,
        finished_workers: usize,
        workers: usize,
    },
    /// One or more computations failed; faults are sorted by id.
    WorkerFailure { faults: Vec<WorkerFault> },
    StaleSnapshot(StaleSnapshot),
    Io(io::Error),
}

impl Display for ProcessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProcessingTimeout {
                timeout,
                finished_workers,
                workers,
            } => write!(
                f,
                "raise processing timed out after {}ms ({finished_workers}/{workers} workers finished)",
                timeout.as_millis()
            ),
            Self::WorkerFailure { faults } => match faults.first() {
                Some(first) => write!(
                    f,
                    "{} raise computation(s) failed; first: {first}",
                    faults.len()
                ),
                None => write!(f, "raise computation failed"),
            },
            Self::StaleSnapshot(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "output write failed: {err}"),
        }
    }
}

impl Error for ProcessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StaleSnapshot(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::ProcessingTimeout { .. } | Self::WorkerFailure { .. } => None,
        }
    }
}

impl From<StaleSnapshot> for ProcessError {
    fn from(value: StaleSnapshot) -> Self {
        Self::StaleSnapshot(value)
    }
}

impl From<io::Error> for ProcessError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// One recomputed record.
#[derive(Debug, Clone, PartialEq)]
pub struct RaisedRow {
    pub id: EmployeeId,
    pub salary: f64,
    pub line: String,
}

/// Recomputed records in canonical (ascending id) order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaiseBatch {
    pub rows: Vec<RaisedRow>,
}

impl RaiseBatch {
    pub fn salaries(&self) -> HashMap<EmployeeId, f64> {
        self.rows.iter().map(|row| (row.id, row.salary)).collect()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.rows.into_iter().map(|row| row.line).collect()
    }
}

/// State shared by all workers of a single run.
struct RunShared {
    records: Arc<[Employee]>,
    today: NaiveDate,
    evaluator: Arc<dyn RaiseEvaluator>,
    cursor: AtomicUsize,
    cancelled: AtomicBool,
    rows: SegQueue<RaisedRow>,
    faults: SegQueue<WorkerFault>,
}

impl RunShared {
    /// Claims and processes records until none remain or the run is cancelled.
    fn drain_claims(&self) -> usize {
        let mut processed = 0;
        while !self.cancelled.load(Ordering::Acquire) {
            let index = self.cursor.fetch_add(1, Ordering::Relaxed);
            let Some(record) = self.records.get(index) else {
                break;
            };
            self.process(record);
            processed += 1;
        }
        processed
    }

    fn process(&self, record: &Employee) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.evaluator.evaluate(record, self.today)
        }));
        match outcome {
            Ok(Ok(salary)) => {
                let mut raised = record.clone();
                raised.salary = salary;
                self.rows.push(RaisedRow {
                    id: raised.id,
                    salary,
                    line: format_line(&raised),
                });
            }
            Ok(Err(err)) => self.faults.push(WorkerFault {
                id: record.id,
                message: err.to_string(),
            }),
            Err(payload) => self.faults.push(WorkerFault {
                id: record.id,
                message: format!("computation panicked: {}", panic_message(payload.as_ref())),
            }),
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

/// Recomputes every stored record's salary in parallel and persists the result.
pub struct ParallelRaiseProcessor {
    store: Arc<RecordStore>,
    writer: FileWriter,
    evaluator: Arc<dyn RaiseEvaluator>,
    workers: NonZeroUsize,
    timeout: Duration,
}

impl ParallelRaiseProcessor {
    /// Creates a processor using the standard raise formula.
    pub fn new(store: Arc<RecordStore>, config: &PayrollConfig) -> Self {
        Self {
            store,
            writer: FileWriter::new(config.output_path.clone()),
            evaluator: Arc::new(StandardRaise),
            workers: config.workers,
            timeout: config.timeout,
        }
    }

    /// Replaces the evaluator the workers call.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn RaiseEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    pub fn writer(&self) -> &FileWriter {
        &self.writer
    }

    /// Runs the full pipeline as of `today` and returns the persisted lines.
    ///
    /// # Errors
    /// - `ProcessingTimeout` when workers exceed the configured bound.
    /// - `WorkerFailure` when any computation fails or panics.
    /// - `StaleSnapshot` when the store was reloaded mid-run.
    /// - `Io` when the output file cannot be written.
    pub fn run(&self, today: NaiveDate) -> ProcessResult<Vec<String>> {
        let started_at = Instant::now();
        let snapshot = self.store.versioned_snapshot();
        let records = snapshot.records.len();
        info!(
            "event=raise_run module=processor status=start records={} workers={} generation={}",
            records,
            self.workers.get().min(records.max(1)),
            snapshot.generation
        );

        let result = self
            .compute(snapshot.records, today)
            .and_then(|batch| self.persist(snapshot.generation, batch));

        match &result {
            Ok(lines) => info!(
                "event=raise_run module=processor status=ok records={} duration_ms={}",
                lines.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=raise_run module=processor status=error error_code={} duration_ms={} error={}",
                error_code(err),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Fan-out/fan-in only: computes raises for `records` with no side effects.
    pub fn compute(&self, records: Vec<Employee>, today: NaiveDate) -> ProcessResult<RaiseBatch> {
        let total = records.len();
        if total == 0 {
            return Ok(RaiseBatch::default());
        }

        let worker_count = self.workers.get().min(total);
        let shared = Arc::new(RunShared {
            records: records.into(),
            today,
            evaluator: Arc::clone(&self.evaluator),
            cursor: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            rows: SegQueue::new(),
            faults: SegQueue::new(),
        });

        let (done_tx, done_rx) = crossbeam_channel::bounded::<usize>(worker_count);
        for worker_index in 0..worker_count {
            let worker_shared = Arc::clone(&shared);
            let worker_done = done_tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("raise-worker-{worker_index}"))
                .spawn(move || {
                    let processed = worker_shared.drain_claims();
                    // Receiver is gone after a timeout; nothing left to report to.
                    let _ = worker_done.send(processed);
                });
            if let Err(err) = spawned {
                shared.cancel();
                return Err(ProcessError::Io(err));
            }
        }
        drop(done_tx);

        // A timeout too large to represent as an instant means "wait indefinitely".
        let deadline = Instant::now().checked_add(self.timeout);
        for finished_workers in 0..worker_count {
            let received = match deadline {
                Some(deadline) => done_rx.recv_deadline(deadline),
                None => done_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout) => {
                    shared.cancel();
                    warn!(
                        "event=raise_fan_in module=processor status=timeout finished_workers={} workers={} timeout_ms={}",
                        finished_workers,
                        worker_count,
                        self.timeout.as_millis()
                    );
                    return Err(ProcessError::ProcessingTimeout {
                        timeout: self.timeout,
                        finished_workers,
                        workers: worker_count,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    shared.cancel();
                    return Err(ProcessError::WorkerFailure {
                        faults: vec![WorkerFault {
                            id: 0,
                            message: "worker exited without reporting".to_string(),
                        }],
                    });
                }
            }
        }

        let mut faults = Vec::new();
        while let Some(fault) = shared.faults.pop() {
            faults.push(fault);
        }
        if !faults.is_empty() {
            faults.sort_by_key(|fault| fault.id);
            return Err(ProcessError::WorkerFailure { faults });
        }

        let mut rows = Vec::with_capacity(total);
        while let Some(row) = shared.rows.pop() {
            rows.push(row);
        }
        rows.sort_unstable_by_key(|row| row.id);
        Ok(RaiseBatch { rows })
    }

    fn persist(&self, generation: u64, batch: RaiseBatch) -> ProcessResult<Vec<String>> {
        let salaries = batch.salaries();
        let lines = batch.into_lines();
        let staged = self.writer.stage(&lines)?;
        self.store
            .apply_raises_at(generation, &salaries, || {
                staged.commit().map_err(ProcessError::Io)
            })?;
        Ok(lines)
    }
}

fn error_code(err: &ProcessError) -> &'static str {
    match err {
        ProcessError::ProcessingTimeout { .. } => "processing_timeout",
        ProcessError::WorkerFailure { .. } => "worker_failure",
        ProcessError::StaleSnapshot(_) => "stale_snapshot",
        ProcessError::Io(_) => "io_failure",
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
