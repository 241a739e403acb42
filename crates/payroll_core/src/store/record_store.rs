//! Authoritative in-memory employee store.
//!
//! # Responsibility
//! - Own the single live employee collection for the process lifetime.
//! - Serialize writers against readers with a reader/writer lock.
//!
//! # Invariants
//! - Readers only ever receive copies; the backing `Vec` never escapes.
//! - `load` replaces the collection atomically and bumps `generation`.
//! - Raise results are applied only to the generation they were computed from.

use crate::model::employee::{Employee, EmployeeId};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raise results were computed from a data set that has since been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleSnapshot {
    pub expected: u64,
    pub current: u64,
}

impl Display for StaleSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "store was reloaded during processing (snapshot generation {}, current {})",
            self.expected, self.current
        )
    }
}

impl Error for StaleSnapshot {}

/// Point-in-time copy of the store tagged with the generation it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub generation: u64,
    pub records: Vec<Employee>,
}

#[derive(Debug, Default)]
struct StoreState {
    generation: u64,
    records: Vec<Employee>,
}

impl StoreState {
    fn apply(&mut self, salaries: &HashMap<EmployeeId, f64>) -> usize {
        let mut updated = 0;
        for record in &mut self.records {
            if let Some(salary) = salaries.get(&record.id) {
                record.salary = *salary;
                updated += 1;
            }
        }
        updated
    }
}

/// Thread-safe employee store.
#[derive(Debug, Default)]
pub struct RecordStore {
    state: RwLock<StoreState>,
}

impl RecordStore {
    /// Creates an empty store at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole collection and returns the new generation.
    pub fn load(&self, records: Vec<Employee>) -> u64 {
        let count = records.len();
        let mut state = self.state.write();
        state.records = records;
        state.generation += 1;
        info!(
            "event=store_load module=store status=ok records={} generation={}",
            count, state.generation
        );
        state.generation
    }

    /// Returns an independent copy of the current records.
    pub fn snapshot(&self) -> Vec<Employee> {
        self.state.read().records.clone()
    }

    /// Returns a copy of the current records with their generation.
    pub fn versioned_snapshot(&self) -> StoreSnapshot {
        let state = self.state.read();
        debug!(
            "event=store_snapshot module=store records={} generation={}",
            state.records.len(),
            state.generation
        );
        StoreSnapshot {
            generation: state.generation,
            records: state.records.clone(),
        }
    }

    /// Returns a copy of one record.
    pub fn get(&self, id: EmployeeId) -> Option<Employee> {
        self.state
            .read()
            .records
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Overwrites salaries by id; ids missing from `salaries` are untouched.
    ///
    /// Returns the number of records updated.
    pub fn apply_raises(&self, salaries: &HashMap<EmployeeId, f64>) -> usize {
        let updated = self.state.write().apply(salaries);
        info!(
            "event=store_apply module=store status=ok updated={}",
            updated
        );
        updated
    }

    /// Applies salaries computed from `generation`, gated on `commit`.
    ///
    /// `commit` runs under the exclusive lock after the generation check and
    /// before any record changes; if it fails nothing is applied. This lets a
    /// caller publish an output file and the in-memory raises as one step.
    pub fn apply_raises_at<E, F>(
        &self,
        generation: u64,
        salaries: &HashMap<EmployeeId, f64>,
        commit: F,
    ) -> Result<usize, E>
    where
        E: From<StaleSnapshot>,
        F: FnOnce() -> Result<(), E>,
    {
        let mut state = self.state.write();
        if state.generation != generation {
            warn!(
                "event=store_apply module=store status=error error_code=stale_snapshot expected={} current={}",
                generation, state.generation
            );
            return Err(StaleSnapshot {
                expected: generation,
                current: state.generation,
            }
            .into());
        }

        commit()?;

        let updated = state.apply(salaries);
        info!(
            "event=store_apply module=store status=ok updated={} generation={}",
            updated, generation
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordStore, StaleSnapshot};
    use crate::model::employee::{Employee, Role};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn employee(id: u32, salary: f64) -> Employee {
        Employee::new(
            id,
            format!("emp-{id}"),
            salary,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            Role::Employee,
            0.7,
        )
        .unwrap()
    }

    #[test]
    fn load_bumps_generation() {
        let store = RecordStore::new();
        assert_eq!(store.generation(), 0);
        assert_eq!(store.load(vec![employee(1, 10.0)]), 1);
        assert_eq!(store.load(Vec::new()), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn apply_raises_at_rejects_stale_generation() {
        let store = RecordStore::new();
        let stale = store.load(vec![employee(1, 10.0)]);
        store.load(vec![employee(1, 10.0)]);

        let salaries = HashMap::from([(1, 99.0)]);
        let err = store
            .apply_raises_at(stale, &salaries, || Ok::<(), StaleSnapshot>(()))
            .unwrap_err();
        assert_eq!(err.current, 2);
        assert_eq!(store.get(1).unwrap().salary, 10.0);
    }

    #[test]
    fn apply_raises_at_skips_update_when_commit_fails() {
        #[derive(Debug)]
        enum TestError {
            Stale,
            Commit,
        }
        impl From<StaleSnapshot> for TestError {
            fn from(_: StaleSnapshot) -> Self {
                Self::Stale
            }
        }

        let store = RecordStore::new();
        let generation = store.load(vec![employee(1, 10.0)]);
        let salaries = HashMap::from([(1, 99.0)]);
        let err = store
            .apply_raises_at(generation, &salaries, || Err(TestError::Commit))
            .unwrap_err();
        assert!(matches!(err, TestError::Commit));
        assert_eq!(store.get(1).unwrap().salary, 10.0);
    }
}
