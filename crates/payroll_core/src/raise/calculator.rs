//! Raise formula.
//!
//! # Responsibility
//! - Map one employee and an evaluation date to the post-raise salary.
//!
//! # Invariants
//! - Pure: the evaluation date is always an argument, never read from a clock.
//! - Below `NO_RAISE_THRESHOLD` completion the salary is returned unchanged.
//! - The high-achiever multiplier scales the role component only.

use crate::model::employee::{Employee, EmployeeId};
use chrono::{Datelike, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Completion strictly below this earns no raise at all.
pub const NO_RAISE_THRESHOLD: f64 = 0.60;
/// Completion strictly above this multiplies the role component.
pub const HIGH_ACHIEVER_THRESHOLD: f64 = 0.80;
pub const HIGH_ACHIEVER_MULTIPLIER: f64 = 1.5;
/// Percentage points per completed service year.
pub const SERVICE_PCT_PER_YEAR: f64 = 2.0;

pub type RaiseResult<T> = Result<T, RaiseError>;

#[derive(Debug, Clone, PartialEq)]
pub enum RaiseError {
    JoinDateInFuture {
        id: EmployeeId,
        join_date: NaiveDate,
        today: NaiveDate,
    },
    NonFiniteSalary { id: EmployeeId, value: f64 },
}

impl Display for RaiseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JoinDateInFuture {
                id,
                join_date,
                today,
            } => write!(
                f,
                "employee {id} join date {join_date} is after evaluation date {today}"
            ),
            Self::NonFiniteSalary { id, value } => {
                write!(f, "raise for employee {id} produced non-finite salary {value}")
            }
        }
    }
}

impl Error for RaiseError {}

/// Percentage components of one raise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaiseBreakdown {
    pub years_worked: u32,
    pub service_pct: f64,
    pub role_pct: f64,
}

impl RaiseBreakdown {
    pub fn total_pct(&self) -> f64 {
        self.service_pct + self.role_pct
    }
}

/// Whole civil years between `join_date` and `today`; partial years do not count.
///
/// Returns `None` when `join_date` is after `today`.
pub fn years_worked(join_date: NaiveDate, today: NaiveDate) -> Option<u32> {
    if join_date > today {
        return None;
    }
    let mut years = today.year() - join_date.year();
    if (today.month(), today.day()) < (join_date.month(), join_date.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Returns the raise components, or `None` when no raise is due.
pub fn raise_breakdown(employee: &Employee, today: NaiveDate) -> RaiseResult<Option<RaiseBreakdown>> {
    if employee.project_completion < NO_RAISE_THRESHOLD {
        return Ok(None);
    }

    let mut role_pct = employee.role.raise_pct();
    if employee.project_completion > HIGH_ACHIEVER_THRESHOLD {
        role_pct *= HIGH_ACHIEVER_MULTIPLIER;
    }

    let years = years_worked(employee.join_date, today).ok_or(RaiseError::JoinDateInFuture {
        id: employee.id,
        join_date: employee.join_date,
        today,
    })?;

    Ok(Some(RaiseBreakdown {
        years_worked: years,
        service_pct: f64::from(years) * SERVICE_PCT_PER_YEAR,
        role_pct,
    }))
}

/// Computes the post-raise salary for `employee` as of `today`.
pub fn compute(employee: &Employee, today: NaiveDate) -> RaiseResult<f64> {
    let salary = employee.salary;
    let Some(breakdown) = raise_breakdown(employee, today)? else {
        return Ok(salary);
    };

    let raised = salary
        + salary * (breakdown.service_pct / 100.0)
        + salary * (breakdown.role_pct / 100.0);
    if !raised.is_finite() {
        return Err(RaiseError::NonFiniteSalary {
            id: employee.id,
            value: raised,
        });
    }
    Ok(raised)
}

/// Seam the parallel processor evaluates raises through.
///
/// `StandardRaise` is the only production implementation.
pub trait RaiseEvaluator: Send + Sync {
    fn evaluate(&self, employee: &Employee, today: NaiveDate) -> RaiseResult<f64>;
}

/// The fixed company raise formula.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRaise;

impl RaiseEvaluator for StandardRaise {
    fn evaluate(&self, employee: &Employee, today: NaiveDate) -> RaiseResult<f64> {
        compute(employee, today)
    }
}

#[cfg(test)]
mod tests {
    use super::years_worked;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn years_worked_floors_partial_years() {
        assert_eq!(years_worked(date(2020, 6, 1), date(2023, 5, 31)), Some(2));
        assert_eq!(years_worked(date(2020, 6, 1), date(2023, 6, 1)), Some(3));
        assert_eq!(years_worked(date(2020, 6, 1), date(2020, 6, 1)), Some(0));
    }

    #[test]
    fn years_worked_handles_leap_day_anniversary() {
        assert_eq!(years_worked(date(2020, 2, 29), date(2021, 2, 28)), Some(0));
        assert_eq!(years_worked(date(2020, 2, 29), date(2021, 3, 1)), Some(1));
    }

    #[test]
    fn years_worked_rejects_future_join() {
        assert_eq!(years_worked(date(2025, 1, 2), date(2025, 1, 1)), None);
    }
}
