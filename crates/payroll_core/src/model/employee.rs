//! Employee domain model.
//!
//! # Responsibility
//! - Define the canonical employee record shared by codec, store and processor.
//! - Define the closed role set and its role-based raise percentages.
//!
//! # Invariants
//! - `id` is unique within one loaded data set.
//! - `name` is non-blank and never contains the field delimiter or a line break.
//! - `salary` is finite and non-negative; only `salary` changes after load.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Field delimiter shared by the upload and persisted line formats.
pub const FIELD_DELIMITER: char = ',';

/// Stable identifier of one employee; also the canonical output sort key.
pub type EmployeeId = u32;

/// Closed set of job roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Director,
    Manager,
    Employee,
}

impl Role {
    /// All roles in canonical order.
    pub const ALL: [Role; 3] = [Role::Director, Role::Manager, Role::Employee];

    /// Role-based raise percentage before any high-achiever multiplier.
    pub fn raise_pct(self) -> f64 {
        match self {
            Self::Director => 5.0,
            Self::Manager => 2.0,
            Self::Employee => 1.0,
        }
    }

    /// Canonical capitalized label used on output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Director => "Director",
            Self::Manager => "Manager",
            Self::Employee => "Employee",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role token matches none of the known roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRoleError(pub String);

impl Display for UnknownRoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown role `{}`; expected Director|Manager|Employee",
            self.0
        )
    }
}

impl Error for UnknownRoleError {}

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let token = value.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| UnknownRoleError(token.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// Validation errors for employee invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeValidationError {
    BlankName,
    NameContainsDelimiter(String),
    InvalidSalary(f64),
    InvalidProjectCompletion(f64),
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::NameContainsDelimiter(name) => write!(
                f,
                "name `{name}` must not contain `{FIELD_DELIMITER}` or line breaks"
            ),
            Self::InvalidSalary(value) => {
                write!(f, "salary must be a finite non-negative number, got {value}")
            }
            Self::InvalidProjectCompletion(value) => {
                write!(f, "project completion must be a finite number, got {value}")
            }
        }
    }
}

impl Error for EmployeeValidationError {}

/// Canonical employee record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "EmployeeWire")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub salary: f64,
    pub join_date: NaiveDate,
    pub role: Role,
    /// Fraction in `[0.0, 1.0]`; the range itself is not enforced.
    pub project_completion: f64,
}

impl Employee {
    /// Builds and validates a record.
    pub fn new(
        id: EmployeeId,
        name: impl Into<String>,
        salary: f64,
        join_date: NaiveDate,
        role: Role,
        project_completion: f64,
    ) -> Result<Self, EmployeeValidationError> {
        let employee = Self {
            id,
            name: name.into(),
            salary,
            join_date,
            role,
            project_completion,
        };
        employee.validate()?;
        Ok(employee)
    }

    /// Checks record invariants.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        if self.name.trim().is_empty() {
            return Err(EmployeeValidationError::BlankName);
        }
        if self
            .name
            .contains(|c: char| c == FIELD_DELIMITER || c == '\n' || c == '\r')
        {
            return Err(EmployeeValidationError::NameContainsDelimiter(
                self.name.clone(),
            ));
        }
        if !self.salary.is_finite() || self.salary < 0.0 {
            return Err(EmployeeValidationError::InvalidSalary(self.salary));
        }
        if !self.project_completion.is_finite() {
            return Err(EmployeeValidationError::InvalidProjectCompletion(
                self.project_completion,
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeWire {
    id: EmployeeId,
    name: String,
    salary: f64,
    join_date: NaiveDate,
    role: Role,
    #[serde(alias = "projectCompletionPercentage")]
    project_completion: f64,
}

impl TryFrom<EmployeeWire> for Employee {
    type Error = EmployeeValidationError;

    fn try_from(wire: EmployeeWire) -> Result<Self, Self::Error> {
        Employee::new(
            wire.id,
            wire.name,
            wire.salary,
            wire.join_date,
            wire.role,
            wire.project_completion,
        )
    }
}
