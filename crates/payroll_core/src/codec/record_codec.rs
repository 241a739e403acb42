//! Line codec for the delimited employee file format.
//!
//! # Responsibility
//! - Parse `id,name,salary,joinDate,role,projectCompletion` lines into records.
//! - Render records back into the same line grammar.
//!
//! # Invariants
//! - Parsing is all-or-nothing per document: one bad line aborts the load.
//! - Parsed documents never contain duplicate ids.
//! - `format_line(parse_line(l)) == l` modulo numeric canonicalization.

use crate::model::employee::{
    Employee, EmployeeId, EmployeeValidationError, Role, FIELD_DELIMITER,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const FIELD_COUNT: usize = 6;
const DATE_FORMAT: &str = "%Y-%m-%d";

pub type CodecResult<T> = Result<T, CodecError>;

/// Parse failures. `line` is 1-based; `0` means "not tied to a line".
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    MalformedRecord { line: usize, reason: String },
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
    InvalidDate { line: usize, value: String },
    UnknownRole { line: usize, value: String },
    DuplicateId { line: usize, id: EmployeeId },
    InvalidEncoding { offset: usize },
}

impl CodecError {
    /// Line number the error refers to, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedRecord { line, .. }
            | Self::InvalidNumber { line, .. }
            | Self::InvalidDate { line, .. }
            | Self::UnknownRole { line, .. }
            | Self::DuplicateId { line, .. } => Some(*line).filter(|line| *line > 0),
            Self::InvalidEncoding { .. } => None,
        }
    }

    fn at_line(self, line_no: usize) -> Self {
        match self {
            Self::MalformedRecord { reason, .. } => Self::MalformedRecord {
                line: line_no,
                reason,
            },
            Self::InvalidNumber { field, value, .. } => Self::InvalidNumber {
                line: line_no,
                field,
                value,
            },
            Self::InvalidDate { value, .. } => Self::InvalidDate {
                line: line_no,
                value,
            },
            Self::UnknownRole { value, .. } => Self::UnknownRole {
                line: line_no,
                value,
            },
            Self::DuplicateId { id, .. } => Self::DuplicateId { line: line_no, id },
            other @ Self::InvalidEncoding { .. } => other,
        }
    }
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRecord { line, reason } => {
                write!(f, "malformed record at line {line}: {reason}")
            }
            Self::InvalidNumber { line, field, value } => {
                write!(f, "invalid number for `{field}` at line {line}: `{value}`")
            }
            Self::InvalidDate { line, value } => {
                write!(f, "invalid date at line {line}: `{value}` (expected YYYY-MM-DD)")
            }
            Self::UnknownRole { line, value } => write!(
                f,
                "unknown role at line {line}: `{value}` (expected Director|Manager|Employee)"
            ),
            Self::DuplicateId { line, id } => write!(f, "duplicate id {id} at line {line}"),
            Self::InvalidEncoding { offset } => {
                write!(f, "input is not valid UTF-8 (byte offset {offset})")
            }
        }
    }
}

impl Error for CodecError {}

/// Parses one line. Errors carry line `0`; document parsing fills it in.
pub fn parse_line(line: &str) -> CodecResult<Employee> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(CodecError::MalformedRecord {
            line: 0,
            reason: format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
        });
    }

    let id = fields[0]
        .parse::<EmployeeId>()
        .map_err(|_| invalid_number("id", fields[0]))?;

    let name = fields[1];

    // `-0` parses to negative zero; store it as plain zero.
    let salary = match parse_float("salary", fields[2])? {
        parsed if parsed == 0.0 => 0.0,
        parsed => parsed,
    };

    let join_date =
        NaiveDate::parse_from_str(fields[3], DATE_FORMAT).map_err(|_| CodecError::InvalidDate {
            line: 0,
            value: fields[3].to_string(),
        })?;

    let role = fields[4]
        .parse::<Role>()
        .map_err(|err| CodecError::UnknownRole { line: 0, value: err.0 })?;

    let project_completion = parse_float("projectCompletion", fields[5])?;

    Employee::new(id, name, salary, join_date, role, project_completion).map_err(|err| match err {
        EmployeeValidationError::InvalidSalary(_) => invalid_number("salary", fields[2]),
        EmployeeValidationError::InvalidProjectCompletion(_) => {
            invalid_number("projectCompletion", fields[5])
        }
        EmployeeValidationError::BlankName | EmployeeValidationError::NameContainsDelimiter(_) => {
            CodecError::MalformedRecord {
                line: 0,
                reason: err.to_string(),
            }
        }
    })
}

/// Parses a whole document, one record per line.
///
/// A single trailing line terminator is accepted; any other blank line is
/// malformed.
pub fn parse_document(text: &str) -> CodecResult<Vec<Employee>> {
    let mut employees = Vec::new();
    let mut seen = HashSet::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            return Err(CodecError::MalformedRecord {
                line: line_no,
                reason: "blank line".to_string(),
            });
        }
        let employee = parse_line(line).map_err(|err| err.at_line(line_no))?;
        if !seen.insert(employee.id) {
            return Err(CodecError::DuplicateId {
                line: line_no,
                id: employee.id,
            });
        }
        employees.push(employee);
    }

    Ok(employees)
}

/// Parses raw upload bytes.
pub fn parse_bytes(bytes: &[u8]) -> CodecResult<Vec<Employee>> {
    let text = std::str::from_utf8(bytes).map_err(|err| CodecError::InvalidEncoding {
        offset: err.valid_up_to(),
    })?;
    parse_document(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Renders one record in the canonical line form.
pub fn format_line(employee: &Employee) -> String {
    format!(
        "{id}{d}{name}{d}{salary}{d}{date}{d}{role}{d}{completion}",
        d = FIELD_DELIMITER,
        id = employee.id,
        name = employee.name,
        salary = employee.salary,
        date = employee.join_date.format(DATE_FORMAT),
        role = employee.role,
        completion = employee.project_completion,
    )
}

fn parse_float(field: &'static str, value: &str) -> CodecResult<f64> {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(invalid_number(field, value)),
    }
}

fn invalid_number(field: &'static str, value: &str) -> CodecError {
    CodecError::InvalidNumber {
        line: 0,
        field,
        value: value.to_string(),
    }
}
