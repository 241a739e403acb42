//! Use-case API for transport adapters (HTTP handlers, RPC shims).
//!
//! # Responsibility
//! - Expose one function per external interface: upload, list, preview, apply.
//! - Keep error semantics simple: every call returns a serializable envelope.
//!
//! # Invariants
//! - Exported functions never panic.
//! - One process-wide service backs every call; its config is fixed on first use.
//! - Evaluation date is the local calendar date at call time.

use chrono::{Local, NaiveDate};
use log::warn;
use payroll_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Employee, PayrollConfig, PayrollService,
};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

static SERVICE: OnceLock<PayrollService> = OnceLock::new();
static ACTIVE_CONFIG: OnceLock<PayrollConfig> = OnceLock::new();

/// Health check.
pub fn ping() -> String {
    ping_inner().to_owned()
}

pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Fixes the process-wide pipeline configuration.
///
/// Input semantics:
/// - `output_path`: file rewritten by every apply.
/// - `workers` / `timeout_secs`: `None` keeps the default.
///
/// Safe to repeat with an identical config. Returns an empty string on
/// success and an error message when the config conflicts with the active one
/// or a value is zero.
pub fn configure(
    output_path: String,
    workers: Option<u32>,
    timeout_secs: Option<u64>,
) -> String {
    let mut config = PayrollConfig::default().with_output_path(PathBuf::from(output_path.trim()));
    if let Some(workers) = workers {
        match usize::try_from(workers).ok().and_then(NonZeroUsize::new) {
            Some(workers) => config = config.with_workers(workers),
            None => return "configure failed: workers must be positive".to_string(),
        }
    }
    if let Some(secs) = timeout_secs {
        if secs == 0 {
            return "configure failed: timeout_secs must be positive".to_string();
        }
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let active = ACTIVE_CONFIG.get_or_init(|| config.clone());
    match config_conflict(active, &config) {
        Some(conflict) => format!("configure failed: {conflict}"),
        None => String::new(),
    }
}

fn config_conflict(active: &PayrollConfig, requested: &PayrollConfig) -> Option<String> {
    if active.output_path != requested.output_path {
        return Some(format!(
            "already configured with output `{}`; refusing to switch to `{}`",
            active.output_path.display(),
            requested.output_path.display()
        ));
    }
    if active.workers != requested.workers {
        return Some(format!(
            "already configured with {} worker(s); refusing to switch to {}",
            active.workers, requested.workers
        ));
    }
    if active.timeout != requested.timeout {
        return Some(format!(
            "already configured with timeout {}s; refusing to switch to {}s",
            active.timeout.as_secs(),
            requested.timeout.as_secs()
        ));
    }
    None
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResponse {
    pub ok: bool,
    pub message: String,
}

/// Envelope carrying employee records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeesResponse {
    pub ok: bool,
    pub employees: Vec<Employee>,
    pub message: String,
}

/// Envelope for a single raise preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaisePreviewResponse {
    pub ok: bool,
    #[serde(rename = "newSalary")]
    pub new_salary: Option<f64>,
    pub message: String,
}

impl EmployeesResponse {
    fn success(employees: Vec<Employee>, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            employees,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            employees: Vec::new(),
            message: message.into(),
        }
    }
}

impl RaisePreviewResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            new_salary: None,
            message: message.into(),
        }
    }
}

/// Replaces the store with the records in an uploaded file.
///
/// On any parse failure nothing is ingested and `message` names the line.
pub fn upload_employees(bytes: Vec<u8>) -> EmployeesResponse {
    match service().load_bytes(&bytes) {
        Ok(employees) => {
            let message = format!("Loaded {} employee(s).", employees.len());
            EmployeesResponse::success(employees, message)
        }
        Err(err) => EmployeesResponse::failure(format!("upload_employees failed: {err}")),
    }
}

/// Returns the current records.
pub fn list_employees() -> EmployeesResponse {
    let employees = service().list();
    let message = if employees.is_empty() {
        "No employees loaded.".to_string()
    } else {
        format!("Found {} employee(s).", employees.len())
    };
    EmployeesResponse::success(employees, message)
}

/// Computes one record's new salary; the store is untouched.
pub fn preview_raise(employee: Employee) -> RaisePreviewResponse {
    preview_raise_at(&employee, today())
}

/// Same as `preview_raise`, taking the record as a JSON document.
pub fn preview_raise_json(body: String) -> RaisePreviewResponse {
    match serde_json::from_str::<Employee>(&body) {
        Ok(employee) => preview_raise(employee),
        Err(err) => RaisePreviewResponse::failure(format!("preview_raise failed: {err}")),
    }
}

/// Recomputes every raise, rewrites the output file and updates the store.
pub fn apply_raises() -> ActionResponse {
    match service().apply_raises(today()) {
        Ok(lines) => ActionResponse {
            ok: true,
            message: format!(
                "Applied raises to {} employee(s); wrote {}.",
                lines.len(),
                service().output_path().display()
            ),
        },
        Err(err) => ActionResponse {
            ok: false,
            message: format!("apply_raises failed: {err}"),
        },
    }
}

/// Upload followed by apply in one call.
pub fn upload_and_apply(bytes: Vec<u8>) -> ActionResponse {
    match service().load_and_apply(&bytes, today()) {
        Ok(lines) => ActionResponse {
            ok: true,
            message: format!("Loaded and raised {} employee(s).", lines.len()),
        },
        Err(err) => ActionResponse {
            ok: false,
            message: format!("upload_and_apply failed: {err}"),
        },
    }
}

fn preview_raise_at(employee: &Employee, today: NaiveDate) -> RaisePreviewResponse {
    match service().preview_raise(employee, today) {
        Ok(salary) => RaisePreviewResponse {
            ok: true,
            new_salary: Some(salary),
            message: format!("New salary for employee {}.", employee.id),
        },
        Err(err) => RaisePreviewResponse::failure(format!("preview_raise failed: {err}")),
    }
}

fn service() -> &'static PayrollService {
    SERVICE.get_or_init(|| PayrollService::new(&resolve_config()))
}

fn resolve_config() -> PayrollConfig {
    ACTIVE_CONFIG
        .get_or_init(|| match PayrollConfig::from_env() {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    "event=config_resolve module=api status=fallback error={}",
                    err
                );
                PayrollConfig::default()
            }
        })
        .clone()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
