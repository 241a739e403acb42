//! Transport-facing API over `payroll_core`.

pub mod api;

pub use api::{
    apply_raises, configure, core_version, init_logging, list_employees, ping, preview_raise,
    preview_raise_json, upload_and_apply, upload_employees, ActionResponse, EmployeesResponse,
    RaisePreviewResponse,
};
