use chrono::NaiveDate;
use payroll_core::{Employee, EmployeeValidationError, Role};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn new_accepts_valid_record() {
    let employee = Employee::new(1, "Alice", 50_000.0, date(2020, 1, 1), Role::Director, 0.9)
        .unwrap();
    assert_eq!(employee.id, 1);
    assert_eq!(employee.role, Role::Director);
}

#[test]
fn new_rejects_blank_name_and_delimiter() {
    let err = Employee::new(1, "  ", 1.0, date(2020, 1, 1), Role::Manager, 0.5).unwrap_err();
    assert_eq!(err, EmployeeValidationError::BlankName);

    let err = Employee::new(1, "Doe, Jane", 1.0, date(2020, 1, 1), Role::Manager, 0.5)
        .unwrap_err();
    assert!(matches!(err, EmployeeValidationError::NameContainsDelimiter(_)));
}

#[test]
fn new_rejects_negative_or_non_finite_salary() {
    let err = Employee::new(1, "Bob", -1.0, date(2020, 1, 1), Role::Employee, 0.5).unwrap_err();
    assert_eq!(err, EmployeeValidationError::InvalidSalary(-1.0));

    let err = Employee::new(1, "Bob", f64::INFINITY, date(2020, 1, 1), Role::Employee, 0.5)
        .unwrap_err();
    assert!(matches!(err, EmployeeValidationError::InvalidSalary(_)));
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let employee = Employee::new(2, "Bob", 40_000.0, date(2023, 6, 1), Role::Employee, 0.4)
        .unwrap();

    let json = serde_json::to_value(&employee).unwrap();
    assert_eq!(json["id"], 2);
    assert_eq!(json["name"], "Bob");
    assert_eq!(json["salary"], 40_000.0);
    assert_eq!(json["joinDate"], "2023-06-01");
    assert_eq!(json["role"], "Employee");
    assert_eq!(json["projectCompletion"], 0.4);

    let decoded: Employee = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, employee);
}

#[test]
fn deserialize_accepts_legacy_field_name_and_any_role_case() {
    let value = serde_json::json!({
        "id": 5,
        "name": "Eve",
        "salary": 1000.0,
        "joinDate": "2019-09-09",
        "role": "MANAGER",
        "projectCompletionPercentage": 0.75
    });

    let employee: Employee = serde_json::from_value(value).unwrap();
    assert_eq!(employee.role, Role::Manager);
    assert_eq!(employee.project_completion, 0.75);
}

#[test]
fn deserialize_rejects_invalid_records() {
    let value = serde_json::json!({
        "id": 5,
        "name": "",
        "salary": 1000.0,
        "joinDate": "2019-09-09",
        "role": "Manager",
        "projectCompletion": 0.75
    });
    let err = serde_json::from_value::<Employee>(value).unwrap_err();
    assert!(err.to_string().contains("name must not be blank"), "unexpected error: {err}");

    let value = serde_json::json!({
        "id": 5,
        "name": "Eve",
        "salary": 1000.0,
        "joinDate": "2019-09-09",
        "role": "Intern",
        "projectCompletion": 0.75
    });
    let err = serde_json::from_value::<Employee>(value).unwrap_err();
    assert!(err.to_string().contains("unknown role"), "unexpected error: {err}");
}
