use chrono::NaiveDate;
use payroll_core::{format_line, parse_bytes, parse_document, parse_line, CodecError, Role};

#[test]
fn parse_line_decodes_all_fields() {
    let employee = parse_line("1,Alice,50000,2020-01-01,Director,0.9").unwrap();
    assert_eq!(employee.id, 1);
    assert_eq!(employee.name, "Alice");
    assert_eq!(employee.salary, 50_000.0);
    assert_eq!(employee.join_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    assert_eq!(employee.role, Role::Director);
    assert_eq!(employee.project_completion, 0.9);
}

#[test]
fn format_line_uses_canonical_field_order_and_role_case() {
    let employee = parse_line("3,Carol,61000.25,2018-11-30,mAnAgEr,0.65").unwrap();
    assert_eq!(format_line(&employee), "3,Carol,61000.25,2018-11-30,Manager,0.65");
}

#[test]
fn round_trip_preserves_canonical_lines() {
    let lines = [
        "1,Alice,50000,2020-01-01,Director,0.9",
        "2,Bob,40000,2023-06-01,Employee,0.4",
        "10,Zed,12345.678,1999-12-31,Manager,1",
        "11,Yan,0,2024-02-29,Employee,0",
    ];
    for line in lines {
        assert_eq!(format_line(&parse_line(line).unwrap()), line);
    }
}

#[test]
fn round_trip_canonicalizes_trailing_zero() {
    let employee = parse_line("1,Alice,50000.0,2020-01-01,DIRECTOR,0.90").unwrap();
    assert_eq!(format_line(&employee), "1,Alice,50000,2020-01-01,Director,0.9");
}

#[test]
fn parse_line_reports_each_error_kind() {
    assert!(matches!(
        parse_line("1,Alice,50000,2020-01-01,Director").unwrap_err(),
        CodecError::MalformedRecord { .. }
    ));
    assert!(matches!(
        parse_line("1,Alice,50000,2020-01-01,Director,0.9,extra").unwrap_err(),
        CodecError::MalformedRecord { .. }
    ));
    assert!(matches!(
        parse_line("1,Alice,lots,2020-01-01,Director,0.9").unwrap_err(),
        CodecError::InvalidNumber { field: "salary", .. }
    ));
    assert!(matches!(
        parse_line("1,Alice,50000,2020-01-01,Director,most").unwrap_err(),
        CodecError::InvalidNumber { field: "projectCompletion", .. }
    ));
    assert!(matches!(
        parse_line("x,Alice,50000,2020-01-01,Director,0.9").unwrap_err(),
        CodecError::InvalidNumber { field: "id", .. }
    ));
    assert!(matches!(
        parse_line("1,Alice,50000,2020-02-30,Director,0.9").unwrap_err(),
        CodecError::InvalidDate { .. }
    ));
    assert!(matches!(
        parse_line("1,Alice,50000,2020-01-01,Intern,0.9").unwrap_err(),
        CodecError::UnknownRole { ref value, .. } if value == "Intern"
    ));
    assert!(matches!(
        parse_line("1,,50000,2020-01-01,Director,0.9").unwrap_err(),
        CodecError::MalformedRecord { .. }
    ));
}

#[test]
fn parse_line_rejects_line_break_inside_name() {
    let err = parse_line("1,Da\rna,100,2020-01-01,Director,0.9").unwrap_err();
    assert!(
        matches!(err, CodecError::MalformedRecord { ref reason, .. } if reason.contains("line breaks")),
        "unexpected error: {err}"
    );
}

#[test]
fn parse_line_rejects_negative_salary_and_normalizes_negative_zero() {
    assert!(matches!(
        parse_line("2,Zed,-5,2020-01-01,Employee,0.9").unwrap_err(),
        CodecError::InvalidNumber { field: "salary", .. }
    ));

    let employee = parse_line("2,Zed,-0,2020-01-01,Employee,0.9").unwrap();
    assert!(employee.salary.is_sign_positive());
    assert_eq!(format_line(&employee), "2,Zed,0,2020-01-01,Employee,0.9");
}

#[test]
fn parse_document_accepts_trailing_newline() {
    let records = parse_document(
        "1,Alice,50000,2020-01-01,Director,0.9\n2,Bob,40000,2023-06-01,Employee,0.4\n",
    )
    .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].name, "Bob");
}

#[test]
fn parse_document_accepts_crlf() {
    let records = parse_document(
        "1,Alice,50000,2020-01-01,Director,0.9\r\n2,Bob,40000,2023-06-01,Employee,0.4",
    )
    .unwrap();
    assert_eq!(records[0].project_completion, 0.9);
    assert_eq!(records[1].project_completion, 0.4);
}

#[test]
fn parse_document_reports_failing_line_number() {
    let err = parse_document(
        "1,Alice,50000,2020-01-01,Director,0.9\n2,Bob,40000,2023-06-01,Janitor,0.4\n",
    )
    .unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn parse_document_rejects_blank_interior_line() {
    let err = parse_document(
        "1,Alice,50000,2020-01-01,Director,0.9\n\n2,Bob,40000,2023-06-01,Employee,0.4",
    )
    .unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord { line: 2, .. }));
}

#[test]
fn parse_document_rejects_duplicate_ids() {
    let err = parse_document(
        "1,Alice,50000,2020-01-01,Director,0.9\n1,Bob,40000,2023-06-01,Employee,0.4",
    )
    .unwrap_err();
    assert_eq!(err, CodecError::DuplicateId { line: 2, id: 1 });
}

#[test]
fn parse_document_of_empty_input_is_empty() {
    assert!(parse_document("").unwrap().is_empty());
}

#[test]
fn parse_bytes_rejects_invalid_utf8() {
    let err = parse_bytes(&[b'1', b',', 0xff, 0xfe]).unwrap_err();
    assert_eq!(err, CodecError::InvalidEncoding { offset: 2 });
    assert_eq!(err.line(), None);
}

#[test]
fn parse_bytes_skips_utf8_bom() {
    let mut bytes = vec![0xef, 0xbb, 0xbf];
    bytes.extend_from_slice(b"1,Alice,50000,2020-01-01,Director,0.9");
    let records = parse_bytes(&bytes).unwrap();
    assert_eq!(records[0].id, 1);
}
