use chrono::NaiveDate;
use payroll_core::{
    parse_line, CodecError, PayrollConfig, PayrollError, PayrollService, ProcessError,
};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

const UPLOAD: &[u8] = b"1,Alice,50000,2020-01-01,Director,0.9\n2,Bob,40000,2023-06-01,Employee,0.4\n";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn service(output: &Path) -> PayrollService {
    let config = PayrollConfig::default()
        .with_output_path(output)
        .with_workers(NonZeroUsize::new(4).unwrap());
    PayrollService::new(&config)
}

#[test]
fn upload_returns_and_stores_decoded_records() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir.path().join("out.csv"));

    let records = service.load_bytes(UPLOAD).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(service.list(), records);
}

#[test]
fn failed_upload_keeps_previous_records() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir.path().join("out.csv"));
    service.load_bytes(UPLOAD).unwrap();

    let err = service
        .load_bytes(b"3,Carol,1,2020-01-01,Director,0.9\n4,Dan,oops,2020-01-01,Manager,0.9")
        .unwrap_err();

    assert!(matches!(
        err,
        PayrollError::Codec(CodecError::InvalidNumber { line: 2, .. })
    ));
    let ids: Vec<u32> = service.list().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn preview_does_not_mutate_store() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir.path().join("out.csv"));
    service.load_bytes(UPLOAD).unwrap();
    let before = service.list();

    let alice = parse_line("1,Alice,50000,2020-01-01,Director,0.9").unwrap();
    assert_eq!(service.preview_raise(&alice, today()).unwrap(), 57_750.0);

    assert_eq!(service.list(), before);
}

#[test]
fn preview_validates_input_record() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir.path().join("out.csv"));
    let mut record = parse_line("1,Alice,50000,2020-01-01,Director,0.9").unwrap();
    record.salary = -5.0;

    let err = service.preview_raise(&record, today()).unwrap_err();
    assert!(matches!(err, PayrollError::InvalidEmployee(_)));
}

#[test]
fn apply_persists_file_and_updates_store() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("data").join("employees.csv");
    let service = service(&output);
    service.load_bytes(UPLOAD).unwrap();

    let lines = service.apply_raises(today()).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "1,Alice,57750,2020-01-01,Director,0.9\n2,Bob,40000,2023-06-01,Employee,0.4"
    );
    assert_eq!(lines.len(), 2);
    assert_eq!(service.list()[0].salary, 57_750.0);
    assert_eq!(service.output_path(), output.as_path());
}

#[test]
fn apply_twice_compounds_raises() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(&dir.path().join("out.csv"));
    service.load_bytes(UPLOAD).unwrap();

    service.apply_raises(today()).unwrap();
    service.apply_raises(today()).unwrap();

    let expected = 57_750.0 + 57_750.0 * 0.08 + 57_750.0 * 0.075;
    assert!((service.list()[0].salary - expected).abs() < 1e-6);
}

#[test]
fn load_and_apply_runs_both_steps() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.csv");
    let service = service(&output);

    let lines = service.load_and_apply(UPLOAD, today()).unwrap();

    assert_eq!(lines[0], "1,Alice,57750,2020-01-01,Director,0.9");
    assert_eq!(service.store().len(), 2);
    assert!(output.exists());
}

#[test]
fn apply_failure_surfaces_process_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.csv");
    let service = service(&output);
    service
        .load_bytes(b"1,Future,100,2099-01-01,Director,0.9")
        .unwrap();

    let err = service.apply_raises(today()).unwrap_err();

    assert!(matches!(
        err,
        PayrollError::Process(ProcessError::WorkerFailure { .. })
    ));
    assert_eq!(service.list()[0].salary, 100.0);
    assert!(!output.exists());
}
