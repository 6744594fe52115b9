//! End-to-end tests for the run controller.

mod common;

use std::fs;

use common::{FakeService, Fixture, RecordingNotifier, Reply, instrument_csv, saved};
use loris_core::{JOURNAL_FILE, RunController, RunError, RunOptions, RunState};
use loris_ingest::DiscoveryFilter;
use loris_model::NotificationKind;

#[test]
fn single_project_success_scenario() {
    let fixture = Fixture::new();
    fixture.write_project("demo", "P1", &["demographics"], &["b@x.org"], &["a@x.org"]);
    fixture.write_instrument("P1", "demographics", &instrument_csv(5));
    let collections = vec![fixture.collection("demo", &["P1"])];
    let service =
        FakeService::default().reply("demographics", Reply::Response(saved(5, 5)));
    let notifier = RecordingNotifier::default();

    let mut controller =
        RunController::new(&service, &notifier, &collections, RunOptions::default());
    let report = controller.run().expect("run completes");

    assert_eq!(controller.state(), RunState::Done);
    assert_eq!(report.projects.len(), 1);
    let stats = &report.projects[0].stats;
    assert_eq!(
        (stats.total, stats.success, stats.failed, stats.skipped),
        (1, 1, 0, 0)
    );
    assert_eq!(stats.rows_uploaded, 5);
    assert_eq!(stats.rows_skipped, 0);

    let sent = notifier.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "b@x.org");
    assert_eq!(sent[0].1, "SUCCESS: P1 Clinical Ingestion");
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn authentication_failure_is_fatal() {
    let fixture = Fixture::new();
    fixture.write_project("demo", "P1", &["demographics"], &["b@x.org"], &[]);
    let collections = vec![fixture.collection("demo", &["P1"])];
    let service = FakeService {
        fail_auth: true,
        ..FakeService::default()
    };
    let notifier = RecordingNotifier::default();

    let mut controller =
        RunController::new(&service, &notifier, &collections, RunOptions::default());
    let err = controller.run().unwrap_err();

    assert!(matches!(err, RunError::Authentication(_)));
    assert_eq!(controller.state(), RunState::Fatal);
    assert_eq!(service.upload_count(), 0);
    assert!(notifier.sent.borrow().is_empty());
}

#[test]
fn nothing_discovered_exits_cleanly() {
    let fixture = Fixture::new();
    let collections = vec![fixture.collection("demo", &["missing"])];
    let service = FakeService::default();
    let notifier = RecordingNotifier::default();

    let mut controller =
        RunController::new(&service, &notifier, &collections, RunOptions::default());
    let report = controller.run().expect("run completes");

    assert!(report.projects.is_empty());
    assert_eq!(report.totals.total, 0);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(controller.state(), RunState::Done);
}

#[test]
fn project_without_instruments_gets_success_notification() {
    let fixture = Fixture::new();
    fixture.write_project("demo", "empty", &[], &["b@x.org"], &["a@x.org"]);
    let collections = vec![fixture.collection("demo", &["empty"])];
    let service = FakeService::default();
    let notifier = RecordingNotifier::default();

    let mut controller =
        RunController::new(&service, &notifier, &collections, RunOptions::default());
    let report = controller.run().expect("run completes");

    assert_eq!(report.projects.len(), 1);
    assert_eq!(report.projects[0].stats, Default::default());
    assert_eq!(report.projects[0].notification.kind, NotificationKind::Success);
    assert_eq!(notifier.sent.borrow()[0].0, "b@x.org");
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn any_failure_sets_exit_code_and_error_notification() {
    let fixture = Fixture::new();
    fixture.write_project("demo", "P1", &["bmi", "mri_form", "absent"], &["b@x.org"], &["a@x.org"]);
    fixture.write_project("demo", "P2", &["bmi"], &["ok@x.org"], &["err@x.org"]);
    fixture.write_instrument("P1", "bmi", &instrument_csv(2));
    fixture.write_instrument("P1", "mri_form", "Visit_label\nV1\n");
    fixture.write_instrument("P2", "bmi", &instrument_csv(3));
    let collections = vec![fixture.collection("demo", &["P1", "P2"])];
    let service = FakeService::default().reply("bmi", Reply::Response(saved(2, 2)));
    let notifier = RecordingNotifier::default();

    let mut controller =
        RunController::new(&service, &notifier, &collections, RunOptions::default());
    let report = controller.run().expect("run completes");

    let p1 = &report.projects[0].stats;
    assert_eq!((p1.total, p1.success, p1.failed, p1.skipped), (3, 1, 1, 1));
    assert_eq!(p1.errors.len(), 1);
    assert_eq!(p1.errors[0].instrument, "mri_form");

    assert_eq!(report.totals.total, 4);
    assert_eq!(report.totals.failed, 1);
    assert_eq!(report.totals.rows_uploaded, 4);
    assert_eq!(report.exit_code(), 1);

    let sent = notifier.sent.borrow();
    let recipients: Vec<&str> = sent.iter().map(|(to, _, _)| to.as_str()).collect();
    assert_eq!(recipients, vec!["a@x.org", "ok@x.org"]);
    assert!(sent[0].1.starts_with("FAILED:"));
    assert!(sent[1].1.starts_with("SUCCESS:"));
}

#[test]
fn dry_run_neither_uploads_nor_notifies() {
    let fixture = Fixture::new();
    fixture.write_project("demo", "P1", &["demographics"], &["b@x.org"], &["a@x.org"]);
    fixture.write_instrument("P1", "demographics", &instrument_csv(5));
    let collections = vec![fixture.collection("demo", &["P1"])];
    let service = FakeService::default();
    let notifier = RecordingNotifier::default();
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };

    let mut controller = RunController::new(&service, &notifier, &collections, options);
    let report = controller.run().expect("run completes");

    assert_eq!(*service.auth_calls.borrow(), 1);
    assert_eq!(service.upload_count(), 0);
    assert!(notifier.sent.borrow().is_empty());
    assert!(report.dry_run);
    assert_eq!(report.totals.success, 1);
    assert!(!report.projects[0].notification.dispatched);
}

#[test]
fn instrument_and_project_filters_narrow_the_run() {
    let fixture = Fixture::new();
    fixture.write_project("demo", "P1", &["bmi", "demographics"], &[], &[]);
    fixture.write_project("demo", "P2", &["bmi"], &[], &[]);
    fixture.write_instrument("P1", "bmi", &instrument_csv(1));
    fixture.write_instrument("P1", "demographics", &instrument_csv(1));
    fixture.write_instrument("P2", "bmi", &instrument_csv(1));
    let collections = vec![fixture.collection("demo", &["P1", "P2"])];
    let service = FakeService::default();
    let notifier = RecordingNotifier::default();
    let options = RunOptions {
        filter: DiscoveryFilter {
            collection: Some("demo".to_string()),
            project: Some("P1".to_string()),
        },
        instrument: Some("demographics".to_string()),
        ..RunOptions::default()
    };

    let mut controller = RunController::new(&service, &notifier, &collections, options);
    let report = controller.run().expect("run completes");

    assert_eq!(report.projects.len(), 1);
    assert_eq!(report.projects[0].project, "P1");
    let uploads = service.uploads.borrow();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "demographics");
}

#[test]
fn project_journal_is_written_to_log_path() {
    let fixture = Fixture::new();
    let log_dir = fixture.root.path().join("logs/P1");
    fixture.write_manifest(
        "demo",
        "P1",
        serde_json::json!({
            "name": "P1",
            "mount_path": fixture.mount("P1"),
            "instruments": ["demographics", "absent"],
            "log_path": log_dir,
        }),
    );
    fixture.write_instrument("P1", "demographics", &instrument_csv(2));
    let collections = vec![fixture.collection("demo", &["P1"])];
    let service = FakeService::default().reply("demographics", Reply::Response(saved(2, 2)));
    let notifier = RecordingNotifier::default();

    RunController::new(&service, &notifier, &collections, RunOptions::default())
        .run()
        .expect("run completes");

    let journal = fs::read_to_string(log_dir.join(JOURNAL_FILE)).expect("journal written");
    let lines: Vec<&str> = journal.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("clinical ingestion started for P1"));
    assert!(lines[1].ends_with("demographics: success"));
    assert!(lines[2].ends_with("absent: skipped"));
    assert!(lines[3].contains("total=2 success=1 failed=0 skipped=1 rows_uploaded=2"));
}
