//! Diagnostic logging: captured events from library calls, and the log file
//! written by the binary.

mod common;

use common::fixtures::{catalog_dir, json, mcat};
use common::log_capture::LogCapture;
use mcat::cli::find;
use mcat::core::logging::{self, LogFormat, LogLevel, LogSettings};
use mcat::core::pricing::{self, CostScenario};
use mcat::test_utils::{make_test_model, make_test_provider};

#[test]
fn skipped_batch_entries_are_logged_with_fields() {
    let capture = LogCapture::start();
    let providers = vec![make_test_provider(
        "acme",
        vec![make_test_model("alpha", 1.0, 2.0, 8_000)],
    )];
    let scenarios = [
        CostScenario {
            model: "alpha".into(),
            input_tokens: 10,
            output_tokens: 10,
            cached_ratio: 0.0,
        },
        CostScenario {
            model: "ghost".into(),
            input_tokens: 10,
            output_tokens: 10,
            cached_ratio: 0.0,
        },
    ];

    let report = pricing::estimate_batch(&providers, &scenarios);
    assert_eq!(report.skipped.len(), 1);
    capture.assert_logged(tracing::Level::DEBUG, "unknown model");
    capture.assert_field("model", "ghost");
    capture.assert_field("index", "1");
}

#[test]
fn compare_logs_each_missing_name_below_warn() {
    let capture = LogCapture::start();
    let providers = vec![make_test_provider(
        "acme",
        vec![make_test_model("alpha", 1.0, 2.0, 8_000)],
    )];

    let payload = find::compare(&providers, &["alpha".into(), "x".into(), "y".into()]);
    assert_eq!(payload.missing, ["x", "y"]);
    let events = capture.events();
    let skips = events
        .iter()
        .filter(|e| e.message.contains("Skipping unknown model"))
        .collect::<Vec<_>>();
    assert_eq!(skips.len(), 2);
    // The user-facing warning belongs to the command layer.
    assert!(skips.iter().all(|e| e.level == tracing::Level::DEBUG));
    assert!(capture.count_from("mcat::cli") >= 2);
}

#[test]
fn init_is_idempotent() {
    let settings = LogSettings {
        level: LogLevel::Debug,
        format: LogFormat::Compact,
        file: None,
    };
    logging::init(&settings);
    logging::init(&LogSettings::default());
}

#[test]
fn binary_writes_json_logs_to_file_not_stdout() {
    let dir = catalog_dir();
    let log_path = dir.file_path("mcat.log");
    let out = mcat(&dir)
        .env("MCAT_LOG_FILE", &log_path)
        .args(["--log-level", "debug", "--json-output", "providers", "--json"])
        .assert()
        .success();

    // stdout stays a single clean document
    let value = json(&out.get_output().stdout);
    assert_eq!(value["command"], "providers");

    let log = dir.read_file("mcat.log").expect("log file written");
    let events: Vec<serde_json::Value> = log
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("JSON log line"))
        .collect();
    assert!(
        events
            .iter()
            .any(|e| e["fields"]["message"] == "Catalog loaded"),
        "events: {events:#?}"
    );
}

#[test]
fn env_log_level_is_honoured() {
    let dir = catalog_dir();
    let log_path = dir.file_path("debug.log");
    mcat(&dir)
        .env("MCAT_LOG", "debug")
        .env("MCAT_LOG_FILE", &log_path)
        .args(["models", "-p", "openai"])
        .assert()
        .success();

    let log = dir.read_file("debug.log").expect("log file written");
    assert!(log.contains("Dispatching") || log.contains("Catalog loaded"));
}
