//! End-to-end tests for the `mcat` binary against a catalog file.
//!
//! Covers:
//! - Listing providers and models in every output format
//! - Model lookup, export, and not-found exit codes
//! - Search, comparison, and cost estimation
//! - The select wizard driven through a pipe
//! - Errors in human and robot mode

mod common;

use common::fixtures::{catalog_dir, json, mcat};
use predicates::prelude::*;

// =============================================================================
// providers / models
// =============================================================================

#[test]
fn providers_json_is_sorted_by_name() {
    let dir = catalog_dir();
    let out = mcat(&dir).args(["providers", "--json"]).assert().success();
    let value = json(&out.get_output().stdout);

    assert_eq!(value["schemaVersion"], "mcat.v1");
    assert_eq!(value["command"], "providers");
    let names: Vec<&str> = value["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Anthropic", "OpenAI"]);
    assert_eq!(value["meta"]["catalog"]["origin"], "source");
}

#[test]
fn providers_type_filter_in_human_mode() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["providers", "--type", "ANTHROPIC"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Providers (1)"))
        .stdout(predicate::str::contains("api.anthropic.com"))
        .stdout(predicate::str::contains("api.openai.com").not())
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn models_csv_has_header_and_rows() {
    let dir = catalog_dir();
    let out = mcat(&dir)
        .args(["models", "--provider", "openai", "--format", "csv"])
        .assert()
        .success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let mut lines = stdout.lines();
    assert!(lines.next().unwrap().starts_with("id,name,provider,"));
    assert_eq!(lines.filter(|l| !l.is_empty()).count(), 2);
}

#[test]
fn models_vision_filter_in_markdown() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["models", "-p", "anthropic", "--vision", "--format", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("claude-sonnet-4"))
        .stdout(predicate::str::contains("claude-haiku-3-5").not());
}

#[test]
fn unknown_provider_exits_not_found() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["models", "--provider", "nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error [MCAT-L002]"))
        .stderr(predicate::str::contains("Fix:"));
}

// =============================================================================
// info
// =============================================================================

#[test]
fn info_resolves_display_name() {
    let dir = catalog_dir();
    let out = mcat(&dir)
        .args(["info", "GPT-4o mini", "--json"])
        .assert()
        .success();
    let value = json(&out.get_output().stdout);
    assert_eq!(value["data"]["id"], "gpt-4o-mini");
    assert_eq!(value["data"]["providerId"], "openai");
}

#[test]
fn info_export_is_bare_document() {
    let dir = catalog_dir();
    let out = mcat(&dir)
        .args(["info", "claude-sonnet-4", "--export"])
        .assert()
        .success();
    let value = json(&out.get_output().stdout);
    assert!(value.get("schemaVersion").is_none());
    assert_eq!(value["model"]["id"], "claude-sonnet-4");
    assert_eq!(value["api_config"]["endpoint"], "https://api.anthropic.com/v1");
}

#[test]
fn info_unknown_model_in_json_mode() {
    let dir = catalog_dir();
    let out = mcat(&dir).args(["info", "gpt-9", "--json"]).assert().code(2);
    let value = json(&out.get_output().stderr);
    assert_eq!(value["errorDetails"]["code"], "MCAT-L001");
    assert_eq!(value["data"], serde_json::Value::Null);
}

#[test]
fn info_rejects_csv() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["info", "gpt-4o", "--format", "csv"])
        .assert()
        .code(3);
}

// =============================================================================
// find
// =============================================================================

#[test]
fn find_reasoning_returns_only_reasoners() {
    let dir = catalog_dir();
    let out = mcat(&dir)
        .args(["find", "--reasoning", "--json"])
        .assert()
        .success();
    let value = json(&out.get_output().stdout);
    assert_eq!(value["data"]["totalMatches"], 1);
    assert_eq!(value["data"]["results"][0]["modelId"], "claude-sonnet-4");
    assert_eq!(value["data"]["results"][0]["rank"], 1);
}

#[test]
fn find_limit_caps_results_but_not_total() {
    let dir = catalog_dir();
    let out = mcat(&dir)
        .args(["find", "--limit", "2", "--json"])
        .assert()
        .success();
    let value = json(&out.get_output().stdout);
    assert_eq!(value["data"]["totalMatches"], 4);
    assert_eq!(value["data"]["results"].as_array().unwrap().len(), 2);
}

#[test]
fn find_compare_reports_missing_models() {
    let dir = catalog_dir();
    let out = mcat(&dir)
        .args(["find", "--compare", "gpt-4o,ghost", "--json"])
        .assert()
        .success();
    let value = json(&out.get_output().stdout);
    assert_eq!(value["data"]["models"][0]["id"], "gpt-4o");
    assert_eq!(value["errors"][0], "model not found: ghost");
}

#[test]
fn find_compare_warns_about_missing_models_outside_json() {
    let dir = catalog_dir();
    for format in ["csv", "md", "human"] {
        mcat(&dir)
            .env("MCAT_LOG", "error")
            .args(["find", "--compare", "gpt-4o,ghost", "--format", format])
            .assert()
            .success()
            .stdout(predicate::str::contains("ghost").not())
            .stderr(predicate::str::contains("Warning: model not found: ghost"));
    }
}

#[test]
fn find_interactive_scripted_through_stdin() {
    let dir = catalog_dir();
    // Cost ceiling $3, at least 150K context, then results and finish.
    let out = mcat(&dir)
        .args(["find", "--interactive", "--json"])
        .write_stdin("3\n150\n\n\n")
        .assert()
        .success();
    let value = json(&out.get_output().stdout);
    assert_eq!(value["command"], "find");
    assert_eq!(value["data"]["requirements"]["minContext"], 150_000);
    assert_eq!(value["data"]["totalMatches"], 2);
    assert_eq!(value["data"]["results"][0]["modelId"], "claude-sonnet-4");
    assert_eq!(value["data"]["results"][1]["modelId"], "claude-haiku-3-5");

    let prompts = String::from_utf8(out.get_output().stderr.clone()).unwrap();
    assert!(prompts.contains("Filtered to 4 models"));
    assert!(prompts.contains("Filtered to 2 models"));
}

#[test]
fn find_interactive_retries_and_cancels() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["find", "--interactive"])
        .write_stdin("cheap\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Please enter a non-negative number."))
        .stdout(predicate::str::contains("Search cancelled."));
}

#[test]
fn find_interactive_rejects_csv() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["find", "--interactive", "--format", "csv"])
        .assert()
        .code(3);
}

// =============================================================================
// cost
// =============================================================================

#[test]
fn cost_single_matches_worked_example() {
    let dir = catalog_dir();
    let out = mcat(&dir)
        .args([
            "cost", "--model", "gpt-4o", "--input", "1000", "--output", "500", "--cached", "0.5",
            "--json",
        ])
        .assert()
        .success();
    let value = json(&out.get_output().stdout);
    let result = &value["data"]["results"][0];
    assert!((result["inputCost"].as_f64().unwrap() - 0.001_875).abs() < 1e-12);
    assert!((result["outputCost"].as_f64().unwrap() - 0.005).abs() < 1e-12);
    assert!((result["totalCost"].as_f64().unwrap() - 0.006_875).abs() < 1e-12);
}

#[test]
fn cost_human_shows_breakdown() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["cost", "-m", "gpt-4o", "-i", "1000", "-o", "500", "--cached", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cost estimate: GPT-4o"))
        .stdout(predicate::str::contains("$0.006875"));
}

#[test]
fn cost_batch_warns_about_skipped_entries() {
    let dir = catalog_dir();
    dir.create_file(
        "batch.json",
        r#"[{"model": "gpt-4o-mini", "input_tokens": 10000, "output_tokens": 2000},
            {"model": "ghost", "input_tokens": 1, "output_tokens": 1}]"#,
    );
    mcat(&dir)
        .args(["cost", "--batch"])
        .arg(dir.file_path("batch.json"))
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gpt-4o-mini").or(predicate::str::contains("GPT-4o mini")))
        .stderr(predicate::str::contains("entry 2: model not found: ghost"))
        .stderr(predicate::str::contains("Skipping scenario").not());
}

#[test]
fn cost_rejects_cached_ratio_above_one() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["cost", "-m", "gpt-4o", "-i", "10", "-o", "10", "--cached", "1.5"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("MCAT-I"));
}

#[test]
fn cost_requires_a_model() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["cost", "--input", "10", "--output", "10"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--model"));
}

#[test]
fn cost_unknown_model_is_not_found() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["cost", "-m", "ghost", "-i", "10", "-o", "10"])
        .assert()
        .code(2);
}

// =============================================================================
// select
// =============================================================================

#[test]
fn select_scripted_through_stdin() {
    let dir = catalog_dir();
    // Any cost, any context, reasoning yes, vision no, then finish.
    let out = mcat(&dir)
        .args(["select", "--json"])
        .write_stdin("6\n1\n1\n2\n\n")
        .assert()
        .success();
    let value = json(&out.get_output().stdout);
    assert_eq!(value["command"], "select");
    assert_eq!(value["data"]["requirements"]["reasoning"], true);
    assert_eq!(value["data"]["totalMatches"], 4);
    assert_eq!(value["data"]["results"][0]["modelId"], "claude-sonnet-4");

    let prompts = String::from_utf8(out.get_output().stderr.clone()).unwrap();
    assert!(prompts.contains("What's your budget?"));
}

#[test]
fn select_retries_invalid_answers_and_cancels() {
    let dir = catalog_dir();
    mcat(&dir)
        .arg("select")
        .write_stdin("9\nabc\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Please enter a number between 1 and 6."))
        .stdout(predicate::str::contains("Selection cancelled."));
}

#[test]
fn select_rejects_markdown() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["select", "--format", "md"])
        .assert()
        .code(3);
}

// =============================================================================
// config, completions, catalog errors
// =============================================================================

#[test]
fn config_does_not_need_a_catalog() {
    let dir = catalog_dir();
    std::fs::remove_file(dir.file_path("catalog.json")).unwrap();
    let out = mcat(&dir).args(["config", "--json"]).assert().success();
    let value = json(&out.get_output().stdout);
    assert_eq!(value["data"]["configExists"], false);
    let keys: Vec<&str> = value["data"]["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["key"].as_str().unwrap())
        .collect();
    assert!(keys.contains(&"catalog.file"));
}

#[test]
fn config_file_settings_are_applied() {
    let dir = catalog_dir();
    dir.create_file("config.toml", "[output]\nformat = \"json\"\n");
    let out = mcat(&dir).arg("providers").assert().success();
    let value = json(&out.get_output().stdout);
    assert_eq!(value["command"], "providers");
}

#[test]
fn malformed_config_is_input_error() {
    let dir = catalog_dir();
    dir.create_file("config.toml", "[output\nformat = ");
    mcat(&dir).arg("providers").assert().code(3);
}

#[test]
fn completions_need_no_catalog() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mcat"));
}

#[test]
fn missing_catalog_file_is_network_error() {
    let dir = catalog_dir();
    std::fs::remove_file(dir.file_path("catalog.json")).unwrap();
    mcat(&dir)
        .arg("providers")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("MCAT-N"));
}

#[test]
fn chat_is_human_only() {
    let dir = catalog_dir();
    let out = mcat(&dir)
        .args(["chat", "--provider", "openai", "--json"])
        .assert()
        .code(3);
    let value = json(&out.get_output().stderr);
    assert_eq!(value["command"], "chat");
}

#[test]
fn chat_without_key_fails_before_prompting() {
    let dir = catalog_dir();
    mcat(&dir)
        .args(["chat", "--provider", "openai"])
        .write_stdin("hello\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn unknown_subcommand_is_rejected() {
    let dir = catalog_dir();
    mcat(&dir)
        .arg("notacommand")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized").or(predicate::str::contains("error")));
}
