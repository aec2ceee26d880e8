use assert_cmd::Command;
use mcat::test_utils::{TestDir, make_test_catalog_json};

/// Environment variables that could leak host settings into a run.
const HOST_ENV: &[&str] = &[
    "CATWALK_URL",
    "MCAT_CATALOG_FILE",
    "MCAT_FORMAT",
    "MCAT_TIMEOUT",
    "MCAT_PRETTY",
    "MCAT_NO_COLOR",
    "MCAT_LOG",
    "MCAT_LOG_FORMAT",
    "MCAT_LOG_FILE",
    "RUST_LOG",
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
];

/// A temp directory holding `catalog.json` with the two-provider fixture.
pub fn catalog_dir() -> TestDir {
    let dir = TestDir::new();
    dir.create_file("catalog.json", &make_test_catalog_json());
    dir
}

/// `mcat` isolated from the host: no config file, no cache, no color, and
/// the catalog read from `dir/catalog.json`.
#[allow(deprecated)]
pub fn mcat(dir: &TestDir) -> Command {
    let mut cmd = Command::cargo_bin("mcat").expect("mcat binary");
    for key in HOST_ENV {
        cmd.env_remove(key);
    }
    cmd.env("MCAT_CONFIG", dir.file_path("config.toml"))
        .env("XDG_CACHE_HOME", dir.file_path("cache"))
        .env("NO_COLOR", "1")
        .arg("--catalog-file")
        .arg(dir.file_path("catalog.json"));
    cmd
}

/// Parse stdout (or stderr) bytes as JSON.
pub fn json(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap_or_else(|e| {
        panic!(
            "invalid JSON ({e}):\n{}",
            String::from_utf8_lossy(bytes)
        )
    })
}
