use serde::Deserialize;
use toolx_kernel::config::load_config;

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    url: String,
}

#[derive(Debug, Deserialize)]
struct AppConfig {
    port: u16,
    database: DatabaseSection,
}

#[test]
fn loads_layered_file_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "port = 8080\n\n[database]\nurl = \"sqlite://app.db\"\n")
        .expect("write config");

    let cfg: AppConfig = load_config(Some(&path)).expect("load config");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.database.url, "sqlite://app.db");
}

#[test]
fn missing_file_surfaces_a_context_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_config::<AppConfig>(Some(dir.path().join("absent")))
        .expect_err("missing file");
    assert!(err.to_string().contains("Failed to build config"), "unexpected error: {err}");
}
