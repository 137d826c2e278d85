//! Loading must fail fast on missing or malformed configuration files.

use std::fs;

use pfserver_config::{ConfigError, HeaderMode, ServerConfig};
use rstest::rstest;
use tempfile::TempDir;

#[test]
fn missing_file_reports_read_error() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("server_config.json");

    let error = ServerConfig::load_from_path(&path).expect_err("loading must fail");
    assert!(matches!(error, ConfigError::Read { .. }), "got {error:?}");
    assert!(error.to_string().contains("server_config.json"));
}

#[rstest]
#[case::not_json("doc_root = '/srv'")]
#[case::wrong_type(r#"{"doc_root": "/srv", "port": "eighty", "excluded_files": [], "header_image": false, "header_text": "", "header_image_file": ""}"#)]
#[case::port_overflow(r#"{"doc_root": "/srv", "port": 70000, "excluded_files": [], "header_image": false, "header_text": "", "header_image_file": ""}"#)]
fn malformed_file_reports_parse_error(#[case] content: &str) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("server_config.json");
    fs::write(&path, content).expect("write config");

    let error = ServerConfig::load_from_path(&path).expect_err("loading must fail");
    assert!(matches!(error, ConfigError::Parse { .. }), "got {error:?}");
}

#[test]
fn zero_port_is_rejected_after_parsing() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("server_config.json");
    fs::write(
        &path,
        r#"{"doc_root": "/srv", "port": 0, "excluded_files": [], "header_image": false, "header_text": "", "header_image_file": ""}"#,
    )
    .expect("write config");

    let error = ServerConfig::load_from_path(&path).expect_err("loading must fail");
    assert!(matches!(error, ConfigError::InvalidPort { port: 0 }));
}

#[test]
fn relative_doc_root_becomes_absolute() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("server_config.json");
    fs::write(
        &path,
        r#"{
            "doc_root": "public",
            "port": 8000,
            "excluded_files": ["secret.cfg"],
            "header_image": false,
            "header_text": "Downloads",
            "header_image_file": "logo.png",
            "log_filter": "debug"
        }"#,
    )
    .expect("write config");

    let config = ServerConfig::load_from_path(&path).expect("config should load");
    assert!(config.doc_root.is_absolute());
    assert!(config.doc_root.ends_with("public"));
    assert_eq!(config.header_mode, HeaderMode::Text);
    assert_eq!(config.header_text, "Downloads");
    assert_eq!(config.log_filter, "debug");
    assert!(config.is_excluded("secret.cfg"));
}
