use kb_deploy::load_config::{load_config, SettingsFile};
use kb_deploy_core::config::DeployConfig;
use std::fs::write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_full_file_overrides_defaults() {
    let yaml = r#"
environments_dir: infra/environments
data_dir: ./documents
poll_interval_secs: 10
settle_delay_secs: 0
description: Nightly ingestion
"#;
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();

    let mut config = DeployConfig::default();
    load_config(file.path())
        .expect("Config should load")
        .apply(&mut config);

    assert_eq!(config.environments_dir, PathBuf::from("infra/environments"));
    assert_eq!(config.data_dir, PathBuf::from("./documents"));
    assert_eq!(config.poll_interval, Duration::from_secs(10));
    assert_eq!(config.settle_delay, Duration::ZERO);
    assert_eq!(config.job_description, "Nightly ingestion");
}

#[test]
fn test_load_config_partial_file_keeps_other_defaults() {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), "data_dir: /srv/resumes\n").unwrap();

    let settings = load_config(file.path()).expect("Config should load");
    assert_eq!(
        settings,
        SettingsFile {
            data_dir: Some(PathBuf::from("/srv/resumes")),
            ..SettingsFile::default()
        }
    );

    let mut config = DeployConfig::default();
    settings.apply(&mut config);
    assert_eq!(config.data_dir, PathBuf::from("/srv/resumes"));
    assert_eq!(config.poll_interval, Duration::from_secs(30));
    assert_eq!(config.job_description, "First Ingestion");
}

#[test]
fn test_load_config_errors_for_invalid_file() {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), b"not-yaml: [:::").unwrap();

    let msg = load_config(file.path()).unwrap_err().to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
fn test_load_config_rejects_unknown_keys() {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), "poll_every: 5\n").unwrap();

    let msg = load_config(file.path()).unwrap_err().to_string();
    assert!(msg.contains("parse"), "Parse error expected, got: {msg}");
}

#[test]
fn test_load_config_errors_for_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let msg = load_config(dir.path().join("absent.yaml"))
        .unwrap_err()
        .to_string();
    assert!(msg.contains("read"), "Read error expected, got: {msg}");
}
