use std::path::PathBuf;

use kb_deploy_core::contract::{CommandOutput, Invocation, MockCommandRunner};
use kb_deploy_core::outputs::OutputReader;
use kb_deploy_core::DeployError;

const OUTPUTS_JSON: &str = r#"{
  "knowledge_base_id": {"sensitive": false, "type": "string", "value": "KB123"},
  "data_source_id": {"sensitive": false, "type": "string", "value": "DS456"},
  "resume_bucket_name": {"sensitive": false, "type": "string", "value": "resumes-dev"}
}"#;

fn ok_output(stdout: &str) -> CommandOutput {
    CommandOutput {
        status: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

#[test]
fn runs_terraform_output_json_in_environment_directory() {
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .withf(|inv: &Invocation| {
            inv.program == "terraform"
                && inv.args == ["output", "-json"]
                && inv.working_dir == PathBuf::from("environments/dev")
        })
        .times(1)
        .returning(|_| Ok(ok_output(OUTPUTS_JSON)));

    let reader = OutputReader::new(runner, "terraform", "environments");
    let outputs = reader.read("dev").expect("outputs should parse");

    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs.require_text("knowledge_base_id").unwrap(), "KB123");
    assert_eq!(outputs.require_text("resume_bucket_name").unwrap(), "resumes-dev");
}

#[test]
fn non_zero_exit_is_tool_invocation_error_with_stderr() {
    let cwd_before = std::env::current_dir().unwrap();
    let mut runner = MockCommandRunner::new();
    runner.expect_run().returning(|_| {
        Ok(CommandOutput {
            status: Some(1),
            stdout: String::new(),
            stderr: "Error: No outputs found".to_string(),
        })
    });

    let reader = OutputReader::new(runner, "terraform", "environments");
    let err = reader.read("staging").unwrap_err();

    match err {
        DeployError::ToolInvocation {
            status,
            stderr,
            working_dir,
            ..
        } => {
            assert_eq!(status, Some(1));
            assert_eq!(stderr, "Error: No outputs found");
            assert_eq!(working_dir, PathBuf::from("environments/staging"));
        }
        other => panic!("expected ToolInvocation, got {other:?}"),
    }
    assert_eq!(std::env::current_dir().unwrap(), cwd_before);
}

#[test]
fn spawn_failure_is_tool_invocation_error_without_status() {
    let mut runner = MockCommandRunner::new();
    runner.expect_run().returning(|_| {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "No such file or directory",
        ))
    });

    let reader = OutputReader::new(runner, "terraform", "environments");
    let err = reader.read("dev").unwrap_err();
    assert!(
        matches!(err, DeployError::ToolInvocation { status: None, .. }),
        "got {err:?}"
    );
}

#[test]
fn malformed_output_is_parse_error() {
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .returning(|_| Ok(ok_output("Warning: no outputs\n")));

    let reader = OutputReader::new(runner, "terraform", "environments");
    let err = reader.read("dev").unwrap_err();
    assert!(matches!(err, DeployError::OutputParse { .. }), "got {err:?}");
}

#[cfg(unix)]
mod with_real_process {
    use super::*;
    use kb_deploy_core::contract::ProcessRunner;
    use serial_test::serial;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    /// Fake terraform that prints `outputs.json` from its working directory.
    fn write_fake_terraform(dir: &Path) -> PathBuf {
        let script = dir.join("terraform");
        fs::write(
            &script,
            "#!/bin/sh\nif [ ! -f outputs.json ]; then echo 'No state' >&2; exit 1; fi\ncat outputs.json\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[test]
    #[serial]
    fn reads_from_environment_dir_and_is_repeatable() {
        let root = tempfile::tempdir().unwrap();
        let env_dir = root.path().join("environments").join("dev");
        fs::create_dir_all(&env_dir).unwrap();
        fs::write(env_dir.join("outputs.json"), OUTPUTS_JSON).unwrap();
        let script = write_fake_terraform(root.path());

        let cwd_before = std::env::current_dir().unwrap();
        let reader = OutputReader::new(
            ProcessRunner,
            script.to_string_lossy(),
            root.path().join("environments"),
        );

        let first = reader.read("dev").expect("first read");
        let second = reader.read("dev").expect("second read");

        assert_eq!(first, second);
        assert_eq!(first.require_text("data_source_id").unwrap(), "DS456");
        assert_eq!(std::env::current_dir().unwrap(), cwd_before);
    }

    #[test]
    #[serial]
    fn environment_without_state_fails_and_keeps_cwd() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("environments").join("prod")).unwrap();
        let script = write_fake_terraform(root.path());

        let cwd_before = std::env::current_dir().unwrap();
        let reader = OutputReader::new(
            ProcessRunner,
            script.to_string_lossy(),
            root.path().join("environments"),
        );

        let err = reader.read("prod").unwrap_err();
        match err {
            DeployError::ToolInvocation { status, stderr, .. } => {
                assert_eq!(status, Some(1));
                assert!(stderr.contains("No state"), "stderr: {stderr}");
            }
            other => panic!("expected ToolInvocation, got {other:?}"),
        }
        assert_eq!(std::env::current_dir().unwrap(), cwd_before);
    }

    #[test]
    #[serial]
    fn missing_environment_directory_fails_and_keeps_cwd() {
        let root = tempfile::tempdir().unwrap();
        let script = write_fake_terraform(root.path());

        let cwd_before = std::env::current_dir().unwrap();
        let reader = OutputReader::new(
            ProcessRunner,
            script.to_string_lossy(),
            root.path().join("environments"),
        );

        let err = reader.read("nowhere").unwrap_err();
        assert!(
            matches!(err, DeployError::ToolInvocation { status: None, .. }),
            "got {err:?}"
        );
        assert_eq!(std::env::current_dir().unwrap(), cwd_before);
    }
}
