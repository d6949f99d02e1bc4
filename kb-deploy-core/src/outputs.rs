//! Output Reader: fetches `terraform output -json` for one environment.
//!
//! The command runs with its working directory set to `<environments_dir>/<env>`; the
//! current process never changes directory, so there is nothing to restore on any exit
//! path. Failures are fatal to the calling script and are never retried.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{environment_dir, DeployConfig};
use crate::contract::{CommandRunner, Invocation, ProcessRunner};
use crate::error::{DeployError, Result};

/// One entry of `terraform output -json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputValue {
    pub value: serde_json::Value,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<serde_json::Value>,
    #[serde(default)]
    pub sensitive: bool,
}

impl OutputValue {
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self {
            value: value.into(),
            value_type: None,
            sensitive: false,
        }
    }

    /// Plain text for string outputs, compact JSON for anything else.
    pub fn as_text(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// All outputs of an environment, keyed by output name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputSet {
    outputs: BTreeMap<String, OutputValue>,
}

impl OutputSet {
    pub fn from_json(command: &str, raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|source| DeployError::OutputParse {
            command: command.to_string(),
            source,
        })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: OutputValue) {
        self.outputs.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&OutputValue> {
        self.outputs.get(key)
    }

    pub fn require(&self, key: &str) -> Result<&OutputValue> {
        self.outputs
            .get(key)
            .ok_or_else(|| DeployError::MissingOutputKey {
                key: key.to_string(),
            })
    }

    /// [`OutputSet::require`] rendered with [`OutputValue::as_text`].
    pub fn require_text(&self, key: &str) -> Result<String> {
        self.require(key).map(OutputValue::as_text)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for OutputSet
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            outputs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), OutputValue::new(v)))
                .collect(),
        }
    }
}

/// Reads Terraform outputs through a [`CommandRunner`].
pub struct OutputReader<R> {
    runner: R,
    terraform_bin: String,
    environments_dir: PathBuf,
}

impl OutputReader<ProcessRunner> {
    pub fn from_config(config: &DeployConfig) -> Self {
        Self::new(
            ProcessRunner,
            config.terraform_bin.clone(),
            config.environments_dir.clone(),
        )
    }
}

impl<R: CommandRunner> OutputReader<R> {
    pub fn new(runner: R, terraform_bin: impl Into<String>, environments_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            terraform_bin: terraform_bin.into(),
            environments_dir: environments_dir.into(),
        }
    }

    pub fn invocation(&self, environment: &str) -> Invocation {
        Invocation {
            program: self.terraform_bin.clone(),
            args: vec!["output".to_string(), "-json".to_string()],
            working_dir: environment_dir(&self.environments_dir, environment),
        }
    }

    pub fn read(&self, environment: &str) -> Result<OutputSet> {
        let invocation = self.invocation(environment);
        let command = invocation.command_line();
        info!(
            environment,
            working_dir = %invocation.working_dir.display(),
            "Reading infrastructure outputs"
        );

        let output = match self.runner.run(&invocation) {
            Ok(output) => output,
            Err(e) => {
                error!(error = %e, command = %command, working_dir = %invocation.working_dir.display(), "Could not run infrastructure tool");
                return Err(DeployError::ToolInvocation {
                    command,
                    working_dir: invocation.working_dir,
                    status: None,
                    stderr: e.to_string(),
                });
            }
        };

        if !output.success() {
            error!(
                command = %command,
                working_dir = %invocation.working_dir.display(),
                status = ?output.status,
                stderr = %output.stderr.trim_end(),
                "Infrastructure tool exited with an error"
            );
            return Err(DeployError::ToolInvocation {
                command,
                working_dir: invocation.working_dir,
                status: output.status,
                stderr: output.stderr,
            });
        }

        let outputs = OutputSet::from_json(&command, &output.stdout).map_err(|e| {
            error!(error = %e, command = %command, "Error parsing infrastructure output as JSON");
            e
        })?;
        debug!(keys = ?outputs.keys().collect::<Vec<_>>(), "Infrastructure outputs loaded");
        info!(environment, count = outputs.len(), "Read infrastructure outputs");
        Ok(outputs)
    }
}
