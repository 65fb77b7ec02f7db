//! The JSON boundary: pipeline specifications and run-status payloads as
//! served by the API, and the merge that turns the pair into verbose
//! [`Task`] records.

use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use super::{Step, StepSpec, Task, TaskSpec, null_as_default};
use crate::{error::Result, status::Status};

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct PipelineSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: IndexMap<String, TaskSpec>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct RunStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: IndexMap<String, TaskStatus>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct TaskStatus {
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: IndexMap<String, StepStatus>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub log_file: String,
}

impl PipelineSpec {
    /// Parses a pipeline spec, either bare or wrapped in an API response
    /// carrying it as a JSON string under `spec`.
    pub fn from_json(contents: &str) -> Result<Self> {
        parse_wrapped(contents, "spec")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl RunStatus {
    /// Parses a run-status payload, either bare or wrapped under `runInfo`.
    pub fn from_json(contents: &str) -> Result<Self> {
        parse_wrapped(contents, "runInfo")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

fn parse_wrapped<T: DeserializeOwned>(contents: &str, wrapper_key: &str) -> Result<T> {
    let value: Value = serde_json::from_str(contents)?;
    from_value_wrapped(value, wrapper_key)
}

pub(crate) fn from_value_wrapped<T: DeserializeOwned>(value: Value, wrapper_key: &str) -> Result<T> {
    match value.get(wrapper_key) {
        Some(Value::String(inner)) => Ok(serde_json::from_str(inner)?),
        Some(inner @ Value::Object(_)) => Ok(serde_json::from_value(inner.clone())?),
        _ => Ok(serde_json::from_value(value)?),
    }
}

/// Merges a spec with the status of one of its runs into verbose tasks.
///
/// The spec decides which tasks and steps exist and in what order. Spec steps
/// without a status entry get a placeholder with no status; status-only steps
/// are appended after the spec steps. Status-only tasks are dropped.
pub fn merge(spec: &PipelineSpec, run: &RunStatus) -> Vec<Task> {
    for name in run.tasks.keys() {
        if !spec.tasks.contains_key(name) {
            warn!("Task '{}' has run status but is not in the pipeline spec, dropping", name);
        }
    }

    spec.tasks
        .iter()
        .map(|(name, task_spec)| merge_task(name, task_spec, run.tasks.get(name)))
        .collect()
}

fn merge_task(name: &str, spec: &TaskSpec, status: Option<&TaskStatus>) -> Task {
    let mut steps: Vec<Step> = spec
        .steps
        .iter()
        .map(|step| merge_step(step, status.and_then(|s| s.steps.get(&step.name))))
        .collect();

    if let Some(status) = status {
        for (step_name, step_status) in &status.steps {
            if spec.steps.iter().any(|s| &s.name == step_name) {
                continue;
            }
            debug!(
                "Step '{}' of task '{}' only present in run status, appending",
                step_name, name
            );
            steps.push(Step {
                name: step_name.clone(),
                status: step_status.status.clone(),
                time: step_status.time,
                log_file: step_status.log_file.clone(),
                kind: String::new(),
            });
        }
    }

    Task {
        name: name.to_string(),
        dependencies: spec.dependencies.clone(),
        description: spec.description.clone(),
        status: status.and_then(|s| s.status.clone()),
        steps,
    }
}

fn merge_step(spec: &StepSpec, status: Option<&StepStatus>) -> Step {
    match status {
        Some(status) => Step {
            name: spec.name.clone(),
            status: status.status.clone(),
            time: status.time,
            log_file: status.log_file.clone(),
            kind: spec.kind.clone(),
        },
        None => Step {
            name: spec.name.clone(),
            kind: spec.kind.clone(),
            ..Step::default()
        },
    }
}
