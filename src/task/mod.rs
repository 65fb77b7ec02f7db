pub mod dependency;
pub mod payload;

pub use dependency::{DependencyLevels, find_cycles};
pub use payload::{PipelineSpec, RunStatus, merge};

use serde::{Deserialize, Deserializer, Serialize};

use crate::status::Status;

/// A task as declared in a pipeline specification, keyed by name in
/// [`PipelineSpec::tasks`].
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct TaskSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct StepSpec {
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
}

/// A task of a concrete run: the spec's structure merged with its execution
/// status.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub log_file: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Payloads use `null` and "missing" interchangeably.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn null_and_missing_fields_default() {
        let spec: TaskSpec =
            serde_json::from_str(r#"{"dependencies": null, "description": null}"#).unwrap();
        assert_eq!(spec, TaskSpec::default());

        let spec: TaskSpec = serde_json::from_str("{}").unwrap();
        assert!(spec.dependencies.is_empty());
    }

    #[test]
    fn step_uses_payload_field_names() {
        let step: Step = serde_json::from_str(
            r#"{"name": "unit", "status": "Success", "time": 12, "logFile": "u.log", "type": "shell"}"#,
        )
        .unwrap();

        assert_eq!(step.status, Some(Status::Success));
        assert_eq!(step.time, 12.0);
        assert_eq!(step.log_file, "u.log");
        assert_eq!(step.kind, "shell");
    }

    #[test]
    fn step_without_time_yet() {
        let step: Step =
            serde_json::from_str(r#"{"name": "deploy", "status": "NotExecuted", "time": null}"#).unwrap();
        assert_eq!(step.time, 0.0);
        assert_eq!(step.status, Some(Status::NotExecuted));
    }
}
