//! Pipeline domain types
//!
//! The compiled artifact handed to a scheduler. Structure only: the compiler
//! fills it in, the scheduler crate renders it into the cluster's document
//! format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fully-specified onboarding pipeline
///
/// Working steps run strictly in order and the pipeline stops at the first
/// failing step. The terminal step runs only after every working step
/// succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Prefix the scheduler extends into a unique workload name
    pub generated_name_prefix: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub steps: Vec<PipelineStep>,
    pub terminal_step: PipelineStep,
    pub shared_volumes: Vec<VolumeDeclaration>,
    pub host_aliases: Vec<HostAlias>,
    pub restart_policy: RestartPolicy,
    pub node_selector: BTreeMap<String, String>,
    pub service_account: String,
}

impl PipelineSpec {
    /// Looks up a working step by name
    pub fn step(&self, name: &str) -> Option<&PipelineStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Working steps followed by the terminal step
    pub fn all_steps(&self) -> impl Iterator<Item = &PipelineStep> {
        self.steps.iter().chain(std::iter::once(&self.terminal_step))
    }
}

/// One container in the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub working_dir: Option<String>,
    pub volume_mounts: Vec<VolumeMount>,
    /// Credential bundle exposed to the step as environment variables
    pub secret_env_source: Option<String>,
}

impl PipelineStep {
    pub fn mounts(&self, volume: &str) -> Option<&VolumeMount> {
        self.volume_mounts.iter().find(|m| m.volume == volume)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    pub volume: String,
    pub mount_path: String,
    pub read_only: bool,
}

/// Volume made available to the steps of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDeclaration {
    pub name: String,
    pub source: VolumeSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeSource {
    /// Empty at start, discarded with the run
    EmptyDir,
    /// Provisioned outside this system
    ConfigMap { name: String },
}

/// Static hostname override for the pipeline's containers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAlias {
    pub ip: String,
    pub hostnames: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartPolicy {
    OnFailure,
    Never,
}

impl RestartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartPolicy::OnFailure => "OnFailure",
            RestartPolicy::Never => "Never",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OnFailure" => Some(RestartPolicy::OnFailure),
            "Never" => Some(RestartPolicy::Never),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str) -> PipelineStep {
        PipelineStep {
            name: name.to_string(),
            image: "busybox".to_string(),
            command: vec!["echo".to_string()],
            args: vec![],
            working_dir: None,
            volume_mounts: vec![VolumeMount {
                volume: "repo".to_string(),
                mount_path: "/workspace".to_string(),
                read_only: false,
            }],
            secret_env_source: None,
        }
    }

    #[test]
    fn test_all_steps_ends_with_terminal() {
        let spec = PipelineSpec {
            generated_name_prefix: "p-".to_string(),
            namespace: "ns".to_string(),
            labels: BTreeMap::new(),
            steps: vec![step("a"), step("b")],
            terminal_step: step("done"),
            shared_volumes: vec![],
            host_aliases: vec![],
            restart_policy: RestartPolicy::OnFailure,
            node_selector: BTreeMap::new(),
            service_account: "sa".to_string(),
        };

        let names: Vec<_> = spec.all_steps().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "done"]);
        assert!(spec.step("b").is_some());
        assert!(spec.step("done").is_none());
        assert!(spec.steps[0].mounts("repo").is_some());
        assert!(spec.steps[0].mounts("certs").is_none());
    }

    #[test]
    fn test_restart_policy_strings() {
        for policy in [RestartPolicy::OnFailure, RestartPolicy::Never] {
            assert_eq!(RestartPolicy::parse(policy.as_str()), Some(policy));
        }
        assert_eq!(RestartPolicy::parse("Always"), None);
    }
}
