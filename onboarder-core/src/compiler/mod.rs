//! Pipeline Template Compiler
//!
//! Maps a validated [`OnboardingRequest`] into a [`PipelineSpec`]: step
//! ordering, working directories, volume wiring, credential injection and
//! restart policy. Compilation is pure and total over validated requests;
//! the only fallible part is accepting the static configuration.

pub mod templates;

use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::domain::pipeline::{
    PipelineSpec, PipelineStep, RestartPolicy, VolumeDeclaration, VolumeMount, VolumeSource,
};
use crate::domain::request::OnboardingRequest;
use templates::{
    Arg, Field, Identity, Mounts, STEP_TEMPLATES, StepTemplate, TEMPLATE_VERSION, TERMINAL_STEP,
    TRUST_VOLUME, Tool, WORKSPACE_VOLUME, WorkDir,
};

pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const PROJECT_LABEL: &str = "onboarder/project";
pub const TEMPLATE_VERSION_LABEL: &str = "onboarder/template-version";

/// Compiler error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    #[error("invalid pipeline configuration `{setting}`: {reason}")]
    InvalidConfig {
        setting: &'static str,
        reason: String,
    },
}

impl CompilationError {
    pub(crate) fn invalid(setting: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            setting,
            reason: reason.into(),
        }
    }
}

/// Compiles onboarding requests against one deployment's configuration
///
/// Holds no mutable state; a single instance can be shared across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct PipelineCompiler {
    config: PipelineConfig,
}

impl PipelineCompiler {
    /// Creates a compiler, rejecting configuration it cannot compile against
    pub fn new(config: PipelineConfig) -> Result<Self, CompilationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compiles a request into a pipeline
    ///
    /// The output is a function of the request and configuration only.
    /// The generated name is a prefix; the scheduler makes it unique.
    pub fn compile(&self, request: &OnboardingRequest) -> PipelineSpec {
        let branch = request.branch_name();

        let steps = STEP_TEMPLATES
            .iter()
            .map(|template| self.render_step(template, request, &branch))
            .collect();

        PipelineSpec {
            generated_name_prefix: format!("{}-", request.name),
            namespace: self.config.namespace.clone(),
            labels: self.labels(request),
            steps,
            terminal_step: self.terminal_step(),
            shared_volumes: self.volumes(),
            host_aliases: self.config.git_host_alias.iter().cloned().collect(),
            restart_policy: RestartPolicy::OnFailure,
            node_selector: self.config.node_selector.clone(),
            service_account: self.config.service_account.clone(),
        }
    }

    fn render_step(
        &self,
        template: &StepTemplate,
        request: &OnboardingRequest,
        branch: &str,
    ) -> PipelineStep {
        let (image, command) = match template.tool {
            Tool::Git => (&self.config.git_client_image, "git"),
            Tool::Generator => (
                &self.config.generator_image,
                self.config.generator_command.as_str(),
            ),
        };

        let working_dir = match template.working_dir {
            WorkDir::Workspace => self.config.workspace_path.clone(),
            WorkDir::Repository => self.config.repo_dir(),
            WorkDir::Generator => self.config.generator_dir(),
        };

        PipelineStep {
            name: template.name.to_string(),
            image: image.clone(),
            command: vec![command.to_string()],
            args: template
                .args
                .iter()
                .map(|arg| self.render_arg(arg, request, branch))
                .collect(),
            working_dir: Some(working_dir),
            volume_mounts: self.mounts(template.mounts),
            secret_env_source: template
                .credentials
                .then(|| self.config.git_secret.clone()),
        }
    }

    fn render_arg(&self, arg: &Arg, request: &OnboardingRequest, branch: &str) -> String {
        match arg {
            Arg::Lit(value) => value.to_string(),
            Arg::Branch => branch.to_string(),
            Arg::RepoName => self.config.repo_name.clone(),
            Arg::CloneUrl => format!(
                "https://$({}):$({})@{}",
                self.config.git_user_key, self.config.git_token_key, self.config.git_repo
            ),
            Arg::Identity(key, identity) => {
                let value = match identity {
                    Identity::Email => &self.config.git_user_email,
                    Identity::Name => &self.config.git_user_name,
                };
                format!("{}={}", key, value)
            }
            Arg::Flag(flag, field) => {
                format!(
                    "--{}={}",
                    flag,
                    escape_var_refs(&self.field_value(*field, request))
                )
            }
        }
    }

    fn field_value(&self, field: Field, request: &OnboardingRequest) -> String {
        match field {
            Field::Cluster => or_default(&request.cluster, &self.config.cluster),
            Field::BuildNumber => or_default(&request.build_number, &self.config.build_number),
            Field::Name => request.name.clone(),
            Field::Owner => request.owner.clone(),
            Field::Team => request.team.clone(),
            Field::Email => request.email.clone(),
            Field::Service => request.service.clone().unwrap_or_default(),
            Field::Application => request.application.clone().unwrap_or_default(),
            Field::Domain => request.domain.clone().unwrap_or_default(),
            Field::NamespaceVip => request.namespace_vip.clone().unwrap_or_default(),
            Field::SnatIp => request.snat_ip.clone().unwrap_or_default(),
            Field::Cpu => request.cpu.to_string(),
            Field::Memory => request.memory.to_string(),
        }
    }

    fn mounts(&self, mounts: Mounts) -> Vec<VolumeMount> {
        let mut volume_mounts = vec![VolumeMount {
            volume: WORKSPACE_VOLUME.to_string(),
            mount_path: self.config.workspace_path.clone(),
            read_only: false,
        }];

        if mounts == Mounts::WorkspaceAndTrust && self.config.trust_config_map.is_some() {
            volume_mounts.push(VolumeMount {
                volume: TRUST_VOLUME.to_string(),
                mount_path: self.config.trust_mount_path.clone(),
                read_only: true,
            });
        }

        volume_mounts
    }

    fn volumes(&self) -> Vec<VolumeDeclaration> {
        let mut volumes = vec![VolumeDeclaration {
            name: WORKSPACE_VOLUME.to_string(),
            source: VolumeSource::EmptyDir,
        }];

        if let Some(config_map) = &self.config.trust_config_map {
            volumes.push(VolumeDeclaration {
                name: TRUST_VOLUME.to_string(),
                source: VolumeSource::ConfigMap {
                    name: config_map.clone(),
                },
            });
        }

        volumes
    }

    fn terminal_step(&self) -> PipelineStep {
        PipelineStep {
            name: TERMINAL_STEP.to_string(),
            image: self.config.terminal_image.clone(),
            command: vec!["echo".to_string()],
            args: vec!["job completed".to_string()],
            working_dir: None,
            volume_mounts: vec![],
            secret_env_source: None,
        }
    }

    fn labels(&self, request: &OnboardingRequest) -> BTreeMap<String, String> {
        BTreeMap::from([
            (MANAGED_BY_LABEL.to_string(), "onboarder".to_string()),
            (PROJECT_LABEL.to_string(), request.name.clone()),
            (
                TEMPLATE_VERSION_LABEL.to_string(),
                TEMPLATE_VERSION.to_string(),
            ),
        ])
    }
}

/// Request value when present and non-empty, else the deployment default.
fn or_default(value: &Option<String>, default: &str) -> String {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// The kubelet expands `$(VAR)` in container args; `$$` yields a literal `$`.
fn escape_var_refs(value: &str) -> String {
    value.replace('$', "$$")
}
