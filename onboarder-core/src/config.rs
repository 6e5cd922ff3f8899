//! Pipeline configuration
//!
//! Static, per-deployment settings the compiler needs to wire steps:
//! images, the repository to clone, credential and trust-material
//! references, placement constraints. Built once at start-up and never read
//! from the process environment by this crate.

use std::collections::BTreeMap;

use crate::compiler::CompilationError;
use crate::domain::pipeline::HostAlias;

/// Deployment settings shared by every compiled pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Cluster identifier passed to the generator when the request has none
    pub cluster: String,

    /// Build number passed to the generator when the request has none
    pub build_number: String,

    /// Namespace the pipeline is created in
    pub namespace: String,

    /// Identity the pipeline runs under
    pub service_account: String,

    /// Repository location without scheme, e.g. `git.internal/platform/config.git`
    pub git_repo: String,

    /// Commit identity configured on the clone
    pub git_user_name: String,
    pub git_user_email: String,

    /// Credential bundle injected into the clone and push steps
    pub git_secret: String,

    /// Keys inside the credential bundle holding the user and token
    pub git_user_key: String,
    pub git_token_key: String,

    /// Resolves the git host without external DNS
    pub git_host_alias: Option<HostAlias>,

    pub git_client_image: String,

    /// Directory the repository is cloned into, below the workspace
    pub repo_name: String,

    /// Mount path of the shared workspace volume in every step
    pub workspace_path: String,

    pub generator_image: String,
    pub generator_command: String,

    /// Working directory of the generator step; the repository directory when unset
    pub generator_base_dir: Option<String>,

    /// Config map carrying TLS roots for git; no trust volume when unset
    pub trust_config_map: Option<String>,
    pub trust_mount_path: String,

    /// Image of the always-succeeding completion step
    pub terminal_image: String,

    pub node_selector: BTreeMap<String, String>,
}

impl PipelineConfig {
    /// Creates a configuration with defaults for everything but the
    /// deployment-specific essentials
    pub fn new(
        namespace: impl Into<String>,
        git_repo: impl Into<String>,
        repo_name: impl Into<String>,
        generator_image: impl Into<String>,
    ) -> Self {
        Self {
            cluster: String::new(),
            build_number: String::new(),
            namespace: namespace.into(),
            service_account: "onboarder".to_string(),
            git_repo: git_repo.into(),
            git_user_name: "onboarder".to_string(),
            git_user_email: "onboarder@localhost".to_string(),
            git_secret: "git-credentials".to_string(),
            git_user_key: "GIT_AUTHUSER".to_string(),
            git_token_key: "GIT_AUTHKEY".to_string(),
            git_host_alias: None,
            git_client_image: "alpine/git:latest".to_string(),
            repo_name: repo_name.into(),
            workspace_path: "/workspace".to_string(),
            generator_image: generator_image.into(),
            generator_command: "clingo".to_string(),
            generator_base_dir: None,
            trust_config_map: None,
            trust_mount_path: "/tmp/certs".to_string(),
            terminal_image: "busybox".to_string(),
            node_selector: BTreeMap::from([(
                "node-role.kubernetes.io/infra".to_string(),
                "true".to_string(),
            )]),
        }
    }

    /// Mounts the named config map read-only into the git steps
    pub fn with_trust_material(mut self, config_map: impl Into<String>) -> Self {
        self.trust_config_map = Some(config_map.into());
        self
    }

    /// Pins the git hostname to a fixed IP inside the pipeline
    pub fn with_git_host_alias(mut self, ip: impl Into<String>, hostname: impl Into<String>) -> Self {
        self.git_host_alias = Some(HostAlias {
            ip: ip.into(),
            hostnames: vec![hostname.into()],
        });
        self
    }

    /// Path of the cloned repository inside the workspace
    pub fn repo_dir(&self) -> String {
        format!("{}/{}", self.workspace_path.trim_end_matches('/'), self.repo_name)
    }

    /// Working directory of the generator step
    pub fn generator_dir(&self) -> String {
        self.generator_base_dir
            .clone()
            .unwrap_or_else(|| self.repo_dir())
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), CompilationError> {
        for (setting, value) in [
            ("namespace", &self.namespace),
            ("service_account", &self.service_account),
            ("git_repo", &self.git_repo),
            ("git_user_name", &self.git_user_name),
            ("git_user_email", &self.git_user_email),
            ("git_secret", &self.git_secret),
            ("git_user_key", &self.git_user_key),
            ("git_token_key", &self.git_token_key),
            ("git_client_image", &self.git_client_image),
            ("repo_name", &self.repo_name),
            ("generator_image", &self.generator_image),
            ("generator_command", &self.generator_command),
            ("terminal_image", &self.terminal_image),
        ] {
            if value.trim().is_empty() {
                return Err(CompilationError::invalid(setting, "must not be empty"));
            }
        }

        if !is_dns_label(&self.namespace) {
            return Err(CompilationError::invalid(
                "namespace",
                "must be a lowercase DNS label",
            ));
        }

        if self.git_repo.contains("://") {
            return Err(CompilationError::invalid(
                "git_repo",
                "must not include a scheme; https is implied",
            ));
        }

        if self.repo_name.contains('/') || self.repo_name == "." || self.repo_name == ".." {
            return Err(CompilationError::invalid(
                "repo_name",
                "must be a single directory name",
            ));
        }

        for (setting, path) in [
            ("workspace_path", Some(&self.workspace_path)),
            ("trust_mount_path", Some(&self.trust_mount_path)),
            ("generator_base_dir", self.generator_base_dir.as_ref()),
        ] {
            if let Some(path) = path {
                if !path.starts_with('/') {
                    return Err(CompilationError::invalid(setting, "must be an absolute path"));
                }
            }
        }

        if self.trust_config_map.is_some()
            && self.trust_mount_path.trim_end_matches('/') == self.workspace_path.trim_end_matches('/')
        {
            return Err(CompilationError::invalid(
                "trust_mount_path",
                "must differ from the workspace path",
            ));
        }

        if let Some(alias) = &self.git_host_alias {
            if alias.ip.trim().is_empty() || alias.hostnames.iter().all(|h| h.trim().is_empty()) {
                return Err(CompilationError::invalid(
                    "git_host_alias",
                    "needs both an IP and a hostname",
                ));
            }
        }

        Ok(())
    }
}

fn is_dns_label(value: &str) -> bool {
    value.len() <= 63
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !value.starts_with('-')
        && !value.ends_with('-')
}
