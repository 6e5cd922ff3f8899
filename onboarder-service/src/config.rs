//! Service configuration
//!
//! Everything is static per deployment and read once at start-up. The
//! variable names match the ones existing deployments already set.

use anyhow::{Context, Result};
use onboarder_core::config::PipelineConfig;
use std::collections::BTreeMap;
use std::time::Duration;

/// Which submission adapter the service talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerKind {
    /// Kubernetes API server
    Kube,
    /// Log the rendered job instead of creating it
    DryRun,
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings handed to the pipeline compiler
    pub pipeline: PipelineConfig,

    pub scheduler: SchedulerKind,

    /// Upper bound on a single submission call
    pub submit_timeout: Duration,

    /// Address the HTTP server listens on
    pub bind_addr: String,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Required:
    /// - NAMESPACE, GIT_REPO, GIT_NAME, GIT_EMAIL, GIT_SECRET, REPO_NAME, CLINGO_IMAGE
    ///
    /// Optional:
    /// - CLUSTER, BUILDNUMBER (generator defaults, empty)
    /// - SERVICE_ACCOUNT (default: onboarder)
    /// - GIT_USER_KEY, GIT_TOKEN_KEY (default: GIT_AUTHUSER, GIT_AUTHKEY)
    /// - GIT_IP and GIT_HOSTNAME (together)
    /// - GIT_CLIENT_IMAGE (default: alpine/git:latest)
    /// - REPO_WORKINGDIR (default: /workspace)
    /// - CLINGO_COMMAND (default: clingo), CLINGO_BASEDIR
    /// - TRUST_CONFIGMAP, TRUST_MOUNT_PATH (default: /tmp/certs)
    /// - TERMINAL_IMAGE (default: busybox)
    /// - NODE_SELECTOR as k=v,k=v (default: node-role.kubernetes.io/infra=true)
    /// - SCHEDULER: kube | dry-run (default: kube)
    /// - SUBMIT_TIMEOUT (seconds, default: 10)
    /// - BIND_ADDR (default: 0.0.0.0:8080)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| anyhow::anyhow!("{} environment variable not set", key))
        };

        let mut pipeline = PipelineConfig::new(
            required("NAMESPACE")?,
            required("GIT_REPO")?,
            required("REPO_NAME")?,
            required("CLINGO_IMAGE")?,
        );

        pipeline.git_user_name = required("GIT_NAME")?;
        pipeline.git_user_email = required("GIT_EMAIL")?;
        pipeline.git_secret = required("GIT_SECRET")?;

        let overrides: [(&str, &mut String); 10] = [
            ("CLUSTER", &mut pipeline.cluster),
            ("BUILDNUMBER", &mut pipeline.build_number),
            ("SERVICE_ACCOUNT", &mut pipeline.service_account),
            ("GIT_USER_KEY", &mut pipeline.git_user_key),
            ("GIT_TOKEN_KEY", &mut pipeline.git_token_key),
            ("GIT_CLIENT_IMAGE", &mut pipeline.git_client_image),
            ("REPO_WORKINGDIR", &mut pipeline.workspace_path),
            ("CLINGO_COMMAND", &mut pipeline.generator_command),
            ("TRUST_MOUNT_PATH", &mut pipeline.trust_mount_path),
            ("TERMINAL_IMAGE", &mut pipeline.terminal_image),
        ];
        for (key, setting) in overrides {
            if let Some(value) = var(key) {
                *setting = value;
            }
        }

        pipeline.generator_base_dir = var("CLINGO_BASEDIR");
        pipeline.trust_config_map = var("TRUST_CONFIGMAP");

        pipeline = match (var("GIT_IP"), var("GIT_HOSTNAME")) {
            (Some(ip), Some(hostname)) => pipeline.with_git_host_alias(ip, hostname),
            (None, None) => pipeline,
            _ => anyhow::bail!("GIT_IP and GIT_HOSTNAME must be set together"),
        };

        if let Some(selector) = lookup("NODE_SELECTOR") {
            pipeline.node_selector = parse_node_selector(&selector)?;
        }

        let scheduler = match var("SCHEDULER").as_deref() {
            None | Some("kube") => SchedulerKind::Kube,
            Some("dry-run") => SchedulerKind::DryRun,
            Some(other) => anyhow::bail!("unknown SCHEDULER {:?}, expected kube or dry-run", other),
        };

        let submit_timeout = match var("SUBMIT_TIMEOUT") {
            Some(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .with_context(|| format!("SUBMIT_TIMEOUT must be whole seconds, got {:?}", secs))?,
            ),
            None => Duration::from_secs(10),
        };

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        Ok(Self {
            pipeline,
            scheduler,
            submit_timeout,
            bind_addr,
        })
    }

    /// Validates the service-level settings
    ///
    /// Pipeline settings are validated when the compiler is built.
    pub fn validate(&self) -> Result<()> {
        if self.submit_timeout.is_zero() {
            anyhow::bail!("submit_timeout must be greater than 0");
        }

        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        Ok(())
    }
}

/// Parses `key=value` pairs separated by commas; empty input clears the selector.
fn parse_node_selector(raw: &str) -> Result<BTreeMap<String, String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("invalid NODE_SELECTOR entry {:?}: no `=` found", pair))?;
            Ok((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = [
            ("NAMESPACE", "onboarding"),
            ("GIT_REPO", "git.internal/platform/config.git"),
            ("GIT_NAME", "Onboarding Bot"),
            ("GIT_EMAIL", "bot@internal"),
            ("GIT_SECRET", "git-auth"),
            ("REPO_NAME", "config"),
            ("CLINGO_IMAGE", "registry.internal/clingo:1.4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }
        vars
    }

    fn load(vars: &HashMap<String, String>) -> Result<Config> {
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_minimal_environment() {
        let config = load(&env(&[])).unwrap();

        assert_eq!(config.pipeline.namespace, "onboarding");
        assert_eq!(config.pipeline.git_user_name, "Onboarding Bot");
        assert_eq!(config.pipeline.git_secret, "git-auth");
        assert_eq!(config.pipeline.workspace_path, "/workspace");
        assert_eq!(config.pipeline.git_host_alias, None);
        assert_eq!(config.scheduler, SchedulerKind::Kube);
        assert_eq!(config.submit_timeout, Duration::from_secs(10));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(config.validate().is_ok());
        assert!(config.pipeline.validate().is_ok());
    }

    #[test]
    fn test_missing_required_variable() {
        let mut vars = env(&[]);
        vars.remove("GIT_REPO");
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("GIT_REPO"));
    }

    #[test]
    fn test_full_environment() {
        let config = load(&env(&[
            ("CLUSTER", "east-1"),
            ("BUILDNUMBER", "42"),
            ("GIT_IP", "10.1.2.3"),
            ("GIT_HOSTNAME", "git.internal"),
            ("REPO_WORKINGDIR", "/repo"),
            ("CLINGO_BASEDIR", "/repo/config/projects"),
            ("TRUST_CONFIGMAP", "rootca"),
            ("NODE_SELECTOR", "role=infra, zone=a"),
            ("SCHEDULER", "dry-run"),
            ("SUBMIT_TIMEOUT", "3"),
        ]))
        .unwrap();

        let pipeline = &config.pipeline;
        assert_eq!(pipeline.cluster, "east-1");
        assert_eq!(pipeline.build_number, "42");
        assert_eq!(pipeline.workspace_path, "/repo");
        assert_eq!(pipeline.generator_dir(), "/repo/config/projects");
        assert_eq!(pipeline.trust_config_map.as_deref(), Some("rootca"));
        assert_eq!(pipeline.git_host_alias.as_ref().unwrap().ip, "10.1.2.3");
        assert_eq!(pipeline.node_selector.len(), 2);
        assert_eq!(pipeline.node_selector.get("zone"), Some(&"a".to_string()));
        assert_eq!(config.scheduler, SchedulerKind::DryRun);
        assert_eq!(config.submit_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_half_host_alias_is_rejected() {
        assert!(load(&env(&[("GIT_IP", "10.1.2.3")])).is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(load(&env(&[("SCHEDULER", "nomad")])).is_err());
        assert!(load(&env(&[("SUBMIT_TIMEOUT", "soon")])).is_err());
        assert!(load(&env(&[("NODE_SELECTOR", "infra")])).is_err());

        let mut config = load(&env(&[])).unwrap();
        config.submit_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_node_selector_clears_default() {
        let config = load(&env(&[("NODE_SELECTOR", "")])).unwrap();
        assert!(config.pipeline.node_selector.is_empty());
    }
}
