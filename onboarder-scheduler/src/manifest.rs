//! Kubernetes Job rendering
//!
//! Translates a [`PipelineSpec`] into a `batch/v1` Job and back:
//! - working steps become init containers, which the kubelet runs one at a
//!   time and stops at the first failure
//! - the terminal step becomes the single main container
//! - volumes, host aliases, node selector and service account move to the
//!   pod template
//!
//! [`parse_job`] is the inverse of [`render_job`] for every Job this module
//! renders.

use std::collections::BTreeMap;

use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, EmptyDirVolumeSource, EnvFromSource, HostAlias as PodHostAlias,
    PodSpec, PodTemplateSpec, SecretEnvSource, Volume, VolumeMount as PodVolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use onboarder_core::domain::pipeline::{
    HostAlias, PipelineSpec, PipelineStep, RestartPolicy, VolumeDeclaration, VolumeMount,
    VolumeSource,
};
use thiserror::Error;

/// Errors raised when a Job cannot be read back as a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("job manifest is missing `{0}`")]
    Missing(&'static str),

    #[error("job manifest has unsupported `{field}`: {value}")]
    Unsupported { field: &'static str, value: String },
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders a pipeline as a Job ready for creation
pub fn render_job(spec: &PipelineSpec) -> Job {
    let labels = non_empty_map(&spec.labels);

    let pod = PodSpec {
        init_containers: Some(spec.steps.iter().map(render_container).collect()),
        containers: vec![render_container(&spec.terminal_step)],
        restart_policy: Some(spec.restart_policy.as_str().to_string()),
        host_aliases: non_empty(spec.host_aliases.iter().map(render_host_alias).collect()),
        node_selector: non_empty_map(&spec.node_selector),
        service_account_name: Some(spec.service_account.clone()),
        volumes: non_empty(spec.shared_volumes.iter().map(render_volume).collect()),
        ..Default::default()
    };

    Job {
        metadata: ObjectMeta {
            generate_name: Some(spec.generated_name_prefix.clone()),
            namespace: Some(spec.namespace.clone()),
            labels: labels.clone(),
            ..Default::default()
        },
        spec: Some(JobSpec {
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    generate_name: Some(spec.generated_name_prefix.clone()),
                    labels,
                    ..Default::default()
                }),
                spec: Some(pod),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn render_container(step: &PipelineStep) -> Container {
    Container {
        name: step.name.clone(),
        image: Some(step.image.clone()),
        command: non_empty(step.command.clone()),
        args: non_empty(step.args.clone()),
        working_dir: step.working_dir.clone(),
        env_from: step.secret_env_source.as_ref().map(|secret| {
            vec![EnvFromSource {
                secret_ref: Some(SecretEnvSource {
                    name: Some(secret.clone()),
                    ..Default::default()
                }),
                ..Default::default()
            }]
        }),
        volume_mounts: non_empty(
            step.volume_mounts
                .iter()
                .map(|m| PodVolumeMount {
                    name: m.volume.clone(),
                    mount_path: m.mount_path.clone(),
                    read_only: m.read_only.then_some(true),
                    ..Default::default()
                })
                .collect(),
        ),
        ..Default::default()
    }
}

fn render_volume(volume: &VolumeDeclaration) -> Volume {
    match &volume.source {
        VolumeSource::EmptyDir => Volume {
            name: volume.name.clone(),
            empty_dir: Some(EmptyDirVolumeSource::default()),
            ..Default::default()
        },
        VolumeSource::ConfigMap { name } => Volume {
            name: volume.name.clone(),
            config_map: Some(ConfigMapVolumeSource {
                name: Some(name.clone()),
                ..Default::default()
            }),
            ..Default::default()
        },
    }
}

fn render_host_alias(alias: &HostAlias) -> PodHostAlias {
    PodHostAlias {
        ip: Some(alias.ip.clone()),
        hostnames: Some(alias.hostnames.clone()),
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

fn non_empty_map(map: &BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    (!map.is_empty()).then(|| map.clone())
}

// =============================================================================
// Parsing
// =============================================================================

/// Reads a Job back into the pipeline it was rendered from
pub fn parse_job(job: &Job) -> Result<PipelineSpec, ManifestError> {
    let metadata = &job.metadata;
    let pod = job
        .spec
        .as_ref()
        .and_then(|s| s.template.spec.as_ref())
        .ok_or(ManifestError::Missing("spec.template.spec"))?;

    let steps = pod
        .init_containers
        .iter()
        .flatten()
        .map(parse_container)
        .collect::<Result<Vec<_>, _>>()?;

    if steps.is_empty() {
        return Err(ManifestError::Missing("spec.template.spec.initContainers"));
    }

    let terminal_step = match pod.containers.as_slice() {
        [terminal] => parse_container(terminal)?,
        other => {
            return Err(ManifestError::Unsupported {
                field: "spec.template.spec.containers",
                value: format!("{} containers, expected 1", other.len()),
            });
        }
    };

    let restart_policy = pod
        .restart_policy
        .as_deref()
        .ok_or(ManifestError::Missing("spec.template.spec.restartPolicy"))?;
    let restart_policy =
        RestartPolicy::parse(restart_policy).ok_or_else(|| ManifestError::Unsupported {
            field: "spec.template.spec.restartPolicy",
            value: restart_policy.to_string(),
        })?;

    Ok(PipelineSpec {
        generated_name_prefix: metadata
            .generate_name
            .clone()
            .ok_or(ManifestError::Missing("metadata.generateName"))?,
        namespace: metadata
            .namespace
            .clone()
            .ok_or(ManifestError::Missing("metadata.namespace"))?,
        labels: metadata.labels.clone().unwrap_or_default(),
        steps,
        terminal_step,
        shared_volumes: pod
            .volumes
            .iter()
            .flatten()
            .map(parse_volume)
            .collect::<Result<_, _>>()?,
        host_aliases: pod
            .host_aliases
            .iter()
            .flatten()
            .map(parse_host_alias)
            .collect::<Result<_, _>>()?,
        restart_policy,
        node_selector: pod.node_selector.clone().unwrap_or_default(),
        service_account: pod
            .service_account_name
            .clone()
            .ok_or(ManifestError::Missing("spec.template.spec.serviceAccountName"))?,
    })
}

fn parse_container(container: &Container) -> Result<PipelineStep, ManifestError> {
    let secrets = container
        .env_from
        .iter()
        .flatten()
        .filter_map(|source| source.secret_ref.as_ref())
        .map(|secret| {
            secret
                .name
                .clone()
                .ok_or(ManifestError::Missing("envFrom.secretRef.name"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if secrets.len() > 1 {
        return Err(ManifestError::Unsupported {
            field: "envFrom",
            value: format!("{} secret sources on {}", secrets.len(), container.name),
        });
    }

    Ok(PipelineStep {
        name: container.name.clone(),
        image: container
            .image
            .clone()
            .ok_or(ManifestError::Missing("container.image"))?,
        command: container.command.clone().unwrap_or_default(),
        args: container.args.clone().unwrap_or_default(),
        working_dir: container.working_dir.clone(),
        volume_mounts: container
            .volume_mounts
            .iter()
            .flatten()
            .map(|m| VolumeMount {
                volume: m.name.clone(),
                mount_path: m.mount_path.clone(),
                read_only: m.read_only.unwrap_or(false),
            })
            .collect(),
        secret_env_source: secrets.into_iter().next(),
    })
}

fn parse_volume(volume: &Volume) -> Result<VolumeDeclaration, ManifestError> {
    let source = if volume.empty_dir.is_some() {
        VolumeSource::EmptyDir
    } else if let Some(config_map) = &volume.config_map {
        VolumeSource::ConfigMap {
            name: config_map
                .name
                .clone()
                .ok_or(ManifestError::Missing("volume.configMap.name"))?,
        }
    } else {
        return Err(ManifestError::Unsupported {
            field: "volume",
            value: format!("source of volume {}", volume.name),
        });
    };

    Ok(VolumeDeclaration {
        name: volume.name.clone(),
        source,
    })
}

fn parse_host_alias(alias: &PodHostAlias) -> Result<HostAlias, ManifestError> {
    Ok(HostAlias {
        ip: alias
            .ip
            .clone()
            .ok_or(ManifestError::Missing("hostAliases.ip"))?,
        hostnames: alias.hostnames.clone().unwrap_or_default(),
    })
}
