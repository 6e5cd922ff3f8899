//! Onboarding request model
//!
//! Parsing and validation of the payload that asks for a new project to be
//! onboarded. The schema is a superset of every field set the generator has
//! accepted over time; unknown keys are ignored so older and newer callers
//! keep working.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Longest accepted project name.
///
/// Kubernetes object names are capped at 63 characters and the scheduler
/// appends `-` plus a 5 character suffix to the generated name prefix.
pub const MAX_NAME_LENGTH: usize = 57;

/// Errors raised while turning a raw payload into an [`OnboardingRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Payload is not JSON, not an object, lacks a required field or carries
    /// a value of the wrong type
    #[error("malformed request: {0}")]
    Malformed(String),

    /// Field is present and well-typed but its value is not acceptable
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// A request to onboard a project into the configuration repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    /// Project name, used as resource prefix and branch suffix
    pub name: String,
    pub owner: String,
    pub team: String,
    pub email: String,
    /// Cluster CPU request
    pub cpu: u32,
    /// Cluster memory request
    pub memory: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, rename = "namespaceVIP", skip_serializing_if = "Option::is_none")]
    pub namespace_vip: Option<String>,
    #[serde(default, rename = "snatIP", skip_serializing_if = "Option::is_none")]
    pub snat_ip: Option<String>,
}

impl OnboardingRequest {
    /// Parses and validates a raw JSON payload
    ///
    /// # Errors
    /// [`ValidationError::Malformed`] when the payload cannot be deserialized,
    /// [`ValidationError::InvalidField`] when a value breaks a field rule.
    pub fn parse(raw: &[u8]) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_slice(raw).map_err(|e| ValidationError::Malformed(e.to_string()))?;

        let request: OnboardingRequest = serde_json::from_value(canonicalize_keys(value))
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;

        request.validate()?;

        Ok(request)
    }

    /// Checks every field rule on an already deserialized request
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;

        for (field, value) in [
            ("owner", &self.owner),
            ("team", &self.team),
            ("email", &self.email),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::invalid(field, "must not be blank"));
            }
        }

        if self.cpu == 0 {
            return Err(ValidationError::invalid("cpu", "must be greater than 0"));
        }

        if self.memory == 0 {
            return Err(ValidationError::invalid("memory", "must be greater than 0"));
        }

        Ok(())
    }

    /// Branch the onboarding changes are committed to
    pub fn branch_name(&self) -> String {
        format!("{}-onboarding", self.name)
    }
}

// =============================================================================
// Key matching
// =============================================================================

/// Wire names of every known field
const FIELD_NAMES: [&str; 13] = [
    "name",
    "owner",
    "team",
    "email",
    "cpu",
    "memory",
    "cluster",
    "buildNumber",
    "service",
    "application",
    "domain",
    "namespaceVIP",
    "snatIP",
];

/// Rewrites top-level keys that match a field name ignoring ASCII case to
/// that field's wire name.
///
/// When several keys fold onto one field, the exact spelling wins, else the
/// first in key order. Unknown keys are left alone. Non-objects pass through
/// untouched and fail deserialization later.
fn canonicalize_keys(value: Value) -> Value {
    let Value::Object(object) = value else {
        return value;
    };

    let mut canonical = Map::with_capacity(object.len());
    for (key, value) in object {
        match FIELD_NAMES.iter().find(|f| f.eq_ignore_ascii_case(&key)) {
            Some(field) if *field == key => {
                canonical.insert(key, value);
            }
            Some(field) => {
                canonical.entry(field.to_string()).or_insert(value);
            }
            None => {
                canonical.entry(key).or_insert(value);
            }
        }
    }

    Value::Object(canonical)
}

// =============================================================================
// Validation
// =============================================================================

/// The name must work both as a DNS-label prefix and as a branch suffix.
fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::invalid("name", "must not be empty"));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::invalid(
            "name",
            format!("is too long (max {} characters)", MAX_NAME_LENGTH),
        ));
    }

    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(ValidationError::invalid(
            "name",
            format!(
                "contains {:?}; only lowercase letters, digits and '-' are allowed",
                c
            ),
        ));
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(ValidationError::invalid(
            "name",
            "must start and end with a letter or digit",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYMENTS: &str =
        r#"{"name":"payments","owner":"alice","team":"core","email":"a@x.com","cpu":2,"memory":4}"#;

    #[test]
    fn test_parse_minimal_request() {
        let req = OnboardingRequest::parse(PAYMENTS.as_bytes()).unwrap();
        assert_eq!(req.name, "payments");
        assert_eq!(req.owner, "alice");
        assert_eq!(req.cpu, 2);
        assert_eq!(req.memory, 4);
        assert_eq!(req.service, None);
        assert_eq!(req.branch_name(), "payments-onboarding");
    }

    #[test]
    fn test_parse_superset_fields_and_aliases() {
        let raw = r#"{
            "name": "billing", "owner": "bob", "team": "fin", "email": "b@x.com",
            "cpu": 1, "memory": 2,
            "cluster": "east-1", "buildnumber": "42", "service": "svc",
            "application": "app", "domain": "x.com",
            "namespacevip": "10.0.0.1", "snatIP": "10.0.0.2"
        }"#;

        let req = OnboardingRequest::parse(raw.as_bytes()).unwrap();
        assert_eq!(req.cluster.as_deref(), Some("east-1"));
        assert_eq!(req.build_number.as_deref(), Some("42"));
        assert_eq!(req.namespace_vip.as_deref(), Some("10.0.0.1"));
        assert_eq!(req.snat_ip.as_deref(), Some("10.0.0.2"));
    }

    #[test]
    fn test_keys_match_ignoring_case() {
        let raw = r#"{
            "Name": "payments", "OWNER": "alice", "Team": "core", "eMail": "a@x.com",
            "CPU": 2, "Memory": 4,
            "BuildNumber": "42", "Service": "svc", "NamespaceVip": "10.0.0.1", "SNATIP": "10.0.0.2"
        }"#;

        let req = OnboardingRequest::parse(raw.as_bytes()).unwrap();
        assert_eq!(req.name, "payments");
        assert_eq!(req.owner, "alice");
        assert_eq!(req.email, "a@x.com");
        assert_eq!(req.cpu, 2);
        assert_eq!(req.memory, 4);
        assert_eq!(req.build_number.as_deref(), Some("42"));
        assert_eq!(req.service.as_deref(), Some("svc"));
        assert_eq!(req.namespace_vip.as_deref(), Some("10.0.0.1"));
        assert_eq!(req.snat_ip.as_deref(), Some("10.0.0.2"));
    }

    #[test]
    fn test_exact_key_wins_over_folded_duplicate() {
        let raw = r#"{"name":"payments","owner":"alice","team":"core","email":"a@x.com",
                      "cpu":2,"memory":4,"Service":"folded","service":"exact"}"#;

        let req = OnboardingRequest::parse(raw.as_bytes()).unwrap();
        assert_eq!(req.service.as_deref(), Some("exact"));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let raw = r#"{"name":"payments","owner":"alice","team":"core","email":"a@x.com",
                      "cpu":2,"memory":4,"costCenter":"cc-9","tags":["a"]}"#;
        assert!(OnboardingRequest::parse(raw.as_bytes()).is_ok());
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let raw = r#"{"owner":"alice","team":"core","email":"a@x.com","cpu":2,"memory":4}"#;
        let err = OnboardingRequest::parse(raw.as_bytes()).unwrap_err();
        match err {
            ValidationError::Malformed(msg) => assert!(msg.contains("name"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let raw = r#"{"name":"payments","owner":"alice","team":"core","email":"a@x.com",
                      "cpu":"two","memory":4}"#;
        assert!(matches!(
            OnboardingRequest::parse(raw.as_bytes()),
            Err(ValidationError::Malformed(_))
        ));

        let raw = r#"{"name":"payments","owner":"alice","team":"core","email":"a@x.com",
                      "cpu":-1,"memory":4}"#;
        assert!(matches!(
            OnboardingRequest::parse(raw.as_bytes()),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        assert!(matches!(
            OnboardingRequest::parse(b"[1,2,3]"),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(
            OnboardingRequest::parse(b"not json"),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("payments").is_ok());
        assert!(validate_name("payments-v2").is_ok());
        assert!(validate_name("a").is_ok());
        assert!(validate_name(&"a".repeat(MAX_NAME_LENGTH)).is_ok());

        for bad in [
            "",
            "pay ments",
            "pay/ments",
            "pay\\ments",
            "../etc",
            "Payments",
            "-payments",
            "payments-",
            "pay\tments",
            "pay.ments",
        ] {
            assert!(
                matches!(
                    validate_name(bad),
                    Err(ValidationError::InvalidField { field: "name", .. })
                ),
                "{bad:?} should be rejected"
            );
        }

        assert!(validate_name(&"a".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_blank_owner_is_rejected() {
        let raw = r#"{"name":"payments","owner":"  ","team":"core","email":"a@x.com","cpu":2,"memory":4}"#;
        assert_eq!(
            OnboardingRequest::parse(raw.as_bytes()),
            Err(ValidationError::InvalidField {
                field: "owner",
                reason: "must not be blank".to_string()
            })
        );
    }

    #[test]
    fn test_zero_resources_are_rejected() {
        let raw = r#"{"name":"payments","owner":"alice","team":"core","email":"a@x.com","cpu":0,"memory":4}"#;
        assert!(matches!(
            OnboardingRequest::parse(raw.as_bytes()),
            Err(ValidationError::InvalidField { field: "cpu", .. })
        ));

        let raw = r#"{"name":"payments","owner":"alice","team":"core","email":"a@x.com","cpu":2,"memory":0}"#;
        assert!(matches!(
            OnboardingRequest::parse(raw.as_bytes()),
            Err(ValidationError::InvalidField { field: "memory", .. })
        ));
    }
}
