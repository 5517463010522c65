//! Typed views over rendered Kubernetes documents
//!
//! Every document that survives classification is a [`RawDocument`]: a YAML
//! tree with a known `kind` and (possibly empty) `metadata.name`. The
//! [`Resource`] sum type wraps it according to kind, and [`ResourceSpec`]
//! provides the accessors shared by all variants.

use serde::{Serialize, Serializer};
use serde_yaml::Value;
use std::collections::BTreeMap;

use crate::hooks::{self, HookPhase};

/// Kind of batch jobs, also the only kind that can be a hook
pub const JOB_KIND: &str = "Job";
/// Kind of deployments
pub const DEPLOYMENT_KIND: &str = "Deployment";

/// A parsed document with its classification keys
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    kind: String,
    name: String,
    value: Value,
}

impl RawDocument {
    /// Wrap a parsed document
    ///
    /// Returns `None` when the document has no string `kind`, since it cannot be
    /// classified. A missing `metadata.name` yields an empty name.
    pub fn from_value(value: Value) -> Option<Self> {
        let kind = value.get("kind")?.as_str()?.to_string();
        let name = value
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(scalar_to_string)
            .unwrap_or_default();

        Some(Self { kind, name, value })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The whole parsed document
    pub fn value(&self) -> &Value {
        &self.value
    }

    fn metadata(&self, field: &str) -> Option<&Value> {
        self.value.get("metadata").and_then(|m| m.get(field))
    }
}

impl Serialize for RawDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

/// Accessors shared by every resource variant
pub trait ResourceSpec {
    /// Underlying document
    fn document(&self) -> &RawDocument;

    fn kind(&self) -> &str {
        self.document().kind()
    }

    fn name(&self) -> &str {
        self.document().name()
    }

    /// `metadata.namespace`, if the chart sets one
    fn namespace(&self) -> Option<&str> {
        self.document().metadata("namespace").and_then(Value::as_str)
    }

    fn labels(&self) -> BTreeMap<String, String> {
        string_map(self.document().metadata("labels"))
    }

    fn annotations(&self) -> BTreeMap<String, String> {
        string_map(self.document().metadata("annotations"))
    }

    /// Single annotation lookup by exact key
    fn annotation(&self, key: &str) -> Option<String> {
        self.document()
            .metadata("annotations")
            .and_then(|a| a.get(key))
            .and_then(scalar_to_string)
    }

    /// Images of all containers and init containers in the pod spec
    fn images(&self) -> Vec<String> {
        let Some(pod_spec) = pod_spec(self.document().value()) else {
            return Vec::new();
        };

        ["initContainers", "containers"]
            .iter()
            .filter_map(|field| pod_spec.get(*field).and_then(Value::as_sequence))
            .flatten()
            .filter_map(|c| c.get("image").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }
}

/// A rendered batch Job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Job {
    doc: RawDocument,
}

impl Job {
    pub fn from_document(doc: RawDocument) -> Self {
        Self { doc }
    }

    /// Whether the job carries the `helm.sh/hook` annotation, whatever its value
    pub fn is_hook(&self) -> bool {
        self.doc
            .metadata("annotations")
            .and_then(Value::as_mapping)
            .is_some_and(hooks::is_hook)
    }

    /// Phases the hook runs in (empty for plain jobs)
    pub fn hook_phases(&self) -> Vec<HookPhase> {
        self.annotation(hooks::HOOK)
            .map(|v| hooks::parse_hook_phases(&v))
            .unwrap_or_default()
    }

    pub fn hook_weight(&self) -> i32 {
        hooks::parse_hook_weight(&self.annotations())
    }

    pub fn hook_delete_policies(&self) -> Vec<String> {
        hooks::parse_delete_policies(&self.annotations())
    }

    /// `spec.backoffLimit`, if set
    pub fn backoff_limit(&self) -> Option<i64> {
        self.doc
            .value()
            .get("spec")
            .and_then(|s| s.get("backoffLimit"))
            .and_then(Value::as_i64)
    }
}

impl ResourceSpec for Job {
    fn document(&self) -> &RawDocument {
        &self.doc
    }
}

/// A rendered Deployment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Deployment {
    doc: RawDocument,
}

impl Deployment {
    pub fn from_document(doc: RawDocument) -> Self {
        Self { doc }
    }

    /// `spec.replicas`, defaulting to 1 like the API server does
    pub fn replicas(&self) -> i64 {
        self.doc
            .value()
            .get("spec")
            .and_then(|s| s.get("replicas"))
            .and_then(Value::as_i64)
            .unwrap_or(1)
    }
}

impl ResourceSpec for Deployment {
    fn document(&self) -> &RawDocument {
        &self.doc
    }
}

/// Any other kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GenericResource {
    doc: RawDocument,
}

impl ResourceSpec for GenericResource {
    fn document(&self) -> &RawDocument {
        &self.doc
    }
}

/// A classified resource
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Job(Job),
    Deployment(Deployment),
    Generic(GenericResource),
}

impl Resource {
    /// Wrap a document according to its kind
    pub fn from_document(doc: RawDocument) -> Self {
        match doc.kind() {
            JOB_KIND => Resource::Job(Job::from_document(doc)),
            DEPLOYMENT_KIND => Resource::Deployment(Deployment::from_document(doc)),
            _ => Resource::Generic(GenericResource { doc }),
        }
    }

    pub fn as_job(&self) -> Option<&Job> {
        match self {
            Resource::Job(job) => Some(job),
            _ => None,
        }
    }

    pub fn as_deployment(&self) -> Option<&Deployment> {
        match self {
            Resource::Deployment(deployment) => Some(deployment),
            _ => None,
        }
    }
}

impl ResourceSpec for Resource {
    fn document(&self) -> &RawDocument {
        match self {
            Resource::Job(r) => r.document(),
            Resource::Deployment(r) => r.document(),
            Resource::Generic(r) => r.document(),
        }
    }
}

/// Pod spec of a workload (`spec.template.spec`) or of a bare Pod (`spec`)
fn pod_spec(value: &Value) -> Option<&Value> {
    let spec = value.get("spec")?;
    match spec.get("template").and_then(|t| t.get("spec")) {
        Some(template_spec) => Some(template_spec),
        None if spec.get("containers").is_some() => Some(spec),
        None => None,
    }
}

/// Annotation and label values are strings, but charts often leave numbers
/// and booleans unquoted
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_mapping)
        .map(|mapping| {
            mapping
                .iter()
                .filter_map(|(k, v)| Some((k.as_str()?.to_string(), scalar_to_string(v)?)))
                .collect()
        })
        .unwrap_or_default()
}
