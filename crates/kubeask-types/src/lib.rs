//! Shared types for kubeask
//!
//! This crate contains the resource summaries, namespace scope and snapshot
//! structures passed between the cluster reader, the query engine and the
//! HTTP layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace used when a request does not name one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Sentinel namespace value meaning cluster-wide scope
pub const ALL_NAMESPACES: &str = "all";

// ============================================================================
// Scope
// ============================================================================

/// Where a list call looks for resources
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NamespaceScope {
    /// Every namespace in the cluster
    All,
    /// A single named namespace
    Namespace(String),
}

impl NamespaceScope {
    /// Parse a namespace argument, treating `"all"` as cluster-wide
    pub fn parse(namespace: &str) -> Self {
        if namespace == ALL_NAMESPACES {
            Self::All
        } else {
            Self::Namespace(namespace.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for NamespaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_NAMESPACES),
            Self::Namespace(ns) => f.write_str(ns),
        }
    }
}

// ============================================================================
// Kubernetes Resource Types
// ============================================================================

/// The resource kinds kubeask knows how to read
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pod,
    Service,
    Deployment,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Pod, Self::Service, Self::Deployment];

    /// Plural name, also used as the snapshot key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pod => "pods",
            Self::Service => "services",
            Self::Deployment => "deployments",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pod lifecycle phase as reported by the API server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodPhase {
    fn from(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Container name and image, in pod spec order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRef {
    pub name: String,
    pub image: Option<String>,
}

/// Pod summary
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSummary {
    pub name: String,
    pub namespace: String,
    pub phase: Option<PodPhase>,
    pub node: Option<String>,
    pub host_ip: Option<String>,
    pub pod_ip: Option<String>,
    pub start_time: Option<String>,
    pub containers: Vec<ContainerRef>,
}

impl PodSummary {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            phase: None,
            node: None,
            host_ip: None,
            pod_ip: None,
            start_time: None,
            containers: Vec::new(),
        }
    }
}

/// A service port's target, either a number or a named container port
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetPort {
    Number(i32),
    Name(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub port: i32,
    pub target_port: Option<TargetPort>,
    pub protocol: Option<String>,
}

/// Service summary
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub name: String,
    pub namespace: String,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    pub cluster_ip: Option<String>,
    pub external_ips: Vec<String>,
    pub ports: Vec<PortMapping>,
}

impl ServiceSummary {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            service_type: None,
            cluster_ip: None,
            external_ips: Vec::new(),
            ports: Vec::new(),
        }
    }
}

/// Deployment summary
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSummary {
    pub name: String,
    pub namespace: String,
    pub replicas: Option<i32>,
    pub available_replicas: Option<i32>,
    pub images: Vec<String>,
}

impl DeploymentSummary {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            replicas: None,
            available_replicas: None,
            images: Vec::new(),
        }
    }
}

// ============================================================================
// Fetch Results
// ============================================================================

/// Outcome of a single list call.
///
/// Failures are carried as data so a broken kind can sit next to healthy ones
/// in a snapshot. Serialises as a bare array on success and as
/// `{"error": "..."}` on failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fetched<T> {
    Items(Vec<T>),
    Error { error: String },
}

impl<T> Fetched<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

impl<T> From<Vec<T>> for Fetched<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Items(items)
    }
}

/// A fetched list of one resource kind
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResourceList {
    Pods(Fetched<PodSummary>),
    Services(Fetched<ServiceSummary>),
    Deployments(Fetched<DeploymentSummary>),
}

impl ResourceList {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Pods(_) => ResourceKind::Pod,
            Self::Services(_) => ResourceKind::Service,
            Self::Deployments(_) => ResourceKind::Deployment,
        }
    }
}

// ============================================================================
// Snapshot & Answer
// ============================================================================

/// The resources handed to the model as grounding for one question.
///
/// Only kinds selected for the question are present; the rest stay `None`
/// and are left out of the JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClusterSnapshot {
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pods: Option<Fetched<PodSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Fetched<ServiceSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployments: Option<Fetched<DeploymentSummary>>,
}

impl ClusterSnapshot {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Store a fetched list in the slot for its kind
    pub fn insert(&mut self, list: ResourceList) {
        match list {
            ResourceList::Pods(pods) => self.pods = Some(pods),
            ResourceList::Services(services) => self.services = Some(services),
            ResourceList::Deployments(deployments) => self.deployments = Some(deployments),
        }
    }

    pub fn contains(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Pod => self.pods.is_some(),
            ResourceKind::Service => self.services.is_some(),
            ResourceKind::Deployment => self.deployments.is_some(),
        }
    }

    /// True when no kind was fetched at all
    pub fn is_empty(&self) -> bool {
        ResourceKind::ALL.iter().all(|kind| !self.contains(*kind))
    }
}

/// What `/api/query` returns under `answer`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    /// Raw list returned for literal "list" questions
    Resources(ResourceList),
    /// Model-generated text
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub answer: Answer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_parse() {
        assert_eq!(NamespaceScope::parse("all"), NamespaceScope::All);
        assert_eq!(
            NamespaceScope::parse("kube-system"),
            NamespaceScope::Namespace("kube-system".to_string())
        );
        // only the exact sentinel is cluster-wide
        assert!(!NamespaceScope::parse("All").is_all());
    }

    #[test]
    fn test_fetched_serialization() {
        let ok: Fetched<DeploymentSummary> =
            Fetched::Items(vec![DeploymentSummary::new("web".into(), "prod".into())]);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!([{
                "name": "web",
                "namespace": "prod",
                "replicas": null,
                "available_replicas": null,
                "images": []
            }])
        );

        let err: Fetched<DeploymentSummary> = Fetched::error("forbidden");
        assert_eq!(serde_json::to_value(&err).unwrap(), json!({"error": "forbidden"}));
    }

    #[test]
    fn test_service_type_field_name() {
        let mut svc = ServiceSummary::new("api".into(), "default".into());
        svc.service_type = Some("NodePort".into());
        svc.ports.push(PortMapping {
            port: 80,
            target_port: Some(TargetPort::Name("http".into())),
            protocol: Some("TCP".into()),
        });

        let value = serde_json::to_value(&svc).unwrap();
        assert_eq!(value["type"], "NodePort");
        assert_eq!(value["ports"][0]["target_port"], "http");
    }

    #[test]
    fn test_snapshot_omits_unselected_kinds() {
        let mut snapshot = ClusterSnapshot::new("prod");
        assert!(snapshot.is_empty());

        snapshot.insert(ResourceList::Deployments(Fetched::Items(Vec::new())));
        assert!(snapshot.contains(ResourceKind::Deployment));
        assert!(!snapshot.contains(ResourceKind::Pod));

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value, json!({"namespace": "prod", "deployments": []}));
    }

    #[test]
    fn test_answer_shapes() {
        let text = QueryResult {
            answer: Answer::Text("all good".into()),
        };
        assert_eq!(serde_json::to_value(&text).unwrap(), json!({"answer": "all good"}));

        let list = QueryResult {
            answer: Answer::Resources(ResourceList::Pods(Fetched::error("boom"))),
        };
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!({"answer": {"error": "boom"}})
        );
    }
}
