//! Keyword classification of free-text questions
//!
//! Matching is plain substring search on the lowercased question. There is
//! no tokenization, so "podcast" counts as a pod mention.

use kubeask_types::{ALL_NAMESPACES, NamespaceScope, ResourceKind};

/// What a question asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// "list" + "pod": return the raw pod list
    ListPods,
    /// "list" + "service"/"svc": return the raw service list
    ListServices,
    /// "list" + "deployment": return the raw deployment list
    ListDeployments,
    /// Anything else goes to the model with the selected kinds
    General {
        pods: bool,
        services: bool,
        deployments: bool,
    },
}

impl Intent {
    /// Kinds to fetch for this intent, in fetch order
    pub fn kinds(&self) -> Vec<ResourceKind> {
        match *self {
            Self::ListPods | Self::ListServices | Self::ListDeployments => {
                self.list_kind().into_iter().collect()
            }
            Self::General {
                pods,
                services,
                deployments,
            } => [
                (pods, ResourceKind::Pod),
                (services, ResourceKind::Service),
                (deployments, ResourceKind::Deployment),
            ]
            .into_iter()
            .filter_map(|(wanted, kind)| wanted.then_some(kind))
            .collect(),
        }
    }

    /// The kind returned raw, for list intents
    pub fn list_kind(&self) -> Option<ResourceKind> {
        match self {
            Self::ListPods => Some(ResourceKind::Pod),
            Self::ListServices => Some(ResourceKind::Service),
            Self::ListDeployments => Some(ResourceKind::Deployment),
            Self::General { .. } => None,
        }
    }
}

fn mentions_pods(q: &str) -> bool {
    q.contains("pod")
}

fn mentions_services(q: &str) -> bool {
    q.contains("service") || q.contains("svc")
}

fn mentions_deployments(q: &str) -> bool {
    q.contains("deployment")
}

/// Classify a question.
///
/// List rules are checked in pod, service, deployment order and the first
/// hit wins, so "list pods and services" only lists pods.
pub fn classify(question: &str) -> Intent {
    let q = question.to_lowercase();

    if q.contains("list") {
        if mentions_pods(&q) {
            return Intent::ListPods;
        }
        if mentions_services(&q) {
            return Intent::ListServices;
        }
        if mentions_deployments(&q) {
            return Intent::ListDeployments;
        }
    }

    Intent::General {
        pods: mentions_pods(&q),
        services: mentions_services(&q),
        deployments: mentions_deployments(&q),
    }
}

/// True when the request or the question asks for cluster-wide data
pub fn wants_all_namespaces(question: &str, namespace: &str) -> bool {
    namespace == ALL_NAMESPACES || question.to_lowercase().contains("all namespaces")
}

/// Scope every fetch for this question uses
pub fn resolve_scope(question: &str, namespace: &str) -> NamespaceScope {
    if wants_all_namespaces(question, namespace) {
        NamespaceScope::All
    } else {
        NamespaceScope::Namespace(namespace.to_string())
    }
}
