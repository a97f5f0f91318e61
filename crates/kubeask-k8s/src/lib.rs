//! Kubernetes client for kubeask
//!
//! This crate provides the cluster reader: credential resolution, the
//! namespaced and cluster-wide list calls for pods, services and
//! deployments, and the formatters that turn API objects into summaries.

mod client;
mod format;

use async_trait::async_trait;

pub use client::KubeClient;
pub use format::{format_deployment, format_pod, format_service};

// Re-export types that are used in our public API
pub use kubeask_types::{
    DeploymentSummary, Fetched, NamespaceScope, PodSummary, ResourceKind, ResourceList,
    ServiceSummary,
};

/// Read access to the cluster.
///
/// Implementations never fail: a broken call comes back as
/// [`Fetched::Error`] so callers can keep assembling other kinds.
#[async_trait]
pub trait ClusterReader: Send + Sync {
    async fn pods(&self, scope: &NamespaceScope, label_selector: Option<&str>)
        -> Fetched<PodSummary>;

    async fn services(&self, scope: &NamespaceScope) -> Fetched<ServiceSummary>;

    async fn deployments(&self, scope: &NamespaceScope) -> Fetched<DeploymentSummary>;

    /// Fetch one kind without a label selector
    async fn fetch(&self, kind: ResourceKind, scope: &NamespaceScope) -> ResourceList {
        match kind {
            ResourceKind::Pod => ResourceList::Pods(self.pods(scope, None).await),
            ResourceKind::Service => ResourceList::Services(self.services(scope).await),
            ResourceKind::Deployment => ResourceList::Deployments(self.deployments(scope).await),
        }
    }
}
