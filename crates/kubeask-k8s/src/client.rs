//! Kubernetes client wrapper

use std::fmt::Debug;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Pod, Service};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::ClusterReader;
use crate::format::{format_deployment, format_pod, format_service};
use kubeask_types::{DeploymentSummary, Fetched, NamespaceScope, PodSummary, ServiceSummary};

/// Kubernetes client wrapper
#[derive(Clone)]
pub struct KubeClient {
    client: kube::Client,
}

impl KubeClient {
    /// Resolve credentials and build a client.
    ///
    /// An explicit kubeconfig path wins; otherwise the default kubeconfig is
    /// tried (`KUBECONFIG`, colon-separated lists merged, then
    /// `~/.kube/config`), and failing that the in-cluster service account.
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self> {
        let config = Self::resolve_config(kubeconfig)
            .await
            .context("Failed to load kube config")?;

        let client =
            kube::Client::try_from(config).context("Failed to create Kubernetes client")?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn from_client(client: kube::Client) -> Self {
        Self { client }
    }

    async fn resolve_config(kubeconfig: Option<&Path>) -> Result<kube::Config> {
        if let Some(path) = kubeconfig {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
            return kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .with_context(|| format!("Invalid kubeconfig {}", path.display()));
        }

        match Kubeconfig::read() {
            Ok(kubeconfig) => {
                kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .context("Invalid default kubeconfig")
            }
            Err(e) => {
                debug!(error = %e, "no local kubeconfig, falling back to in-cluster config");
                kube::Config::incluster().context("Failed to load in-cluster config")
            }
        }
    }

    /// Api handle for a namespaced resource type at the given scope
    fn api<K>(&self, scope: &NamespaceScope) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        match scope {
            NamespaceScope::All => Api::all(self.client.clone()),
            NamespaceScope::Namespace(ns) => Api::namespaced(self.client.clone(), ns),
        }
    }

    /// List objects, turning API failures into an error payload
    async fn list<K, S, F>(
        &self,
        scope: &NamespaceScope,
        params: &ListParams,
        format: F,
    ) -> Fetched<S>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
        F: Fn(K) -> S,
    {
        let kind = K::kind(&Default::default()).to_string();
        match self.api::<K>(scope).list(params).await {
            Ok(list) => {
                debug!(%kind, %scope, count = list.items.len(), "listed resources");
                Fetched::Items(list.items.into_iter().map(format).collect())
            }
            Err(e) => {
                warn!(%kind, %scope, error = %e, "list call failed");
                Fetched::error(e.to_string())
            }
        }
    }
}

#[async_trait]
impl ClusterReader for KubeClient {
    async fn pods(
        &self,
        scope: &NamespaceScope,
        label_selector: Option<&str>,
    ) -> Fetched<PodSummary> {
        let mut params = ListParams::default();
        if let Some(selector) = label_selector {
            params = params.labels(selector);
        }
        self.list::<Pod, _, _>(scope, &params, format_pod).await
    }

    async fn services(&self, scope: &NamespaceScope) -> Fetched<ServiceSummary> {
        self.list::<Service, _, _>(scope, &ListParams::default(), format_service)
            .await
    }

    async fn deployments(&self, scope: &NamespaceScope) -> Fetched<DeploymentSummary> {
        self.list::<Deployment, _, _>(scope, &ListParams::default(), format_deployment)
            .await
    }
}
