use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use kubeask_k8s::ClusterReader;
use kubeask_llm::{ModelInvoker, build_prompt};
use kubeask_types::{Answer, ClusterSnapshot, QueryResult, ResourceList};

use crate::classify::{classify, resolve_scope};

/// How a question will be answered
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plan {
    /// Return this list as-is, no model call
    ShortCircuit(ResourceList),
    /// Ask the model with this snapshot
    Forward(ClusterSnapshot),
}

/// Classify a question and fetch what it needs.
///
/// Kinds are fetched one after another. A failed fetch sits in its own slot
/// as an error payload and does not stop the remaining kinds.
pub async fn assemble(reader: &dyn ClusterReader, question: &str, namespace: &str) -> Plan {
    let intent = classify(question);
    let scope = resolve_scope(question, namespace);
    debug!(?intent, %scope, "classified question");

    if let Some(kind) = intent.list_kind() {
        return Plan::ShortCircuit(reader.fetch(kind, &scope).await);
    }

    let mut snapshot = ClusterSnapshot::new(namespace);
    for kind in intent.kinds() {
        snapshot.insert(reader.fetch(kind, &scope).await);
    }
    Plan::Forward(snapshot)
}

/// Answers questions about the cluster
#[derive(Clone)]
pub struct QueryEngine {
    reader: Arc<dyn ClusterReader>,
    model: Arc<dyn ModelInvoker>,
}

impl QueryEngine {
    pub fn new(reader: Arc<dyn ClusterReader>, model: Arc<dyn ModelInvoker>) -> Self {
        Self { reader, model }
    }

    /// Answer a question scoped to a namespace (or `"all"`).
    ///
    /// Only a failed model call is an error; cluster failures end up inside
    /// the answer or the snapshot.
    pub async fn answer(&self, question: &str, namespace: &str) -> Result<QueryResult> {
        match assemble(self.reader.as_ref(), question, namespace).await {
            Plan::ShortCircuit(list) => {
                info!(kind = %list.kind(), "answering list question without model");
                Ok(QueryResult {
                    answer: Answer::Resources(list),
                })
            }
            Plan::Forward(snapshot) => {
                let prompt =
                    build_prompt(&snapshot, question).context("Failed to build model prompt")?;
                info!(
                    namespace,
                    empty_snapshot = snapshot.is_empty(),
                    "forwarding question to model"
                );
                let text = self.model.invoke(&prompt).await?;
                Ok(QueryResult {
                    answer: Answer::Text(text),
                })
            }
        }
    }
}
