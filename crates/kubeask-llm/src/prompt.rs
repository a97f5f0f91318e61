//! Prompt construction for cluster questions

use serde_json::Value;

use kubeask_types::{ClusterSnapshot, ResourceKind};

/// Sentence the model is told to reply with when the snapshot can't answer
pub const FALLBACK_ANSWER: &str = "I don't have enough information from the snapshot.";

/// Build the prompt sent to the model for a question.
///
/// Kinds missing from the snapshot are rendered as empty arrays so the model
/// always sees all three keys.
pub fn build_prompt(snapshot: &ClusterSnapshot, question: &str) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(snapshot)?;
    if let Some(map) = value.as_object_mut() {
        for kind in ResourceKind::ALL {
            map.entry(kind.as_str())
                .or_insert_with(|| Value::Array(Vec::new()));
        }
    }
    let snapshot_json = serde_json::to_string_pretty(&value)?;

    Ok(format!(
        "You are a Kubernetes assistant.

Here is the live cluster snapshot (JSON):
{snapshot_json}

RULES:
- Only use this snapshot to answer the user's question.
- Explicitly include namespaces (like kube-system, default, etc.) if present.
- Do NOT suggest kubectl commands.
- If the information is not in the snapshot, reply exactly: \"{FALLBACK_ANSWER}\"

User question:
{question}

Answer concisely using ONLY the snapshot.
"
    ))
}
