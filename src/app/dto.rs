use crate::domain::builder::BuildStats;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct UnitSummary {
    pub unit: String,
    pub node_count: usize,
    pub call_edge_count: usize,
    pub override_pairs: usize,
    pub stats: BuildStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphDump {
    pub unit: String,
    pub stats: BuildStats,
    /// Nodes in reverse postorder from root.
    pub nodes: Vec<NodeDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeDto {
    pub label: String,
    pub kind: Option<String>,
    /// Mangled key; `__NO_NAME__` when no stable key exists. Absent for root.
    pub key: Option<String>,
    pub callees: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overridden_by: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalleesResponse {
    pub unit: String,
    pub function: String,
    pub callees: Vec<String>,
    pub callers: Vec<String>,
    pub overrides: Vec<String>,
    pub overridden_by: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyEntry {
    pub unit: String,
    pub key: String,
    pub label: String,
}
