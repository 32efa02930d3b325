use crate::domain::ast::{DeclId, TranslationUnit};
use crate::domain::builder::BuildStats;
use crate::domain::edge::EdgeKind;
use crate::domain::filter;
use crate::domain::identity::{self, CanonicalId, MangledKey};
use crate::domain::node::CallGraphNode;
use crate::domain::options::GraphOptions;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Call Graph - the node/edge store
///
/// Owns every node; edges are indices into the same arena, so recursion and override cycles
/// need no ownership tree. The root is created with the graph and calls every other node.
pub struct CallGraph {
    /// The directed graph of nodes and call/override edges
    pub graph: DiGraph<CallGraphNode, EdgeKind>,

    /// Mapping from canonical identity to node index
    id_to_node: HashMap<CanonicalId, NodeIndex>,

    /// Mapping from mangled key to node, filled as nodes are created. The first node to claim
    /// a key keeps it: virtual redeclarations share a key but not an identity.
    key_to_node: HashMap<MangledKey, NodeIndex>,

    root: NodeIndex,
    options: GraphOptions,
    stats: BuildStats,
}

impl Default for CallGraph {
    fn default() -> Self {
        Self::new(GraphOptions::default())
    }
}

impl CallGraph {
    pub fn new(options: GraphOptions) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(CallGraphNode::root());
        let mut id_to_node = HashMap::new();
        id_to_node.insert(CanonicalId::Root, root);
        Self {
            graph,
            id_to_node,
            key_to_node: HashMap::new(),
            root,
            options,
            stats: BuildStats::default(),
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub(crate) fn record_stats(&mut self, stats: &BuildStats) {
        self.stats += stats;
    }

    pub fn include_in_graph(&self, tu: &TranslationUnit, decl: DeclId) -> bool {
        tu.decl(decl)
            .is_some_and(|d| filter::include_in_graph(d, &self.options))
    }

    /// Returns the node for `decl`'s identity, creating it (and the root edge to it) on first
    /// touch. `None` is the root.
    pub fn get_or_insert_node(&mut self, tu: &TranslationUnit, decl: Option<DeclId>) -> NodeIndex {
        let id = identity::resolve(tu, decl);
        if let Some(&idx) = self.id_to_node.get(&id) {
            return idx;
        }

        let CanonicalId::Decl(decl_id) = id else {
            return self.root;
        };
        let idx = self
            .graph
            .add_node(CallGraphNode::for_decl(id, tu.decl(decl_id)));
        self.id_to_node.insert(id, idx);

        let key = identity::mangled_key(tu, decl_id);
        if key.is_stable() {
            if let Some(&owner) = self.key_to_node.get(&key) {
                tracing::debug!(
                    key = %key,
                    owner = self.graph[owner].label(),
                    "key already claimed; node reachable by identity only"
                );
            } else {
                self.key_to_node.insert(key, idx);
            }
        }

        // Make root a parent of every node so all are reachable.
        self.graph.add_edge(self.root, idx, EdgeKind::Call);
        tracing::trace!(node = self.graph[idx].label(), "created call graph node");
        idx
    }

    /// Lookup without insertion.
    pub fn get_node(&self, tu: &TranslationUnit, decl: Option<DeclId>) -> Option<NodeIndex> {
        self.get_node_by_id(identity::resolve(tu, decl))
    }

    pub fn get_node_by_id(&self, id: CanonicalId) -> Option<NodeIndex> {
        self.id_to_node.get(&id).copied()
    }

    /// The first node created under `key`.
    pub fn get_node_by_key(&self, key: &MangledKey) -> Option<NodeIndex> {
        self.key_to_node.get(key).copied()
    }

    /// First node whose qualified name matches.
    pub fn get_node_by_name(&self, qualified_name: &str) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&idx| self.graph[idx].qualified_name.as_deref() == Some(qualified_name))
    }

    /// Every node with a stable key, keyed for cross-unit correlation.
    pub fn keys(&self) -> impl Iterator<Item = (&MangledKey, NodeIndex)> {
        self.key_to_node.iter().map(|(k, &v)| (k, v))
    }

    /// Appends a call edge. Parallel edges are allowed: one per discovered call site.
    pub fn add_callee(&mut self, caller: NodeIndex, callee: NodeIndex) {
        debug_assert_ne!(callee, self.root, "no one can call the root node");
        self.graph.add_edge(caller, callee, EdgeKind::Call);
    }

    pub fn add_overridden_method(&mut self, node: NodeIndex, overridden: NodeIndex) {
        self.add_unique_edge(node, overridden, EdgeKind::Overrides);
    }

    pub fn add_overridden_by(&mut self, node: NodeIndex, overrider: NodeIndex) {
        self.add_unique_edge(node, overrider, EdgeKind::OverriddenBy);
    }

    fn add_unique_edge(&mut self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) {
        let exists = self
            .graph
            .edges_connecting(from, to)
            .any(|e| *e.weight() == kind);
        if !exists {
            self.graph.add_edge(from, to, kind);
        }
    }

    pub fn node(&self, idx: NodeIndex) -> &CallGraphNode {
        &self.graph[idx]
    }

    pub fn label(&self, idx: NodeIndex) -> &str {
        self.graph[idx].label()
    }

    /// Call targets of `idx` in insertion order, one entry per call edge.
    pub fn callees(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.targets(idx, EdgeKind::Call)
    }

    pub fn overrides(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.targets(idx, EdgeKind::Overrides)
    }

    pub fn overridden_by(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.targets(idx, EdgeKind::OverriddenBy)
    }

    /// Nodes with a call edge into `idx` (root included).
    pub fn callers(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|e| e.weight().is_call())
            .map(|e| e.source())
            .collect();
        out.reverse();
        out
    }

    fn targets(&self, idx: NodeIndex, kind: EdgeKind) -> Vec<NodeIndex> {
        // petgraph lists outgoing edges newest first
        let mut out: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| *e.weight() == kind)
            .map(|e| e.target())
            .collect();
        out.reverse();
        out
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn call_edge_count(&self) -> usize {
        self.graph
            .edge_references()
            .filter(|e| e.weight().is_call())
            .count()
    }
}
