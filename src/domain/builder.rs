use crate::domain::ast::{DeclId, DeclKind, Stmt, TranslationUnit};
use crate::domain::graph::CallGraph;
use crate::domain::options::GraphOptions;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::HashSet;
use std::ops::AddAssign;

/// Edge-discovery statistics, threaded through the walker and accumulated on the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Declarations whose bodies were walked.
    pub bodies_walked: usize,
    /// Call expressions visited.
    pub call_sites: usize,
    /// Calls recognized as invoking a block literal in place.
    pub block_call_edges: usize,
    /// Message sends resolved to an implementation in the same unit.
    pub message_call_edges: usize,
    /// Edges added by the function-pointer-argument heuristic.
    pub function_pointer_edges: usize,
}

impl AddAssign<&BuildStats> for BuildStats {
    fn add_assign(&mut self, rhs: &BuildStats) {
        self.bodies_walked += rhs.bodies_walked;
        self.call_sites += rhs.call_sites;
        self.block_call_edges += rhs.block_call_edges;
        self.message_call_edges += rhs.message_call_edges;
        self.function_pointer_edges += rhs.function_pointer_edges;
    }
}

/// Walks one body and locates all of its call sites.
struct CallSiteWalker<'a> {
    graph: &'a mut CallGraph,
    tu: &'a TranslationUnit,
    caller: NodeIndex,
    stats: BuildStats,
}

impl<'a> CallSiteWalker<'a> {
    fn new(graph: &'a mut CallGraph, tu: &'a TranslationUnit, caller: NodeIndex) -> Self {
        Self {
            graph,
            tu,
            caller,
            stats: BuildStats::default(),
        }
    }

    fn visit(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Call { .. } => self.visit_call(stmt),
            Stmt::MessageSend {
                receiver_interface,
                selector,
                instance,
                ..
            } => self.visit_message_send(*receiver_interface, selector, *instance),
            Stmt::BlockLiteral { .. }
            | Stmt::AddrOf { .. }
            | Stmt::DeclRef { .. }
            | Stmt::Paren { .. }
            | Stmt::ImplicitCast { .. }
            | Stmt::Other { .. } => {}
        }
        self.visit_children(stmt);
    }

    fn visit_children(&mut self, stmt: &Stmt) {
        for child in stmt.children() {
            self.visit(child);
        }
    }

    fn visit_call(&mut self, call: &Stmt) {
        self.stats.call_sites += 1;
        if let Some(decl) = self.decl_from_call(call) {
            self.add_called_decl(decl);
        }
        if self.graph.options().function_pointer_heuristic {
            self.handle_function_pointer_in_arguments(call);
        }
    }

    /// The direct callee, or the block literal invoked in place.
    fn decl_from_call(&mut self, call: &Stmt) -> Option<DeclId> {
        let Stmt::Call { callee, target, .. } = call else {
            return None;
        };
        if let Some(callee) = *callee {
            return Some(callee);
        }
        if let Stmt::BlockLiteral { decl } = target.ignore_paren_imp_casts() {
            self.stats.block_call_edges += 1;
            return Some(*decl);
        }
        None
    }

    /// `x(&f)`: assume `x` calls `f`. Purely syntactic; only the direct callee of the call gets
    /// the edge, never the enclosing caller.
    fn handle_function_pointer_in_arguments(&mut self, call: &Stmt) {
        let Stmt::Call {
            callee: Some(callee),
            args,
            ..
        } = call
        else {
            return;
        };
        if !self.is_function(*callee) {
            return;
        }
        for arg in args {
            let Stmt::AddrOf { operand } = arg else {
                continue;
            };
            let Stmt::DeclRef { decl } = operand.as_ref() else {
                continue;
            };
            if self.is_function(*decl) && self.add_called_decl_from(*callee, *decl) {
                self.stats.function_pointer_edges += 1;
                tracing::trace!(
                    callee = self.tu.decl(*callee).and_then(|d| d.display_name()),
                    target = self.tu.decl(*decl).and_then(|d| d.display_name()),
                    "function pointer argument edge"
                );
            }
        }
    }

    /// Message sends: look the selector up on the receiver's static interface within this unit.
    fn visit_message_send(&mut self, interface: Option<DeclId>, selector: &str, instance: bool) {
        let Some(interface) = interface else {
            return;
        };
        if let Some(method) = self.tu.lookup_method(interface, selector, instance) {
            self.add_called_decl(method);
            self.stats.message_call_edges += 1;
        }
    }

    fn is_function(&self, decl: DeclId) -> bool {
        self.tu.decl(decl).is_some_and(|d| d.kind.is_function())
    }

    // add a called decl to the current caller
    fn add_called_decl(&mut self, callee: DeclId) {
        if !self.graph.include_in_graph(self.tu, callee) {
            return;
        }
        let callee_node = self.graph.get_or_insert_node(self.tu, Some(callee));
        self.graph.add_callee(self.caller, callee_node);
    }

    // add a called decl to another caller; returns whether an edge was added
    fn add_called_decl_from(&mut self, caller: DeclId, callee: DeclId) -> bool {
        if !self.graph.include_in_graph(self.tu, caller)
            || !self.graph.include_in_graph(self.tu, callee)
        {
            return false;
        }
        let caller_node = self.graph.get_or_insert_node(self.tu, Some(caller));
        let callee_node = self.graph.get_or_insert_node(self.tu, Some(callee));
        self.graph.add_callee(caller_node, callee_node);
        true
    }
}

impl CallGraph {
    /// Inserts `decl`'s node and walks its body, if any.
    pub fn add_node_for_decl(&mut self, tu: &TranslationUnit, decl: DeclId) -> BuildStats {
        let node = self.get_or_insert_node(tu, Some(decl));
        let Some(body) = tu.decl(decl).and_then(|d| d.body.as_ref()) else {
            return BuildStats::default();
        };

        let mut walker = CallSiteWalker::new(self, tu, node);
        walker.visit(body);
        let mut stats = walker.stats;
        stats.bodies_walked += 1;

        tracing::debug!(
            decl = tu.decl(decl).and_then(|d| d.display_name()),
            call_sites = stats.call_sites,
            "walked body"
        );
        self.record_stats(&stats);
        stats
    }

    /// Adds nodes for every block declared (transitively) inside `decl`'s context.
    pub fn add_nodes_for_blocks(&mut self, tu: &TranslationUnit, decl: DeclId) -> BuildStats {
        self.add_nodes_for_blocks_in(tu, decl, &mut HashSet::new())
    }

    // Contexts are visited once each; a malformed unit may nest a context inside itself.
    fn add_nodes_for_blocks_in(
        &mut self,
        tu: &TranslationUnit,
        decl: DeclId,
        seen: &mut HashSet<DeclId>,
    ) -> BuildStats {
        let mut stats = BuildStats::default();
        if !seen.insert(decl) {
            return stats;
        }
        let Some(d) = tu.decl(decl) else {
            return stats;
        };
        if d.kind == DeclKind::Block && self.include_in_graph(tu, decl) {
            stats += &self.add_node_for_decl(tu, decl);
        }
        for &child in &d.children {
            stats += &self.add_nodes_for_blocks_in(tu, child, seen);
        }
        stats
    }

    /// Top-level sweep: every included function-like declaration gets a node, its nested blocks
    /// first, then its own body.
    pub fn add_translation_unit(&mut self, tu: &TranslationUnit) -> BuildStats {
        let mut stats = BuildStats::default();
        for id in tu.walk_decls() {
            let Some(decl) = tu.decl(id) else {
                continue;
            };
            // Blocks are reached through their enclosing declaration.
            if !decl.kind.is_callable() || decl.kind == DeclKind::Block {
                continue;
            }
            if !self.include_in_graph(tu, id) {
                tracing::trace!(decl = decl.display_name(), "excluded from call graph");
                continue;
            }
            let mut seen = HashSet::from([id]);
            for &child in &decl.children {
                stats += &self.add_nodes_for_blocks_in(tu, child, &mut seen);
            }
            stats += &self.add_node_for_decl(tu, id);
        }
        stats
    }
}

/// Graph builder - Domain Service constructing a CallGraph from translation units
pub struct GraphBuilder {
    options: GraphOptions,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(GraphOptions::default())
    }
}

impl GraphBuilder {
    pub fn new(options: GraphOptions) -> Self {
        Self { options }
    }

    /// Two-pass build over one unit: body walking, then override linking.
    ///
    /// Declaration ids are unit-local, so every unit gets its own graph.
    pub fn build(&self, tu: &TranslationUnit) -> CallGraph {
        let mut graph = CallGraph::new(self.options.clone());

        // Pass 1: call edges
        let stats = graph.add_translation_unit(tu);

        // Pass 2: override lattice
        let linked = if self.options.link_overrides {
            graph.link_overrides(tu)
        } else {
            0
        };

        tracing::info!(
            unit = %tu.name,
            nodes = graph.node_count(),
            call_edges = graph.call_edge_count(),
            block_calls = stats.block_call_edges,
            message_calls = stats.message_call_edges,
            overrides = linked,
            "built call graph"
        );
        graph
    }
}
