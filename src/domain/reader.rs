//! Deterministic observation of a finished graph: reverse-postorder enumeration, the text dump
//! and the Graphviz export.

use crate::domain::edge::EdgeKind;
use crate::domain::graph::CallGraph;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{DfsPostOrder, EdgeFiltered, EdgeRef};
use std::collections::HashMap;
use std::fmt::{self, Write};

impl CallGraph {
    /// Nodes reachable from root over call edges, in reverse postorder. Root comes first.
    ///
    /// The order only depends on insertion order, so enumerating an unmodified graph twice
    /// yields the same sequence.
    pub fn reverse_post_order(&self) -> Vec<NodeIndex> {
        let calls = EdgeFiltered::from_fn(&self.graph, |e| e.weight().is_call());
        let mut dfs = DfsPostOrder::new(&calls, self.root());
        let mut order = Vec::with_capacity(self.node_count());
        while let Some(idx) = dfs.next(&calls) {
            order.push(idx);
        }
        order.reverse();
        order
    }

    /// Human-readable dump, one line per node in reverse postorder.
    pub fn print(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, " --- Call graph Dump --- ")?;
        for idx in self.reverse_post_order() {
            write!(out, "  Function: {} calls: ", self.label(idx))?;
            for callee in self.callees(idx) {
                debug_assert_ne!(callee, self.root(), "no one can call the root node");
                write!(out, "{} ", self.label(callee))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.print(&mut out);
        out
    }

    /// Graphviz rendering of the call edges, labelled by unqualified names.
    pub fn to_dot(&self) -> String {
        let mut view: DiGraph<String, &str> = DiGraph::new();
        let mut mapped: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        for idx in self.reverse_post_order() {
            let label = self.node(idx).short_label().to_string();
            mapped.insert(idx, view.add_node(label));
        }
        for edge in self.graph.edge_references() {
            if *edge.weight() != EdgeKind::Call {
                continue;
            }
            if let (Some(&from), Some(&to)) = (mapped.get(&edge.source()), mapped.get(&edge.target()))
            {
                view.add_edge(from, to, "");
            }
        }
        format!("{}", Dot::with_config(&view, &[Config::EdgeNoLabel]))
    }
}
