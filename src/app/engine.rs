use crate::adapters::json::adapter::JsonUnitSource;
use crate::app::dto::*;
use crate::domain::ast::TranslationUnit;
use crate::domain::builder::GraphBuilder;
use crate::domain::edge::EdgeKind;
use crate::domain::graph::CallGraph;
use crate::domain::identity::{self, CanonicalId};
use crate::domain::options::GraphOptions;
use crate::domain::ports::TranslationUnitSource;
use anyhow::{Context as _, Result, anyhow};
use petgraph::graph::NodeIndex;
use std::path::Path;

/// A unit together with the graph built from it.
pub struct UnitGraph {
    pub unit: TranslationUnit,
    pub graph: CallGraph,
}

/// Application service: loads units, builds one graph per unit and answers queries.
pub struct CallGraphEngine {
    units: Vec<UnitGraph>,
}

impl CallGraphEngine {
    /// Construct an engine from already-parsed units.
    pub fn from_units(units: Vec<TranslationUnit>, options: GraphOptions) -> Self {
        let builder = GraphBuilder::new(options);
        let units = units
            .into_iter()
            .map(|unit| {
                let graph = builder.build(&unit);
                UnitGraph { unit, graph }
            })
            .collect();
        Self { units }
    }

    pub fn load(source: &dyn TranslationUnitSource, options: GraphOptions) -> Result<Self> {
        let units = source.load()?;
        tracing::debug!(units = units.len(), "loaded translation units");
        Ok(Self::from_units(units, options))
    }

    pub fn load_from_json(json_path: &Path, options: GraphOptions) -> Result<Self> {
        let source = JsonUnitSource::new(json_path);
        Self::load(&source, options)
            .with_context(|| format!("Failed to build call graphs from {}", json_path.display()))
    }

    pub fn units(&self) -> &[UnitGraph] {
        &self.units
    }

    pub fn summaries(&self) -> Vec<UnitSummary> {
        self.units
            .iter()
            .map(|ug| UnitSummary {
                unit: ug.unit.name.clone(),
                node_count: ug.graph.node_count(),
                call_edge_count: ug.graph.call_edge_count(),
                override_pairs: ug
                    .graph
                    .graph
                    .edge_weights()
                    .filter(|w| **w == EdgeKind::Overrides)
                    .count(),
                stats: *ug.graph.stats(),
            })
            .collect()
    }

    /// Text dumps of every unit, concatenated.
    pub fn dump(&self) -> String {
        self.units.iter().map(|ug| ug.graph.dump()).collect()
    }

    pub fn dot(&self) -> String {
        self.units.iter().map(|ug| ug.graph.to_dot()).collect()
    }

    pub fn graph_dumps(&self) -> Vec<GraphDump> {
        self.units.iter().map(graph_dump).collect()
    }

    /// Callees, callers and override relations of every node named `qualified_name`.
    pub fn callees(&self, qualified_name: &str) -> Result<Vec<CalleesResponse>> {
        let found: Vec<CalleesResponse> = self
            .units
            .iter()
            .filter_map(|ug| {
                let idx = ug.graph.get_node_by_name(qualified_name)?;
                let g = &ug.graph;
                Some(CalleesResponse {
                    unit: ug.unit.name.clone(),
                    function: g.label(idx).to_string(),
                    callees: labels(g, g.callees(idx)),
                    callers: labels(g, g.callers(idx)),
                    overrides: labels(g, g.overrides(idx)),
                    overridden_by: labels(g, g.overridden_by(idx)),
                })
            })
            .collect();
        if found.is_empty() {
            return Err(anyhow!("Function not found: {}", qualified_name));
        }
        Ok(found)
    }

    /// Stable keys of every node, sorted per unit.
    pub fn keys(&self) -> Vec<KeyEntry> {
        let mut out = Vec::new();
        for ug in &self.units {
            let mut entries: Vec<KeyEntry> = ug
                .graph
                .keys()
                .map(|(key, idx)| KeyEntry {
                    unit: ug.unit.name.clone(),
                    key: key.to_string(),
                    label: ug.graph.label(idx).to_string(),
                })
                .collect();
            entries.sort_by(|a, b| a.key.cmp(&b.key));
            out.extend(entries);
        }
        out
    }
}

fn labels(g: &CallGraph, nodes: Vec<NodeIndex>) -> Vec<String> {
    nodes.into_iter().map(|n| g.label(n).to_string()).collect()
}

fn graph_dump(ug: &UnitGraph) -> GraphDump {
    let g = &ug.graph;
    let nodes = g
        .reverse_post_order()
        .into_iter()
        .map(|idx| {
            let node = g.node(idx);
            let key = match node.id {
                CanonicalId::Root => None,
                CanonicalId::Decl(decl) => Some(identity::mangled_key(&ug.unit, decl).to_string()),
            };
            NodeDto {
                label: node.label().to_string(),
                kind: node.kind.map(|k| format!("{:?}", k)),
                key,
                callees: labels(g, g.callees(idx)),
                overrides: labels(g, g.overrides(idx)),
                overridden_by: labels(g, g.overridden_by(idx)),
            }
        })
        .collect();
    GraphDump {
        unit: ug.unit.name.clone(),
        stats: *g.stats(),
        nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::{Decl, DeclKind, Stmt};

    fn unit() -> TranslationUnit {
        let mut tu = TranslationUnit::new("engine.cpp");
        let b = tu.add_top_level(Decl::function("b").params(["int"]));
        tu.add_top_level(Decl::function("a").with_body(Stmt::call(b, vec![])));
        let base = tu.add_top_level(
            Decl::new(DeclKind::Method, "f")
                .qualified("Base::f")
                .virtual_method(),
        );
        tu.add_top_level(
            Decl::new(DeclKind::Method, "f")
                .qualified("Derived::f")
                .virtual_method()
                .overrides(base),
        );
        tu
    }

    #[test]
    fn summary_counts_nodes_edges_and_overrides() {
        let engine = CallGraphEngine::from_units(vec![unit()], GraphOptions::default());
        let summary = &engine.summaries()[0];
        assert_eq!(summary.node_count, 5);
        assert_eq!(summary.call_edge_count, 5, "four root edges plus a -> b");
        assert_eq!(summary.override_pairs, 1);
    }

    #[test]
    fn overrides_can_be_skipped() {
        let opts = GraphOptions {
            link_overrides: false,
            ..GraphOptions::default()
        };
        let engine = CallGraphEngine::from_units(vec![unit()], opts);
        assert_eq!(engine.summaries()[0].override_pairs, 0);
    }

    #[test]
    fn callees_query_reports_relations() {
        let engine = CallGraphEngine::from_units(vec![unit()], GraphOptions::default());
        let a = &engine.callees("a").unwrap()[0];
        assert_eq!(a.callees, vec!["b"]);
        assert_eq!(a.callers, vec!["< root >"]);

        let base = &engine.callees("Base::f").unwrap()[0];
        assert_eq!(base.overridden_by, vec!["Derived::f"]);
        assert!(engine.callees("nope").is_err());
    }

    #[test]
    fn graph_dump_starts_at_root_and_carries_keys() {
        let engine = CallGraphEngine::from_units(vec![unit()], GraphOptions::default());
        let dump = &engine.graph_dumps()[0];
        assert_eq!(dump.nodes[0].label, "< root >");
        assert!(dump.nodes[0].key.is_none());
        let b = dump.nodes.iter().find(|n| n.label == "b").unwrap();
        assert_eq!(b.key.as_deref(), Some("_Z1bi"));
    }

    #[test]
    fn keys_are_sorted() {
        let engine = CallGraphEngine::from_units(vec![unit()], GraphOptions::default());
        let keys: Vec<String> = engine.keys().into_iter().map(|k| k.key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(keys.contains(&"_ZN4Base1fEv".to_string()));
    }
}
