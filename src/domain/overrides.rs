use crate::domain::ast::{DeclId, TranslationUnit};
use crate::domain::graph::CallGraph;

impl CallGraph {
    /// Links one virtual method to the methods it directly overrides. Returns the number of
    /// override pairs recorded; non-virtual methods record nothing.
    ///
    /// Multiple inheritance yields one entry per path. Deeper levels of the hierarchy are not
    /// collected here: each level records its own immediate overrides when it is visited.
    pub fn link_method_overrides(&mut self, tu: &TranslationUnit, method: DeclId) -> usize {
        let Some(decl) = tu.decl(method) else {
            return 0;
        };
        if !decl.kind.is_method() || !decl.is_virtual {
            return 0;
        }
        if !self.include_in_graph(tu, method) {
            return 0;
        }

        let node = self.get_or_insert_node(tu, Some(method));
        let mut linked = 0;
        for &overridden in &decl.overridden_methods {
            if !self.include_in_graph(tu, overridden) {
                continue;
            }
            let overridden_node = self.get_or_insert_node(tu, Some(overridden));
            self.add_overridden_method(node, overridden_node);
            self.add_overridden_by(overridden_node, node);
            linked += 1;
        }
        linked
    }

    /// Override sweep over every method in the unit, independent of body walking.
    pub fn link_overrides(&mut self, tu: &TranslationUnit) -> usize {
        tu.walk_decls()
            .into_iter()
            .map(|id| self.link_method_overrides(tu, id))
            .sum()
    }
}
