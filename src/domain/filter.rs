use crate::domain::ast::Decl;
use crate::domain::options::GraphOptions;

/// Whether `decl` may ever become a call graph node.
///
/// Bodiless declarations are kept so partial graphs of several units can be merged on shared
/// identity later.
pub fn include_in_graph(decl: &Decl, options: &GraphOptions) -> bool {
    // Template-dependent code only has call semantics once instantiated.
    if decl.dependent_context {
        return false;
    }

    if decl.kind.is_function()
        && !options.inline_prefix.is_empty()
        && let Some(name) = &decl.name
        && name.starts_with(&options.inline_prefix)
    {
        return false;
    }

    true
}
