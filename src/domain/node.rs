use crate::domain::ast::{Decl, DeclKind};
use crate::domain::identity::CanonicalId;

/// Label printed for the root node.
pub const ROOT_LABEL: &str = "< root >";

/// Label printed for nodes without a derivable name.
pub const UNNAMED_LABEL: &str = "< >";

/// Call graph node: one per canonical identity.
///
/// Names are captured when the node is created so the finished graph can be read without the
/// translation unit that produced it.
#[derive(Debug, Clone)]
pub struct CallGraphNode {
    pub id: CanonicalId,
    pub kind: Option<DeclKind>, // None for root
    pub name: Option<String>,
    pub qualified_name: Option<String>,
}

impl CallGraphNode {
    pub fn root() -> Self {
        Self {
            id: CanonicalId::Root,
            kind: None,
            name: None,
            qualified_name: None,
        }
    }

    pub fn for_decl(id: CanonicalId, decl: Option<&Decl>) -> Self {
        Self {
            id,
            kind: decl.map(|d| d.kind),
            name: decl.and_then(|d| d.name.clone()),
            qualified_name: decl.and_then(|d| d.display_name().map(String::from)),
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == CanonicalId::Root
    }

    /// Qualified name, `< root >`, or `< >`.
    pub fn label(&self) -> &str {
        if self.is_root() {
            return ROOT_LABEL;
        }
        self.qualified_name.as_deref().unwrap_or(UNNAMED_LABEL)
    }

    /// Unqualified name, as used by the Graphviz export.
    pub fn short_label(&self) -> &str {
        if self.is_root() {
            return ROOT_LABEL;
        }
        self.name.as_deref().unwrap_or(UNNAMED_LABEL)
    }
}
