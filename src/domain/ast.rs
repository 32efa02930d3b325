//! Host program representation: the contract between a parsing front-end and the call graph.
//!
//! The front-end lowers its syntax tree into a [`TranslationUnit`]: an arena of [`Decl`]s
//! addressed by [`DeclId`], plus the statement/expression trees of their bodies expressed as the
//! closed [`Stmt`] variant. Only the shapes the call graph cares about are distinguished; every
//! other construct is an [`Stmt::Other`] carrying its children.

use std::collections::{BTreeMap, HashSet};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Index of a declaration inside its translation unit's arena.
pub type DeclId = u32;

/// Declaration kind.
///
/// `Function`, `Method`, `Constructor` and `Destructor` form the statically bound function family;
/// `ObjCMethod` is dispatched by selector at runtime; `Block` is a block/closure literal's own
/// synthetic declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Function,
    Method,
    Constructor,
    Destructor,
    ObjCMethod,
    Block,
    Record,
    Interface,
    Namespace,
    Other,
}

impl DeclKind {
    /// Statically bound function family (free functions, member functions, ctors and dtors).
    pub fn is_function(self) -> bool {
        matches!(
            self,
            DeclKind::Function | DeclKind::Method | DeclKind::Constructor | DeclKind::Destructor
        )
    }

    /// Anything that may own a body and become a call graph node through the unit sweep.
    pub fn is_callable(self) -> bool {
        self.is_function() || matches!(self, DeclKind::ObjCMethod | DeclKind::Block)
    }

    /// Member functions that can take part in virtual overriding.
    pub fn is_method(self) -> bool {
        matches!(
            self,
            DeclKind::Method | DeclKind::Destructor | DeclKind::ObjCMethod
        )
    }
}

/// A declaration as handed over by the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    /// Position in [`TranslationUnit::decls`]; assigned by [`TranslationUnit::add`].
    #[serde(default)]
    pub id: DeclId,
    pub kind: DeclKind,
    /// Plain identifier, absent for anonymous entities (blocks, lambdas).
    #[serde(default)]
    pub name: Option<String>,
    /// Fully qualified name (`ns::Class::method`); falls back to `name` when absent.
    #[serde(default)]
    pub qualified_name: Option<String>,
    /// The canonical redeclaration representing every declaration of this entity.
    /// `None` means the declaration is its own canonical declaration.
    #[serde(default)]
    pub canonical: Option<DeclId>,
    /// Declared inside a template-dependent context.
    #[serde(default)]
    pub dependent_context: bool,
    #[serde(default)]
    pub is_virtual: bool,
    /// Methods this one directly overrides (one entry per inheritance path).
    #[serde(default)]
    pub overridden_methods: Vec<DeclId>,
    /// Declared with external linkage and C calling convention.
    #[serde(default)]
    pub extern_c: bool,
    /// The program entry point.
    #[serde(default)]
    pub is_main: bool,
    /// Parameter type spellings, used for mangled keys.
    #[serde(default)]
    pub param_types: Vec<String>,
    /// Declarations lexically contained in this declaration's context.
    #[serde(default)]
    pub children: Vec<DeclId>,
    /// Body, absent for forward declarations.
    #[serde(default)]
    pub body: Option<Stmt>,
    /// Interfaces only: superclass used for selector lookup.
    #[serde(default)]
    pub superclass: Option<DeclId>,
    /// Interfaces only: selector -> instance method implementation.
    #[serde(default)]
    pub instance_methods: BTreeMap<String, DeclId>,
    /// Interfaces only: selector -> class method implementation.
    #[serde(default)]
    pub class_methods: BTreeMap<String, DeclId>,
}

impl Decl {
    pub fn new(kind: DeclKind, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::anonymous(kind)
        }
    }

    pub fn anonymous(kind: DeclKind) -> Self {
        Self {
            id: 0,
            kind,
            name: None,
            qualified_name: None,
            canonical: None,
            dependent_context: false,
            is_virtual: false,
            overridden_methods: Vec::new(),
            extern_c: false,
            is_main: false,
            param_types: Vec::new(),
            children: Vec::new(),
            body: None,
            superclass: None,
            instance_methods: BTreeMap::new(),
            class_methods: BTreeMap::new(),
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(DeclKind::Function, name)
    }

    pub fn block() -> Self {
        Self::anonymous(DeclKind::Block)
    }

    pub fn with_body(mut self, body: Stmt) -> Self {
        self.body = Some(body);
        self
    }

    pub fn qualified(mut self, qualified_name: impl Into<String>) -> Self {
        self.qualified_name = Some(qualified_name.into());
        self
    }

    pub fn redeclares(mut self, canonical: DeclId) -> Self {
        self.canonical = Some(canonical);
        self
    }

    pub fn dependent(mut self) -> Self {
        self.dependent_context = true;
        self
    }

    pub fn virtual_method(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn overrides(mut self, overridden: DeclId) -> Self {
        self.overridden_methods.push(overridden);
        self
    }

    pub fn extern_c(mut self) -> Self {
        self.extern_c = true;
        self
    }

    pub fn entry_point(mut self) -> Self {
        self.is_main = true;
        self
    }

    pub fn params<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_child(mut self, child: DeclId) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_superclass(mut self, superclass: DeclId) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn with_instance_method(mut self, selector: impl Into<String>, method: DeclId) -> Self {
        self.instance_methods.insert(selector.into(), method);
        self
    }

    pub fn with_class_method(mut self, selector: impl Into<String>, method: DeclId) -> Self {
        self.class_methods.insert(selector.into(), method);
        self
    }

    /// Methods bound at runtime: selector-dispatched methods and virtual member functions.
    /// These keep a per-declaration identity instead of being canonicalized.
    pub fn is_dynamically_dispatched(&self) -> bool {
        match self.kind {
            DeclKind::ObjCMethod => true,
            DeclKind::Method | DeclKind::Destructor => self.is_virtual,
            _ => false,
        }
    }

    /// Qualified name if known, else the plain identifier.
    pub fn display_name(&self) -> Option<&str> {
        self.qualified_name.as_deref().or(self.name.as_deref())
    }
}

/// Statement/expression tree of a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    /// A call expression. `callee` is the directly bound function, when the front-end could
    /// resolve one; `target` is the callee expression as written.
    Call {
        #[serde(default)]
        callee: Option<DeclId>,
        target: Box<Stmt>,
        #[serde(default)]
        args: Vec<Stmt>,
    },
    /// A runtime-dispatched message send.
    MessageSend {
        /// Static interface type of the receiver, if known.
        #[serde(default)]
        receiver_interface: Option<DeclId>,
        selector: String,
        /// Instance dispatch (`true`) or class-level dispatch (`false`).
        #[serde(default = "default_instance")]
        instance: bool,
        #[serde(default)]
        receiver: Option<Box<Stmt>>,
        #[serde(default)]
        args: Vec<Stmt>,
    },
    /// A block/closure literal; its body lives on the referenced `Block` declaration.
    BlockLiteral { decl: DeclId },
    /// Unary address-of.
    AddrOf { operand: Box<Stmt> },
    /// A direct reference to a named declaration.
    DeclRef { decl: DeclId },
    Paren { inner: Box<Stmt> },
    ImplicitCast { inner: Box<Stmt> },
    /// Any other statement or expression.
    Other {
        #[serde(default)]
        children: Vec<Stmt>,
    },
}

fn default_instance() -> bool {
    true
}

impl Stmt {
    /// Depth-first structural decomposition. Block literals have no children: their bodies are
    /// reached through the block declaration.
    pub fn children(&self) -> Vec<&Stmt> {
        match self {
            Stmt::Call { target, args, .. } => {
                std::iter::once(target.as_ref()).chain(args.iter()).collect()
            }
            Stmt::MessageSend { receiver, args, .. } => {
                receiver.as_deref().into_iter().chain(args.iter()).collect()
            }
            Stmt::AddrOf { operand } => vec![operand.as_ref()],
            Stmt::Paren { inner } | Stmt::ImplicitCast { inner } => vec![inner.as_ref()],
            Stmt::Other { children } => children.iter().collect(),
            Stmt::BlockLiteral { .. } | Stmt::DeclRef { .. } => Vec::new(),
        }
    }

    /// Strips parentheses and implicit conversions.
    pub fn ignore_paren_imp_casts(&self) -> &Stmt {
        let mut current = self;
        while let Stmt::Paren { inner } | Stmt::ImplicitCast { inner } = current {
            current = inner.as_ref();
        }
        current
    }

    pub fn compound(children: Vec<Stmt>) -> Self {
        Stmt::Other { children }
    }

    pub fn decl_ref(decl: DeclId) -> Self {
        Stmt::DeclRef { decl }
    }

    /// `f(args...)` with `f` statically bound.
    pub fn call(callee: DeclId, args: Vec<Stmt>) -> Self {
        Stmt::Call {
            callee: Some(callee),
            target: Box::new(Stmt::ImplicitCast {
                inner: Box::new(Stmt::decl_ref(callee)),
            }),
            args,
        }
    }

    /// A call through an arbitrary expression with no statically bound callee.
    pub fn indirect_call(target: Stmt, args: Vec<Stmt>) -> Self {
        Stmt::Call {
            callee: None,
            target: Box::new(target),
            args,
        }
    }

    /// `(^{ ... })()`: invoking a block literal in place.
    pub fn call_block(block: DeclId) -> Self {
        Self::indirect_call(
            Stmt::Paren {
                inner: Box::new(Stmt::BlockLiteral { decl: block }),
            },
            Vec::new(),
        )
    }

    /// `&f`
    pub fn addr_of(decl: DeclId) -> Self {
        Stmt::AddrOf {
            operand: Box::new(Stmt::decl_ref(decl)),
        }
    }

    pub fn message(interface: DeclId, selector: impl Into<String>, instance: bool) -> Self {
        Stmt::MessageSend {
            receiver_interface: Some(interface),
            selector: selector.into(),
            instance,
            receiver: None,
            args: Vec::new(),
        }
    }
}

/// One parsed translation unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    #[serde(default)]
    pub name: String,
    /// Declaration arena; `decls[i].id == i`.
    pub decls: Vec<Decl>,
    /// Top-level declarations in source order.
    pub top_level: Vec<DeclId>,
}

impl TranslationUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a nested declaration, returning its id.
    pub fn add(&mut self, mut decl: Decl) -> DeclId {
        let id = self.decls.len() as DeclId;
        decl.id = id;
        self.decls.push(decl);
        id
    }

    /// Adds a declaration and lists it as top-level.
    pub fn add_top_level(&mut self, decl: Decl) -> DeclId {
        let id = self.add(decl);
        self.top_level.push(id);
        id
    }

    pub fn decl(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id as usize)
    }

    pub fn decl_mut(&mut self, id: DeclId) -> Option<&mut Decl> {
        self.decls.get_mut(id as usize)
    }

    /// The declaration representing all redeclarations of `id`'s entity.
    ///
    /// Follows `canonical` links to the end of the chain, so the result is its own canonical.
    /// On a cycle the smallest id on the cycle wins, whichever member the walk starts from.
    pub fn canonical_decl(&self, id: DeclId) -> DeclId {
        let mut seen = Vec::new();
        let mut current = id;
        loop {
            let next = match self.decl(current).and_then(|d| d.canonical) {
                Some(next) if next != current => next,
                _ => return current,
            };
            seen.push(current);
            if seen.contains(&next) {
                let start = seen.iter().position(|&s| s == next).unwrap_or(0);
                return seen[start..].iter().copied().min().unwrap_or(next);
            }
            current = next;
        }
    }

    /// Finds the implementation of `selector` for a receiver statically typed as `interface`,
    /// walking the superclass chain within this unit.
    pub fn lookup_method(&self, interface: DeclId, selector: &str, instance: bool) -> Option<DeclId> {
        let mut seen = HashSet::new();
        let mut current = Some(interface);
        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            let decl = self.decl(id)?;
            let table = if instance {
                &decl.instance_methods
            } else {
                &decl.class_methods
            };
            if let Some(&method) = table.get(selector) {
                return Some(method);
            }
            current = decl.superclass;
        }
        None
    }

    /// Every declaration reachable from the top level through decl contexts, in pre-order.
    pub fn walk_decls(&self) -> Vec<DeclId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<DeclId> = self.top_level.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            if let Some(decl) = self.decl(id) {
                stack.extend(decl.children.iter().rev().copied());
            }
        }
        out
    }

    /// Parses a unit from JSON and validates its references.
    pub fn from_json(json: &str) -> Result<Self> {
        let unit: TranslationUnit = serde_json::from_str(json)?;
        unit.validate()?;
        Ok(unit)
    }

    /// Checks arena indexing and that every referenced declaration exists.
    pub fn validate(&self) -> Result<()> {
        let len = self.decls.len();
        let check = |what: &str, owner: DeclId, id: DeclId| -> Result<()> {
            if (id as usize) >= len {
                bail!("{what} of declaration {owner} refers to unknown declaration {id}");
            }
            Ok(())
        };

        for &id in &self.top_level {
            if (id as usize) >= len {
                bail!("top-level entry refers to unknown declaration {id}");
            }
        }

        for (index, decl) in self.decls.iter().enumerate() {
            if decl.id as usize != index {
                bail!(
                    "declaration at position {index} carries id {}; ids must match arena positions",
                    decl.id
                );
            }
            if let Some(canonical) = decl.canonical {
                check("canonical", decl.id, canonical)?;
            }
            for &om in &decl.overridden_methods {
                check("override", decl.id, om)?;
            }
            for &child in &decl.children {
                check("child", decl.id, child)?;
            }
            if let Some(superclass) = decl.superclass {
                check("superclass", decl.id, superclass)?;
            }
            for &method in decl.instance_methods.values().chain(decl.class_methods.values()) {
                check("method table", decl.id, method)?;
            }
            if let Some(body) = &decl.body {
                validate_stmt(body, decl.id, len)?;
            }
        }
        Ok(())
    }
}

fn validate_stmt(stmt: &Stmt, owner: DeclId, len: usize) -> Result<()> {
    let referenced = match stmt {
        Stmt::Call {
            callee: Some(id), ..
        }
        | Stmt::MessageSend {
            receiver_interface: Some(id),
            ..
        }
        | Stmt::BlockLiteral { decl: id }
        | Stmt::DeclRef { decl: id } => Some(*id),
        _ => None,
    };
    if let Some(id) = referenced
        && (id as usize) >= len
    {
        bail!("body of declaration {owner} refers to unknown declaration {id}");
    }
    for child in stmt.children() {
        validate_stmt(child, owner, len)?;
    }
    Ok(())
}
