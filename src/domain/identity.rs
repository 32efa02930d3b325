//! Declaration identity: which node a declaration maps to, and the textual key that correlates
//! the same entity across independently built graphs.

use std::fmt;

use serde::Serialize;

use crate::domain::ast::{DeclId, DeclKind, TranslationUnit};

/// Identity of a call graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CanonicalId {
    /// The synthetic root; stands for "no declaration".
    Root,
    Decl(DeclId),
}

/// Resolves a declaration to the identity of its node.
///
/// Dynamically dispatched methods keep their own identity because override edges are
/// declaration-specific; everything else collapses onto its canonical redeclaration.
/// Resolving an already canonical identity yields itself.
pub fn resolve(tu: &TranslationUnit, decl: Option<DeclId>) -> CanonicalId {
    let Some(id) = decl else {
        return CanonicalId::Root;
    };
    match tu.decl(id) {
        Some(d) if d.is_dynamically_dispatched() => CanonicalId::Decl(id),
        _ => CanonicalId::Decl(tu.canonical_decl(id)),
    }
}

/// Sentinel for entities without a stable key.
pub const NO_NAME: &str = "__NO_NAME__";

/// Stable textual key of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MangledKey {
    /// Constructors, destructors and unnamed entities: overload identity is ambiguous.
    NoName,
    /// Keyed by plain identifier (C linkage, the entry point, selector-dispatched methods).
    Plain(String),
    Mangled(String),
}

impl MangledKey {
    pub fn as_str(&self) -> &str {
        match self {
            MangledKey::NoName => NO_NAME,
            MangledKey::Plain(s) | MangledKey::Mangled(s) => s,
        }
    }

    pub fn is_stable(&self) -> bool {
        !matches!(self, MangledKey::NoName)
    }
}

impl fmt::Display for MangledKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MangledKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Computes the key for `decl`.
pub fn mangled_key(tu: &TranslationUnit, decl: DeclId) -> MangledKey {
    let Some(d) = tu.decl(decl) else {
        return MangledKey::NoName;
    };

    if matches!(d.kind, DeclKind::Constructor | DeclKind::Destructor) {
        return MangledKey::NoName;
    }

    if d.kind.is_function() {
        if d.extern_c
            && let Some(name) = &d.name
        {
            return MangledKey::Plain(name.clone());
        }
        if d.is_main {
            return MangledKey::Plain("main".to_string());
        }
    }

    let Some(qualified) = d.display_name() else {
        return MangledKey::NoName;
    };

    if d.kind == DeclKind::ObjCMethod {
        return MangledKey::Plain(qualified.to_string());
    }

    MangledKey::Mangled(mangle(qualified, &d.param_types, d.kind.is_function()))
}

/// Itanium-flavoured encoding: `_Z` + (nested) length-prefixed name + parameter types.
fn mangle(qualified: &str, params: &[String], is_function: bool) -> String {
    let segments: Vec<&str> = qualified.split("::").filter(|s| !s.is_empty()).collect();
    let mut out = String::from("_Z");
    if segments.len() > 1 {
        out.push('N');
        for seg in &segments {
            push_source_name(&mut out, seg);
        }
        out.push('E');
    } else {
        push_source_name(&mut out, segments.first().copied().unwrap_or(qualified));
    }

    if is_function {
        if params.is_empty() {
            out.push('v');
        } else {
            for param in params {
                out.push_str(&mangle_type(param));
            }
        }
    }
    out
}

fn push_source_name(out: &mut String, name: &str) {
    out.push_str(&name.len().to_string());
    out.push_str(name);
}

fn mangle_type(spelling: &str) -> String {
    let spelling = spelling.trim();
    if let Some(pointee) = spelling.strip_suffix('*') {
        return format!("P{}", mangle_type(pointee));
    }
    if let Some(referent) = spelling.strip_suffix('&') {
        return format!("R{}", mangle_type(referent));
    }
    if let Some(inner) = spelling.strip_prefix("const ") {
        return format!("K{}", mangle_type(inner));
    }
    let builtin = match spelling {
        "void" => "v",
        "bool" => "b",
        "char" => "c",
        "signed char" => "a",
        "unsigned char" => "h",
        "short" => "s",
        "unsigned short" => "t",
        "int" => "i",
        "unsigned" | "unsigned int" => "j",
        "long" => "l",
        "unsigned long" => "m",
        "long long" => "x",
        "unsigned long long" => "y",
        "float" => "f",
        "double" => "d",
        "..." => "z",
        _ => {
            let mut out = String::new();
            let segments: Vec<&str> = spelling.split("::").collect();
            if segments.len() > 1 {
                out.push('N');
                for seg in segments {
                    push_source_name(&mut out, seg);
                }
                out.push('E');
            } else {
                push_source_name(&mut out, spelling);
            }
            return out;
        }
    };
    builtin.to_string()
}
