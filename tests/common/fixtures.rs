//! Test fixture generators for integration tests.
#![allow(dead_code)]

use ast_callgraph::domain::ast::{Decl, DeclKind, Stmt, TranslationUnit};

/// `main -> parse -> lex`, `parse -> parse` (recursion), `lex` only declared.
pub fn unit_direct_calls() -> TranslationUnit {
    let mut tu = TranslationUnit::new("direct.c");
    let lex = tu.add_top_level(Decl::function("lex").params(["const char*"]));
    let parse_proto = tu.add_top_level(Decl::function("parse"));
    let parse = tu.add_top_level(
        Decl::function("parse")
            .redeclares(parse_proto)
            .with_body(Stmt::compound(vec![
                Stmt::call(lex, vec![]),
                Stmt::call(parse_proto, vec![]),
            ])),
    );
    tu.add_top_level(
        Decl::function("main")
            .entry_point()
            .params(["int", "char**"])
            .with_body(Stmt::call(parse, vec![])),
    );
    tu
}

/// `run` invokes a block in place; the block calls `work`. A second block is only declared.
pub fn unit_with_blocks() -> TranslationUnit {
    let mut tu = TranslationUnit::new("blocks.m");
    let work = tu.add_top_level(Decl::function("work"));
    let invoked = tu.add(Decl::block().with_body(Stmt::call(work, vec![])));
    let stored = tu.add(Decl::block());
    tu.add_top_level(
        Decl::function("run")
            .with_child(invoked)
            .with_child(stored)
            .with_body(Stmt::compound(vec![
                Stmt::call_block(invoked),
                Stmt::Other {
                    children: vec![Stmt::BlockLiteral { decl: stored }],
                },
            ])),
    );
    tu
}

/// `start` calls `qsort(&cmp)` and `signal(&handler)` through a C-linkage library.
pub fn unit_with_function_pointers() -> TranslationUnit {
    let mut tu = TranslationUnit::new("fnptr.c");
    let cmp = tu.add_top_level(Decl::function("cmp"));
    let handler = tu.add_top_level(Decl::function("handler"));
    let qsort = tu.add_top_level(Decl::function("qsort").extern_c());
    let signal = tu.add_top_level(Decl::function("signal").extern_c());
    tu.add_top_level(Decl::function("start").with_body(Stmt::compound(vec![
        Stmt::call(qsort, vec![Stmt::decl_ref(cmp), Stmt::addr_of(cmp)]),
        Stmt::call(signal, vec![Stmt::addr_of(handler)]),
    ])));
    tu
}

/// `Shape` with instance `draw` and class `make`; `Circle : Shape`; `render` sends messages.
pub fn unit_with_message_sends() -> TranslationUnit {
    let mut tu = TranslationUnit::new("shapes.m");
    let draw = tu.add(Decl::new(DeclKind::ObjCMethod, "draw").qualified("Shape::draw"));
    let make = tu.add(Decl::new(DeclKind::ObjCMethod, "make").qualified("Shape::make"));
    let shape = tu.add_top_level(
        Decl::new(DeclKind::Interface, "Shape")
            .with_child(draw)
            .with_child(make)
            .with_instance_method("draw", draw)
            .with_class_method("make", make),
    );
    let circle =
        tu.add_top_level(Decl::new(DeclKind::Interface, "Circle").with_superclass(shape));
    tu.add_top_level(Decl::function("render").with_body(Stmt::compound(vec![
        Stmt::message(circle, "draw", true),
        Stmt::message(shape, "make", false),
        Stmt::message(circle, "fill", true),
    ])));
    tu
}

/// Diamond-ish hierarchy: `Both::f` overrides `Left::f` and `Right::f`; `Leaf::f` overrides `Both::f`.
pub fn unit_with_hierarchy() -> TranslationUnit {
    let mut tu = TranslationUnit::new("hierarchy.cpp");
    let method = |q: &str| {
        Decl::new(DeclKind::Method, "f")
            .qualified(q)
            .virtual_method()
    };
    let left = tu.add(method("Left::f"));
    let right = tu.add(method("Right::f"));
    let both = tu.add(method("Both::f").overrides(left).overrides(right));
    let leaf = tu.add(method("Leaf::f").overrides(both));
    for (name, m) in [("Left", left), ("Right", right), ("Both", both), ("Leaf", leaf)] {
        tu.add_top_level(Decl::new(DeclKind::Record, name).with_child(m));
    }
    tu
}

/// A template body with calls, an inline helper and a normal caller of both.
pub fn unit_with_exclusions() -> TranslationUnit {
    let mut tu = TranslationUnit::new("exclusions.cpp");
    let target = tu.add_top_level(Decl::function("target"));
    let helper = tu.add_top_level(
        Decl::function("__inline_helper").with_body(Stmt::call(target, vec![])),
    );
    let tmpl = tu.add_top_level(
        Decl::function("generic")
            .dependent()
            .with_body(Stmt::call(target, vec![])),
    );
    tu.add_top_level(Decl::function("user").with_body(Stmt::compound(vec![
        Stmt::call(helper, vec![]),
        Stmt::call(tmpl, vec![]),
    ])));
    tu
}
