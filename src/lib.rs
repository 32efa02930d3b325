//! ast-callgraph library: conservative call graph construction over a parsed program.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
