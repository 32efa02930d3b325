pub mod ast;
pub mod identity;
pub mod filter;
pub mod options;
pub mod node;
pub mod edge;
pub mod graph;
pub mod builder;
pub mod overrides;
pub mod reader;
pub mod ports;
