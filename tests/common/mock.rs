//! Mock implementations for integration tests.
#![allow(dead_code)]

use anyhow::{Result, anyhow};
use ast_callgraph::domain::ast::TranslationUnit;
use ast_callgraph::domain::ports::TranslationUnitSource;

/// Mock source returning units held in memory.
pub struct MockUnitSource {
    pub units: Vec<TranslationUnit>,
}

impl MockUnitSource {
    pub fn new(units: Vec<TranslationUnit>) -> Self {
        Self { units }
    }
}

impl TranslationUnitSource for MockUnitSource {
    fn load(&self) -> Result<Vec<TranslationUnit>> {
        Ok(self.units.clone())
    }
}

/// Source that always fails, as a broken front-end would.
pub struct FailingUnitSource;

impl TranslationUnitSource for FailingUnitSource {
    fn load(&self) -> Result<Vec<TranslationUnit>> {
        Err(anyhow!("front-end crashed"))
    }
}
