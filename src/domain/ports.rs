use crate::domain::ast::TranslationUnit;
use anyhow::Result;

/// Front-end port: supplies parsed translation units (implemented by Infrastructure)
pub trait TranslationUnitSource {
    fn load(&self) -> Result<Vec<TranslationUnit>>;
}
