use crate::domain::ast::TranslationUnit;
use crate::domain::ports::TranslationUnitSource;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// JSON translation unit source adapter
///
/// The file holds either a single unit object or an array of units.
pub struct JsonUnitSource {
    pub path: PathBuf,
}

impl JsonUnitSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UnitFile {
    Many(Vec<TranslationUnit>),
    One(Box<TranslationUnit>),
}

impl TranslationUnitSource for JsonUnitSource {
    fn load(&self) -> Result<Vec<TranslationUnit>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read unit file: {}", self.path.display()))?;
        parse_units(&content)
            .with_context(|| format!("Failed to load units from {}", self.path.display()))
    }
}

/// Parses and validates one unit or an array of units.
pub fn parse_units(json: &str) -> Result<Vec<TranslationUnit>> {
    let file: UnitFile = serde_json::from_str(json).context("Failed to parse unit JSON")?;
    let units = match file {
        UnitFile::Many(units) => units,
        UnitFile::One(unit) => vec![*unit],
    };
    for (i, unit) in units.iter().enumerate() {
        unit.validate()
            .with_context(|| format!("Invalid translation unit #{} ({})", i, unit.name))?;
    }
    Ok(units)
}
