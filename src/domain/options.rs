use serde::{Deserialize, Serialize};

/// Identifier prefix marking compiler-internal inline helpers.
pub const DEFAULT_INLINE_PREFIX: &str = "__inline";

/// Knobs for call graph construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Function-family declarations whose identifier starts with this prefix never become nodes.
    pub inline_prefix: String,
    /// Assume `x(&f)` means `x` calls `f`.
    pub function_pointer_heuristic: bool,
    /// Run the override sweep after body walking.
    pub link_overrides: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            inline_prefix: DEFAULT_INLINE_PREFIX.to_string(),
            function_pointer_heuristic: true,
            link_overrides: true,
        }
    }
}
