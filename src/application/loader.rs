//! Reading forests and values supplied by the caller

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationResult, PathResultExt};
use crate::domain::Forest;

/// Read a forest from a JSON file holding an array of node objects.
#[instrument(level = "debug")]
pub fn load_forest(path: &Path) -> ApplicationResult<Forest> {
    let content = fs::read_to_string(path).with_path_context("read forest", path)?;
    let json: Value = serde_json::from_str(&content).with_path_context("parse forest", path)?;
    let forest = Forest::from_json(&json)?;
    debug!(nodes = forest.len(), depth = forest.depth(), "forest loaded");
    Ok(forest)
}

/// Interpret a value argument: JSON when it parses, a plain string otherwise.
///
/// `a,b` and `"a,b"` both become the string `a,b`; `["a","b"]` an array.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
