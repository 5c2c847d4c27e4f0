//! Conversion between the external value and the canonical selected set
//!
//! The external value is whatever the host form stores: a delimited string, a
//! bare scalar, a node object, or an array of either. Internally the selection
//! is always a [`SelectedSet`] of node ids resolved against the current forest.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, trace};

use crate::domain::arena::{Forest, NodeId};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::fields::{value_key, FieldMap};
use crate::domain::selection::SelectedSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodecOptions {
    pub multiple: bool,
    pub join_values: bool,
    pub extract_value: bool,
    pub delimiter: String,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            multiple: false,
            join_values: true,
            extract_value: false,
            delimiter: ",".into(),
        }
    }
}

impl CodecOptions {
    pub fn validate(&self) -> DomainResult<()> {
        if self.delimiter.is_empty() {
            return Err(DomainError::EmptyDelimiter);
        }
        Ok(())
    }
}

/// Resolve an external value against the forest.
///
/// Pieces that do not name an existing node are dropped silently. When
/// several nodes share a value the first one in depth-first order wins.
#[instrument(level = "debug", skip(forest, fields, opts))]
pub fn decode(forest: &Forest, value: &Value, fields: &FieldMap, opts: &CodecOptions) -> SelectedSet {
    let index = value_index(forest, fields);
    let resolve = |item: &Value| -> Option<NodeId> {
        let key = piece_key(item, fields)?;
        let found = index.get(key.as_str()).copied();
        if found.is_none() {
            trace!(key = %key, "dropping unresolved value");
        }
        found
    };

    if !opts.multiple {
        return resolve(value).into_iter().collect();
    }

    match value {
        Value::Null => SelectedSet::new(),
        // empty pieces are separators only, `""` is the empty selection
        Value::String(s) => s
            .split(opts.delimiter.as_str())
            .filter(|piece| !piece.is_empty())
            .filter_map(|piece| resolve(&Value::String(piece.to_string())))
            .collect(),
        Value::Array(items) => items.iter().filter_map(resolve).collect(),
        other => resolve(other).into_iter().collect(),
    }
}

/// Serialize the selected set into the external representation.
#[instrument(level = "debug", skip(forest, selected, fields, opts))]
pub fn encode(forest: &Forest, selected: &SelectedSet, fields: &FieldMap, opts: &CodecOptions) -> Value {
    let raw = |id: NodeId| -> Value {
        forest
            .attrs(id)
            .and_then(|attrs| fields.raw_value(attrs))
            .cloned()
            .unwrap_or(Value::Null)
    };

    if opts.join_values {
        if opts.multiple {
            let joined = selected
                .iter()
                .map(|id| value_key(&raw(id)).unwrap_or_default())
                .join(&opts.delimiter);
            Value::String(joined)
        } else {
            selected.first().map(raw).unwrap_or(Value::Null)
        }
    } else if opts.extract_value {
        if opts.multiple {
            Value::Array(selected.iter().map(raw).collect())
        } else {
            selected.first().map(raw).unwrap_or(Value::Null)
        }
    } else if opts.multiple {
        Value::Array(selected.iter().map(|id| forest.node_json(id)).collect())
    } else {
        selected
            .first()
            .map(|id| forest.node_json(id))
            .unwrap_or(Value::Null)
    }
}

/// Value key -> first node carrying it, in depth-first order.
fn value_index(forest: &Forest, fields: &FieldMap) -> HashMap<String, NodeId> {
    let mut index = HashMap::new();
    for (idx, node) in forest.iter() {
        if let Some(key) = fields.value_key(&node.data.attrs) {
            index.entry(key).or_insert(idx);
        }
    }
    index
}

/// Node-shaped pieces contribute their value field, scalars themselves.
fn piece_key(item: &Value, fields: &FieldMap) -> Option<String> {
    match item {
        Value::Object(map) => map.get(&fields.value_field).and_then(value_key),
        other => value_key(other),
    }
}
