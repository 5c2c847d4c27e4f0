//! Expanded/collapsed state of branch nodes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::{Forest, NodeId};
use crate::domain::fields::FieldMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoldOptions {
    /// Expand every branch unless a node says otherwise
    pub initially_open: bool,
    /// When not initially open, expand branches up to this level (roots are 1)
    pub unfolded_level: usize,
}

impl Default for FoldOptions {
    fn default() -> Self {
        Self {
            initially_open: true,
            unfolded_level: 0,
        }
    }
}

/// Value key -> expanded, for nodes that have children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldMap {
    unfolded: HashMap<String, bool>,
}

impl FoldMap {
    /// Seed the map from per-node flags and level defaults.
    ///
    /// An explicit unfolded flag wins over a folded flag, which wins over the
    /// `initially_open` / `unfolded_level` defaults.
    #[instrument(level = "debug", skip(forest, fields))]
    pub fn compute_initial(forest: &Forest, fields: &FieldMap, opts: &FoldOptions) -> Self {
        let mut unfolded = HashMap::new();
        for (_, node) in forest.iter().filter(|(_, n)| n.has_children()) {
            let Some(key) = fields.value_key(&node.data.attrs) else {
                continue;
            };
            let expanded = if let Some(flag) = fields.unfolded_flag(&node.data.attrs) {
                flag
            } else if let Some(flag) = fields.folded_flag(&node.data.attrs) {
                !flag
            } else {
                opts.initially_open || node.level <= opts.unfolded_level
            };
            unfolded.insert(key, expanded);
        }
        Self { unfolded }
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.unfolded.get(key).copied()
    }

    /// Unknown keys read as collapsed.
    pub fn is_unfolded(&self, key: &str) -> bool {
        self.get(key).unwrap_or(false)
    }

    pub fn is_node_unfolded(&self, forest: &Forest, fields: &FieldMap, id: NodeId) -> bool {
        forest
            .attrs(id)
            .and_then(|attrs| fields.value_key(attrs))
            .map(|key| self.is_unfolded(&key))
            .unwrap_or(false)
    }

    /// Flip a branch node. Childless or unknown nodes are left alone and
    /// `false` is returned.
    #[instrument(level = "debug", skip(self, forest, fields))]
    pub fn toggle(&mut self, forest: &Forest, fields: &FieldMap, id: NodeId) -> bool {
        if !forest.has_children(id) {
            debug!("fold toggle ignored: node has no children");
            return false;
        }
        let Some(key) = forest.attrs(id).and_then(|attrs| fields.value_key(attrs)) else {
            return false;
        };
        let entry = self.unfolded.entry(key).or_insert(false);
        *entry = !*entry;
        true
    }

    pub fn len(&self) -> usize {
        self.unfolded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unfolded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn forest() -> Forest {
        Forest::from_json(&json!([
            {"label": "L1", "value": "l1", "children": [
                {"label": "L2", "value": "l2", "children": [
                    {"label": "L3", "value": "l3"}
                ]}
            ]},
            {"label": "Open", "value": "open", "unfolded": true, "folded": true, "children": [
                {"label": "x", "value": "x"}
            ]},
            {"label": "Shut", "value": "shut", "folded": true, "children": [
                {"label": "y", "value": "y"}
            ]},
            {"label": "Leaf", "value": "leaf"}
        ]))
        .unwrap()
    }

    #[test]
    fn given_level_default_when_computing_then_opens_up_to_level() {
        let opts = FoldOptions {
            initially_open: false,
            unfolded_level: 1,
        };
        let map = FoldMap::compute_initial(&forest(), &FieldMap::default(), &opts);

        assert_eq!(map.get("l1"), Some(true));
        assert_eq!(map.get("l2"), Some(false));
        assert_eq!(map.get("leaf"), None);
    }

    #[test]
    fn given_explicit_flags_when_computing_then_flags_win() {
        let opts = FoldOptions {
            initially_open: true,
            unfolded_level: 0,
        };
        let map = FoldMap::compute_initial(&forest(), &FieldMap::default(), &opts);

        assert_eq!(map.get("open"), Some(true));
        assert_eq!(map.get("shut"), Some(false));
        assert_eq!(map.get("l2"), Some(true));
    }

    #[test]
    fn given_branch_when_toggling_then_flips_and_leaf_is_noop() {
        let forest = forest();
        let fields = FieldMap::default();
        let mut map = FoldMap::compute_initial(&forest, &fields, &FoldOptions::default());
        let l1 = forest.find_by_value(&fields, "l1").unwrap();
        let leaf = forest.find_by_value(&fields, "leaf").unwrap();

        assert!(map.toggle(&forest, &fields, l1));
        assert!(!map.is_node_unfolded(&forest, &fields, l1));
        assert!(!map.toggle(&forest, &fields, leaf));
        assert_eq!(map.get("leaf"), None);
    }
}
