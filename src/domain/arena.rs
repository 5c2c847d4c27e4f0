use std::collections::VecDeque;

use generational_arena::{Arena, Index};
use serde_json::Value;
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::fields::{Attrs, FieldMap, CHILDREN_KEY};

/// Stable identity of a node within one forest snapshot.
pub type NodeId = Index;

/// Data payload for tree nodes: the node's attributes without `children`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub attrs: Attrs,
}

/// Tree node in the arena-based forest.
#[derive(Debug)]
pub struct TreeNode {
    /// Node attributes
    pub data: NodeData,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<NodeId>,
    /// Indices of child nodes in the arena
    pub children: Vec<NodeId>,
    /// Nesting level, roots are level 1
    pub level: usize,
    /// Position among its siblings
    pub position: usize,
}

impl TreeNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena-based forest: an immutable snapshot of the externally owned node tree.
///
/// Node identity is the arena index, so two structurally identical nodes in
/// different positions stay distinct.
#[derive(Debug, Default)]
pub struct Forest {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Root nodes in input order
    roots: Vec<NodeId>,
}

impl Forest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    /// Load a forest from a JSON array of node objects.
    ///
    /// Nested `children` arrays become child nodes; every other key is kept as
    /// an attribute.
    #[instrument(level = "debug", skip(value))]
    pub fn from_json(value: &Value) -> DomainResult<Self> {
        let roots = match value {
            Value::Array(items) => items,
            Value::Null => return Ok(Self::new()),
            other => return Err(DomainError::ForestNotArray(type_name(other).into())),
        };

        let mut forest = Self::new();
        // (node json, parent, path); pushed in reverse so siblings keep their order
        let mut stack: Vec<(&Value, Option<NodeId>, Vec<usize>)> = roots
            .iter()
            .enumerate()
            .rev()
            .map(|(i, v)| (v, None, vec![i]))
            .collect();

        while let Some((current, parent_idx, path)) = stack.pop() {
            let Value::Object(map) = current else {
                return Err(DomainError::NodeNotObject { path });
            };

            // borrowed from the source so the stack can hold the child nodes
            let children = map.get(CHILDREN_KEY);
            let mut attrs = map.clone();
            attrs.remove(CHILDREN_KEY);
            let current_idx = forest.insert_node(NodeData { attrs }, parent_idx);

            match children {
                Some(Value::Array(items)) => {
                    for (i, child) in items.iter().enumerate().rev() {
                        let mut child_path = path.clone();
                        child_path.push(i);
                        stack.push((child, Some(current_idx), child_path));
                    }
                }
                Some(Value::Null) | None => {}
                Some(_) => return Err(DomainError::ChildrenNotArray { path }),
            }
        }

        Ok(forest)
    }

    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let (level, position) = match parent.and_then(|p| self.arena.get(p)) {
            Some(p) => (p.level + 1, p.children.len()),
            None => (1, self.roots.len()),
        };
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
            level,
            position,
        };
        let node_idx = self.arena.insert(node);

        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent) => parent.children.push(node_idx),
            None => self.roots.push(node_idx),
        }

        node_idx
    }

    pub fn get_node(&self, idx: NodeId) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn attrs(&self, idx: NodeId) -> Option<&Attrs> {
        self.arena.get(idx).map(|n| &n.data.attrs)
    }

    pub fn contains(&self, idx: NodeId) -> bool {
        self.arena.contains(idx)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of a node; empty for leaves and unknown ids.
    pub fn children(&self, idx: NodeId) -> &[NodeId] {
        self.arena
            .get(idx)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_children(&self, idx: NodeId) -> bool {
        !self.children(idx).is_empty()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Depth-first pre-order traversal over all roots.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// All descendants of a node, breadth-first, the node itself excluded.
    #[instrument(level = "trace", skip(self))]
    pub fn descendants(&self, idx: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut queue: VecDeque<NodeId> = self.children(idx).iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            result.push(current);
            queue.extend(self.children(current).iter().copied());
        }
        result
    }

    /// Sibling positions from the root down to the node, e.g. `[0, 2]`.
    #[instrument(level = "trace", skip(self))]
    pub fn path_index(&self, idx: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = Some(idx);
        while let Some(node_idx) = current {
            let node = self.get_node(node_idx)?;
            path.push(node.position);
            current = node.parent;
        }
        path.reverse();
        Some(path)
    }

    /// First node in depth-first order satisfying the predicate.
    pub fn find<F>(&self, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(NodeId, &TreeNode) -> bool,
    {
        self.iter()
            .find(|(idx, node)| predicate(*idx, *node))
            .map(|(idx, _)| idx)
    }

    /// First node in depth-first order whose value key equals `key`.
    pub fn find_by_value(&self, fields: &FieldMap, key: &str) -> Option<NodeId> {
        self.find(|_, node| fields.value_key(&node.data.attrs).as_deref() == Some(key))
    }

    /// Rebuild the JSON object of a node, children included.
    pub fn node_json(&self, idx: NodeId) -> Value {
        let Some(node) = self.get_node(idx) else {
            return Value::Null;
        };
        let mut map = node.data.attrs.clone();
        if node.has_children() {
            let children = node.children.iter().map(|&c| self.node_json(c)).collect();
            map.insert(CHILDREN_KEY.to_string(), Value::Array(children));
        }
        Value::Object(map)
    }

    /// Number of levels of the deepest branch, 0 for an empty forest.
    pub fn depth(&self) -> usize {
        self.iter().map(|(_, node)| node.level).max().unwrap_or(0)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub struct TreeIterator<'a> {
    forest: &'a Forest,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        let stack = forest.roots().iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Forest {
        Forest::from_json(&json!([
            {"label": "A", "value": "a", "children": [
                {"label": "A1", "value": "a1"},
                {"label": "A2", "value": "a2", "children": [
                    {"label": "A2x", "value": "a2x"}
                ]}
            ]},
            {"label": "B", "value": "b"}
        ]))
        .expect("valid forest")
    }

    #[test]
    fn given_nested_json_when_loading_then_builds_levels_and_order() {
        let forest = sample();
        let order: Vec<(String, usize)> = forest
            .iter()
            .map(|(_, n)| (n.data.attrs["value"].as_str().unwrap().to_string(), n.level))
            .collect();

        assert_eq!(
            order,
            vec![
                ("a".to_string(), 1),
                ("a1".to_string(), 2),
                ("a2".to_string(), 2),
                ("a2x".to_string(), 3),
                ("b".to_string(), 1),
            ]
        );
        assert_eq!(forest.len(), 5);
        assert_eq!(forest.depth(), 3);
    }

    #[test]
    fn given_branch_json_when_loading_then_children_become_nodes_not_attrs() {
        let forest = sample();
        let a = forest.roots()[0];

        assert!(!forest.attrs(a).unwrap().contains_key(CHILDREN_KEY));
        assert_eq!(forest.children(a).len(), 2);
        let a2 = forest.children(a)[1];
        assert_eq!(forest.get_node(a2).unwrap().position, 1);
        assert_eq!(forest.children(a2).len(), 1);
    }

    #[test]
    fn given_node_when_resolving_path_index_then_returns_positions() {
        let forest = sample();
        let fields = FieldMap::default();
        let a2x = forest.find_by_value(&fields, "a2x").unwrap();
        let b = forest.find_by_value(&fields, "b").unwrap();

        assert_eq!(forest.path_index(a2x), Some(vec![0, 1, 0]));
        assert_eq!(forest.path_index(b), Some(vec![1]));
    }

    #[test]
    fn given_branch_when_walking_descendants_then_breadth_first() {
        let forest = sample();
        let fields = FieldMap::default();
        let a = forest.find_by_value(&fields, "a").unwrap();
        let keys: Vec<String> = forest
            .descendants(a)
            .into_iter()
            .filter_map(|id| fields.value_key(forest.attrs(id).unwrap()))
            .collect();

        assert_eq!(keys, vec!["a1", "a2", "a2x"]);
    }

    #[test]
    fn given_node_when_rebuilding_json_then_includes_children() {
        let forest = sample();
        let a2 = forest.find_by_value(&FieldMap::default(), "a2").unwrap();
        assert_eq!(
            forest.node_json(a2),
            json!({"label": "A2", "value": "a2", "children": [{"label": "A2x", "value": "a2x"}]})
        );
    }

    #[test]
    fn given_non_array_forest_when_loading_then_fails() {
        let err = Forest::from_json(&json!({"label": "x"})).unwrap_err();
        assert_eq!(err, DomainError::ForestNotArray("object".into()));
    }

    #[test]
    fn given_scalar_child_when_loading_then_reports_path() {
        let err = Forest::from_json(&json!([{"label": "x", "children": [1]}])).unwrap_err();
        assert_eq!(err, DomainError::NodeNotObject { path: vec![0, 0] });
    }

    #[test]
    fn given_null_forest_when_loading_then_empty() {
        let forest = Forest::from_json(&Value::Null).unwrap();
        assert!(forest.is_empty());
        assert_eq!(forest.depth(), 0);
    }
}
