//! Cascade selection engine
//!
//! Pure transitions from one [`SelectedSet`] to the next. Bounds and
//! disablement are not checked here; the selector consults the derived view
//! before calling into the engine.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::arena::{Forest, NodeId};
use crate::domain::selection::SelectedSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CascadeOptions {
    /// Parent and child membership are independent
    pub cascade: bool,
    /// Checking a parent keeps its descendants explicitly selected
    pub with_children: bool,
    /// Checking a parent selects its leaf descendants instead of itself
    pub only_children: bool,
    /// A disabled node disables its subtree
    pub self_disabled_affect_children: bool,
    pub multiple: bool,
}

/// Single choice: the selection becomes exactly `{node}`.
#[instrument(level = "debug")]
pub fn select(node: NodeId) -> SelectedSet {
    SelectedSet::single(node)
}

/// Multiple choice: apply a check or uncheck of `node` to `current`.
#[instrument(level = "debug", skip(forest, current))]
pub fn check(
    forest: &Forest,
    current: &SelectedSet,
    node: NodeId,
    next_checked: bool,
    opts: &CascadeOptions,
) -> SelectedSet {
    let mut value = current.clone();

    if next_checked {
        let children = forest.children(node);
        if !opts.cascade && opts.only_children && !children.is_empty() {
            // the branch itself is never added; walk down to the leaves
            let mut queue: VecDeque<NodeId> = children.iter().copied().collect();
            while let Some(child) = queue.pop_front() {
                let grandchildren = forest.children(child);
                if grandchildren.is_empty() {
                    value.insert(child);
                } else {
                    queue.extend(grandchildren.iter().copied());
                }
            }
        } else {
            value.insert(node);
            if !opts.cascade {
                // a checked parent makes its descendants redundant
                for child in forest.descendants(node) {
                    value.remove(child);
                    if opts.with_children {
                        value.insert(child);
                    }
                }
            }
        }
    } else {
        value.remove(node);
        if !opts.cascade && (opts.with_children || opts.only_children) {
            for child in forest.descendants(node) {
                value.remove(child);
            }
        }
    }

    trace!(before = current.len(), after = value.len(), "check applied");
    value
}
