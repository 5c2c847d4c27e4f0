//! Derived display state
//!
//! Everything here is recomputed top-down from the immutable forest, the
//! selected set, the fold map and the edit session on every request. Nothing
//! is cached on nodes, so there is nothing to invalidate when state changes.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::arena::{Forest, NodeId};
use crate::domain::edit::EditSession;
use crate::domain::fields::{has_ability, is_visible, Ability, FieldMap};
use crate::domain::fold::FoldMap;
use crate::domain::selection::SelectedSet;

/// Why a node cannot be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    /// The whole selector is disabled
    TreeDisabled,
    /// The node's own disabled flag is set
    SelfDisabled,
    /// An ancestor is disabled and disables its subtree
    AncestorDisabled,
    /// An ancestor is checked; its subtree is implied
    AncestorChecked,
    /// Checking would exceed the maximum selection size
    MaxLength,
    /// Unchecking would go below the minimum selection size
    MinLength,
}

impl fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DisabledReason::TreeDisabled => "selector disabled",
            DisabledReason::SelfDisabled => "disabled",
            DisabledReason::AncestorDisabled => "ancestor disabled",
            DisabledReason::AncestorChecked => "ancestor checked",
            DisabledReason::MaxLength => "max length reached",
            DisabledReason::MinLength => "min length reached",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewOptions {
    pub multiple: bool,
    pub cascade: bool,
    pub only_children: bool,
    pub self_disabled_affect_children: bool,
    /// Single choice shows radio marks
    pub show_radio: bool,
    /// The whole selector is disabled
    pub disabled: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub creatable: bool,
    pub editable: bool,
    pub removable: bool,
    pub hide_root: bool,
    pub root_creatable: bool,
}

impl ViewOptions {
    fn min(&self) -> Option<usize> {
        self.min_length.filter(|&m| m > 0)
    }

    fn max(&self) -> Option<usize> {
        self.max_length.filter(|&m| m > 0)
    }
}

/// Selection-related state of one visible node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    /// Member of the selected set
    pub checked: bool,
    /// Displayed as checked: member, implied by a checked or disabled
    /// ancestor, or promoted because all children are checked
    pub self_checked: bool,
    /// Visible immediate children that are checked or have checked descendants
    pub children_checked: usize,
    /// Some descendants checked, shown as a partial mark
    pub indeterminate: bool,
    pub disabled: Option<DisabledReason>,
}

/// Per-node state for every visible node, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct DerivedState {
    states: HashMap<NodeId, NodeState>,
}

impl DerivedState {
    #[instrument(level = "trace", skip_all)]
    pub fn compute(forest: &Forest, fields: &FieldMap, selected: &SelectedSet, opts: &ViewOptions) -> Self {
        let mut deriver = Deriver {
            forest,
            fields,
            selected,
            opts,
            states: HashMap::new(),
        };
        deriver.derive_list(forest.roots(), None);
        Self {
            states: deriver.states,
        }
    }

    /// `None` for hidden nodes, descendants of hidden nodes and unknown ids.
    pub fn get(&self, id: NodeId) -> Option<&NodeState> {
        self.states.get(&id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

struct Deriver<'a> {
    forest: &'a Forest,
    fields: &'a FieldMap,
    selected: &'a SelectedSet,
    opts: &'a ViewOptions,
    states: HashMap<NodeId, NodeState>,
}

impl<'a> Deriver<'a> {
    /// Derive `ids` and their subtrees; returns how many of `ids` count as
    /// checked for their parent.
    fn derive_list(&mut self, ids: &[NodeId], inherited: Option<DisabledReason>) -> usize {
        let forest = self.forest;
        let opts = self.opts;
        let mut children_checked = 0;

        for &id in ids {
            let Some(node) = forest.get_node(id) else {
                continue;
            };
            let attrs = &node.data.attrs;
            if !is_visible(attrs) {
                continue;
            }

            let checked = self.selected.contains(id);
            let self_disabled = self.fields.is_disabled(attrs);
            let mut self_checked = inherited.is_some() || checked;

            let mut checked_below = 0;
            if node.has_children() {
                let child_inherited = if opts.cascade {
                    None
                } else if inherited.is_some() {
                    inherited
                } else if opts.self_disabled_affect_children && self_disabled {
                    Some(DisabledReason::AncestorDisabled)
                } else if opts.multiple && checked {
                    Some(DisabledReason::AncestorChecked)
                } else {
                    None
                };
                checked_below = self.derive_list(&node.children, child_inherited);
                // display-only promotion, never written back to the selection
                if !self_checked && opts.only_children && node.children.len() == checked_below {
                    self_checked = true;
                }
            }

            if checked_below > 0 || checked {
                children_checked += 1;
            }

            let mut disabled = if inherited.is_some() {
                inherited
            } else if opts.disabled {
                Some(DisabledReason::TreeDisabled)
            } else if self_disabled {
                Some(DisabledReason::SelfDisabled)
            } else {
                None
            };
            if disabled.is_none() {
                let count = self.selected.len();
                if opts.max().is_some_and(|max| !self_checked && count >= max) {
                    disabled = Some(DisabledReason::MaxLength);
                } else if opts.min().is_some_and(|min| self_checked && count <= min) {
                    disabled = Some(DisabledReason::MinLength);
                }
            }

            let indeterminate =
                opts.multiple && !opts.cascade && checked_below > 0 && disabled.is_none();

            self.states.insert(
                id,
                NodeState {
                    checked,
                    self_checked,
                    children_checked: checked_below,
                    indeterminate,
                    disabled,
                },
            );
        }

        children_checked
    }
}

/// Which CRUD buttons a node offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Affordances {
    pub create: bool,
    pub edit: bool,
    pub remove: bool,
}

/// Display model of one visible node and its visible subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView {
    pub id: NodeId,
    pub label: String,
    pub value_key: Option<String>,
    pub icon: Option<String>,
    pub level: usize,
    pub is_leaf: bool,
    pub unfolded: bool,
    pub state: NodeState,
    /// This node is the target of the open edit session
    pub editing: bool,
    /// A child is being added under this node
    pub adding_child: bool,
    pub affordances: Affordances,
    pub children: Vec<NodeView>,
}

/// The synthetic root item shown when `hide_root` is off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootView {
    pub hidden: bool,
    pub label: String,
    /// Checked while nothing is selected
    pub checked: bool,
    pub can_add: bool,
    /// A root-level node is being added
    pub adding: bool,
}

/// Everything a presentation layer needs to draw the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorView {
    pub root: RootView,
    /// Nodes carry a checkbox or radio mark
    pub check_marks: bool,
    /// The marks are radio buttons (single choice)
    pub radio: bool,
    pub nodes: Vec<NodeView>,
    /// Current edit buffer, when a session is open
    pub buffer: Option<String>,
    pub selected_count: usize,
    /// The forest has no nodes; show the placeholder
    pub is_empty: bool,
}

pub struct ViewInput<'a> {
    pub forest: &'a Forest,
    pub fields: &'a FieldMap,
    pub selected: &'a SelectedSet,
    pub fold: &'a FoldMap,
    pub session: &'a EditSession,
    pub opts: &'a ViewOptions,
    pub root_label: &'a str,
}

/// Build the full display model.
#[instrument(level = "debug", skip_all)]
pub fn build_view(input: &ViewInput<'_>) -> SelectorView {
    let derived = DerivedState::compute(input.forest, input.fields, input.selected, input.opts);
    let session_open = !input.session.is_idle();
    let opts = input.opts;

    let root = RootView {
        hidden: opts.hide_root,
        label: input.root_label.to_string(),
        checked: input.selected.is_empty(),
        can_add: opts.creatable
            && !session_open
            && (opts.hide_root || (!opts.disabled && opts.root_creatable)),
        adding: input.session.adding_parent() == Some(None),
    };

    SelectorView {
        root,
        check_marks: opts.multiple || opts.show_radio,
        radio: !opts.multiple && opts.show_radio,
        nodes: view_list(input, &derived, input.forest.roots()),
        buffer: input.session.buffer().map(str::to_string),
        selected_count: input.selected.len(),
        is_empty: input.forest.is_empty(),
    }
}

fn view_list(input: &ViewInput<'_>, derived: &DerivedState, ids: &[NodeId]) -> Vec<NodeView> {
    let session_open = !input.session.is_idle();
    let opts = input.opts;

    ids.iter()
        .filter_map(|&id| {
            let node = input.forest.get_node(id)?;
            let state = *derived.get(id)?;
            let attrs = &node.data.attrs;
            let offer = state.disabled.is_none() && !session_open;

            Some(NodeView {
                id,
                label: input.fields.label_text(attrs),
                value_key: input.fields.value_key(attrs),
                icon: input.fields.icon(attrs).map(str::to_string),
                level: node.level,
                is_leaf: !node.has_children(),
                unfolded: input.fold.is_node_unfolded(input.forest, input.fields, id),
                state,
                editing: input.session.editing_target() == Some(id),
                adding_child: input.session.adding_parent() == Some(Some(id)),
                affordances: Affordances {
                    create: offer && opts.creatable && has_ability(attrs, Ability::Creatable),
                    edit: offer && opts.editable && has_ability(attrs, Ability::Editable),
                    remove: offer && opts.removable && has_ability(attrs, Ability::Removable),
                },
                children: view_list(input, derived, &node.children),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn forest() -> Forest {
        Forest::from_json(&json!([
            {"label": "P", "value": "p", "children": [
                {"label": "A", "value": "a"},
                {"label": "B", "value": "b"}
            ]},
            {"label": "D", "value": "d", "disabled": true, "children": [
                {"label": "D1", "value": "d1"}
            ]},
            {"label": "H", "value": "h", "hidden": true},
            {"label": "Q", "value": "q"}
        ]))
        .unwrap()
    }

    fn id(forest: &Forest, key: &str) -> NodeId {
        forest.find_by_value(&FieldMap::default(), key).unwrap()
    }

    fn multi() -> ViewOptions {
        ViewOptions {
            multiple: true,
            self_disabled_affect_children: true,
            ..ViewOptions::default()
        }
    }

    #[test]
    fn given_all_children_checked_when_only_children_then_parent_promoted_display_only() {
        let forest = forest();
        let selected: SelectedSet = vec![id(&forest, "a"), id(&forest, "b")].into_iter().collect();
        let opts = ViewOptions {
            only_children: true,
            ..multi()
        };

        let derived = DerivedState::compute(&forest, &FieldMap::default(), &selected, &opts);
        let parent = derived.get(id(&forest, "p")).unwrap();

        assert_eq!(parent.children_checked, 2);
        assert!(parent.self_checked);
        assert!(!parent.checked);
        assert!(!selected.contains(id(&forest, "p")));
    }

    #[test]
    fn given_some_children_checked_when_deriving_then_parent_indeterminate() {
        let forest = forest();
        let selected = SelectedSet::single(id(&forest, "a"));

        let derived = DerivedState::compute(&forest, &FieldMap::default(), &selected, &multi());
        let parent = derived.get(id(&forest, "p")).unwrap();

        assert_eq!(parent.children_checked, 1);
        assert!(parent.indeterminate);
        assert!(!parent.self_checked);
    }

    #[test]
    fn given_disabled_parent_when_deriving_then_children_inherit() {
        let forest = forest();
        let fields = FieldMap::default();
        let derived = DerivedState::compute(&forest, &fields, &SelectedSet::new(), &multi());

        assert_eq!(
            derived.get(id(&forest, "d")).unwrap().disabled,
            Some(DisabledReason::SelfDisabled)
        );
        assert_eq!(
            derived.get(id(&forest, "d1")).unwrap().disabled,
            Some(DisabledReason::AncestorDisabled)
        );

        let cascade = ViewOptions {
            cascade: true,
            ..multi()
        };
        let derived = DerivedState::compute(&forest, &fields, &SelectedSet::new(), &cascade);
        assert_eq!(derived.get(id(&forest, "d1")).unwrap().disabled, None);
    }

    #[test]
    fn given_checked_parent_when_deriving_then_children_implied() {
        let forest = forest();
        let selected = SelectedSet::single(id(&forest, "p"));

        let derived = DerivedState::compute(&forest, &FieldMap::default(), &selected, &multi());
        let child = derived.get(id(&forest, "a")).unwrap();

        assert!(child.self_checked);
        assert!(!child.checked);
        assert_eq!(child.disabled, Some(DisabledReason::AncestorChecked));
    }

    #[test]
    fn given_bounds_when_deriving_then_blocks_overflow_and_underflow() {
        let forest = forest();
        let selected = SelectedSet::single(id(&forest, "q"));
        let opts = ViewOptions {
            min_length: Some(1),
            max_length: Some(1),
            ..multi()
        };

        let derived = DerivedState::compute(&forest, &FieldMap::default(), &selected, &opts);

        assert_eq!(
            derived.get(id(&forest, "q")).unwrap().disabled,
            Some(DisabledReason::MinLength)
        );
        assert_eq!(
            derived.get(id(&forest, "a")).unwrap().disabled,
            Some(DisabledReason::MaxLength)
        );
    }

    #[test]
    fn given_hidden_node_when_building_view_then_omitted() {
        let forest = forest();
        let fields = FieldMap::default();
        let opts = ViewOptions {
            creatable: true,
            editable: true,
            hide_root: true,
            ..multi()
        };
        let view = build_view(&ViewInput {
            forest: &forest,
            fields: &fields,
            selected: &SelectedSet::new(),
            fold: &FoldMap::default(),
            session: &EditSession::Idle,
            opts: &opts,
            root_label: "Root",
        });

        let labels: Vec<&str> = view.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["P", "D", "Q"]);
        assert!(view.root.can_add);
        assert!(view.root.checked);
        assert!(view.nodes[0].affordances.create);
        assert!(!view.nodes[0].affordances.remove);
        assert!(!view.nodes[1].affordances.edit);
    }

    #[test]
    fn given_open_session_when_building_view_then_no_affordances() {
        let forest = forest();
        let fields = FieldMap::default();
        let p = id(&forest, "p");
        let opts = ViewOptions {
            creatable: true,
            editable: true,
            removable: true,
            ..multi()
        };
        let session = EditSession::Adding {
            parent: Some(p),
            buffer: "new".into(),
        };
        let view = build_view(&ViewInput {
            forest: &forest,
            fields: &fields,
            selected: &SelectedSet::new(),
            fold: &FoldMap::default(),
            session: &session,
            opts: &opts,
            root_label: "Root",
        });

        assert!(view.nodes[0].adding_child);
        assert_eq!(view.nodes[0].affordances, Affordances::default());
        assert_eq!(view.buffer.as_deref(), Some("new"));
        assert!(!view.root.can_add);
    }
}
