//! Tree selector state container
//!
//! Owns the forest snapshot, the selected set, the fold map and the edit
//! session, applies gestures atomically and reports to a [`SelectorListener`].

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::application::listener::{AddRequest, EditRequest, SelectorListener};
use crate::application::ApplicationResult;
use crate::config::SelectorConfig;
use crate::domain::cascade;
use crate::domain::codec;
use crate::domain::view::{build_view, ViewInput};
use crate::domain::{
    Commit, DerivedState, DisabledReason, EditSession, FoldMap, Forest, NodeId, NodeState,
    Outcome, Rejection, SelectedSet, SelectorView,
};

pub struct TreeSelector<L: SelectorListener> {
    config: SelectorConfig,
    forest: Forest,
    selected: SelectedSet,
    fold: FoldMap,
    session: EditSession,
    listener: L,
}

impl<L: SelectorListener> TreeSelector<L> {
    /// Build a selector for `forest` with the external `value` decoded into
    /// the initial selection.
    ///
    /// # Errors
    /// Fails only on an invalid configuration.
    #[instrument(level = "debug", skip_all)]
    pub fn new(config: SelectorConfig, forest: Forest, value: &Value, listener: L) -> ApplicationResult<Self> {
        config.validate()?;
        let selected = codec::decode(&forest, value, &config.fields, &config.codec());
        let fold = FoldMap::compute_initial(&forest, &config.fields, &config.fold());
        debug!(nodes = forest.len(), selected = selected.len(), "selector initialized");
        Ok(Self {
            config,
            forest,
            selected,
            fold,
            session: EditSession::Idle,
            listener,
        })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn selected(&self) -> &SelectedSet {
        &self.selected
    }

    pub fn fold(&self) -> &FoldMap {
        &self.fold
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// First node in depth-first order whose value key equals `key`.
    pub fn find_by_value(&self, key: &str) -> Option<NodeId> {
        self.forest.find_by_value(&self.config.fields, key)
    }

    /// The current selection in its external representation.
    pub fn value(&self) -> Value {
        codec::encode(&self.forest, &self.selected, &self.config.fields, &self.config.codec())
    }

    /// The host supplied a new value for the same forest.
    #[instrument(level = "debug", skip(self))]
    pub fn set_value(&mut self, value: &Value) {
        self.selected = codec::decode(&self.forest, value, &self.config.fields, &self.config.codec());
    }

    /// The host supplied a new forest. Selection and folds are derived anew and
    /// any open session is dropped, its node ids belong to the old snapshot.
    #[instrument(level = "debug", skip_all)]
    pub fn set_forest(&mut self, forest: Forest, value: &Value) {
        self.selected = codec::decode(&forest, value, &self.config.fields, &self.config.codec());
        self.fold = FoldMap::compute_initial(&forest, &self.config.fields, &self.config.fold());
        self.session = EditSession::Idle;
        self.forest = forest;
    }

    pub fn derived(&self) -> DerivedState {
        DerivedState::compute(&self.forest, &self.config.fields, &self.selected, &self.config.view())
    }

    pub fn node_state(&self, id: NodeId) -> Option<NodeState> {
        self.derived().get(id).copied()
    }

    pub fn view(&self) -> SelectorView {
        let opts = self.config.view();
        build_view(&ViewInput {
            forest: &self.forest,
            fields: &self.config.fields,
            selected: &self.selected,
            fold: &self.fold,
            session: &self.session,
            opts: &opts,
            root_label: &self.config.root_label,
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn toggle_fold(&mut self, id: NodeId) -> Outcome {
        if !self.forest.contains(id) {
            return Rejection::UnknownNode.into();
        }
        if self.fold.toggle(&self.forest, &self.config.fields, id) {
            Outcome::Applied
        } else {
            Rejection::Childless.into()
        }
    }

    /// Single choice: the selection becomes exactly this node.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&mut self, id: NodeId) -> Outcome {
        if let Err(rejection) = self.guard_toggle(id) {
            return rejection.into();
        }
        self.selected = cascade::select(id);
        self.emit_change();
        Outcome::Applied
    }

    /// Multiple choice: check or uncheck a node under the cascade rules.
    ///
    /// Disabled nodes are refused here too, and so is any result that a
    /// cascade would push past `min_length`/`max_length`.
    #[instrument(level = "debug", skip(self))]
    pub fn check(&mut self, id: NodeId, next_checked: bool) -> Outcome {
        if let Err(rejection) = self.guard_toggle(id) {
            return rejection.into();
        }
        let next = cascade::check(
            &self.forest,
            &self.selected,
            id,
            next_checked,
            &self.config.cascade(),
        );
        if let Err(rejection) = self.guard_bounds(&next) {
            return rejection.into();
        }
        self.selected = next;
        self.emit_change();
        Outcome::Applied
    }

    /// A click on the node text: toggles the displayed state in multiple
    /// mode, selects otherwise.
    #[instrument(level = "debug", skip(self))]
    pub fn activate(&mut self, id: NodeId) -> Outcome {
        let state = match self.guard_toggle(id) {
            Ok(state) => state,
            Err(rejection) => return rejection.into(),
        };
        if self.config.multiple {
            self.check(id, !state.self_checked)
        } else {
            self.select(id)
        }
    }

    /// Drop the whole selection. Emits the root value when joining values.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) -> Outcome {
        self.selected.clear();
        let value = if self.config.join_values {
            self.config.root_value.clone()
        } else {
            Value::Array(Vec::new())
        };
        self.listener.on_change(&value);
        Outcome::Applied
    }

    /// Start adding a child of `parent` (a root node when `None`).
    ///
    /// When the host handles CRUD itself the request is forwarded with the
    /// parent's path and the state stays as it is.
    #[instrument(level = "debug", skip(self))]
    pub fn request_add(&mut self, parent: Option<NodeId>) -> Outcome {
        if let Some(p) = parent {
            if !self.forest.contains(p) {
                return Rejection::UnknownNode.into();
            }
        }
        if !self.config.builtin_cud {
            let request = AddRequest {
                path: parent.and_then(|p| self.forest.path_index(p)),
                draft: None,
                skip_form: false,
            };
            debug!(?request.path, "delegating add to host");
            self.listener.on_add(&request);
            return Outcome::Applied;
        }
        self.session.begin_add(parent)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn request_edit(&mut self, id: NodeId) -> Outcome {
        let Some(attrs) = self.forest.attrs(id) else {
            return Rejection::UnknownNode.into();
        };
        let label = self.config.fields.label_text(attrs);
        self.session.begin_edit(id, label)
    }

    /// Forward a removal to the host. The selector's own state only changes
    /// once the host hands over a new forest.
    #[instrument(level = "debug", skip(self))]
    pub fn request_remove(&mut self, id: NodeId) -> Outcome {
        if !self.forest.contains(id) {
            return Rejection::UnknownNode.into();
        }
        let node = self.forest.node_json(id);
        self.listener.on_delete(&node);
        Outcome::Applied
    }

    pub fn input_changed(&mut self, text: &str) -> Outcome {
        self.session.input(text)
    }

    /// Commit the open session to the host and return to idle.
    #[instrument(level = "debug", skip(self))]
    pub fn confirm(&mut self) -> Outcome {
        let commit = match self.session.confirm() {
            Ok(commit) => commit,
            Err(rejection) => {
                debug!(%rejection, "confirm rejected");
                return rejection.into();
            }
        };
        let label_field = self.config.fields.label_field.clone();

        match commit {
            Commit::Add { parent, label } => {
                let mut path = parent
                    .and_then(|p| self.forest.path_index(p))
                    .unwrap_or_default();
                path.push(0);
                let mut draft = Map::new();
                draft.insert(label_field, Value::String(label));
                self.listener.on_add(&AddRequest {
                    path: Some(path),
                    draft: Some(Value::Object(draft)),
                    skip_form: true,
                });
            }
            Commit::Edit { target, label } => {
                let original = self.forest.node_json(target);
                let mut updated = original.clone();
                if let Value::Object(map) = &mut updated {
                    map.insert(label_field, Value::String(label));
                }
                self.listener.on_edit(&EditRequest {
                    updated,
                    original,
                    skip_form: true,
                });
            }
        }
        Outcome::Applied
    }

    pub fn cancel(&mut self) -> Outcome {
        self.session.cancel();
        Outcome::Applied
    }

    /// The node's derived state, or why it cannot be toggled.
    fn guard_toggle(&self, id: NodeId) -> Result<NodeState, Rejection> {
        if !self.forest.contains(id) {
            return Err(Rejection::UnknownNode);
        }
        let state = self.node_state(id).ok_or(Rejection::NotVisible)?;
        if let Some(reason) = state.disabled {
            debug!(%reason, "toggle rejected");
            return Err(Rejection::Disabled(reason));
        }
        Ok(state)
    }

    /// A cascade can move several nodes at once; the resulting size must stay
    /// within the bounds in the direction it moved.
    fn guard_bounds(&self, next: &SelectedSet) -> Result<(), Rejection> {
        let before = self.selected.len();
        let after = next.len();
        let max = self.config.max_length.filter(|&m| m > 0);
        let min = self.config.min_length.filter(|&m| m > 0);
        if after > before && max.is_some_and(|max| after > max) {
            debug!(before, after, "check rejected: max length");
            return Err(Rejection::Disabled(DisabledReason::MaxLength));
        }
        if after < before && min.is_some_and(|min| after < min) {
            debug!(before, after, "check rejected: min length");
            return Err(Rejection::Disabled(DisabledReason::MinLength));
        }
        Ok(())
    }

    fn emit_change(&mut self) {
        let value = self.value();
        debug!(%value, "selection changed");
        self.listener.on_change(&value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::listener::{RecordingListener, SelectorEvent};
    use serde_json::json;

    fn forest() -> Forest {
        Forest::from_json(&json!([
            {"label": "P", "value": "p", "children": [
                {"label": "C", "value": "c"}
            ]},
            {"label": "Q", "value": "q"}
        ]))
        .unwrap()
    }

    fn selector(config: SelectorConfig, value: Value) -> TreeSelector<RecordingListener> {
        TreeSelector::new(config, forest(), &value, RecordingListener::new()).unwrap()
    }

    #[test]
    fn given_single_mode_when_activating_then_selects_and_emits_scalar() {
        let mut sel = selector(SelectorConfig::default(), json!("q"));
        let p = sel.find_by_value("p").unwrap();

        assert!(sel.activate(p).is_applied());

        assert_eq!(sel.listener().last_change(), Some(&json!("p")));
        assert_eq!(sel.selected().as_slice(), &[p]);
    }

    #[test]
    fn given_multiple_mode_when_activating_checked_node_then_unchecks() {
        let config = SelectorConfig {
            multiple: true,
            ..SelectorConfig::default()
        };
        let mut sel = selector(config, json!("q"));
        let q = sel.find_by_value("q").unwrap();

        assert!(sel.activate(q).is_applied());

        assert!(sel.selected().is_empty());
        assert_eq!(sel.listener().last_change(), Some(&json!("")));
    }

    #[test]
    fn given_stale_node_when_checking_then_rejected_without_event() {
        let mut sel = selector(SelectorConfig::default(), Value::Null);
        let stale = sel.find_by_value("q").unwrap();
        sel.set_forest(Forest::new(), &Value::Null);

        assert_eq!(sel.check(stale, true), Outcome::Rejected(Rejection::UnknownNode));
        assert!(sel.listener().events.is_empty());
    }

    #[test]
    fn given_disabled_node_when_selecting_then_rejected_with_reason() {
        let config = SelectorConfig {
            disabled: true,
            ..SelectorConfig::default()
        };
        let mut sel = selector(config, Value::Null);
        let q = sel.find_by_value("q").unwrap();

        assert_eq!(
            sel.select(q),
            Outcome::Rejected(Rejection::Disabled(crate::domain::DisabledReason::TreeDisabled))
        );
        assert!(sel.selected().is_empty());
    }

    #[test]
    fn given_delegated_cud_when_requesting_add_then_forwards_path_only() {
        let mut sel = selector(SelectorConfig::default(), Value::Null);
        let p = sel.find_by_value("p").unwrap();

        assert!(sel.request_add(Some(p)).is_applied());

        assert!(sel.session().is_idle());
        assert_eq!(
            sel.listener().events,
            vec![SelectorEvent::Add(AddRequest {
                path: Some(vec![0]),
                draft: None,
                skip_form: false,
            })]
        );
    }

    #[test]
    fn given_edit_session_when_confirming_then_emits_updated_and_original() {
        let config = SelectorConfig {
            builtin_cud: true,
            ..SelectorConfig::default()
        };
        let mut sel = selector(config, Value::Null);
        let c = sel.find_by_value("c").unwrap();

        sel.request_edit(c);
        sel.input_changed("Renamed");
        assert!(sel.confirm().is_applied());

        assert!(sel.session().is_idle());
        assert_eq!(
            sel.listener().events,
            vec![SelectorEvent::Edit(EditRequest {
                updated: json!({"label": "Renamed", "value": "c"}),
                original: json!({"label": "C", "value": "c"}),
                skip_form: true,
            })]
        );
    }

    #[test]
    fn given_join_values_when_clearing_then_emits_root_value() {
        let config = SelectorConfig {
            multiple: true,
            ..SelectorConfig::default()
        };
        let mut sel = selector(config, json!("p,q"));

        sel.clear();

        assert!(sel.selected().is_empty());
        assert_eq!(sel.listener().last_change(), Some(&json!(0)));
    }

    #[test]
    fn given_new_forest_when_replacing_then_session_is_dropped() {
        let config = SelectorConfig {
            builtin_cud: true,
            ..SelectorConfig::default()
        };
        let mut sel = selector(config, Value::Null);
        sel.request_add(None);
        sel.input_changed("pending");

        sel.set_forest(forest(), &json!("c"));

        assert!(sel.session().is_idle());
        assert_eq!(sel.value(), json!("c"));
    }
}
