//! Callbacks towards the host
//!
//! The selector calls a [`SelectorListener`] synchronously after its own
//! state has settled, at most once per callback kind and gesture.

use serde_json::Value;

/// Add request forwarded to the host.
///
/// Without a draft the host is asked to open its own add form for the node at
/// `path` (root level when `None`). With a draft the node was entered inline
/// and `path` points at the insertion slot, e.g. `[2, 0]` for the first child
/// of the third root.
#[derive(Debug, Clone, PartialEq)]
pub struct AddRequest {
    pub path: Option<Vec<usize>>,
    pub draft: Option<Value>,
    pub skip_form: bool,
}

/// Edit request forwarded to the host: the node with its new label, and the
/// node as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub updated: Value,
    pub original: Value,
    pub skip_form: bool,
}

pub trait SelectorListener {
    /// The selection changed; `value` is the encoded external value.
    fn on_change(&mut self, _value: &Value) {}

    fn on_add(&mut self, _request: &AddRequest) {}

    fn on_edit(&mut self, _request: &EditRequest) {}

    /// Removal is entirely up to the host; the selector keeps its state.
    fn on_delete(&mut self, _node: &Value) {}
}

/// Ignores every callback.
impl SelectorListener for () {}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEvent {
    Change(Value),
    Add(AddRequest),
    Edit(EditRequest),
    Delete(Value),
}

/// Records every callback in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    pub events: Vec<SelectorEvent>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&mut self) -> Vec<SelectorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn last_change(&self) -> Option<&Value> {
        self.events.iter().rev().find_map(|event| match event {
            SelectorEvent::Change(value) => Some(value),
            _ => None,
        })
    }
}

impl SelectorListener for RecordingListener {
    fn on_change(&mut self, value: &Value) {
        self.events.push(SelectorEvent::Change(value.clone()));
    }

    fn on_add(&mut self, request: &AddRequest) {
        self.events.push(SelectorEvent::Add(request.clone()));
    }

    fn on_edit(&mut self, request: &EditRequest) {
        self.events.push(SelectorEvent::Edit(request.clone()));
    }

    fn on_delete(&mut self, node: &Value) {
        self.events.push(SelectorEvent::Delete(node.clone()));
    }
}
