//! Inline add/edit session
//!
//! At most one session is open at a time. The session only tracks what is
//! being typed; turning a confirmed session into a change request is up to
//! the caller, which receives a [`Commit`].

use tracing::{debug, instrument};

use crate::domain::arena::NodeId;
use crate::domain::outcome::{Outcome, Rejection};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    Idle,
    /// Adding a child of `parent`, or a root node when `parent` is `None`
    Adding {
        parent: Option<NodeId>,
        buffer: String,
    },
    Editing {
        target: NodeId,
        buffer: String,
    },
}

/// A confirmed session, ready to be forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    Add { parent: Option<NodeId>, label: String },
    Edit { target: NodeId, label: String },
}

impl EditSession {
    pub fn is_idle(&self) -> bool {
        matches!(self, EditSession::Idle)
    }

    pub fn is_adding(&self) -> bool {
        matches!(self, EditSession::Adding { .. })
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditSession::Editing { .. })
    }

    pub fn buffer(&self) -> Option<&str> {
        match self {
            EditSession::Idle => None,
            EditSession::Adding { buffer, .. } | EditSession::Editing { buffer, .. } => {
                Some(buffer.as_str())
            }
        }
    }

    /// `Some(parent)` while adding; the inner `None` means a root node.
    pub fn adding_parent(&self) -> Option<Option<NodeId>> {
        match self {
            EditSession::Adding { parent, .. } => Some(*parent),
            _ => None,
        }
    }

    pub fn editing_target(&self) -> Option<NodeId> {
        match self {
            EditSession::Editing { target, .. } => Some(*target),
            _ => None,
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn begin_add(&mut self, parent: Option<NodeId>) -> Outcome {
        if !self.is_idle() {
            return Rejection::SessionOpen.into();
        }
        *self = EditSession::Adding {
            parent,
            buffer: String::new(),
        };
        Outcome::Applied
    }

    #[instrument(level = "debug", skip(self))]
    pub fn begin_edit(&mut self, target: NodeId, label: String) -> Outcome {
        if !self.is_idle() {
            return Rejection::SessionOpen.into();
        }
        *self = EditSession::Editing {
            target,
            buffer: label,
        };
        Outcome::Applied
    }

    pub fn input(&mut self, text: &str) -> Outcome {
        match self {
            EditSession::Idle => Rejection::NoSession.into(),
            EditSession::Adding { buffer, .. } | EditSession::Editing { buffer, .. } => {
                *buffer = text.to_string();
                Outcome::Applied
            }
        }
    }

    /// Close the session and hand back what was entered.
    ///
    /// A blank buffer keeps the session open.
    #[instrument(level = "debug", skip(self))]
    pub fn confirm(&mut self) -> Result<Commit, Rejection> {
        match self.buffer() {
            None => return Err(Rejection::NoSession),
            Some(buffer) if buffer.trim().is_empty() => {
                debug!("confirm ignored: empty buffer");
                return Err(Rejection::EmptyBuffer);
            }
            Some(_) => {}
        }
        match std::mem::take(self) {
            EditSession::Adding { parent, buffer } => Ok(Commit::Add {
                parent,
                label: buffer,
            }),
            EditSession::Editing { target, buffer } => Ok(Commit::Edit {
                target,
                label: buffer,
            }),
            EditSession::Idle => Err(Rejection::NoSession),
        }
    }

    pub fn cancel(&mut self) {
        *self = EditSession::Idle;
    }
}
