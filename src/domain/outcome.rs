//! Result of a single user gesture

use std::fmt;

use crate::domain::view::DisabledReason;

/// Gestures never fail; they either apply completely or are rejected and
/// leave every piece of state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The node id does not belong to the current forest
    UnknownNode,
    /// The node or one of its ancestors is hidden
    NotVisible,
    Disabled(DisabledReason),
    /// Fold toggle on a node without children
    Childless,
    /// An add or edit session is already open
    SessionOpen,
    /// Input, confirm or cancel without an open session
    NoSession,
    /// Confirm with an empty or blank buffer
    EmptyBuffer,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnknownNode => write!(f, "unknown node"),
            Rejection::NotVisible => write!(f, "node is hidden"),
            Rejection::Disabled(reason) => write!(f, "node is disabled: {reason}"),
            Rejection::Childless => write!(f, "node has no children"),
            Rejection::SessionOpen => write!(f, "an edit session is already open"),
            Rejection::NoSession => write!(f, "no edit session is open"),
            Rejection::EmptyBuffer => write!(f, "input is empty"),
        }
    }
}

impl From<Rejection> for Outcome {
    fn from(rejection: Rejection) -> Self {
        Outcome::Rejected(rejection)
    }
}
