//! Domain layer: forest snapshot, selection engine and edit session
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod cascade;
pub mod codec;
pub mod edit;
pub mod error;
pub mod fields;
pub mod fold;
pub mod outcome;
pub mod selection;
pub mod view;

pub use arena::{Forest, NodeData, NodeId, TreeNode};
pub use cascade::CascadeOptions;
pub use codec::CodecOptions;
pub use edit::{Commit, EditSession};
pub use error::{DomainError, DomainResult};
pub use fields::{Ability, Attrs, FieldMap};
pub use fold::{FoldMap, FoldOptions};
pub use outcome::{Outcome, Rejection};
pub use selection::SelectedSet;
pub use view::{
    Affordances, DerivedState, DisabledReason, NodeState, NodeView, RootView, SelectorView,
    ViewOptions,
};
