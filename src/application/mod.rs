//! Application layer: the selector container and its inputs
//!
//! This layer drives the domain engines and talks to the host through
//! [`SelectorListener`].

pub mod error;
pub mod error_ext;
pub mod listener;
pub mod loader;
pub mod selector;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::PathResultExt;
pub use listener::{AddRequest, EditRequest, RecordingListener, SelectorEvent, SelectorListener};
pub use loader::{load_forest, parse_value};
pub use selector::TreeSelector;
