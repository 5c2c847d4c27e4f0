//! Selection, cascade and inline-edit state for hierarchical tree selectors.
//!
//! A host hands over a forest of JSON node objects and an external value;
//! [`application::TreeSelector`] decodes the value, applies check, fold and
//! edit gestures and reports changes through [`application::SelectorListener`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
