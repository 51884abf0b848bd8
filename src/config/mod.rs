//! Configuration module for quill.
//!
//! Handles query options, the optional entity catalog file and environment
//! variable expansion.

mod settings;

pub use settings::{expand_env_vars, QueryOptions, Settings, SettingsError};
