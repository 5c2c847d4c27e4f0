//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (mirror the widget defaults)
//! 2. Global config: `$XDG_CONFIG_HOME/treeselect/treeselect.toml`
//! 3. Local config: an explicit file passed by the caller
//! 4. Environment variables: `TREESELECT_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ApplicationError;
use crate::domain::{CascadeOptions, CodecOptions, DomainResult, FieldMap, FoldOptions, ViewOptions};

/// Behaviour of one tree selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    /// Attribute names for label, value, icon and flags
    pub fields: FieldMap,

    /// Multiple choice with checkboxes
    pub multiple: bool,
    /// Single choice shows radio marks
    pub show_radio: bool,
    /// Disable the whole selector
    pub disabled: bool,

    /// Parent and child selections are independent
    pub cascade: bool,
    /// Checking a parent keeps its descendants selected
    pub with_children: bool,
    /// Checking a parent selects its leaves instead of itself
    pub only_children: bool,
    /// A disabled node disables its subtree
    pub self_disabled_affect_children: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,

    /// Emit a delimited string (multiple) or bare scalar (single)
    pub join_values: bool,
    /// Without join_values, emit raw values instead of node objects
    pub extract_value: bool,
    pub delimiter: String,

    /// Expand every branch initially
    pub initially_open: bool,
    /// When not initially open, expand branches up to this level (roots are 1)
    pub unfolded_level: usize,

    /// Hide the synthetic root item
    pub hide_root: bool,
    pub root_label: String,
    /// Value emitted by `clear` when joining values
    pub root_value: Value,

    /// Handle add/edit input in-core instead of delegating add to the host
    pub builtin_cud: bool,
    pub creatable: bool,
    pub root_creatable: bool,
    pub editable: bool,
    pub removable: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            fields: FieldMap::default(),
            multiple: false,
            show_radio: false,
            disabled: false,
            cascade: false,
            with_children: false,
            only_children: false,
            self_disabled_affect_children: true,
            min_length: None,
            max_length: None,
            join_values: true,
            extract_value: false,
            delimiter: ",".into(),
            initially_open: true,
            unfolded_level: 0,
            hide_root: true,
            root_label: "Root".into(),
            root_value: Value::from(0),
            builtin_cud: false,
            creatable: false,
            root_creatable: true,
            editable: false,
            removable: false,
        }
    }
}

impl SelectorConfig {
    /// Fail fast on configurations the core cannot work with.
    pub fn validate(&self) -> DomainResult<()> {
        self.fields.validate()?;
        self.codec().validate()
    }

    pub fn codec(&self) -> CodecOptions {
        CodecOptions {
            multiple: self.multiple,
            join_values: self.join_values,
            extract_value: self.extract_value,
            delimiter: self.delimiter.clone(),
        }
    }

    pub fn cascade(&self) -> CascadeOptions {
        CascadeOptions {
            cascade: self.cascade,
            with_children: self.with_children,
            only_children: self.only_children,
            self_disabled_affect_children: self.self_disabled_affect_children,
            multiple: self.multiple,
        }
    }

    pub fn fold(&self) -> FoldOptions {
        FoldOptions {
            initially_open: self.initially_open,
            unfolded_level: self.unfolded_level,
        }
    }

    pub fn view(&self) -> ViewOptions {
        ViewOptions {
            multiple: self.multiple,
            cascade: self.cascade,
            only_children: self.only_children,
            self_disabled_affect_children: self.self_disabled_affect_children,
            show_radio: self.show_radio,
            disabled: self.disabled,
            min_length: self.min_length,
            max_length: self.max_length,
            creatable: self.creatable,
            editable: self.editable,
            removable: self.removable,
            hide_root: self.hide_root,
            root_creatable: self.root_creatable,
        }
    }
}

/// Unified configuration for treeselect.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub selector: SelectorConfig,
}

/// Get the XDG config directory for treeselect.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treeselect").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treeselect.toml"))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file; it must exist when given
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let defaults = Config::try_from(&Settings::default()).map_err(config_err)?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(path) = local {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("TREESELECT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.selector.validate()?;
        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treeselect configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treeselect/treeselect.toml
#   Local:  file passed with --config
#   Env:    TREESELECT_SELECTOR__<KEY> environment variables

[selector]
# multiple = false
# cascade = false
# with_children = false
# only_children = false
# self_disabled_affect_children = true
# min_length = 1
# max_length = 3

# join_values = true
# extract_value = false
# delimiter = ","

# initially_open = true
# unfolded_level = 0

# hide_root = true
# root_label = "Root"
# root_value = 0

# builtin_cud = false
# creatable = false
# root_creatable = true
# editable = false
# removable = false

[selector.fields]
# label_field = "label"
# value_field = "value"
# icon_field = "icon"
# unfolded_field = "unfolded"
# folded_field = "folded"
# disabled_field = "disabled"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
