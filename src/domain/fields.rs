//! Field-name indirection over node attributes
//!
//! Nodes are plain JSON objects; which key carries the label, the value, the
//! icon and the flags is decided by configuration. All engine code reads node
//! attributes through [`FieldMap`] so it never hardcodes attribute names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::{DomainError, DomainResult};

/// Attributes of a single node (its JSON object minus `children`).
pub type Attrs = Map<String, Value>;

/// Key holding the child nodes of a node object.
pub const CHILDREN_KEY: &str = "children";
/// Key hiding a node when truthy.
pub const HIDDEN_KEY: &str = "hidden";
/// Key hiding a node when explicitly `false`.
pub const VISIBLE_KEY: &str = "visible";

/// Mapping from logical node fields to attribute names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FieldMap {
    pub label_field: String,
    pub value_field: String,
    pub icon_field: String,
    pub unfolded_field: String,
    pub folded_field: String,
    pub disabled_field: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            label_field: "label".into(),
            value_field: "value".into(),
            icon_field: "icon".into(),
            unfolded_field: "unfolded".into(),
            folded_field: "folded".into(),
            disabled_field: "disabled".into(),
        }
    }
}

impl FieldMap {
    /// Label and value field names are required; the others may be empty to
    /// switch the corresponding lookup off.
    pub fn validate(&self) -> DomainResult<()> {
        if self.label_field.is_empty() {
            return Err(DomainError::EmptyFieldName("label_field"));
        }
        if self.value_field.is_empty() {
            return Err(DomainError::EmptyFieldName("value_field"));
        }
        Ok(())
    }

    pub fn label<'a>(&self, attrs: &'a Attrs) -> Option<&'a Value> {
        attrs.get(&self.label_field)
    }

    /// Label rendered as text; non-string labels use their JSON form.
    pub fn label_text(&self, attrs: &Attrs) -> String {
        match self.label(attrs) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn raw_value<'a>(&self, attrs: &'a Attrs) -> Option<&'a Value> {
        attrs.get(&self.value_field)
    }

    /// Value field as a comparable string key.
    pub fn value_key(&self, attrs: &Attrs) -> Option<String> {
        self.raw_value(attrs).and_then(value_key)
    }

    pub fn icon<'a>(&self, attrs: &'a Attrs) -> Option<&'a str> {
        if self.icon_field.is_empty() {
            return None;
        }
        attrs.get(&self.icon_field).and_then(Value::as_str)
    }

    pub fn is_disabled(&self, attrs: &Attrs) -> bool {
        flag(attrs, &self.disabled_field).unwrap_or(false)
    }

    /// Explicit unfolded flag, `None` when the attribute is absent.
    pub fn unfolded_flag(&self, attrs: &Attrs) -> Option<bool> {
        flag(attrs, &self.unfolded_field)
    }

    /// Explicit folded flag, `None` when the attribute is absent.
    pub fn folded_flag(&self, attrs: &Attrs) -> Option<bool> {
        flag(attrs, &self.folded_field)
    }
}

fn flag(attrs: &Attrs, field: &str) -> Option<bool> {
    if field.is_empty() {
        return None;
    }
    attrs.get(field).map(truthy)
}

/// String key used to compare values: strings as-is, numbers in decimal,
/// booleans as `true`/`false`. Null, arrays and objects have no key.
pub fn value_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Loose truthiness: `false`, `null`, numeric zero and the empty string are
/// false, everything else is true.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Per-node permission for the CRUD affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    Creatable,
    Editable,
    Removable,
}

impl Ability {
    pub fn key(self) -> &'static str {
        match self {
            Ability::Creatable => "creatable",
            Ability::Editable => "editable",
            Ability::Removable => "removable",
        }
    }
}

/// Absent annotation means allowed; only a falsy annotation forbids.
pub fn has_ability(attrs: &Attrs, ability: Ability) -> bool {
    attrs.get(ability.key()).map(truthy).unwrap_or(true)
}

pub fn is_visible(attrs: &Attrs) -> bool {
    let hidden = attrs.get(HIDDEN_KEY).map(truthy).unwrap_or(false);
    let invisible = matches!(attrs.get(VISIBLE_KEY), Some(Value::Bool(false)));
    !(hidden || invisible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attrs {
        match value {
            Value::Object(map) => map,
            _ => Attrs::new(),
        }
    }

    #[test]
    fn given_numeric_value_when_keyed_then_uses_decimal_text() {
        assert_eq!(value_key(&json!(42)), Some("42".to_string()));
        assert_eq!(value_key(&json!("a")), Some("a".to_string()));
        assert_eq!(value_key(&json!(true)), Some("true".to_string()));
        assert_eq!(value_key(&json!(null)), None);
    }

    #[test]
    fn given_custom_field_names_when_reading_then_uses_mapping() {
        let fields = FieldMap {
            label_field: "name".into(),
            value_field: "id".into(),
            ..FieldMap::default()
        };
        let node = attrs(json!({"name": "Alpha", "id": 7, "label": "ignored"}));

        assert_eq!(fields.label_text(&node), "Alpha");
        assert_eq!(fields.value_key(&node), Some("7".to_string()));
    }

    #[test]
    fn given_empty_value_field_when_validating_then_fails() {
        let fields = FieldMap {
            value_field: String::new(),
            ..FieldMap::default()
        };
        assert_eq!(
            fields.validate(),
            Err(DomainError::EmptyFieldName("value_field"))
        );
    }

    #[test]
    fn given_ability_annotations_when_checking_then_absence_allows() {
        let node = attrs(json!({"creatable": false, "editable": true}));
        assert!(!has_ability(&node, Ability::Creatable));
        assert!(has_ability(&node, Ability::Editable));
        assert!(has_ability(&node, Ability::Removable));
    }

    #[test]
    fn given_visibility_flags_when_filtering_then_hides_node() {
        assert!(is_visible(&attrs(json!({}))));
        assert!(!is_visible(&attrs(json!({"hidden": true}))));
        assert!(!is_visible(&attrs(json!({"visible": false}))));
        assert!(is_visible(&attrs(json!({"visible": 0}))));
    }

    #[test]
    fn given_flag_values_when_reading_then_applies_truthiness() {
        let fields = FieldMap::default();
        assert_eq!(fields.unfolded_flag(&attrs(json!({"unfolded": 1}))), Some(true));
        assert_eq!(fields.unfolded_flag(&attrs(json!({"unfolded": null}))), Some(false));
        assert_eq!(fields.folded_flag(&attrs(json!({}))), None);
        assert!(fields.is_disabled(&attrs(json!({"disabled": "yes"}))));
    }
}
