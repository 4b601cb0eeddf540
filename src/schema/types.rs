use crate::schema::Processor;
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A single extracted value.
///
/// The closed set of shapes a record field can take: null, a scalar, or a
/// sequence of scalars. Untagged serde representation so records round-trip
/// through JSON unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Many(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrows the text content, if this value is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value as a single cell for tabular exports.
    ///
    /// Null renders empty; sequences render as their JSON representation.
    pub fn render_cell(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::Many(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

/// One scraped page's worth of extracted fields
pub type Record = BTreeMap<String, Value>;

/// Mapping from field name to extraction rule
pub type Schema = BTreeMap<String, FieldSpec>;

/// One field's extraction rule.
///
/// Either a bare CSS selector string, or a structured spec with attribute,
/// multiplicity and a processor pipeline. Anything else is kept as-is and
/// diagnosed at extraction time: a malformed spec warns and omits its field
/// instead of failing the whole schema load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Selector(String),
    Structured(StructuredField),
    Malformed(serde_json::Value),
}

/// The structured form of a field spec
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredField {
    /// CSS selector; a missing or empty selector skips the field with a warning
    #[serde(default)]
    pub selector: Option<String>,

    /// Attribute to read instead of the node text
    #[serde(default)]
    pub attribute: Option<String>,

    /// Keep every matched node instead of collapsing to the first
    #[serde(default)]
    pub multiple: bool,

    /// Transform pipeline applied to each extracted value, in order
    #[serde(default)]
    pub processors: Vec<Processor>,
}

/// Loads a schema from a JSON or TOML file, chosen by extension
pub fn load_schema(path: &Path) -> Result<Schema, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => Ok(serde_json::from_str(&content)?),
        "toml" => Ok(toml::from_str(&content)?),
        other => Err(ConfigError::UnsupportedExtension(other.to_string())),
    }
}
