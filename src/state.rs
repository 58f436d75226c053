//! The field map a resource callback reads from and writes into.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::schema::{Block, Schema};
use crate::validation::check_field;

/// Name of the identity field every resource and data source carries.
pub const ID_FIELD: &str = "id";

/// State of one resource instance, checked against its schema.
///
/// Reads fall back to the schema's default (or the type's zero value) when a
/// field is absent. Writes through [`ResourceData::set_all`] are atomic:
/// every field is checked before any is stored.
#[derive(Debug, Clone)]
pub struct ResourceData {
    block: Block,
    values: Map<String, Value>,
}

impl ResourceData {
    /// Wrap `state` (an object, or null for an empty state).
    pub fn new(schema: &Schema, state: Value) -> Result<Self, ProviderError> {
        let values = match state {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ProviderError::Validation(format!(
                    "expected state to be an object, got {}",
                    other
                )))
            },
        };

        Ok(Self {
            block: schema.block.clone(),
            values,
        })
    }

    /// The identity of the instance, or `""` when it has none.
    pub fn id(&self) -> &str {
        self.values
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Set the identity of the instance.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.values
            .insert(ID_FIELD.to_string(), Value::String(id.into()));
    }

    /// Clear the identity, marking the instance as gone.
    pub fn clear_id(&mut self) {
        self.values.remove(ID_FIELD);
    }

    /// The raw value of a field, if present and non-null.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// A string field, defaulting to the schema default or `""`.
    pub fn get_string(&self, name: &str) -> Result<String, ProviderError> {
        match self.get_or_default(name) {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(type_mismatch(name, "string", &other)),
        }
    }

    /// A bool field, defaulting to the schema default or `false`.
    pub fn get_bool(&self, name: &str) -> Result<bool, ProviderError> {
        match self.get_or_default(name) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(b),
            Some(other) => Err(type_mismatch(name, "bool", &other)),
        }
    }

    /// A list block decoded into `T`, empty when absent.
    ///
    /// Null attributes inside each element are dropped before decoding so
    /// that `#[serde(default)]` applies to them.
    pub fn get_list<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, ProviderError> {
        let items = match self.get(name) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => return Err(type_mismatch(name, "list", other)),
        };

        items
            .iter()
            .map(|item| {
                let cleaned = match item {
                    Value::Object(map) => Value::Object(
                        map.iter()
                            .filter(|(_, v)| !v.is_null())
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect(),
                    ),
                    other => other.clone(),
                };
                serde_json::from_value(cleaned).map_err(|e| {
                    ProviderError::Validation(format!("invalid element in '{}': {}", name, e))
                })
            })
            .collect()
    }

    /// Set a single field.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), ProviderError> {
        self.set_all([(name, value)])
    }

    /// Set several fields at once.
    ///
    /// All fields are checked against the schema first; if any is unknown or
    /// has the wrong type, nothing is written.
    pub fn set_all<I, K>(&mut self, fields: I) -> Result<(), ProviderError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let fields: Vec<(String, Value)> = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();

        for (name, value) in &fields {
            check_field(&self.block, name, value).map_err(|diagnostic| {
                ProviderError::Validation(match diagnostic.detail {
                    Some(detail) => format!("{}: {}", diagnostic.summary, detail),
                    None => diagnostic.summary,
                })
            })?;
        }

        self.values.extend(fields);
        Ok(())
    }

    /// The state to hand back to the host.
    pub fn into_state(self) -> Value {
        Value::Object(self.values)
    }

    fn get_or_default(&self, name: &str) -> Option<Value> {
        self.get(name).cloned().or_else(|| {
            self.block
                .attributes
                .get(name)
                .and_then(|attr| attr.default.clone())
        })
    }
}

fn type_mismatch(name: &str, expected: &str, got: &Value) -> ProviderError {
    ProviderError::Validation(format!(
        "attribute '{}' should be a {}, got {}",
        name, expected, got
    ))
}
