//! Declarative argument schemas
//!
//! An [`ArgumentSchema`] is an ordered list of [`FieldSpec`]s. Validation is pure:
//! unknown fields are dropped, optional fields receive their declared defaults, and
//! the first missing or mistyped field is reported by name.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        }
    }

    /// Check `value` against this type, returning the normalized value on a match.
    ///
    /// Integers accept any integral JSON number (`100.0` becomes `100`).
    fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (FieldType::String, Value::String(_))
            | (FieldType::Number, Value::Number(_))
            | (FieldType::Boolean, Value::Bool(_)) => Some(value.clone()),
            (FieldType::Integer, Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    return Some(json!(i));
                }
                let f = n.as_f64()?;
                (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64)
                    .then(|| json!(f as i64))
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole JSON numbers outside the `i64` range
fn is_oversized_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.as_i64().is_none() => {
            n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validation failure naming the offending field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    Missing { field: String },

    #[error("Invalid type for field '{field}': expected {expected}, found {found}")]
    TypeMismatch { field: String, expected: FieldType, found: &'static str },

    #[error("Value for field '{field}' is out of range: {reason}")]
    OutOfRange { field: String, reason: String },

    #[error("Arguments must be an object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("Invalid arguments: {0}")]
    Conversion(String),
}

impl ValidationError {
    /// Name of the field the error refers to
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Missing { field }
            | ValidationError::TypeMismatch { field, .. }
            | ValidationError::OutOfRange { field, .. } => field,
            ValidationError::NotAnObject { .. } | ValidationError::Conversion(_) => "arguments",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    pub default: Option<Value>,
    /// Smallest accepted value for integer fields
    pub minimum: Option<i64>,
    pub description: &'static str,
}

impl FieldSpec {
    pub fn required(name: &'static str, field_type: FieldType, description: &'static str) -> Self {
        Self { name, field_type, required: true, default: None, minimum: None, description }
    }

    pub fn optional(name: &'static str, field_type: FieldType, description: &'static str) -> Self {
        Self { name, field_type, required: false, default: None, minimum: None, description }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    fn check(&self, value: &Value) -> Result<Value, ValidationError> {
        let out_of_range = |reason: String| ValidationError::OutOfRange { field: self.name.to_string(), reason };

        if self.field_type == FieldType::Integer && is_oversized_integer(value) {
            return Err(out_of_range("outside the 64-bit integer range".to_string()));
        }
        let normalized = self.field_type.coerce(value).ok_or_else(|| ValidationError::TypeMismatch {
            field: self.name.to_string(),
            expected: self.field_type,
            found: json_type_name(value),
        })?;

        match (self.minimum, normalized.as_i64()) {
            (Some(minimum), Some(n)) if n < minimum => Err(out_of_range(format!("must be at least {minimum}"))),
            _ => Ok(normalized),
        }
    }

    /// `name (type, required|optional[, default: X]): description`
    pub fn describe(&self) -> String {
        let requirement = if self.required { "required" } else { "optional" };
        match &self.default {
            Some(default) => format!(
                "{} ({}, {}, default: {}): {}",
                self.name,
                self.field_type,
                requirement,
                display_default(default),
                self.description
            ),
            None => format!(
                "{} ({}, {}): {}",
                self.name, self.field_type, requirement, self.description
            ),
        }
    }
}

fn display_default(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Ordered field list for one tool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSchema {
    fields: Vec<FieldSpec>,
}

impl ArgumentSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn validate(&self, raw: &Value) -> Result<ValidatedArgs, ValidationError> {
        let empty = Map::new();
        let input = match raw {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => return Err(ValidationError::NotAnObject { found: json_type_name(other) }),
        };

        let mut out = Map::new();
        for spec in &self.fields {
            match input.get(spec.name) {
                None | Some(Value::Null) => {
                    if let Some(default) = &spec.default {
                        out.insert(spec.name.to_string(), default.clone());
                    } else if spec.required {
                        return Err(ValidationError::Missing { field: spec.name.to_string() });
                    }
                }
                Some(value) => {
                    out.insert(spec.name.to_string(), spec.check(value)?);
                }
            }
        }

        Ok(ValidatedArgs(out))
    }

    /// JSON Schema for the MCP `inputSchema` field
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for spec in &self.fields {
            let mut property = json!({
                "type": spec.field_type.as_str(),
                "description": spec.description,
            });
            if let Value::Object(obj) = &mut property {
                if let Some(default) = &spec.default {
                    obj.insert("default".to_string(), default.clone());
                }
                if let Some(minimum) = spec.minimum {
                    obj.insert("minimum".to_string(), json!(minimum));
                }
            }
            properties.insert(spec.name.to_string(), property);
        }

        let required: Vec<&str> =
            self.fields.iter().filter(|f| f.required).map(|f| f.name).collect();

        let mut schema = json!({ "type": "object", "properties": properties });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }
}

/// Arguments that passed validation, defaults applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArgs(Map<String, Value>);

impl ValidatedArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Convert into a typed argument record
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ValidationError> {
        serde_json::from_value(self.into_value())
            .map_err(|e| ValidationError::Conversion(e.to_string()))
    }
}
