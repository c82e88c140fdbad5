//! Parameter values sent alongside an action.
//!
//! A [`ParamMap`] keeps insertion order, which is also the order the pairs
//! appear in the canonical query and therefore in the signature input.

use indexmap::IndexMap;
use serde_json::{Number, Value};

use crate::error::ApiError;

/// A single scalar parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(Number),
    Bool(bool),
}

impl Scalar {
    /// Wire form of the value: booleans become `1`/`0`, everything else its
    /// string representation.
    pub fn encode(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) => "0".to_string(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
        }
    }
}

/// A parameter value: scalar, absent, or a homogeneous list of scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl ParamValue {
    /// Convert a JSON value into a parameter value.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for objects, nested lists, `null`
    /// list elements and lists mixing scalar types.
    pub fn from_json(key: &str, value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let scalar = scalar_from_json(&format!("{key}[{index}]"), item)?;
                    if let Some(first) = list.first() {
                        if std::mem::discriminant(first) != std::mem::discriminant(&scalar) {
                            return Err(ApiError::invalid_input(format!(
                                "parameter '{key}' mixes {} and {} values",
                                Scalar::type_name(first),
                                scalar.type_name()
                            )));
                        }
                    }
                    list.push(scalar);
                }
                Ok(Self::List(list))
            }
            other => scalar_from_json(key, other).map(Self::Scalar),
        }
    }
}

fn scalar_from_json(key: &str, value: Value) -> Result<Scalar, ApiError> {
    match value {
        Value::String(s) => Ok(Scalar::String(s)),
        Value::Number(n) => Ok(Scalar::Number(n)),
        Value::Bool(b) => Ok(Scalar::Bool(b)),
        Value::Null => Err(ApiError::invalid_input(format!(
            "parameter '{key}' must not be null inside a list"
        ))),
        Value::Array(_) | Value::Object(_) => Err(ApiError::invalid_input(format!(
            "parameter '{key}' must be a scalar or a list of scalars"
        ))),
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::String(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Number(value.into()))
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::Scalar(Scalar::Number(value.into()))
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values.into_iter().map(Scalar::String).collect())
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(
            values
                .into_iter()
                .map(|v| Scalar::String(v.to_string()))
                .collect(),
        )
    }
}

/// Ordered map of parameter names to values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMap {
    entries: IndexMap<String, ParamValue>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Builder-style [`ParamMap::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Expand into wire pairs: `null` entries dropped, lists expanded into
    /// `key[0]`, `key[1]`, ..., scalars coerced with [`Scalar::encode`].
    pub fn encoded_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            match value {
                ParamValue::Null => {}
                ParamValue::Scalar(scalar) => pairs.push((key.clone(), scalar.encode())),
                ParamValue::List(items) => {
                    for (index, item) in items.iter().enumerate() {
                        pairs.push((format!("{key}[{index}]"), item.encode()));
                    }
                }
            }
        }
        pairs
    }

    /// Build a map from a JSON object, keeping the object's key order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] if `value` is not an object or any
    /// member is not a supported parameter shape.
    pub fn from_json(value: Value) -> Result<Self, ApiError> {
        let Value::Object(object) = value else {
            return Err(ApiError::invalid_input("parameters must be a JSON object"));
        };
        let mut map = Self::new();
        for (key, value) in object {
            let param = ParamValue::from_json(&key, value)?;
            map.entries.insert(key, param);
        }
        Ok(map)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
