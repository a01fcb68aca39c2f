use std::path::Path;

use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to parse settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse settings TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("settings must be a key/value object, found {0}")]
    NotAnObject(&'static str),
}

/// Host key/value settings object handed to filter callbacks.
///
/// User values and registered defaults live in separate maps. Reads consult
/// the user value first, then the default, then fall back to the type's zero
/// value. Only user values are persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: Map<String, Value>,
    defaults: Map<String, Value>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses persisted settings (a JSON object of user values).
    pub fn from_json_str(source: &str) -> Result<Self, SettingsError> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_value(value)
    }

    /// Parses the same key/value shape written as TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let values: Map<String, Value> = toml::from_str(source)?;
        Ok(Self {
            values,
            defaults: Map::new(),
        })
    }

    /// Loads a settings file, choosing TOML for `.toml` files and JSON otherwise.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }

    fn from_value(value: Value) -> Result<Self, SettingsError> {
        match value {
            Value::Object(values) => Ok(Self {
                values,
                defaults: Map::new(),
            }),
            Value::Null => Err(SettingsError::NotAnObject("null")),
            Value::Bool(_) => Err(SettingsError::NotAnObject("a boolean")),
            Value::Number(_) => Err(SettingsError::NotAnObject("a number")),
            Value::String(_) => Err(SettingsError::NotAnObject("a string")),
            Value::Array(_) => Err(SettingsError::NotAnObject("an array")),
        }
    }

    /// Serialises the user values in the persisted shape.
    pub fn to_json_string(&self) -> String {
        Value::Object(self.values.clone()).to_string()
    }

    /// Serialises user values merged over defaults, as the filter would see them.
    pub fn to_effective_json_pretty(&self) -> String {
        let mut merged = self.defaults.clone();
        for (key, value) in &self.values {
            merged.insert(key.clone(), value.clone());
        }
        serde_json::to_string_pretty(&Value::Object(merged)).unwrap_or_else(|_| "{}".into())
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.values
            .get(key)
            .and_then(Value::as_bool)
            .or_else(|| self.defaults.get(key).and_then(Value::as_bool))
            .unwrap_or(false)
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), Value::Bool(value));
    }

    pub fn set_default_bool(&mut self, key: &str, value: bool) {
        self.defaults.insert(key.to_string(), Value::Bool(value));
    }

    pub fn has_user_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn has_default_value(&self, key: &str) -> bool {
        self.defaults.contains_key(key)
    }

    /// Copies every user value of `other` over this object, keeping defaults.
    pub fn apply(&mut self, other: &Settings) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn erase(&mut self, key: &str) {
        self.values.remove(key);
    }
}
