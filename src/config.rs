use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Key-value configuration for one rule checker.
///
/// The backing store is one JSON object per checker, mapping rule keys to
/// parameter objects. Every lookup is a pure `(rule, param, default)`
/// function: a missing key or a value that cannot be coerced to the
/// requested type yields the caller's default, never an error.
#[derive(Debug, Clone, Default)]
pub struct ConfigReader {
    root: Value,
}

impl ConfigReader {
    /// Loads a checker section from a JSON file. The file must exist and
    /// contain a JSON object; anything else is a startup failure.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let root: Value = serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in config file {}", path.display()))?;
        if !root.is_object() {
            bail!("config file {} must contain a JSON object", path.display());
        }
        Ok(Self { root })
    }

    /// Wraps an already-built JSON value. Used by tests and by the built-in
    /// default configuration.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// A reader with no overrides: every lookup returns its default.
    pub fn empty() -> Self {
        Self { root: Value::Null }
    }

    fn parameter(&self, rule: &str, param: &str) -> Option<&Value> {
        self.root.get(rule)?.get(param)
    }

    pub fn get_bool(&self, rule: &str, param: &str, default: bool) -> bool {
        match self.parameter(rule, param) {
            Some(Value::Bool(value)) => *value,
            Some(Value::String(value)) => match value.to_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => default,
            },
            _ => default,
        }
    }

    pub fn get_int(&self, rule: &str, param: &str, default: i64) -> i64 {
        match self.parameter(rule, param) {
            Some(Value::Number(value)) => value.as_i64().unwrap_or(default),
            Some(Value::String(value)) => value.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    pub fn get_string(&self, rule: &str, param: &str, default: &str) -> String {
        match self.parameter(rule, param) {
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            Some(Value::Bool(value)) => value.to_string(),
            _ => default.to_string(),
        }
    }

    pub fn get_string_array(&self, rule: &str, param: &str, default: &[&str]) -> Vec<String> {
        match self.parameter(rule, param) {
            Some(Value::Array(values)) => values
                .iter()
                .map(|value| match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => default.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The three checker configuration sections, loaded together at startup.
///
/// Construction is explicit: the analyzer receives a `Config` value rather
/// than reading hidden global state, and a load failure surfaces as an
/// error before any rule executes.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub diagnostics: ConfigReader,
    pub framework: ConfigReader,
    pub code_quality: ConfigReader,
}

impl Config {
    /// Loads `Diagnostics.json`, `Framework.json` and `CodeQuality.json`
    /// from a config directory. All three are required.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            bail!("config folder not found at {}", dir.display());
        }
        Ok(Self {
            diagnostics: ConfigReader::from_file(&dir.join("Diagnostics.json"))?,
            framework: ConfigReader::from_file(&dir.join("Framework.json"))?,
            code_quality: ConfigReader::from_file(&dir.join("CodeQuality.json"))?,
        })
    }
}
