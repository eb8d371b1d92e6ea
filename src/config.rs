//! Configuration module for mqcheck.
//!
//! Loads configuration from environment variables with sensible defaults and
//! reads the JSON rules file holding check parameters.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tokio::io::AsyncReadExt;

use crate::plugins::CheckError;

/// Agent output source meaning standard input.
pub const STDIN_SOURCE: &str = "-";

/// Checker configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckerConfig {
    /// Agent output file, or `-` for stdin (default: "-")
    pub agent_output: String,
    /// JSON rules file (default: none, all checks use default parameters)
    pub rules_path: Option<PathBuf>,
    /// Print the parsed sections as JSON before checking (default: false)
    pub dump_sections: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            agent_output: STDIN_SOURCE.to_string(),
            rules_path: None,
            dump_sections: false,
        }
    }
}

impl CheckerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `MQCHECK_AGENT_OUTPUT`: agent output file (default: "-")
    /// - `MQCHECK_RULES`: rules file path (default: none)
    /// - `MQCHECK_DUMP_SECTIONS`: `1`/`true` to dump parsed sections
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut cfg = Self::default();

        if let Some(source) = lookup("MQCHECK_AGENT_OUTPUT").filter(|s| !s.is_empty()) {
            cfg.agent_output = source;
        }

        if let Some(path) = lookup("MQCHECK_RULES").filter(|s| !s.is_empty()) {
            cfg.rules_path = Some(PathBuf::from(path));
        }

        if let Some(flag) = lookup("MQCHECK_DUMP_SECTIONS") {
            cfg.dump_sections = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        cfg
    }
}

/// Parameters of one ruleset, with per-item replacements.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RulesetConfig {
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub items: BTreeMap<String, Value>,
}

/// Check parameters keyed by ruleset name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Rules {
    rulesets: BTreeMap<String, RulesetConfig>,
}

impl Rules {
    pub fn from_json(text: &str) -> Result<Self, CheckError> {
        Ok(serde_json::from_str(text)?)
    }

    pub async fn load(path: &Path) -> Result<Self, CheckError> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_json(&text)
    }

    pub fn rulesets(&self) -> impl Iterator<Item = &str> {
        self.rulesets.keys().map(String::as_str)
    }

    /// Items with their own entry in the ruleset.
    pub fn configured_items<'a>(&'a self, ruleset: &str) -> impl Iterator<Item = &'a str> {
        self.rulesets
            .get(ruleset)
            .into_iter()
            .flat_map(|config| config.items.keys().map(String::as_str))
    }

    /// Parameters for `item`: its own entry if present, else the ruleset's.
    pub fn params_for(&self, ruleset: &str, item: &str) -> &Value {
        static NULL: Value = Value::Null;
        match self.rulesets.get(ruleset) {
            Some(config) => config.items.get(item).unwrap_or(&config.params),
            None => &NULL,
        }
    }
}

/// Read the whole agent output from a file or from stdin.
pub async fn read_agent_output(source: &str) -> Result<String, CheckError> {
    if source == STDIN_SOURCE {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }
    Ok(tokio::fs::read_to_string(source).await?)
}
