#![forbid(unsafe_code)]

//! Engine options as data (feature `config`).
//!
//! [`EngineConfig`] is the serializable face of [`EngineOptions`]: the same
//! template/`el`/`data` triple plus an optional policy name, loadable from
//! TOML or JSON. Policy names are validated at parse time so a bad config
//! fails before an engine is anywhere near construction.

use core::fmt;

use serde::Deserialize;

use weft_core::Value;

use crate::gate::WritePolicy;
use crate::options::EngineOptions;

/// Errors from loading an engine config document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be deserialized.
    Parse(String),
    /// `policy` named something other than a known write policy.
    UnknownPolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::UnknownPolicy(name) => {
                write!(
                    f,
                    "unknown write policy '{name}' (expected 'first-write' or 'batch')"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A deserialized engine setup.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Template source.
    pub template: String,
    /// Target surface identifier.
    pub el: String,
    /// Initial data tree.
    pub data: Value,
    /// Optional gate policy name: `"first-write"` or `"batch"`.
    #[serde(default)]
    pub policy: Option<String>,
}

impl EngineConfig {
    /// Load a config from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.parse_policy()?;
        Ok(config)
    }

    /// Load a config from a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.parse_policy()?;
        Ok(config)
    }

    /// Convert into construction options, resolving the policy name.
    pub fn into_options(self) -> Result<EngineOptions, ConfigError> {
        let policy = self.parse_policy()?;
        Ok(EngineOptions::new(self.template, self.el, self.data).with_policy(policy))
    }

    fn parse_policy(&self) -> Result<WritePolicy, ConfigError> {
        match self.policy.as_deref() {
            None => Ok(WritePolicy::default()),
            Some("first-write") => Ok(WritePolicy::FirstWriteOnly),
            Some("batch") => Ok(WritePolicy::BatchAll),
            Some(other) => Err(ConfigError::UnknownPolicy(other.to_owned())),
        }
    }
}
