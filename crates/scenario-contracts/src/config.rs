// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// Static lookup tables, no I/O.
    #[default]
    Template,
    /// One local-model call per stage unit, with fallbacks.
    Model,
}

impl EngineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineMode::Template => "template",
            EngineMode::Model => "model",
        }
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EngineMode {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "model" | "llm" => EngineMode::Model,
            _ => EngineMode::Template,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelBackend {
    /// `ollama run <model> <prompt>` as a subprocess.
    #[default]
    Cli,
    /// Ollama's `/api/generate` HTTP endpoint.
    Http,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: EngineMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub backend: ModelBackend,
    pub binary: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Domains that get model-generated impacts; the rest get the placeholder.
    pub impact_domain_limit: usize,
    /// First-order impacts used as seeds for ripple chains.
    pub ripple_seed_limit: usize,
    /// Ask for a free-text analysis once the stages are done.
    pub narrative: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            backend: ModelBackend::default(),
            binary: "ollama".to_string(),
            model: "llama2".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            timeout_secs: 30,
            max_retries: 0,
            impact_domain_limit: 3,
            ripple_seed_limit: 3,
            narrative: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:9999".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatIfConfig {
    pub engine: EngineConfig,
    pub model: ModelSettings,
    pub server: ServerConfig,
}

impl WhatIfConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "model.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.model.impact_domain_limit == 0 || self.model.ripple_seed_limit == 0 {
            return Err(ConfigError::Invalid(
                "model.impact_domain_limit and model.ripple_seed_limit must be at least 1"
                    .to_string(),
            ));
        }
        if self.model.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model.model must not be empty".to_string()));
        }
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = WhatIfConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.mode, EngineMode::Template);
        assert_eq!(config.model.timeout_secs, 30);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = WhatIfConfig::default();
        config.model.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: WhatIfConfig =
            serde_json::from_str(r#"{"engine": {"mode": "model"}, "model": {"model": "mistral"}}"#)
                .unwrap();
        assert_eq!(config.engine.mode, EngineMode::Model);
        assert_eq!(config.model.model, "mistral");
        assert_eq!(config.model.binary, "ollama");
        assert_eq!(config.server.bind, "127.0.0.1:9999");
    }

    #[test]
    fn engine_mode_from_string() {
        assert_eq!(EngineMode::from("LLM".to_string()), EngineMode::Model);
        assert_eq!(EngineMode::from("fast".to_string()), EngineMode::Template);
    }
}
