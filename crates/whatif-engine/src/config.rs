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

use config::{Config, Environment, File, FileFormat};
use scenario_contracts::{ConfigError, EngineMode, WhatIfConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "whatif.toml";
pub const ENV_PREFIX: &str = "WHATIF";

/// Layers built-in defaults, an optional TOML file and `WHATIF__*`
/// environment variables, in that order of precedence (last wins). An engine
/// override from the command line beats every layer, on reloads too.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    engine_override: Option<EngineMode>,
}

impl ConfigLoader {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            engine_override: None,
        }
    }

    pub fn with_engine_override(mut self, mode: Option<EngineMode>) -> Self {
        self.engine_override = mode;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> Result<WhatIfConfig, ConfigError> {
        let defaults = Config::try_from(&WhatIfConfig::default())
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let file = match &self.path {
            Some(path) => File::from(path.as_path())
                .format(FileFormat::Toml)
                .required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let mut config: WhatIfConfig = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|built| built.try_deserialize())
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        if let Some(mode) = self.engine_override {
            config.engine.mode = mode;
        }
        config.validate()?;
        info!(
            engine = %config.engine.mode,
            model = %config.model.model,
            file = ?self.path,
            "Configuration loaded"
        );
        Ok(config)
    }
}

/// Current configuration shared between request handlers.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    loader: ConfigLoader,
    current: Arc<RwLock<WhatIfConfig>>,
}

impl ConfigStore {
    pub fn load(loader: ConfigLoader) -> Result<Self, ConfigError> {
        let config = loader.load()?;
        Ok(Self::with_config(loader, config))
    }

    pub fn with_config(loader: ConfigLoader, config: WhatIfConfig) -> Self {
        Self {
            loader,
            current: Arc::new(RwLock::new(config)),
        }
    }

    pub async fn snapshot(&self) -> WhatIfConfig {
        self.current.read().await.clone()
    }

    /// Re-reads every source. On failure the previous configuration stays in place.
    pub async fn reload(&self) -> Result<WhatIfConfig, ConfigError> {
        match self.loader.load() {
            Ok(config) => {
                *self.current.write().await = config.clone();
                Ok(config)
            }
            Err(e) => {
                warn!(error = %e, "Configuration reload failed, keeping previous values");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_contracts::{EngineMode, ModelBackend};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn file_overrides_defaults() {
        let file = toml_file(
            r#"
[engine]
mode = "model"

[model]
backend = "http"
model = "mistral"
timeout_secs = 12
"#,
        );
        let config = ConfigLoader::new(Some(file.path().to_path_buf())).load().unwrap();
        assert_eq!(config.engine.mode, EngineMode::Model);
        assert_eq!(config.model.backend, ModelBackend::Http);
        assert_eq!(config.model.model, "mistral");
        assert_eq!(config.model.timeout_secs, 12);
        assert_eq!(config.model.impact_domain_limit, 3);
        assert_eq!(config.server.bind, "127.0.0.1:9999");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new(Some(dir.path().join("absent.toml")));
        assert!(matches!(loader.load(), Err(ConfigError::Load(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let file = toml_file("[model]\ntimeout_secs = 0\n");
        let loader = ConfigLoader::new(Some(file.path().to_path_buf()));
        assert!(matches!(loader.load(), Err(ConfigError::Invalid(_))));
    }

    #[tokio::test]
    async fn reload_picks_up_changes_and_keeps_last_good() {
        let file = toml_file("[server]\nbind = \"0.0.0.0:8080\"\n");
        let path = file.path().to_path_buf();
        let store = ConfigStore::load(ConfigLoader::new(Some(path.clone()))).unwrap();
        assert_eq!(store.snapshot().await.server.bind, "0.0.0.0:8080");

        std::fs::write(&path, "[engine]\nmode = \"model\"\n").unwrap();
        let reloaded = store.reload().await.unwrap();
        assert_eq!(reloaded.engine.mode, EngineMode::Model);
        assert_eq!(store.snapshot().await.server.bind, "127.0.0.1:9999");

        std::fs::write(&path, "[model]\nripple_seed_limit = 0\n").unwrap();
        assert!(store.reload().await.is_err());
        assert_eq!(store.snapshot().await.engine.mode, EngineMode::Model);
    }

    #[tokio::test]
    async fn engine_override_survives_reload() {
        let file = toml_file("[engine]\nmode = \"model\"\n");
        let path = file.path().to_path_buf();
        let loader =
            ConfigLoader::new(Some(path.clone())).with_engine_override(Some(EngineMode::Template));
        let store = ConfigStore::load(loader).unwrap();
        assert_eq!(store.snapshot().await.engine.mode, EngineMode::Template);

        std::fs::write(&path, "[engine]\nmode = \"model\"\n[model]\nmodel = \"mistral\"\n").unwrap();
        let reloaded = store.reload().await.unwrap();
        assert_eq!(reloaded.engine.mode, EngineMode::Template);
        assert_eq!(reloaded.model.model, "mistral");
    }
}
