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

use scenario_contracts::{EngineMode, ModelResult, WhatIfConfig, WorkflowError, WorkflowResult};

use crate::analyst::ModelAnalyst;
use crate::llm::{build_client, ModelClient};
use crate::orchestrator::{FastWhatIfOrchestrator, ModelWhatIfOrchestrator, WhatIfOrchestrator};

/// Orchestrator chosen from configuration at runtime.
pub enum ScenarioEngine {
    Template(FastWhatIfOrchestrator),
    Model(ModelWhatIfOrchestrator<Box<dyn ModelClient>>),
}

impl ScenarioEngine {
    pub fn from_config(config: &WhatIfConfig) -> ModelResult<Self> {
        Ok(match config.engine.mode {
            EngineMode::Template => ScenarioEngine::Template(FastWhatIfOrchestrator::fast()),
            EngineMode::Model => {
                let client = build_client(&config.model)?;
                ScenarioEngine::Model(WhatIfOrchestrator::new(ModelAnalyst::new(
                    client,
                    config.model.clone(),
                )))
            }
        })
    }

    pub fn mode(&self) -> EngineMode {
        match self {
            ScenarioEngine::Template(_) => EngineMode::Template,
            ScenarioEngine::Model(_) => EngineMode::Model,
        }
    }

    /// Backend name and reachability of the model; None for the template engine.
    pub async fn model_health(&self) -> Option<(&'static str, ModelResult<()>)> {
        match self {
            ScenarioEngine::Template(_) => None,
            ScenarioEngine::Model(orchestrator) => {
                let client = orchestrator.analyst().caller().client();
                Some((client.backend_name(), client.health_check().await))
            }
        }
    }

    pub async fn run_workflow(&self, scenario: &str) -> Result<WorkflowResult, WorkflowError> {
        match self {
            ScenarioEngine::Template(orchestrator) => orchestrator.run_workflow(scenario).await,
            ScenarioEngine::Model(orchestrator) => orchestrator.run_workflow(scenario).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_contracts::ModelBackend;

    #[test]
    fn mode_follows_config() {
        let engine = ScenarioEngine::from_config(&WhatIfConfig::default()).unwrap();
        assert_eq!(engine.mode(), EngineMode::Template);

        let mut config = WhatIfConfig::default();
        config.engine.mode = EngineMode::Model;
        config.model.backend = ModelBackend::Http;
        let engine = ScenarioEngine::from_config(&config).unwrap();
        assert_eq!(engine.mode(), EngineMode::Model);
    }

    #[tokio::test]
    async fn model_health_reports_the_backend() {
        let engine = ScenarioEngine::from_config(&WhatIfConfig::default()).unwrap();
        assert!(engine.model_health().await.is_none());

        let mut config = WhatIfConfig::default();
        config.engine.mode = EngineMode::Model;
        let engine = ScenarioEngine::from_config(&config).unwrap();
        let (backend, status) = engine.model_health().await.unwrap();
        assert_eq!(backend, "ollama-cli");
        assert!(status.is_ok());

        config.model.backend = ModelBackend::Http;
        config.model.endpoint = "http://127.0.0.1:9".to_string();
        config.model.timeout_secs = 2;
        let engine = ScenarioEngine::from_config(&config).unwrap();
        let (backend, status) = engine.model_health().await.unwrap();
        assert_eq!(backend, "ollama-http");
        assert!(status.is_err());
    }
}
