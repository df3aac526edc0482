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

pub mod cli;
pub mod http;
pub mod prompts;
pub mod utils;

pub use cli::OllamaCliClient;
pub use http::OllamaHttpClient;
pub use prompts::StagePrompt;

use async_trait::async_trait;
use scenario_contracts::{
    ModelBackend, ModelError, ModelRequest, ModelResponse, ModelResult, ModelSettings, StageError,
    StageId, StageResult,
};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::logging::log_model_call;

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: ModelRequest) -> ModelResult<ModelResponse>;

    fn backend_name(&self) -> &'static str;

    async fn health_check(&self) -> ModelResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ModelClient for Box<dyn ModelClient> {
    async fn complete(&self, request: ModelRequest) -> ModelResult<ModelResponse> {
        (**self).complete(request).await
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    async fn health_check(&self) -> ModelResult<()> {
        (**self).health_check().await
    }
}

pub fn build_client(settings: &ModelSettings) -> ModelResult<Box<dyn ModelClient>> {
    let timeout = Duration::from_secs(settings.timeout_secs);
    let client: Box<dyn ModelClient> = match settings.backend {
        ModelBackend::Cli => Box::new(OllamaCliClient::new(settings.binary.clone(), timeout)),
        ModelBackend::Http => Box::new(OllamaHttpClient::new(
            settings.endpoint.clone(),
            timeout,
            settings.max_retries,
        )?),
    };
    Ok(client)
}

/// Binds a client to the model settings and turns replies into JSON objects.
pub struct ModelCaller<C> {
    client: C,
    settings: ModelSettings,
}

impl<C: ModelClient> ModelCaller<C> {
    pub fn new(client: C, settings: ModelSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Sends one prompt and returns the trimmed reply text.
    pub async fn request_text(&self, stage: StageId, prompt: String) -> StageResult<String> {
        let request = ModelRequest::new(stage, self.settings.model.clone(), prompt)
            .with_timeout_secs(self.settings.timeout_secs);
        debug!(stage = %stage, prompt = %request.prompt, "Sending stage prompt");

        let started = Instant::now();
        let outcome = self.client.complete(request.clone()).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        log_model_call(&request, elapsed_ms, outcome.is_ok());

        let content = outcome?.content.trim().to_string();
        if content.is_empty() {
            return Err(StageError::Model(ModelError::EmptyResponse));
        }
        Ok(content)
    }

    pub async fn request_json(
        &self,
        stage: StageId,
        prompt: String,
    ) -> StageResult<Map<String, Value>> {
        let content = self.request_text(stage, prompt).await?;
        utils::extract_json_object(&content).ok_or_else(|| {
            StageError::parse(
                stage,
                format!(
                    "no JSON object in reply: {}",
                    utils::truncate_chars(&content, 120)
                ),
            )
        })
    }
}
