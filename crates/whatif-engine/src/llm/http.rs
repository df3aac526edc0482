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

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scenario_contracts::{ModelError, ModelRequest, ModelResponse, ModelResult};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::ModelClient;

/// Client for Ollama's non-streaming `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaHttpClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
}

impl OllamaHttpClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> ModelResult<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ModelError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            max_retries,
        })
    }

    fn build_payload(request: &ModelRequest) -> Value {
        json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false
        })
    }

    fn backoff(attempt: u32) -> Duration {
        Duration::from_millis(250 * 2_u64.pow(attempt.min(5)))
    }

    /// Every attempt and back-off shares one deadline of `timeout`.
    async fn execute_with_retry(&self, payload: &Value, timeout: Duration) -> ModelResult<Value> {
        let url = format!("{}/api/generate", self.base_url);
        let deadline = Instant::now() + timeout;
        let timed_out = || ModelError::Timeout {
            seconds: timeout.as_secs(),
        };
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(last_error.unwrap_or_else(timed_out));
            }
            debug!(
                attempt = attempt + 1,
                max_attempts = self.max_retries + 1,
                ?remaining,
                "Sending request to Ollama API"
            );

            let response =
                tokio::time::timeout(remaining, self.client.post(&url).json(payload).send()).await;

            match response {
                Ok(Ok(resp)) => {
                    let status = resp.status();
                    info!("Received response from Ollama API: {}", status);

                    if status.is_success() {
                        return resp.json::<Value>().await.map_err(|e| {
                            ModelError::Serialisation(format!("Failed to parse JSON response: {e}"))
                        });
                    }
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ModelError::RateLimit);
                    } else {
                        let body = resp.text().await.unwrap_or_default();
                        last_error = Some(ModelError::Http {
                            status: status.as_u16(),
                            body,
                        });
                        if status.is_client_error() {
                            break;
                        }
                    }
                }
                Ok(Err(e)) => {
                    last_error = Some(ModelError::Network(format!("Request failed: {e}")));
                }
                Err(_) => {
                    warn!("Request to Ollama API timed out after {:?}", timeout);
                    return Err(timed_out());
                }
            }

            if attempt < self.max_retries {
                let wait_time = Self::backoff(attempt)
                    .min(deadline.saturating_duration_since(Instant::now()));
                warn!(?wait_time, error = ?last_error, "Ollama API request failed, backing off");
                tokio::time::sleep(wait_time).await;
            }
        }

        Err(last_error.unwrap_or(ModelError::EmptyResponse))
    }
}

#[async_trait]
impl ModelClient for OllamaHttpClient {
    async fn complete(&self, request: ModelRequest) -> ModelResult<ModelResponse> {
        let started = Instant::now();
        let timeout = self.timeout.min(request.timeout());
        let payload = Self::build_payload(&request);
        let data = self.execute_with_retry(&payload, timeout).await?;

        let content = data["response"]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ModelError::EmptyResponse)?;

        Ok(ModelResponse {
            request_id: request.id,
            content: content.to_string(),
            model: data["model"]
                .as_str()
                .map(str::to_string)
                .unwrap_or(request.model),
            elapsed_ms: started.elapsed().as_millis() as u64,
            eval_count: data["eval_count"].as_u64().map(|n| n as u32),
        })
    }

    fn backend_name(&self) -> &'static str {
        "ollama-http"
    }

    async fn health_check(&self) -> ModelResult<()> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = tokio::time::timeout(self.timeout, self.client.get(&url).send())
            .await
            .map_err(|_| ModelError::Timeout {
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| ModelError::Network(format!("Health check failed: {e}")))?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ModelError::Http {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            })
        }
    }
}
