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
use scenario_contracts::{ModelError, ModelRequest, ModelResponse, ModelResult};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

use super::ModelClient;

/// Runs `<binary> run <model> <prompt>` and returns stdout.
#[derive(Debug, Clone)]
pub struct OllamaCliClient {
    binary: String,
    timeout: Duration,
}

impl OllamaCliClient {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ModelClient for OllamaCliClient {
    async fn complete(&self, request: ModelRequest) -> ModelResult<ModelResponse> {
        let timeout = self.timeout.min(request.timeout());
        let started = Instant::now();

        let child = Command::new(&self.binary)
            .arg("run")
            .arg(&request.model)
            .arg(&request.prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ModelError::Spawn(format!("{}: {e}", self.binary)))?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ModelError::Spawn(format!("{}: {e}", self.binary))),
            Err(_) => {
                warn!(binary = %self.binary, ?timeout, "Model process timed out");
                return Err(ModelError::Timeout {
                    seconds: timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            return Err(ModelError::ExitStatus {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let content = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if content.is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        debug!(bytes = content.len(), "Model process finished");

        Ok(ModelResponse {
            request_id: request.id,
            content,
            model: request.model,
            elapsed_ms: started.elapsed().as_millis() as u64,
            eval_count: None,
        })
    }

    fn backend_name(&self) -> &'static str {
        "ollama-cli"
    }
}
