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

use scenario_contracts::{ModelRequest, StageError, StageId, StageSource};
use serde_json::Value;
use tracing::{debug, info, warn};

pub fn log_stage_event(stage: StageId, event: &str, payload: Value) {
    debug!(
        stage = %stage,
        event = event,
        payload = %serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string()),
        "Stage event"
    );
}

pub fn log_stage_complete(stage: StageId, source: StageSource, elapsed_ms: u64) {
    info!(
        stage = %stage,
        title = stage.title(),
        source = ?source,
        elapsed_ms = elapsed_ms,
        "Stage complete"
    );
}

pub fn log_fallback(stage: StageId, subject: &str, error: &StageError) {
    warn!(
        stage = %stage,
        subject = subject,
        error = %error,
        "Model output unusable, using fallback"
    );
}

pub fn log_model_call(request: &ModelRequest, elapsed_ms: u64, succeeded: bool) {
    debug!(
        request_id = %request.id,
        stage = %request.stage,
        model = %request.model,
        prompt_chars = request.prompt.chars().count(),
        elapsed_ms = elapsed_ms,
        succeeded = succeeded,
        "Model call"
    );
}
