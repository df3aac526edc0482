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

use scenario_contracts::{ParsedScenario, ReportMeta, StageId, StageResult};

use crate::llm::{ModelCaller, ModelClient, StagePrompt};

pub fn format_report() -> ReportMeta {
    ReportMeta::default()
}

/// Asks for a free-text analysis of the whole scenario. The reply is kept as
/// written; only a blank reply is an error.
pub async fn narrative_with_model<C: ModelClient>(
    caller: &ModelCaller<C>,
    parsed: &ParsedScenario,
) -> StageResult<String> {
    let prompt = StagePrompt::Narrative.render(&[("scenario", &parsed.raw_prompt)]);
    caller.request_text(StageId::Report, prompt).await
}
