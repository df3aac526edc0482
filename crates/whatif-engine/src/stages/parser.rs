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

use scenario_contracts::{ParsedScenario, StageError, StageId, StageResult};
use serde_json::{Map, Value};

use crate::classify::{classify_duration, classify_scope, scope_from_label};
use crate::llm::utils::{str_field, string_list, truncate_chars};
use crate::llm::{ModelCaller, ModelClient, StagePrompt};
use crate::tables::{DEFAULT_ENTITIES, DEFAULT_SCALE};

pub const EVENT_MAX_CHARS: usize = 80;
pub const MIN_ENTITIES: usize = 3;
pub const MAX_ENTITIES: usize = 5;

const REPLY_FIELDS: [&str; 5] = ["event", "scope", "duration", "scale", "entities"];

/// Keyword-only parse. Total over all inputs, including the empty string.
pub fn parse_keywords(prompt: &str) -> ParsedScenario {
    ParsedScenario {
        event: truncate_chars(prompt, EVENT_MAX_CHARS),
        scope: classify_scope(prompt),
        duration: classify_duration(prompt).label().to_string(),
        scale: DEFAULT_SCALE.to_string(),
        entities: DEFAULT_ENTITIES.iter().map(|e| e.to_string()).collect(),
        raw_prompt: prompt.to_string(),
    }
}

/// Merges a model reply over the keyword parse. Fields the model left out or
/// mangled keep their keyword value.
pub fn parsed_from_reply(reply: &Map<String, Value>, prompt: &str) -> StageResult<ParsedScenario> {
    if !REPLY_FIELDS.iter().any(|field| reply.contains_key(*field)) {
        return Err(StageError::schema(
            StageId::Parse,
            "reply has none of event, scope, duration, scale, entities",
        ));
    }

    let base = parse_keywords(prompt);
    let mut entities = string_list(reply.get("entities"));
    for fallback in DEFAULT_ENTITIES {
        if entities.len() >= MIN_ENTITIES {
            break;
        }
        if !entities.iter().any(|e| e.eq_ignore_ascii_case(fallback)) {
            entities.push(fallback.to_string());
        }
    }
    entities.truncate(MAX_ENTITIES);

    Ok(ParsedScenario {
        event: str_field(reply, "event")
            .map(|e| truncate_chars(e, EVENT_MAX_CHARS))
            .unwrap_or(base.event),
        scope: str_field(reply, "scope")
            .and_then(scope_from_label)
            .unwrap_or(base.scope),
        duration: str_field(reply, "duration")
            .map(str::to_string)
            .unwrap_or(base.duration),
        scale: str_field(reply, "scale")
            .map(str::to_string)
            .unwrap_or(base.scale),
        entities,
        raw_prompt: base.raw_prompt,
    })
}

pub async fn parse_with_model<C: ModelClient>(
    caller: &ModelCaller<C>,
    prompt: &str,
) -> StageResult<ParsedScenario> {
    let rendered = StagePrompt::Parse.render(&[("scenario", prompt)]);
    let reply = caller.request_json(StageId::Parse, rendered).await?;
    parsed_from_reply(&reply, prompt)
}
