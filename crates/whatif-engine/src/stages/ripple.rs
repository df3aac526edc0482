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

use scenario_contracts::{ImpactStage, RippleChain, RippleStage, StageError, StageId, StageResult};
use serde_json::{Map, Value};

use crate::llm::utils::{int_field, str_field, string_list};
use crate::llm::{ModelCaller, ModelClient, StagePrompt};
use crate::tables::ripple_templates;

/// Template chains. These do not depend on the upstream impacts.
pub fn template_ripples() -> RippleStage {
    RippleStage::from_chains(
        ripple_templates(RippleChain::SECOND_ORDER)
            .into_iter()
            .chain(ripple_templates(RippleChain::THIRD_ORDER)),
    )
}

/// First impact description of each of the first `limit` domains that have one.
pub fn ripple_seeds(impacts: &ImpactStage, limit: usize) -> Vec<String> {
    impacts
        .first_order_impacts
        .values()
        .filter_map(|list| list.first())
        .map(|impact| impact.description.clone())
        .take(limit)
        .collect()
}

pub fn placeholder_chains(cause: &str) -> Vec<RippleChain> {
    vec![
        RippleChain {
            order: RippleChain::SECOND_ORDER,
            cause: cause.to_string(),
            effect: "Secondary consequence".to_string(),
            explanation: "Cascading effect".to_string(),
            affected_domains: vec!["multiple".to_string()],
            time_to_manifest: "Days to weeks".to_string(),
        },
        RippleChain {
            order: RippleChain::THIRD_ORDER,
            cause: "Secondary consequence".to_string(),
            effect: "Tertiary consequence".to_string(),
            explanation: "Further cascading".to_string(),
            affected_domains: vec!["multiple".to_string()],
            time_to_manifest: "Weeks to months".to_string(),
        },
    ]
}

fn chain_from_value(value: &Value, seed: &str) -> Option<RippleChain> {
    let item = value.as_object()?;
    let order = u8::try_from(int_field(item, "order")?).ok()?;
    if order != RippleChain::SECOND_ORDER && order != RippleChain::THIRD_ORDER {
        return None;
    }
    Some(RippleChain {
        order,
        cause: str_field(item, "cause").unwrap_or(seed).to_string(),
        effect: str_field(item, "effect")?.to_string(),
        explanation: str_field(item, "explanation").unwrap_or_default().to_string(),
        affected_domains: string_list(item.get("affected_domains")),
        time_to_manifest: str_field(item, "time_to_manifest")
            .unwrap_or_default()
            .to_string(),
    })
}

/// Reads `{"chains": [...]}`. Chains of other orders are dropped; the reply
/// must contain at least one chain of each of order 2 and order 3.
pub fn chains_from_reply(reply: &Map<String, Value>, seed: &str) -> StageResult<Vec<RippleChain>> {
    let items = reply
        .get("chains")
        .and_then(Value::as_array)
        .ok_or_else(|| StageError::schema(StageId::Ripples, "missing `chains` array"))?;

    let chains: Vec<RippleChain> = items
        .iter()
        .filter_map(|item| chain_from_value(item, seed))
        .collect();

    if !chains.iter().any(RippleChain::is_second_order) {
        return Err(StageError::schema(StageId::Ripples, "no second-order chain"));
    }
    if !chains.iter().any(RippleChain::is_third_order) {
        return Err(StageError::schema(StageId::Ripples, "no third-order chain"));
    }
    Ok(chains)
}

pub async fn chains_with_model<C: ModelClient>(
    caller: &ModelCaller<C>,
    seed: &str,
) -> StageResult<Vec<RippleChain>> {
    let prompt = StagePrompt::Ripples.render(&[("impact", seed)]);
    let reply = caller.request_json(StageId::Ripples, prompt).await?;
    chains_from_reply(&reply, seed)
}
