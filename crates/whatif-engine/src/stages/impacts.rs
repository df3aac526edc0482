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

use scenario_contracts::{
    Domain, ImpactRecord, ImpactStage, ParsedScenario, StageError, StageId, StageResult,
};
use serde_json::{Map, Value};

use crate::llm::utils::{str_field, string_list};
use crate::llm::{ModelCaller, ModelClient, StagePrompt};
use crate::tables::domain_impacts;

pub const MAX_MODEL_IMPACTS: usize = 3;

pub fn template_impacts(domains: &[Domain]) -> ImpactStage {
    ImpactStage {
        first_order_impacts: domains
            .iter()
            .map(|domain| (*domain, domain_impacts(*domain)))
            .collect(),
    }
}

pub fn placeholder_impact(domain: Domain) -> ImpactRecord {
    ImpactRecord::new(
        format!("Direct consequence in {domain}"),
        "Immediate effect from scenario",
        &["Key stakeholders"],
        "Immediate",
    )
}

fn impact_from_value(value: &Value) -> Option<ImpactRecord> {
    let item = value.as_object()?;
    let description = str_field(item, "description").or_else(|| str_field(item, "impact"))?;
    Some(ImpactRecord {
        description: description.to_string(),
        explanation: str_field(item, "explanation").unwrap_or_default().to_string(),
        affected_entities: string_list(item.get("affected_entities")),
        onset: str_field(item, "onset")
            .or_else(|| str_field(item, "onset_time"))
            .unwrap_or_default()
            .to_string(),
    })
}

/// Reads `{"impacts": [...]}`. Items without a description are skipped; an
/// empty result is a schema error.
pub fn impacts_from_reply(reply: &Map<String, Value>) -> StageResult<Vec<ImpactRecord>> {
    let items = reply
        .get("impacts")
        .and_then(Value::as_array)
        .ok_or_else(|| StageError::schema(StageId::Impacts, "missing `impacts` array"))?;

    let impacts: Vec<ImpactRecord> = items
        .iter()
        .filter_map(impact_from_value)
        .take(MAX_MODEL_IMPACTS)
        .collect();

    if impacts.is_empty() {
        return Err(StageError::schema(StageId::Impacts, "no usable impacts in reply"));
    }
    Ok(impacts)
}

/// The impacts prompt carries the whole parsed scenario, not only the event.
pub fn impacts_prompt(domain: Domain, parsed: &ParsedScenario) -> String {
    StagePrompt::Impacts.render(&[
        ("scenario", &parsed.raw_prompt),
        ("scope", parsed.scope.label()),
        ("duration", &parsed.duration),
        ("domain", domain.as_str()),
        ("event", &parsed.event),
    ])
}

pub async fn impacts_with_model<C: ModelClient>(
    caller: &ModelCaller<C>,
    domain: Domain,
    parsed: &ParsedScenario,
) -> StageResult<Vec<ImpactRecord>> {
    let prompt = impacts_prompt(domain, parsed);
    let reply = caller.request_json(StageId::Impacts, prompt).await?;
    impacts_from_reply(&reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn template_covers_every_domain() {
        let stage = template_impacts(&Domain::ALL);
        assert_eq!(stage.first_order_impacts.len(), 7);
        assert!(stage.first_order_impacts.values().all(|v| v.len() == 3));
    }

    #[test]
    fn placeholder_names_the_domain() {
        let impact = placeholder_impact(Domain::SocialSystems);
        assert_eq!(impact.description, "Direct consequence in social_systems");
        assert_eq!(impact.affected_entities, ["Key stakeholders"]);
    }

    #[test]
    fn reply_items_are_filtered_and_capped() {
        let reply = json!({"impacts": [
            {"description": "Fuel prices spike", "onset": "Immediate"},
            {"explanation": "no description"},
            "not an object",
            {"impact": "Refineries idle", "onset_time": "Days"},
            {"description": "c"},
            {"description": "d"}
        ]});
        let impacts = impacts_from_reply(reply.as_object().unwrap()).unwrap();
        assert_eq!(impacts.len(), 3);
        assert_eq!(impacts[1].description, "Refineries idle");
        assert_eq!(impacts[1].onset, "Days");
    }

    #[test]
    fn empty_list_is_rejected() {
        let reply = json!({"impacts": []});
        assert!(impacts_from_reply(reply.as_object().unwrap()).is_err());
        let reply = json!({"effects": [{"description": "x"}]});
        assert!(impacts_from_reply(reply.as_object().unwrap()).is_err());
    }

    #[test]
    fn prompt_carries_scenario_context() {
        let parsed = ParsedScenario {
            event: "a cyberattack on the grid".into(),
            scope: scenario_contracts::Scope::National,
            duration: "Long-term (months+)".into(),
            scale: "s".into(),
            entities: vec![],
            raw_prompt: "What if a cyberattack took down the national grid for months?".into(),
        };
        let prompt = impacts_prompt(Domain::Infrastructure, &parsed);
        assert!(prompt.contains("Scenario: What if a cyberattack took down the national grid"));
        assert!(prompt.contains("Scope: National"));
        assert!(prompt.contains("Duration: Long-term (months+)"));
        assert!(prompt.contains("impacts of: a cyberattack on the grid"));
        assert!(!prompt.contains("{{"));
    }
}
