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
    Domain, ImpactRecord, ImpactStage, ScoringFactors, SeverityLevel, SeverityRanking,
    SeverityStage, StageError, StageId, StageResult,
};
use serde_json::{Map, Value};

use crate::llm::utils::{int_field, str_field};
use crate::llm::{ModelCaller, ModelClient, StagePrompt};
use crate::tables::{recovery_timeline, severity_factor, LONG_RECOVERY};

/// Scores each domain present in `impacts` from the static severity factors.
pub fn template_severity(impacts: &ImpactStage) -> SeverityStage {
    SeverityStage {
        rankings: impacts
            .first_order_impacts
            .keys()
            .map(|domain| (*domain, template_ranking(*domain)))
            .collect(),
    }
}

pub fn template_ranking(domain: Domain) -> SeverityRanking {
    let (score, rationale) = severity_factor(domain);
    SeverityRanking::new(i64::from(score), rationale, recovery_timeline(score))
}

pub fn placeholder_ranking() -> SeverityRanking {
    SeverityRanking::new(3, "Moderate impact based on scenario", LONG_RECOVERY)
        .with_factors(ScoringFactors::baseline())
}

fn factors_from_value(value: Option<&Value>) -> Option<ScoringFactors> {
    let factors = value?.as_object()?;
    let factor = |key: &str| int_field(factors, key).map(SeverityLevel::clamp_score);
    Some(ScoringFactors {
        disruption_scale: factor("disruption_scale")?,
        recovery_difficulty: factor("recovery_difficulty")?,
        cascading_effects: factor("cascading_effects")?,
        vulnerable_populations: factor("vulnerable_populations")?,
    })
}

/// Reads a severity reply. `severity_score` is required and clamped to 1..=5;
/// the level is always derived from the clamped score, never taken verbatim.
pub fn ranking_from_reply(reply: &Map<String, Value>) -> StageResult<SeverityRanking> {
    let raw_score = int_field(reply, "severity_score")
        .or_else(|| int_field(reply, "score"))
        .ok_or_else(|| StageError::schema(StageId::Severity, "missing numeric `severity_score`"))?;

    let ranking = SeverityRanking::new(
        raw_score,
        str_field(reply, "justification").unwrap_or_default(),
        str_field(reply, "recovery_timeline").unwrap_or("Unknown"),
    );
    Ok(match factors_from_value(reply.get("scoring_factors")) {
        Some(factors) => ranking.with_factors(factors),
        None => ranking,
    })
}

pub async fn severity_with_model<C: ModelClient>(
    caller: &ModelCaller<C>,
    domain: Domain,
    impacts: &[ImpactRecord],
) -> StageResult<SeverityRanking> {
    let joined = impacts
        .iter()
        .map(|impact| impact.description.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let prompt =
        StagePrompt::Severity.render(&[("domain", domain.as_str()), ("impacts", joined.as_str())]);
    let reply = caller.request_json(StageId::Severity, prompt).await?;
    ranking_from_reply(&reply)
}
