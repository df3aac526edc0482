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

use serde::{Deserialize, Serialize};

use crate::types::{Scope, SeverityLevel};

/// Stage 1 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedScenario {
    pub event: String,
    pub scope: Scope,
    pub duration: String,
    pub scale: String,
    pub entities: Vec<String>,
    pub raw_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactRecord {
    pub description: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub affected_entities: Vec<String>,
    #[serde(default)]
    pub onset: String,
}

impl ImpactRecord {
    pub fn new(
        description: impl Into<String>,
        explanation: impl Into<String>,
        affected_entities: &[&str],
        onset: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            explanation: explanation.into(),
            affected_entities: affected_entities.iter().map(|s| s.to_string()).collect(),
            onset: onset.into(),
        }
    }
}

/// A second- or third-order consequence chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RippleChain {
    pub order: u8,
    pub cause: String,
    pub effect: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub affected_domains: Vec<String>,
    #[serde(default)]
    pub time_to_manifest: String,
}

impl RippleChain {
    pub const SECOND_ORDER: u8 = 2;
    pub const THIRD_ORDER: u8 = 3;

    pub fn is_second_order(&self) -> bool {
        self.order == Self::SECOND_ORDER
    }

    pub fn is_third_order(&self) -> bool {
        self.order == Self::THIRD_ORDER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringFactors {
    pub disruption_scale: u8,
    pub recovery_difficulty: u8,
    pub cascading_effects: u8,
    pub vulnerable_populations: u8,
}

impl ScoringFactors {
    /// Factors reported when the model could not score a domain.
    pub fn baseline() -> Self {
        Self {
            disruption_scale: 3,
            recovery_difficulty: 3,
            cascading_effects: 3,
            vulnerable_populations: 2,
        }
    }
}

/// Stage 5 output for one domain. `level` always agrees with `score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityRanking {
    pub score: u8,
    pub level: SeverityLevel,
    pub justification: String,
    pub recovery_timeline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factors: Option<ScoringFactors>,
}

impl SeverityRanking {
    /// Clamps `raw_score` into 1..=5 and derives the level from the result.
    pub fn new(
        raw_score: i64,
        justification: impl Into<String>,
        recovery_timeline: impl Into<String>,
    ) -> Self {
        let score = SeverityLevel::clamp_score(raw_score);
        Self {
            score,
            level: SeverityLevel::from_score(score),
            justification: justification.into(),
            recovery_timeline: recovery_timeline.into(),
            factors: None,
        }
    }

    pub fn with_factors(mut self, factors: ScoringFactors) -> Self {
        self.factors = Some(factors);
        self
    }
}
