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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::records::{ImpactRecord, ParsedScenario, RippleChain, SeverityRanking};
use crate::types::Domain;

pub const WORKFLOW_COMPLETE: &str = "complete";
pub const REPORT_TYPE: &str = "What-If Scenario Analysis";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StageId {
    #[serde(rename = "stage_1")]
    Parse,
    #[serde(rename = "stage_2")]
    Domains,
    #[serde(rename = "stage_3")]
    Impacts,
    #[serde(rename = "stage_4")]
    Ripples,
    #[serde(rename = "stage_5")]
    Severity,
    #[serde(rename = "stage_6")]
    Report,
}

impl StageId {
    pub const ALL: [StageId; 6] = [
        StageId::Parse,
        StageId::Domains,
        StageId::Impacts,
        StageId::Ripples,
        StageId::Severity,
        StageId::Report,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StageId::Parse => "stage_1",
            StageId::Domains => "stage_2",
            StageId::Impacts => "stage_3",
            StageId::Ripples => "stage_4",
            StageId::Severity => "stage_5",
            StageId::Report => "stage_6",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StageId::Parse => "Scenario Parser",
            StageId::Domains => "Domain Decomposition",
            StageId::Impacts => "Impact Simulation",
            StageId::Ripples => "Ripple Effects",
            StageId::Severity => "Severity Ranking",
            StageId::Report => "Report Formatter",
        }
    }

    /// One-line entry used in the report's reasoning trace.
    pub fn trace_line(&self) -> &'static str {
        match self {
            StageId::Parse => "Scenario parsed",
            StageId::Domains => "Domains identified",
            StageId::Impacts => "First-order impacts generated",
            StageId::Ripples => "Ripple effects generated",
            StageId::Severity => "Severity ranking complete",
            StageId::Report => "Report formatted",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a stage's output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSource {
    /// Static tables or fixed rules; no model involved.
    Static,
    /// Every model call for the stage produced usable data.
    Model,
    /// Some model calls fell back to placeholder values.
    Partial,
    /// Nothing usable came back from the model.
    Fallback,
}

impl StageSource {
    /// Combines per-call outcomes of a model-backed stage.
    pub fn from_counts(succeeded: usize, fell_back: usize) -> Self {
        match (succeeded, fell_back) {
            (_, 0) => StageSource::Model,
            (0, _) => StageSource::Fallback,
            _ => StageSource::Partial,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageSource::Partial | StageSource::Fallback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMap {
    pub impacted_domains: Vec<Domain>,
    pub domain_count: usize,
}

impl DomainMap {
    pub fn new(impacted_domains: Vec<Domain>) -> Self {
        let domain_count = impacted_domains.len();
        Self {
            impacted_domains,
            domain_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImpactStage {
    pub first_order_impacts: BTreeMap<Domain, Vec<ImpactRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RippleStage {
    pub second_order: Vec<RippleChain>,
    pub third_order: Vec<RippleChain>,
}

impl RippleStage {
    /// Splits a mixed list of chains by order; other orders are discarded.
    pub fn from_chains(chains: impl IntoIterator<Item = RippleChain>) -> Self {
        let mut stage = Self::default();
        for chain in chains {
            if chain.is_second_order() {
                stage.second_order.push(chain);
            } else if chain.is_third_order() {
                stage.third_order.push(chain);
            }
        }
        stage
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityStage {
    pub rankings: BTreeMap<Domain, SeverityRanking>,
}

/// Stage 6 output. Metadata only; the analysis content lives in the other stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub report_type: String,
    pub stages_completed: u8,
    pub reasoning_trace: BTreeMap<StageId, String>,
}

impl Default for ReportMeta {
    fn default() -> Self {
        Self {
            report_type: REPORT_TYPE.to_string(),
            stages_completed: StageId::ALL.len() as u8,
            reasoning_trace: StageId::ALL
                .iter()
                .map(|stage| (*stage, stage.trace_line().to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutputs {
    pub stage_1: ParsedScenario,
    pub stage_2: DomainMap,
    pub stage_3: ImpactStage,
    pub stage_4: RippleStage,
    pub stage_5: SeverityStage,
    pub stage_6: ReportMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub workflow_status: String,
    pub scenario: String,
    pub stages: StageOutputs,
    pub stage_sources: BTreeMap<StageId, StageSource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_notes: Vec<String>,
    /// Free-text narrative written by the model after the six stages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl WorkflowResult {
    pub fn used_fallback(&self) -> bool {
        self.stage_sources.values().any(StageSource::is_degraded)
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            domains: self.stages.stage_2.impacted_domains.clone(),
            impacts: self.stages.stage_3.first_order_impacts.clone(),
            ripples: RippleSummary {
                second_order: self.stages.stage_4.second_order.clone(),
                third_order: self.stages.stage_4.third_order.clone(),
            },
            severity: self.stages.stage_5.rankings.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RippleSummary {
    pub second_order: Vec<RippleChain>,
    pub third_order: Vec<RippleChain>,
}

/// Condensed view consumed by front ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub domains: Vec<Domain>,
    pub impacts: BTreeMap<Domain, Vec<ImpactRecord>>,
    pub ripples: RippleSummary,
    pub severity: BTreeMap<Domain, SeverityRanking>,
}

/// Body returned by the analyse endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub status: String,
    pub scenario: String,
    pub stages: StageOutputs,
    pub summary: AnalysisSummary,
    pub stage_sources: BTreeMap<StageId, StageSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

impl From<WorkflowResult> for AnalyzeResponse {
    fn from(result: WorkflowResult) -> Self {
        let summary = result.summary();
        Self {
            status: "success".to_string(),
            scenario: result.scenario,
            stages: result.stages,
            summary,
            stage_sources: result.stage_sources,
            analysis: result.analysis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RippleChain;

    fn chain(order: u8) -> RippleChain {
        RippleChain {
            order,
            cause: "c".into(),
            effect: "e".into(),
            explanation: String::new(),
            affected_domains: vec![],
            time_to_manifest: String::new(),
        }
    }

    #[test]
    fn stage_ids_serialise_as_stage_keys() {
        let meta = ReportMeta::default();
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["stages_completed"], 6);
        assert_eq!(json["reasoning_trace"]["stage_1"], "Scenario parsed");
        assert_eq!(json["reasoning_trace"]["stage_6"], "Report formatted");
    }

    #[test]
    fn ripple_stage_splits_by_order() {
        let stage = RippleStage::from_chains(vec![chain(2), chain(3), chain(7), chain(2)]);
        assert_eq!(stage.second_order.len(), 2);
        assert_eq!(stage.third_order.len(), 1);
    }

    #[test]
    fn source_from_counts() {
        assert_eq!(StageSource::from_counts(3, 0), StageSource::Model);
        assert_eq!(StageSource::from_counts(0, 2), StageSource::Fallback);
        assert_eq!(StageSource::from_counts(1, 2), StageSource::Partial);
        assert!(StageSource::Partial.is_degraded());
        assert!(!StageSource::Static.is_degraded());
    }
}
