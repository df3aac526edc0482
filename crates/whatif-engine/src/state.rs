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

use chrono::Utc;
use scenario_contracts::{
    Domain, DomainMap, ImpactStage, ParsedScenario, ReportMeta, RippleChain, RippleStage,
    SeverityStage, StageId, StageOutputs, StageSource, WorkflowError, WorkflowResult,
    WORKFLOW_COMPLETE,
};
use std::collections::BTreeMap;
use std::fmt;

use crate::analyst::Staged;

/// Position of a run in the six-stage pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkflowPhase {
    Init,
    Stage(StageId),
    Done,
}

impl WorkflowPhase {
    fn next_stage(&self) -> Option<StageId> {
        match self {
            WorkflowPhase::Init => Some(StageId::Parse),
            WorkflowPhase::Stage(current) => StageId::ALL
                .iter()
                .position(|s| s == current)
                .and_then(|i| StageId::ALL.get(i + 1).copied()),
            WorkflowPhase::Done => None,
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowPhase::Init => f.write_str("init"),
            WorkflowPhase::Stage(stage) => write!(f, "{stage}"),
            WorkflowPhase::Done => f.write_str("done"),
        }
    }
}

/// Accumulated record of one run. Each stage slot is written exactly once and
/// only after every earlier slot has been written.
#[derive(Debug, Clone)]
pub struct ScenarioState {
    user_prompt: String,
    phase: WorkflowPhase,
    parsed: Option<ParsedScenario>,
    domains: Option<DomainMap>,
    impacts: Option<ImpactStage>,
    ripples: Option<RippleStage>,
    severity: Option<SeverityStage>,
    report: Option<ReportMeta>,
    analysis: Option<Option<String>>,
    sources: BTreeMap<StageId, StageSource>,
    notes: Vec<String>,
}

impl ScenarioState {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            phase: WorkflowPhase::Init,
            parsed: None,
            domains: None,
            impacts: None,
            ripples: None,
            severity: None,
            report: None,
            analysis: None,
            sources: BTreeMap::new(),
            notes: Vec::new(),
        }
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn source(&self, stage: StageId) -> Option<StageSource> {
        self.sources.get(&stage).copied()
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    fn advance<T>(&mut self, stage: StageId, staged: &Staged<T>) -> Result<(), WorkflowError> {
        match self.phase.next_stage() {
            Some(expected) if expected == stage => {
                self.phase = WorkflowPhase::Stage(stage);
                self.sources.insert(stage, staged.source);
                self.notes.extend(staged.notes.iter().cloned());
                Ok(())
            }
            expected => Err(WorkflowError::OutOfOrder {
                expected: expected
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "no further stages".to_string()),
                found: stage.to_string(),
            }),
        }
    }

    pub fn record_parsed(&mut self, staged: Staged<ParsedScenario>) -> Result<(), WorkflowError> {
        self.advance(StageId::Parse, &staged)?;
        self.parsed = Some(staged.output);
        Ok(())
    }

    pub fn record_domains(&mut self, staged: Staged<DomainMap>) -> Result<(), WorkflowError> {
        self.advance(StageId::Domains, &staged)?;
        self.domains = Some(staged.output);
        Ok(())
    }

    pub fn record_impacts(&mut self, staged: Staged<ImpactStage>) -> Result<(), WorkflowError> {
        self.advance(StageId::Impacts, &staged)?;
        self.impacts = Some(staged.output);
        Ok(())
    }

    pub fn record_ripples(&mut self, staged: Staged<RippleStage>) -> Result<(), WorkflowError> {
        self.advance(StageId::Ripples, &staged)?;
        self.ripples = Some(staged.output);
        Ok(())
    }

    pub fn record_severity(&mut self, staged: Staged<SeverityStage>) -> Result<(), WorkflowError> {
        self.advance(StageId::Severity, &staged)?;
        self.severity = Some(staged.output);
        Ok(())
    }

    pub fn record_report(&mut self, staged: Staged<ReportMeta>) -> Result<(), WorkflowError> {
        self.advance(StageId::Report, &staged)?;
        self.report = Some(staged.output);
        Ok(())
    }

    /// Attaches the narrative once the report is written. Does not add a
    /// stage source; fallback notes are kept.
    pub fn record_analysis(&mut self, staged: Staged<Option<String>>) -> Result<(), WorkflowError> {
        if self.phase != WorkflowPhase::Stage(StageId::Report) || self.analysis.is_some() {
            return Err(WorkflowError::OutOfOrder {
                expected: format!("narrative after {}", StageId::Report),
                found: self.phase.to_string(),
            });
        }
        self.notes.extend(staged.notes);
        self.analysis = Some(staged.output);
        Ok(())
    }

    fn missing(&self, stage: StageId) -> WorkflowError {
        WorkflowError::OutOfOrder {
            expected: stage.to_string(),
            found: self.phase.to_string(),
        }
    }

    pub fn require_parsed(&self) -> Result<&ParsedScenario, WorkflowError> {
        self.parsed.as_ref().ok_or_else(|| self.missing(StageId::Parse))
    }

    pub fn require_domains(&self) -> Result<&DomainMap, WorkflowError> {
        self.domains.as_ref().ok_or_else(|| self.missing(StageId::Domains))
    }

    pub fn require_impacts(&self) -> Result<&ImpactStage, WorkflowError> {
        self.impacts.as_ref().ok_or_else(|| self.missing(StageId::Impacts))
    }

    pub fn require_ripples(&self) -> Result<&RippleStage, WorkflowError> {
        self.ripples.as_ref().ok_or_else(|| self.missing(StageId::Ripples))
    }

    pub fn require_severity(&self) -> Result<&SeverityStage, WorkflowError> {
        self.severity.as_ref().ok_or_else(|| self.missing(StageId::Severity))
    }

    pub fn event(&self) -> Option<&str> {
        self.parsed.as_ref().map(|p| p.event.as_str())
    }

    pub fn impacted_domains(&self) -> &[Domain] {
        self.domains
            .as_ref()
            .map(|d| d.impacted_domains.as_slice())
            .unwrap_or(&[])
    }

    pub fn second_order(&self) -> &[RippleChain] {
        self.ripples
            .as_ref()
            .map(|r| r.second_order.as_slice())
            .unwrap_or(&[])
    }

    pub fn third_order(&self) -> &[RippleChain] {
        self.ripples
            .as_ref()
            .map(|r| r.third_order.as_slice())
            .unwrap_or(&[])
    }

    /// Seals the run. Fails unless all six stages have been recorded.
    pub fn into_result(mut self) -> Result<WorkflowResult, WorkflowError> {
        let (Some(parsed), Some(domains), Some(impacts), Some(ripples), Some(severity), Some(report)) = (
            self.parsed.take(),
            self.domains.take(),
            self.impacts.take(),
            self.ripples.take(),
            self.severity.take(),
            self.report.take(),
        ) else {
            return Err(WorkflowError::OutOfOrder {
                expected: StageId::Report.to_string(),
                found: self.phase.to_string(),
            });
        };
        self.phase = WorkflowPhase::Done;

        Ok(WorkflowResult {
            workflow_status: WORKFLOW_COMPLETE.to_string(),
            scenario: self.user_prompt,
            stages: StageOutputs {
                stage_1: parsed,
                stage_2: domains,
                stage_3: impacts,
                stage_4: ripples,
                stage_5: severity,
                stage_6: report,
            },
            stage_sources: self.sources,
            fallback_notes: self.notes,
            analysis: self.analysis.flatten(),
            completed_at: Utc::now(),
        })
    }
}
