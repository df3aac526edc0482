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

use scenario_contracts::{StageId, StageSource, WorkflowError, WorkflowResult};
use serde_json::json;
use std::time::Instant;
use tracing::{info, instrument};

use crate::analyst::{ModelAnalyst, ScenarioAnalyst, TemplateAnalyst};
use crate::logging::{log_stage_complete, log_stage_event};
use crate::state::ScenarioState;

/// Drives a `ScenarioAnalyst` through the six stages in order.
pub struct WhatIfOrchestrator<A> {
    analyst: A,
}

pub type FastWhatIfOrchestrator = WhatIfOrchestrator<TemplateAnalyst>;
pub type ModelWhatIfOrchestrator<C> = WhatIfOrchestrator<ModelAnalyst<C>>;

impl FastWhatIfOrchestrator {
    pub fn fast() -> Self {
        Self::new(TemplateAnalyst::new())
    }
}

impl Default for FastWhatIfOrchestrator {
    fn default() -> Self {
        Self::fast()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn stage_done(state: &ScenarioState, stage: StageId, started: Instant) {
    let source = state.source(stage).unwrap_or(StageSource::Static);
    log_stage_complete(stage, source, elapsed_ms(started));
}

impl<A: ScenarioAnalyst> WhatIfOrchestrator<A> {
    pub fn new(analyst: A) -> Self {
        Self { analyst }
    }

    pub fn analyst(&self) -> &A {
        &self.analyst
    }

    /// Runs all six stages for `scenario`. Any input string, including the
    /// empty one, produces a complete result; an error here means stages were
    /// recorded out of order.
    #[instrument(skip(self), fields(analyst = self.analyst.name()))]
    pub async fn run_workflow(&self, scenario: &str) -> Result<WorkflowResult, WorkflowError> {
        let run_started = Instant::now();
        let mut state = ScenarioState::new(scenario);
        info!("What-if workflow started");

        let started = Instant::now();
        let parsed = self.analyst.parse(state.user_prompt()).await;
        state.record_parsed(parsed)?;
        let parsed = state.require_parsed()?;
        log_stage_event(
            StageId::Parse,
            "parsed",
            json!({"scope": parsed.scope, "duration": parsed.duration}),
        );
        stage_done(&state, StageId::Parse, started);

        let started = Instant::now();
        let domains = self.analyst.map_domains(state.require_parsed()?).await;
        state.record_domains(domains)?;
        log_stage_event(
            StageId::Domains,
            "mapped",
            json!({"domain_count": state.impacted_domains().len()}),
        );
        stage_done(&state, StageId::Domains, started);

        let started = Instant::now();
        let impacts = self
            .analyst
            .simulate_impacts(state.require_parsed()?, state.require_domains()?)
            .await;
        state.record_impacts(impacts)?;
        stage_done(&state, StageId::Impacts, started);

        let started = Instant::now();
        let ripples = self.analyst.build_ripples(state.require_impacts()?).await;
        state.record_ripples(ripples)?;
        log_stage_event(
            StageId::Ripples,
            "chained",
            json!({
                "second_order": state.second_order().len(),
                "third_order": state.third_order().len()
            }),
        );
        stage_done(&state, StageId::Ripples, started);

        let started = Instant::now();
        let severity = self
            .analyst
            .rank_severity(state.require_impacts()?, state.require_ripples()?)
            .await;
        state.record_severity(severity)?;
        stage_done(&state, StageId::Severity, started);

        let started = Instant::now();
        state.record_report(self.analyst.format_report())?;
        stage_done(&state, StageId::Report, started);

        let narrative = self.analyst.narrate(state.require_parsed()?).await;
        log_stage_event(
            StageId::Report,
            "narrated",
            json!({"source": narrative.source, "present": narrative.output.is_some()}),
        );
        state.record_analysis(narrative)?;

        let result = state.into_result()?;
        info!(
            elapsed_ms = elapsed_ms(run_started),
            degraded = result.used_fallback(),
            "What-if workflow complete"
        );
        Ok(result)
    }
}
