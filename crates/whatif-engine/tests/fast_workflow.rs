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

use whatif_engine::contracts::{Domain, Scope, SeverityLevel, StageSource};
use whatif_engine::FastWhatIfOrchestrator;

const DEMO_SCENARIOS: [&str; 3] = [
    "What if fossil fuels were banned tomorrow?",
    "What if a major earthquake hit Tokyo?",
    "What if all cars became autonomous?",
];

#[tokio::test]
async fn every_input_yields_all_six_stages() {
    let orchestrator = FastWhatIfOrchestrator::fast();
    for scenario in DEMO_SCENARIOS
        .iter()
        .copied()
        .chain(["x", "   ", "What if the world stopped for a day?"])
    {
        let result = orchestrator.run_workflow(scenario).await.unwrap();
        assert_eq!(result.workflow_status, "complete");
        assert_eq!(result.scenario, scenario);

        let json = serde_json::to_value(&result).unwrap();
        for key in ["stage_1", "stage_2", "stage_3", "stage_4", "stage_5", "stage_6"] {
            assert!(json["stages"].get(key).is_some(), "{key} missing for {scenario}");
        }
    }
}

#[tokio::test]
async fn domains_are_the_fixed_seven() {
    let result = FastWhatIfOrchestrator::fast()
        .run_workflow("What if all cars became autonomous?")
        .await
        .unwrap();
    assert_eq!(result.stages.stage_2.impacted_domains, Domain::ALL);
    assert_eq!(result.stages.stage_2.domain_count, 7);
}

#[tokio::test]
async fn rankings_are_in_range_and_consistent() {
    let result = FastWhatIfOrchestrator::fast()
        .run_workflow(DEMO_SCENARIOS[1])
        .await
        .unwrap();
    assert_eq!(result.stages.stage_5.rankings.len(), 7);
    for ranking in result.stages.stage_5.rankings.values() {
        assert!((1..=5).contains(&ranking.score));
        assert_eq!(ranking.level, SeverityLevel::from_score(ranking.score));
    }
}

#[tokio::test]
async fn no_empty_impact_or_ripple_lists() {
    let result = FastWhatIfOrchestrator::fast()
        .run_workflow(DEMO_SCENARIOS[2])
        .await
        .unwrap();
    assert_eq!(result.stages.stage_3.first_order_impacts.len(), 7);
    assert!(result
        .stages
        .stage_3
        .first_order_impacts
        .values()
        .all(|impacts| !impacts.is_empty()));
    assert!(!result.stages.stage_4.second_order.is_empty());
    assert!(!result.stages.stage_4.third_order.is_empty());
}

#[tokio::test]
async fn template_runs_are_deterministic() {
    let orchestrator = FastWhatIfOrchestrator::default();
    let first = orchestrator.run_workflow(DEMO_SCENARIOS[0]).await.unwrap();
    let second = orchestrator.run_workflow(DEMO_SCENARIOS[0]).await.unwrap();
    assert_eq!(
        serde_json::to_string(&first.stages).unwrap(),
        serde_json::to_string(&second.stages).unwrap()
    );
    assert_eq!(first.stage_sources, second.stage_sources);
}

#[tokio::test]
async fn fossil_fuel_ban_severities() {
    let result = FastWhatIfOrchestrator::fast()
        .run_workflow("What if fossil fuels were banned tomorrow?")
        .await
        .unwrap();
    let rankings = &result.stages.stage_5.rankings;

    let healthcare = &rankings[&Domain::Healthcare];
    assert_eq!(healthcare.score, 5);
    assert_eq!(healthcare.level, SeverityLevel::Catastrophic);

    let education = &rankings[&Domain::Education];
    assert_eq!(education.score, 2);
    assert_eq!(education.level, SeverityLevel::Minor);

    assert_eq!(result.stages.stage_1.scope, Scope::Regional);
    assert_eq!(result.stages.stage_1.duration, "Long-term (months+)");
}

#[tokio::test]
async fn empty_prompt_does_not_fail() {
    let result = FastWhatIfOrchestrator::fast().run_workflow("").await.unwrap();
    assert_eq!(result.stages.stage_1.scope, Scope::Regional);
    assert_eq!(result.stages.stage_1.duration, "Long-term (months+)");
    assert_eq!(result.stages.stage_1.event, "");
    assert!(result
        .stage_sources
        .values()
        .all(|source| *source == StageSource::Static));
}

#[tokio::test]
async fn report_meta_and_summary() {
    let result = FastWhatIfOrchestrator::fast()
        .run_workflow("What if the global internet went down for a week?")
        .await
        .unwrap();
    assert_eq!(result.stages.stage_1.scope, Scope::Global);
    assert_eq!(result.stages.stage_1.duration, "Medium-term (weeks)");

    let meta = &result.stages.stage_6;
    assert_eq!(meta.report_type, "What-If Scenario Analysis");
    assert_eq!(meta.stages_completed, 6);
    assert_eq!(meta.reasoning_trace.len(), 6);

    let summary = result.summary();
    assert_eq!(summary.domains.len(), 7);
    assert_eq!(summary.ripples.second_order.len(), 4);
    assert_eq!(summary.severity.len(), 7);
}
