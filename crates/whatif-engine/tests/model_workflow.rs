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

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use whatif_engine::contracts::{
    Domain, ModelError, ModelRequest, ModelResponse, ModelResult, ModelSettings, SeverityLevel,
    StageId, StageSource,
};
use whatif_engine::{ModelAnalyst, ModelClient, ModelWhatIfOrchestrator, WhatIfOrchestrator};

/// Always fails with the given error.
struct FailingClient(ModelError);

#[async_trait]
impl ModelClient for FailingClient {
    async fn complete(&self, _request: ModelRequest) -> ModelResult<ModelResponse> {
        Err(self.0.clone())
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

/// Replies with a canned body per stage and counts calls.
#[derive(Default)]
struct ScriptedClient {
    calls: Arc<AtomicUsize>,
}

fn reply_for(stage: StageId) -> String {
    match stage {
        StageId::Parse => json!({
            "event": "Fossil fuel ban",
            "scope": "Global",
            "duration": "Decades",
            "scale": "Billions",
            "entities": ["Oil producers", "Drivers", "Utilities"]
        })
        .to_string(),
        StageId::Impacts => format!(
            "Here you go:\n```json\n{}\n```",
            json!({"impacts": [
                {"description": "Fuel rationing", "explanation": "Supply halts", "affected_entities": ["Drivers"], "onset": "Immediate"},
                {"description": "Price shock", "explanation": "Scarcity", "affected_entities": ["Consumers"], "onset": "Days"}
            ]})
        ),
        StageId::Ripples => json!({"chains": [
            {"order": 2, "cause": "Fuel rationing", "effect": "Freight stalls", "explanation": "No diesel", "affected_domains": ["economy"], "time_to_manifest": "Days"},
            {"order": 3, "cause": "Freight stalls", "effect": "Food shortages", "explanation": "Empty shelves", "affected_domains": ["individual_behavior"], "time_to_manifest": "Weeks"}
        ]})
        .to_string(),
        StageId::Severity => json!({
            "severity_score": 7,
            "severity_level": "Moderate",
            "justification": "Energy underpins everything",
            "recovery_timeline": "Years"
        })
        .to_string(),
        StageId::Report => "1. Fuel runs out within days\n2. Freight stalls".to_string(),
        StageId::Domains => String::new(),
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn complete(&self, request: ModelRequest) -> ModelResult<ModelResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ModelResponse {
            request_id: request.id,
            content: reply_for(request.stage),
            model: request.model,
            elapsed_ms: 1,
            eval_count: None,
        })
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}

fn orchestrator<C: ModelClient>(client: C) -> ModelWhatIfOrchestrator<C> {
    WhatIfOrchestrator::new(ModelAnalyst::new(client, ModelSettings::default()))
}

#[tokio::test]
async fn unreachable_model_falls_back_everywhere() {
    let result = orchestrator(FailingClient(ModelError::Spawn("ollama: not found".into())))
        .run_workflow("What if a major earthquake hit Tokyo?")
        .await
        .unwrap();

    assert_eq!(result.stage_sources[&StageId::Parse], StageSource::Fallback);
    assert_eq!(result.stage_sources[&StageId::Domains], StageSource::Static);
    assert_eq!(result.stage_sources[&StageId::Impacts], StageSource::Fallback);
    assert_eq!(result.stage_sources[&StageId::Ripples], StageSource::Fallback);
    assert_eq!(result.stage_sources[&StageId::Severity], StageSource::Fallback);
    assert_eq!(result.stage_sources[&StageId::Report], StageSource::Static);
    assert!(result.used_fallback());
    assert!(!result.fallback_notes.is_empty());
    assert_eq!(result.analysis, None);
    assert!(result
        .fallback_notes
        .iter()
        .any(|note| note.starts_with("stage_6 (narrative):")));

    let stages = &result.stages;
    assert_eq!(stages.stage_1.event, "What if a major earthquake hit Tokyo?");
    assert_eq!(stages.stage_2.impacted_domains, Domain::ALL);
    for domain in Domain::ALL {
        let impacts = &stages.stage_3.first_order_impacts[&domain];
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].description, format!("Direct consequence in {domain}"));
    }
    assert_eq!(stages.stage_4.second_order.len(), 3);
    assert_eq!(stages.stage_4.third_order.len(), 3);
    assert_eq!(stages.stage_5.rankings.len(), 7);
    for ranking in stages.stage_5.rankings.values() {
        assert_eq!(ranking.score, 3);
        assert_eq!(ranking.level, SeverityLevel::Moderate);
        assert_eq!(ranking.recovery_timeline, "Weeks to months");
    }
}

#[tokio::test]
async fn timeouts_are_reported_as_fallbacks() {
    let result = orchestrator(FailingClient(ModelError::Timeout { seconds: 30 }))
        .run_workflow("")
        .await
        .unwrap();
    assert!(result
        .fallback_notes
        .iter()
        .any(|note| note.contains("30 seconds")));
    assert_eq!(result.stages.stage_1.duration, "Long-term (months+)");
}

#[tokio::test]
async fn well_formed_replies_are_used() {
    let client = ScriptedClient::default();
    let calls = client.calls.clone();
    let result = orchestrator(client)
        .run_workflow("What if fossil fuels were banned tomorrow?")
        .await
        .unwrap();

    // 1 parse + 3 impact domains + 3 ripple seeds + 7 severity domains + 1 narrative
    assert_eq!(calls.load(Ordering::SeqCst), 15);
    assert_eq!(
        result.analysis.as_deref(),
        Some("1. Fuel runs out within days\n2. Freight stalls")
    );

    let stages = &result.stages;
    assert_eq!(stages.stage_1.event, "Fossil fuel ban");
    assert_eq!(stages.stage_1.entities, ["Oil producers", "Drivers", "Utilities"]);
    assert_eq!(result.stage_sources[&StageId::Parse], StageSource::Model);

    let economy = &stages.stage_3.first_order_impacts[&Domain::Economy];
    assert_eq!(economy.len(), 2);
    assert_eq!(economy[0].description, "Fuel rationing");
    let education = &stages.stage_3.first_order_impacts[&Domain::Education];
    assert_eq!(education[0].description, "Direct consequence in education");
    assert_eq!(result.stage_sources[&StageId::Impacts], StageSource::Partial);

    assert_eq!(stages.stage_4.second_order.len(), 3);
    assert_eq!(stages.stage_4.third_order[0].effect, "Food shortages");
    assert_eq!(result.stage_sources[&StageId::Ripples], StageSource::Model);

    for ranking in stages.stage_5.rankings.values() {
        assert_eq!(ranking.score, 5);
        assert_eq!(ranking.level, SeverityLevel::Catastrophic);
        assert_eq!(ranking.recovery_timeline, "Years");
    }
    assert_eq!(result.stage_sources[&StageId::Severity], StageSource::Model);
}

#[tokio::test]
async fn impact_limit_is_configurable() {
    let settings = ModelSettings {
        impact_domain_limit: 7,
        ..ModelSettings::default()
    };
    let orchestrator = WhatIfOrchestrator::new(ModelAnalyst::new(ScriptedClient::default(), settings));
    let result = orchestrator.run_workflow("What if?").await.unwrap();
    assert_eq!(result.stage_sources[&StageId::Impacts], StageSource::Model);
    assert!(result
        .stages
        .stage_3
        .first_order_impacts
        .values()
        .all(|impacts| impacts.len() == 2));
}

#[tokio::test]
async fn narrative_can_be_switched_off() {
    let settings = ModelSettings {
        narrative: false,
        ..ModelSettings::default()
    };
    let client = ScriptedClient::default();
    let calls = client.calls.clone();
    let result = WhatIfOrchestrator::new(ModelAnalyst::new(client, settings))
        .run_workflow("What if?")
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 14);
    assert_eq!(result.analysis, None);
    assert!(result.fallback_notes.iter().all(|n| !n.contains("narrative")));
}

#[tokio::test]
async fn boxed_clients_work_through_the_trait() {
    let client: Box<dyn ModelClient> = Box::new(FailingClient(ModelError::EmptyResponse));
    assert_eq!(client.backend_name(), "failing");
    assert!(client.health_check().await.is_ok());
    let result = orchestrator(client).run_workflow("What if?").await.unwrap();
    assert_eq!(result.stages.stage_5.rankings.len(), 7);
}
