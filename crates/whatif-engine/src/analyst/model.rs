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
use scenario_contracts::{
    DomainMap, ImpactStage, ModelSettings, ParsedScenario, RippleStage, SeverityStage, StageId,
};

use super::{ScenarioAnalyst, Staged, Tally};
use crate::llm::{ModelCaller, ModelClient};
use crate::stages::{domains, impacts, parser, report, ripple, severity};

/// Analyst that asks a local model for each stage unit and falls back to
/// placeholder values per unit when a call or its reply is unusable.
pub struct ModelAnalyst<C> {
    caller: ModelCaller<C>,
}

impl<C: ModelClient> ModelAnalyst<C> {
    pub fn new(client: C, settings: ModelSettings) -> Self {
        Self {
            caller: ModelCaller::new(client, settings),
        }
    }

    pub fn caller(&self) -> &ModelCaller<C> {
        &self.caller
    }
}

#[async_trait]
impl<C: ModelClient> ScenarioAnalyst for ModelAnalyst<C> {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn parse(&self, prompt: &str) -> Staged<ParsedScenario> {
        match parser::parse_with_model(&self.caller, prompt).await {
            Ok(parsed) => Staged::model(parsed),
            Err(error) => {
                let mut tally = Tally::new();
                tally.fallback(StageId::Parse, "scenario", &error);
                tally.finish(parser::parse_keywords(prompt))
            }
        }
    }

    async fn map_domains(&self, parsed: &ParsedScenario) -> Staged<DomainMap> {
        Staged::fixed(domains::map_domains(parsed))
    }

    async fn simulate_impacts(
        &self,
        parsed: &ParsedScenario,
        domains: &DomainMap,
    ) -> Staged<ImpactStage> {
        let limit = self.caller.settings().impact_domain_limit;
        let mut tally = Tally::new();
        let mut stage = ImpactStage::default();

        for domain in domains.impacted_domains.iter().take(limit) {
            let list = match impacts::impacts_with_model(&self.caller, *domain, parsed).await {
                Ok(list) => {
                    tally.success();
                    list
                }
                Err(error) => {
                    tally.fallback(StageId::Impacts, domain.as_str(), &error);
                    vec![impacts::placeholder_impact(*domain)]
                }
            };
            stage.first_order_impacts.insert(*domain, list);
        }

        let skipped: Vec<_> = domains.impacted_domains.iter().skip(limit).collect();
        for domain in &skipped {
            stage
                .first_order_impacts
                .insert(**domain, vec![impacts::placeholder_impact(**domain)]);
        }
        tally.skipped(
            skipped.len(),
            format!(
                "{}: {} domain(s) past the model limit of {limit} use placeholder impacts",
                StageId::Impacts,
                skipped.len()
            ),
        );

        tally.finish(stage)
    }

    async fn build_ripples(&self, impacts: &ImpactStage) -> Staged<RippleStage> {
        let limit = self.caller.settings().ripple_seed_limit;
        let mut tally = Tally::new();
        let mut chains = Vec::new();

        for seed in ripple::ripple_seeds(impacts, limit) {
            match ripple::chains_with_model(&self.caller, &seed).await {
                Ok(found) => {
                    tally.success();
                    chains.extend(found);
                }
                Err(error) => {
                    tally.fallback(StageId::Ripples, &seed, &error);
                    chains.extend(ripple::placeholder_chains(&seed));
                }
            }
        }

        let stage = RippleStage::from_chains(chains);
        if stage.second_order.is_empty() || stage.third_order.is_empty() {
            // Only reachable when there were no seeds at all.
            tally.skipped(
                1,
                format!("{}: no seeds, using template chains", StageId::Ripples),
            );
            return tally.finish(ripple::template_ripples());
        }
        tally.finish(stage)
    }

    async fn rank_severity(
        &self,
        impacts: &ImpactStage,
        _ripples: &RippleStage,
    ) -> Staged<SeverityStage> {
        let mut tally = Tally::new();
        let mut stage = SeverityStage::default();

        for (domain, list) in &impacts.first_order_impacts {
            let ranking = match severity::severity_with_model(&self.caller, *domain, list).await {
                Ok(ranking) => {
                    tally.success();
                    ranking
                }
                Err(error) => {
                    tally.fallback(StageId::Severity, domain.as_str(), &error);
                    severity::placeholder_ranking()
                }
            };
            stage.rankings.insert(*domain, ranking);
        }

        tally.finish(stage)
    }

    async fn narrate(&self, parsed: &ParsedScenario) -> Staged<Option<String>> {
        if !self.caller.settings().narrative {
            return Staged::fixed(None);
        }
        match report::narrative_with_model(&self.caller, parsed).await {
            Ok(text) => Staged::model(Some(text)),
            Err(error) => {
                let mut tally = Tally::new();
                tally.fallback(StageId::Report, "narrative", &error);
                tally.finish(None)
            }
        }
    }
}
