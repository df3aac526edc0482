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
    DomainMap, ImpactStage, ParsedScenario, RippleStage, SeverityStage,
};

use super::{ScenarioAnalyst, Staged};
use crate::stages::{domains, impacts, parser, ripple, severity};

/// Deterministic analyst backed by keyword rules and static tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateAnalyst;

impl TemplateAnalyst {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScenarioAnalyst for TemplateAnalyst {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn parse(&self, prompt: &str) -> Staged<ParsedScenario> {
        Staged::fixed(parser::parse_keywords(prompt))
    }

    async fn map_domains(&self, parsed: &ParsedScenario) -> Staged<DomainMap> {
        Staged::fixed(domains::map_domains(parsed))
    }

    async fn simulate_impacts(
        &self,
        _parsed: &ParsedScenario,
        domains: &DomainMap,
    ) -> Staged<ImpactStage> {
        Staged::fixed(impacts::template_impacts(&domains.impacted_domains))
    }

    async fn build_ripples(&self, _impacts: &ImpactStage) -> Staged<RippleStage> {
        Staged::fixed(ripple::template_ripples())
    }

    async fn rank_severity(
        &self,
        impacts: &ImpactStage,
        _ripples: &RippleStage,
    ) -> Staged<SeverityStage> {
        Staged::fixed(severity::template_severity(impacts))
    }
}
