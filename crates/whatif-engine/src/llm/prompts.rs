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

use tracing::warn;

/// Prompt templates for the model-backed stages. Variables use `{{name}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePrompt {
    Parse,
    Impacts,
    Ripples,
    Severity,
    Narrative,
}

const PARSE_TEMPLATE: &str = r#"Extract key details from this scenario in JSON format:

Scenario: {{scenario}}

Return ONLY this JSON (no markdown):
{"event": "what happens", "scope": "Global/National/Regional/Local", "duration": "timeframe", "scale": "who or what is affected", "entities": ["actor1", "actor2", "actor3"]}"#;

const IMPACTS_TEMPLATE: &str = r#"Scenario: {{scenario}}
Scope: {{scope}}
Duration: {{duration}}

For the {{domain}} domain, list 2 direct (first-order) impacts of: {{event}}

Return ONLY JSON:
{"impacts": [{"description": "impact", "explanation": "why it happens", "affected_entities": ["who"], "onset": "when"}]}"#;

const RIPPLES_TEMPLATE: &str = r#"From this impact: "{{impact}}", generate ripple effects: at least one 2nd-order and one 3rd-order consequence.

Return ONLY JSON:
{"chains": [{"order": 2, "cause": "impact", "effect": "result", "explanation": "how", "affected_domains": ["domain"], "time_to_manifest": "when"}, {"order": 3, "cause": "result", "effect": "further result", "explanation": "how", "affected_domains": ["domain"], "time_to_manifest": "when"}]}"#;

const SEVERITY_TEMPLATE: &str = r#"Score the severity (1-5) of these {{domain}} impacts: {{impacts}}

Consider disruption scale, recovery difficulty, cascading effects and vulnerable populations (each 1-5).

Return ONLY JSON:
{"severity_score": 3, "severity_level": "Moderate", "scoring_factors": {"disruption_scale": 3, "recovery_difficulty": 3, "cascading_effects": 3, "vulnerable_populations": 2}, "justification": "reason", "recovery_timeline": "time"}"#;

const NARRATIVE_TEMPLATE: &str = r#"Analyze this hypothetical scenario and provide detailed reasoning:

SCENARIO: {{scenario}}

Based on this scenario, provide:
1. Key immediate impacts (first 24 hours)
2. Secondary effects (days 1-7)
3. Long-term consequences (weeks+)
4. Most vulnerable populations/systems
5. Potential recovery strategies

Be specific and detailed. Think through the cascading effects."#;

impl StagePrompt {
    pub fn name(&self) -> &'static str {
        match self {
            StagePrompt::Parse => "scenario_parse",
            StagePrompt::Impacts => "impact_generation",
            StagePrompt::Ripples => "ripple_chains",
            StagePrompt::Severity => "severity_scoring",
            StagePrompt::Narrative => "narrative_analysis",
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            StagePrompt::Parse => PARSE_TEMPLATE,
            StagePrompt::Impacts => IMPACTS_TEMPLATE,
            StagePrompt::Ripples => RIPPLES_TEMPLATE,
            StagePrompt::Severity => SEVERITY_TEMPLATE,
            StagePrompt::Narrative => NARRATIVE_TEMPLATE,
        }
    }

    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut rendered = self.template().to_string();
        for (name, value) in vars {
            rendered = rendered.replace(&format!("{{{{{name}}}}}"), value);
        }
        if rendered.contains("{{") {
            warn!(template = self.name(), "Prompt has unsubstituted variables");
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_variables() {
        let prompt = StagePrompt::Impacts.render(&[
            ("scenario", "What if every port closed?"),
            ("scope", "Global"),
            ("duration", "Short-term (days to weeks)"),
            ("domain", "economy"),
            ("event", "ports close"),
        ]);
        assert!(prompt.starts_with("Scenario: What if every port closed?\nScope: Global\n"));
        assert!(prompt.contains("Duration: Short-term (days to weeks)"));
        assert!(prompt.contains("For the economy domain"));
        assert!(prompt.contains("impacts of: ports close"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn narrative_asks_for_plain_text() {
        let prompt = StagePrompt::Narrative.render(&[("scenario", "What if the grid failed?")]);
        assert!(prompt.contains("SCENARIO: What if the grid failed?"));
        assert!(prompt.contains("5. Potential recovery strategies"));
        assert!(!prompt.contains("JSON"));
    }

    #[test]
    fn json_braces_survive_rendering() {
        let prompt = StagePrompt::Parse.render(&[("scenario", "What if?")]);
        assert!(prompt.contains(r#"{"event": "what happens""#));
    }

    #[test]
    fn missing_variables_are_left_in_place() {
        let prompt = StagePrompt::Severity.render(&[("domain", "healthcare")]);
        assert!(prompt.contains("{{impacts}}"));
    }
}
