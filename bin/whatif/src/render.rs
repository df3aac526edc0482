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

use whatif_engine::contracts::{RippleChain, StageId, WorkflowResult};

const RULE_WIDTH: usize = 70;

fn heading(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(title.to_string());
    lines.push("-".repeat(RULE_WIDTH));
}

fn push_chains(lines: &mut Vec<String>, label: &str, chains: &[RippleChain]) {
    lines.push(format!("  {label}:"));
    for chain in chains {
        lines.push(format!(
            "    {} -> {} ({})",
            chain.cause, chain.effect, chain.time_to_manifest
        ));
    }
}

/// Plain-text rendering of a finished run, one section per stage.
pub fn render_report(result: &WorkflowResult) -> String {
    let stages = &result.stages;
    let mut lines = vec![
        "=".repeat(RULE_WIDTH),
        format!("{}: {}", stages.stage_6.report_type, result.scenario),
        "=".repeat(RULE_WIDTH),
    ];

    let parsed = &stages.stage_1;
    heading(&mut lines, StageId::Parse.title());
    lines.push(format!("  Event:    {}", parsed.event));
    lines.push(format!("  Scope:    {}", parsed.scope));
    lines.push(format!("  Duration: {}", parsed.duration));
    lines.push(format!("  Scale:    {}", parsed.scale));
    lines.push(format!("  Entities: {}", parsed.entities.join(", ")));

    heading(&mut lines, StageId::Domains.title());
    let domains: Vec<&str> = stages
        .stage_2
        .impacted_domains
        .iter()
        .map(|d| d.as_str())
        .collect();
    lines.push(format!(
        "  {} domains: {}",
        stages.stage_2.domain_count,
        domains.join(", ")
    ));

    heading(&mut lines, StageId::Impacts.title());
    for (domain, impacts) in &stages.stage_3.first_order_impacts {
        lines.push(format!("  [{domain}]"));
        for impact in impacts {
            lines.push(format!("    - {} ({})", impact.description, impact.onset));
        }
    }

    heading(&mut lines, StageId::Ripples.title());
    push_chains(&mut lines, "Second order", &stages.stage_4.second_order);
    push_chains(&mut lines, "Third order", &stages.stage_4.third_order);

    heading(&mut lines, StageId::Severity.title());
    for (domain, ranking) in &stages.stage_5.rankings {
        lines.push(format!(
            "  {:<20} {}/5 {:<12} recovery: {}",
            domain.as_str(),
            ranking.score,
            ranking.level.label(),
            ranking.recovery_timeline
        ));
    }

    if let Some(analysis) = &result.analysis {
        heading(&mut lines, "Analysis");
        lines.extend(analysis.lines().map(|line| format!("  {line}")));
    }

    if !result.fallback_notes.is_empty() {
        heading(&mut lines, "Fallbacks");
        for note in &result.fallback_notes {
            lines.push(format!("  ! {note}"));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{} stages completed at {}",
        stages.stage_6.stages_completed,
        result.completed_at.to_rfc3339()
    ));
    lines.join("\n")
}
