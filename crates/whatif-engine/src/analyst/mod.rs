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

pub mod model;
pub mod template;

pub use model::ModelAnalyst;
pub use template::TemplateAnalyst;

use async_trait::async_trait;
use scenario_contracts::{
    DomainMap, ImpactStage, ParsedScenario, ReportMeta, RippleStage, SeverityStage, StageError,
    StageId, StageSource,
};

use crate::logging::log_fallback;
use crate::stages::report::format_report;

/// A stage output together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Staged<T> {
    pub output: T,
    pub source: StageSource,
    pub notes: Vec<String>,
}

impl<T> Staged<T> {
    pub fn fixed(output: T) -> Self {
        Self {
            output,
            source: StageSource::Static,
            notes: Vec::new(),
        }
    }

    pub fn model(output: T) -> Self {
        Self {
            output,
            source: StageSource::Model,
            notes: Vec::new(),
        }
    }

    pub fn fallback(output: T, note: impl Into<String>) -> Self {
        Self {
            output,
            source: StageSource::Fallback,
            notes: vec![note.into()],
        }
    }
}

/// Counts per-call outcomes of a model-backed stage.
#[derive(Debug, Default)]
pub struct Tally {
    succeeded: usize,
    fell_back: usize,
    notes: Vec<String>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self) {
        self.succeeded += 1;
    }

    /// Logs the failure and records a note naming the unit that fell back.
    pub fn fallback(&mut self, stage: StageId, subject: &str, error: &StageError) {
        log_fallback(stage, subject, error);
        self.fell_back += 1;
        self.notes.push(format!("{stage} ({subject}): {error}"));
    }

    /// Records units that were never sent to the model.
    pub fn skipped(&mut self, count: usize, note: String) {
        if count > 0 {
            self.fell_back += count;
            self.notes.push(note);
        }
    }

    pub fn finish<T>(self, output: T) -> Staged<T> {
        Staged {
            output,
            source: StageSource::from_counts(self.succeeded, self.fell_back),
            notes: self.notes,
        }
    }
}

/// One implementation of the six pipeline stages. Every method is total:
/// failures are absorbed into fallback output and reported via the source.
#[async_trait]
pub trait ScenarioAnalyst: Send + Sync {
    fn name(&self) -> &'static str;

    async fn parse(&self, prompt: &str) -> Staged<ParsedScenario>;

    async fn map_domains(&self, parsed: &ParsedScenario) -> Staged<DomainMap>;

    async fn simulate_impacts(
        &self,
        parsed: &ParsedScenario,
        domains: &DomainMap,
    ) -> Staged<ImpactStage>;

    async fn build_ripples(&self, impacts: &ImpactStage) -> Staged<RippleStage>;

    async fn rank_severity(
        &self,
        impacts: &ImpactStage,
        ripples: &RippleStage,
    ) -> Staged<SeverityStage>;

    fn format_report(&self) -> Staged<ReportMeta> {
        Staged::fixed(format_report())
    }

    /// Free-text analysis attached after the report. None when not produced.
    async fn narrate(&self, _parsed: &ParsedScenario) -> Staged<Option<String>> {
        Staged::fixed(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_contracts::ModelError;

    #[test]
    fn tally_sources() {
        let mut tally = Tally::new();
        tally.success();
        assert_eq!(tally.finish(()).source, StageSource::Model);

        let mut tally = Tally::new();
        tally.success();
        tally.skipped(4, "4 domains past the limit".to_string());
        let staged = tally.finish(());
        assert_eq!(staged.source, StageSource::Partial);
        assert_eq!(staged.notes.len(), 1);

        let mut tally = Tally::new();
        tally.fallback(
            StageId::Severity,
            "economy",
            &StageError::Model(ModelError::EmptyResponse),
        );
        let staged = tally.finish(());
        assert_eq!(staged.source, StageSource::Fallback);
        assert!(staged.notes[0].starts_with("stage_5 (economy):"));
    }

    #[test]
    fn skipping_nothing_leaves_no_note() {
        let mut tally = Tally::new();
        tally.success();
        tally.skipped(0, "unused".to_string());
        let staged = tally.finish(());
        assert_eq!(staged.source, StageSource::Model);
        assert!(staged.notes.is_empty());
    }
}
