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

//! Shared data types for the what-if scenario pipeline: stage records, the
//! workflow report, model request/response envelopes, configuration and
//! error types. No I/O.

pub mod config;
pub mod records;
pub mod report;
pub mod requests;
pub mod responses;
pub mod types;

pub use config::{
    ConfigError, EngineConfig, EngineMode, ModelBackend, ModelSettings, ServerConfig,
    WhatIfConfig,
};
pub use records::{
    ImpactRecord, ParsedScenario, RippleChain, ScoringFactors, SeverityRanking,
};
pub use report::{
    AnalysisSummary, AnalyzeResponse, DomainMap, ImpactStage, ReportMeta, RippleStage,
    RippleSummary, SeverityStage, StageId, StageOutputs, StageSource, WorkflowResult,
    WORKFLOW_COMPLETE,
};
pub use requests::ModelRequest;
pub use responses::ModelResponse;
pub use types::{
    Domain, DurationClass, ModelError, ModelResult, Scope, SeverityLevel, StageError,
    StageResult, WorkflowError,
};
