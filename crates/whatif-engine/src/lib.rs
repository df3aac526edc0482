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

//! Six-stage what-if scenario pipeline.
//!
//! A scenario string is parsed, mapped onto the fixed analysis domains,
//! expanded into first-order impacts and ripple chains, scored for severity,
//! and wrapped into a report. Two analysts implement the stages: the
//! [`TemplateAnalyst`] reads static tables, the [`ModelAnalyst`] asks a local
//! model and falls back to placeholder values whenever a call fails.

pub mod analyst;
pub mod classify;
pub mod config;
pub mod engine;
pub mod llm;
pub mod logging;
pub mod orchestrator;
pub mod stages;
pub mod state;
pub mod tables;

pub use analyst::{ModelAnalyst, ScenarioAnalyst, Staged, TemplateAnalyst};
pub use self::config::{ConfigLoader, ConfigStore, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use engine::ScenarioEngine;
pub use llm::{build_client, ModelCaller, ModelClient, OllamaCliClient, OllamaHttpClient};
pub use orchestrator::{FastWhatIfOrchestrator, ModelWhatIfOrchestrator, WhatIfOrchestrator};
pub use state::{ScenarioState, WorkflowPhase};

pub use scenario_contracts as contracts;
