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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::report::StageId;

/// The seven fixed analysis domains, in canonical report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Economy,
    Healthcare,
    Infrastructure,
    Education,
    Technology,
    SocialSystems,
    IndividualBehavior,
}

impl Domain {
    pub const ALL: [Domain; 7] = [
        Domain::Economy,
        Domain::Healthcare,
        Domain::Infrastructure,
        Domain::Education,
        Domain::Technology,
        Domain::SocialSystems,
        Domain::IndividualBehavior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Economy => "economy",
            Domain::Healthcare => "healthcare",
            Domain::Infrastructure => "infrastructure",
            Domain::Education => "education",
            Domain::Technology => "technology",
            Domain::SocialSystems => "social_systems",
            Domain::IndividualBehavior => "individual_behavior",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace([' ', '-'], "_");
        Domain::ALL
            .into_iter()
            .find(|domain| domain.as_str() == normalised)
            .ok_or_else(|| format!("unknown domain: {s}"))
    }
}

/// Geographic reach of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Global,
    National,
    Regional,
    Local,
}

impl Scope {
    pub fn label(&self) -> &'static str {
        match self {
            Scope::Global => "Global",
            Scope::National => "National",
            Scope::Regional => "Regional",
            Scope::Local => "Local",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse time horizon detected from the scenario wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationClass {
    ShortTerm,
    MediumTerm,
    LongTermYears,
    LongTermOpen,
}

impl DurationClass {
    pub fn label(&self) -> &'static str {
        match self {
            DurationClass::ShortTerm => "Short-term (days)",
            DurationClass::MediumTerm => "Medium-term (weeks)",
            DurationClass::LongTermYears => "Long-term (years)",
            DurationClass::LongTermOpen => "Long-term (months+)",
        }
    }
}

impl fmt::Display for DurationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityLevel {
    Minimal,
    Minor,
    Moderate,
    Severe,
    Catastrophic,
}

impl SeverityLevel {
    pub const MIN_SCORE: u8 = 1;
    pub const MAX_SCORE: u8 = 5;

    /// Thresholds: >=5 Catastrophic, >=4 Severe, >=3 Moderate, >=2 Minor.
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 5 => SeverityLevel::Catastrophic,
            4 => SeverityLevel::Severe,
            3 => SeverityLevel::Moderate,
            2 => SeverityLevel::Minor,
            _ => SeverityLevel::Minimal,
        }
    }

    pub fn clamp_score(raw: i64) -> u8 {
        raw.clamp(i64::from(Self::MIN_SCORE), i64::from(Self::MAX_SCORE)) as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeverityLevel::Minimal => "Minimal",
            SeverityLevel::Minor => "Minor",
            SeverityLevel::Moderate => "Moderate",
            SeverityLevel::Severe => "Severe",
            SeverityLevel::Catastrophic => "Catastrophic",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("Failed to launch model process: {0}")]
    Spawn(String),

    #[error("Timeout error: model call exceeded {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Model process exited with status {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model API error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Serialisation error: {0}")]
    Serialisation(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Failure of a single model-backed stage call. Never escapes the pipeline:
/// the analyst swaps in the fallback value and records the stage source.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StageError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{stage}: no usable JSON in model reply: {reason}")]
    Parse { stage: StageId, reason: String },

    #[error("{stage}: model reply did not match the expected schema: {reason}")]
    Schema { stage: StageId, reason: String },
}

impl StageError {
    pub fn parse(stage: StageId, reason: impl Into<String>) -> Self {
        StageError::Parse {
            stage,
            reason: reason.into(),
        }
    }

    pub fn schema(stage: StageId, reason: impl Into<String>) -> Self {
        StageError::Schema {
            stage,
            reason: reason.into(),
        }
    }
}

pub type StageResult<T> = Result<T, StageError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("stage written out of order: expected {expected}, got {found}")]
    OutOfOrder { expected: String, found: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domains_round_trip_through_names() {
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), domain);
        }
        assert_eq!("Social Systems".parse::<Domain>().unwrap(), Domain::SocialSystems);
        assert!("weather".parse::<Domain>().is_err());
    }

    #[test]
    fn severity_thresholds() {
        assert_eq!(SeverityLevel::from_score(5), SeverityLevel::Catastrophic);
        assert_eq!(SeverityLevel::from_score(4), SeverityLevel::Severe);
        assert_eq!(SeverityLevel::from_score(3), SeverityLevel::Moderate);
        assert_eq!(SeverityLevel::from_score(2), SeverityLevel::Minor);
        assert_eq!(SeverityLevel::from_score(1), SeverityLevel::Minimal);
        assert_eq!(SeverityLevel::from_score(0), SeverityLevel::Minimal);
    }

    #[test]
    fn domain_map_keys_serialise_snake_case() {
        let value = serde_json::to_value(Domain::IndividualBehavior).unwrap();
        assert_eq!(value, "individual_behavior");
    }
}
