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

//! Keyword classifiers for the scenario parser. Tables are scanned in order
//! and the first entry with a matching keyword wins.

use scenario_contracts::{DurationClass, Scope};

pub const SCOPE_KEYWORDS: &[(Scope, &[&str])] = &[
    (Scope::Global, &["global", "world"]),
    (Scope::National, &["country", "nation"]),
];

pub const DURATION_KEYWORDS: &[(DurationClass, &[&str])] = &[
    (DurationClass::ShortTerm, &["day"]),
    (DurationClass::MediumTerm, &["week"]),
    (DurationClass::LongTermYears, &["year"]),
];

/// Labels a model may use for scope, including free-form variants.
pub const SCOPE_LABELS: &[(Scope, &[&str])] = &[
    (Scope::Global, &["global", "world", "international", "planet"]),
    (Scope::National, &["national", "country", "nation"]),
    (Scope::Regional, &["regional", "region", "continental"]),
    (Scope::Local, &["local", "city", "town", "municipal"]),
];

fn first_match<T: Copy>(table: &[(T, &[&str])], text: &str) -> Option<T> {
    let lowered = text.to_lowercase();
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(value, _)| *value)
}

pub fn classify_scope(text: &str) -> Scope {
    first_match(SCOPE_KEYWORDS, text).unwrap_or(Scope::Regional)
}

pub fn classify_duration(text: &str) -> DurationClass {
    first_match(DURATION_KEYWORDS, text).unwrap_or(DurationClass::LongTermOpen)
}

pub fn scope_from_label(label: &str) -> Option<Scope> {
    first_match(SCOPE_LABELS, label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_keywords() {
        assert_eq!(classify_scope("What if the WORLD ran out of water?"), Scope::Global);
        assert_eq!(classify_scope("a global pandemic"), Scope::Global);
        assert_eq!(classify_scope("What if a nation defaulted?"), Scope::National);
        assert_eq!(classify_scope("an earthquake hit Tokyo"), Scope::Regional);
        assert_eq!(classify_scope(""), Scope::Regional);
    }

    #[test]
    fn global_wins_over_national() {
        assert_eq!(classify_scope("every country in the world"), Scope::Global);
    }

    #[test]
    fn duration_keywords_in_priority_order() {
        assert_eq!(classify_duration("30 days offline"), DurationClass::ShortTerm);
        assert_eq!(classify_duration("for a week"), DurationClass::MediumTerm);
        assert_eq!(classify_duration("a decade-long year of drought"), DurationClass::LongTermYears);
        assert_eq!(classify_duration("a day every week"), DurationClass::ShortTerm);
        assert_eq!(classify_duration("banned tomorrow"), DurationClass::LongTermOpen);
    }

    #[test]
    fn model_scope_labels() {
        assert_eq!(scope_from_label("Global/Regional/Local"), Some(Scope::Global));
        assert_eq!(scope_from_label("local"), Some(Scope::Local));
        assert_eq!(scope_from_label("Continental"), Some(Scope::Regional));
        assert_eq!(scope_from_label("unclear"), None);
    }
}
