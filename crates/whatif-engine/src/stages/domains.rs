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

use scenario_contracts::{Domain, DomainMap, ParsedScenario};

/// Every scenario is mapped onto all seven domains regardless of content.
pub fn map_domains(_parsed: &ParsedScenario) -> DomainMap {
    DomainMap::new(Domain::ALL.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::parser::parse_keywords;

    #[test]
    fn always_seven_domains_in_canonical_order() {
        let map = map_domains(&parse_keywords("What if all cars became autonomous?"));
        assert_eq!(map.domain_count, 7);
        assert_eq!(map.impacted_domains, Domain::ALL);
    }
}
