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

//! Lookup tables backing the template analyst. Everything here is static
//! data so the fast pipeline is fully deterministic.

use scenario_contracts::{Domain, ImpactRecord, RippleChain};

pub struct ImpactTemplate {
    pub description: &'static str,
    pub explanation: &'static str,
    pub affected_entities: &'static [&'static str],
    pub onset: &'static str,
}

impl ImpactTemplate {
    pub fn to_record(&self) -> ImpactRecord {
        ImpactRecord::new(
            self.description,
            self.explanation,
            self.affected_entities,
            self.onset,
        )
    }
}

pub struct RippleTemplate {
    pub cause: &'static str,
    pub effect: &'static str,
    pub explanation: &'static str,
    pub affected_domains: &'static [Domain],
    pub time_to_manifest: &'static str,
}

impl RippleTemplate {
    pub fn to_chain(&self, order: u8) -> RippleChain {
        RippleChain {
            order,
            cause: self.cause.to_string(),
            effect: self.effect.to_string(),
            explanation: self.explanation.to_string(),
            affected_domains: self
                .affected_domains
                .iter()
                .map(|domain| domain.as_str().to_string())
                .collect(),
            time_to_manifest: self.time_to_manifest.to_string(),
        }
    }
}

/// Scale reported for every keyword-parsed scenario.
pub const DEFAULT_SCALE: &str = "Millions to billions affected";

pub const DEFAULT_ENTITIES: &[&str] = &[
    "Governments",
    "Corporations",
    "Individuals",
    "Infrastructure",
    "Systems",
];

/// Score at or above which recovery is measured in months.
pub const LONG_RECOVERY_THRESHOLD: u8 = 4;
pub const LONG_RECOVERY: &str = "Weeks to months";
pub const SHORT_RECOVERY: &str = "Days to weeks";

const ECONOMY_IMPACTS: &[ImpactTemplate] = &[
    ImpactTemplate {
        description: "Stock markets experience significant volatility and potential crashes",
        explanation: "Uncertainty and disruption reduce investor confidence and trading activity",
        affected_entities: &["Financial institutions", "Investors", "Corporations"],
        onset: "Immediate to hours",
    },
    ImpactTemplate {
        description: "Supply chains are disrupted or halted",
        explanation: "Logistics networks, transportation, and coordination systems are affected",
        affected_entities: &["Manufacturers", "Retailers", "Consumers"],
        onset: "Hours to days",
    },
    ImpactTemplate {
        description: "Employment disruption and potential mass layoffs",
        explanation: "Businesses unable to operate normally reduce workforce",
        affected_entities: &["Workers", "Businesses", "Families"],
        onset: "Days to weeks",
    },
];

const HEALTHCARE_IMPACTS: &[ImpactTemplate] = &[
    ImpactTemplate {
        description: "Hospital systems face operational challenges",
        explanation: "Supply disruptions, staff coordination issues, and resource constraints",
        affected_entities: &["Hospitals", "Patients", "Healthcare workers"],
        onset: "Immediate",
    },
    ImpactTemplate {
        description: "Medication and medical supply shortages",
        explanation: "Distribution networks disrupted, manufacturing affected",
        affected_entities: &["Patients", "Pharmacies", "Hospitals"],
        onset: "Days to weeks",
    },
    ImpactTemplate {
        description: "Mental health crisis increases",
        explanation: "Stress, anxiety, and uncertainty from the scenario",
        affected_entities: &["General population", "Vulnerable groups"],
        onset: "Immediate",
    },
];

const INFRASTRUCTURE_IMPACTS: &[ImpactTemplate] = &[
    ImpactTemplate {
        description: "Transportation networks face disruption",
        explanation: "Fuel shortages, coordination issues, or physical damage",
        affected_entities: &["Commuters", "Businesses", "Supply chains"],
        onset: "Immediate to hours",
    },
    ImpactTemplate {
        description: "Utility systems may experience strain or failure",
        explanation: "Power grids, water systems, and communications affected",
        affected_entities: &["Households", "Businesses", "Hospitals"],
        onset: "Hours to days",
    },
    ImpactTemplate {
        description: "Communication systems degraded or offline",
        explanation: "Phone networks, internet, and emergency services affected",
        affected_entities: &["General population", "Emergency services"],
        onset: "Immediate",
    },
];

const EDUCATION_IMPACTS: &[ImpactTemplate] = &[
    ImpactTemplate {
        description: "Schools and universities forced to close or go remote",
        explanation: "Safety concerns, resource constraints, or operational issues",
        affected_entities: &["Students", "Teachers", "Parents"],
        onset: "Days",
    },
    ImpactTemplate {
        description: "Learning disruption and educational setback",
        explanation: "Inability to conduct normal classes and assessments",
        affected_entities: &["Students", "Educational institutions"],
        onset: "Days",
    },
    ImpactTemplate {
        description: "Childcare crisis for working parents",
        explanation: "Schools closed, childcare facilities unavailable",
        affected_entities: &["Parents", "Children", "Workforce"],
        onset: "Days",
    },
];

const TECHNOLOGY_IMPACTS: &[ImpactTemplate] = &[
    ImpactTemplate {
        description: "Digital systems and internet connectivity disrupted",
        explanation: "Infrastructure damage, power loss, or network failures",
        affected_entities: &["Businesses", "Individuals", "Services"],
        onset: "Immediate",
    },
    ImpactTemplate {
        description: "Data loss and cybersecurity vulnerabilities",
        explanation: "Systems offline, backup systems strained, security compromised",
        affected_entities: &["Businesses", "Individuals", "Governments"],
        onset: "Hours to days",
    },
    ImpactTemplate {
        description: "Technology-dependent services collapse",
        explanation: "Banking, e-commerce, cloud services, and digital platforms offline",
        affected_entities: &["Businesses", "Consumers", "Financial sector"],
        onset: "Immediate",
    },
];

const SOCIAL_SYSTEMS_IMPACTS: &[ImpactTemplate] = &[
    ImpactTemplate {
        description: "Social unrest and potential civil disorder",
        explanation: "Fear, uncertainty, and resource scarcity lead to conflict",
        affected_entities: &["General population", "Law enforcement"],
        onset: "Hours to days",
    },
    ImpactTemplate {
        description: "Government response and emergency management activated",
        explanation: "Authorities mobilize to manage crisis and maintain order",
        affected_entities: &["Government agencies", "Population"],
        onset: "Immediate",
    },
    ImpactTemplate {
        description: "Community cohesion tested and potentially fractured",
        explanation: "Competition for resources and divergent responses to crisis",
        affected_entities: &["Communities", "Social groups"],
        onset: "Days",
    },
];

const INDIVIDUAL_BEHAVIOR_IMPACTS: &[ImpactTemplate] = &[
    ImpactTemplate {
        description: "Panic buying and hoarding behavior",
        explanation: "Fear and uncertainty drive people to stockpile resources",
        affected_entities: &["Consumers", "Retailers", "Supply chains"],
        onset: "Immediate to hours",
    },
    ImpactTemplate {
        description: "Psychological stress and anxiety widespread",
        explanation: "Uncertainty about future, loss of normalcy, fear",
        affected_entities: &["General population", "Vulnerable groups"],
        onset: "Immediate",
    },
    ImpactTemplate {
        description: "Behavioral changes in daily routines",
        explanation: "People avoid public spaces, change work patterns, isolate",
        affected_entities: &["General population", "Businesses"],
        onset: "Hours to days",
    },
];

const SECOND_ORDER_RIPPLES: &[RippleTemplate] = &[
    RippleTemplate {
        cause: "Economic disruption",
        effect: "Unemployment rises as businesses struggle",
        explanation: "Companies unable to operate reduce workforce to survive",
        affected_domains: &[
            Domain::Economy,
            Domain::SocialSystems,
            Domain::IndividualBehavior,
        ],
        time_to_manifest: "Weeks",
    },
    RippleTemplate {
        cause: "Supply chain disruption",
        effect: "Consumer goods become scarce and expensive",
        explanation: "Limited availability drives up prices and creates shortages",
        affected_domains: &[Domain::Economy, Domain::IndividualBehavior],
        time_to_manifest: "Days to weeks",
    },
    RippleTemplate {
        cause: "Healthcare system strain",
        effect: "Preventable deaths increase",
        explanation: "Overwhelmed systems cannot provide adequate care",
        affected_domains: &[Domain::Healthcare, Domain::SocialSystems],
        time_to_manifest: "Weeks",
    },
    RippleTemplate {
        cause: "Social unrest",
        effect: "Government imposes emergency measures",
        explanation: "Authorities respond to disorder with restrictions",
        affected_domains: &[Domain::SocialSystems, Domain::IndividualBehavior],
        time_to_manifest: "Days",
    },
];

const THIRD_ORDER_RIPPLES: &[RippleTemplate] = &[
    RippleTemplate {
        cause: "Mass unemployment",
        effect: "Homelessness and poverty increase",
        explanation: "People unable to pay rent and bills lose housing",
        affected_domains: &[
            Domain::Economy,
            Domain::SocialSystems,
            Domain::IndividualBehavior,
        ],
        time_to_manifest: "Months",
    },
    RippleTemplate {
        cause: "Healthcare collapse",
        effect: "Public health crisis worsens",
        explanation: "Untreated illnesses spread and mortality increases",
        affected_domains: &[Domain::Healthcare, Domain::SocialSystems],
        time_to_manifest: "Weeks to months",
    },
    RippleTemplate {
        cause: "Education disruption",
        effect: "Long-term learning loss and skill gaps",
        explanation: "Students fall behind, future workforce less prepared",
        affected_domains: &[Domain::Education, Domain::Economy],
        time_to_manifest: "Months to years",
    },
    RippleTemplate {
        cause: "Infrastructure failure",
        effect: "Cascading system failures",
        explanation: "Interdependent systems fail when one fails",
        affected_domains: &[Domain::Infrastructure, Domain::Technology, Domain::Economy],
        time_to_manifest: "Days to weeks",
    },
];

pub fn impact_templates(domain: Domain) -> &'static [ImpactTemplate] {
    match domain {
        Domain::Economy => ECONOMY_IMPACTS,
        Domain::Healthcare => HEALTHCARE_IMPACTS,
        Domain::Infrastructure => INFRASTRUCTURE_IMPACTS,
        Domain::Education => EDUCATION_IMPACTS,
        Domain::Technology => TECHNOLOGY_IMPACTS,
        Domain::SocialSystems => SOCIAL_SYSTEMS_IMPACTS,
        Domain::IndividualBehavior => INDIVIDUAL_BEHAVIOR_IMPACTS,
    }
}

pub fn domain_impacts(domain: Domain) -> Vec<ImpactRecord> {
    impact_templates(domain)
        .iter()
        .map(ImpactTemplate::to_record)
        .collect()
}

/// Template chains for `order`; unknown orders have no templates.
pub fn ripple_templates(order: u8) -> Vec<RippleChain> {
    let templates: &[RippleTemplate] = match order {
        RippleChain::SECOND_ORDER => SECOND_ORDER_RIPPLES,
        RippleChain::THIRD_ORDER => THIRD_ORDER_RIPPLES,
        _ => &[],
    };
    templates.iter().map(|t| t.to_chain(order)).collect()
}

/// Base severity score and its rationale.
pub fn severity_factor(domain: Domain) -> (u8, &'static str) {
    match domain {
        Domain::Economy => (4, "Direct economic impact, widespread disruption"),
        Domain::Healthcare => (5, "Life-threatening consequences, vulnerable populations"),
        Domain::Infrastructure => (4, "Cascading failures, widespread disruption"),
        Domain::Education => (2, "Important but not immediately life-threatening"),
        Domain::Technology => (3, "Significant disruption but workarounds exist"),
        Domain::SocialSystems => (4, "Governance and order affected"),
        Domain::IndividualBehavior => (3, "Psychological impact, behavioral changes"),
    }
}

pub fn recovery_timeline(score: u8) -> &'static str {
    if score >= LONG_RECOVERY_THRESHOLD {
        LONG_RECOVERY
    } else {
        SHORT_RECOVERY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_domain_has_three_impacts() {
        for domain in Domain::ALL {
            let impacts = domain_impacts(domain);
            assert_eq!(impacts.len(), 3, "{domain}");
            assert!(impacts.iter().all(|i| !i.description.is_empty()));
        }
    }

    #[test]
    fn ripple_tables_by_order() {
        let second = ripple_templates(2);
        let third = ripple_templates(3);
        assert_eq!(second.len(), 4);
        assert_eq!(third.len(), 4);
        assert!(second.iter().all(RippleChain::is_second_order));
        assert!(third.iter().all(RippleChain::is_third_order));
        assert_eq!(third[3].affected_domains, ["infrastructure", "technology", "economy"]);
        assert!(ripple_templates(4).is_empty());
    }

    #[test]
    fn severity_factors_are_in_range() {
        for domain in Domain::ALL {
            let (score, rationale) = severity_factor(domain);
            assert!((1..=5).contains(&score));
            assert!(!rationale.is_empty());
        }
        assert_eq!(severity_factor(Domain::Healthcare).0, 5);
        assert_eq!(severity_factor(Domain::Education).0, 2);
    }

    #[test]
    fn recovery_depends_on_score() {
        assert_eq!(recovery_timeline(5), "Weeks to months");
        assert_eq!(recovery_timeline(4), "Weeks to months");
        assert_eq!(recovery_timeline(3), "Days to weeks");
    }
}
