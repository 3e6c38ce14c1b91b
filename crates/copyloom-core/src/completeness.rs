//! Knowledge base completeness scoring.
//!
//! A fixed 15-point checklist decides whether a client's knowledge base is
//! rich enough to ground content generation. Scoring is pure and total: an
//! absent or empty record scores 0 with every label missing.

use crate::knowledge::KnowledgeBase;
use serde::{Deserialize, Serialize};

/// Minimum completion percentage that unlocks content generation.
pub const GENERATION_THRESHOLD: u32 = 50;

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Positioning,
    Business,
    Audience,
    Seo,
}

impl Section {
    pub fn all() -> &'static [Section] {
        &[
            Section::Positioning,
            Section::Business,
            Section::Audience,
            Section::Seo,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Positioning => "positioning",
            Section::Business => "business",
            Section::Audience => "audience",
            Section::Seo => "seo",
        }
    }
}

// ---------------------------------------------------------------------------
// Checklist
// ---------------------------------------------------------------------------

struct Check {
    section: Section,
    label: &'static str,
    passes: fn(&KnowledgeBase) -> bool,
}

fn filled(s: &str) -> bool {
    !s.trim().is_empty()
}

fn any_filled(items: &[String]) -> bool {
    items.iter().any(|s| filled(s))
}

const CHECKS: [Check; 15] = [
    Check {
        section: Section::Positioning,
        label: "Value proposition",
        passes: |kb| filled(&kb.positioning.value_proposition),
    },
    Check {
        section: Section::Positioning,
        label: "Differentiators",
        passes: |kb| any_filled(&kb.positioning.differentiators),
    },
    Check {
        section: Section::Positioning,
        label: "Words we use",
        passes: |kb| any_filled(&kb.positioning.words_we_use),
    },
    Check {
        section: Section::Positioning,
        label: "Banned words",
        passes: |kb| any_filled(&kb.positioning.banned_words),
    },
    Check {
        section: Section::Positioning,
        label: "Brand personality",
        passes: |kb| kb.positioning.personality.is_customized(),
    },
    Check {
        section: Section::Business,
        label: "Sector",
        passes: |kb| filled(&kb.business.sector),
    },
    Check {
        section: Section::Business,
        label: "Market",
        passes: |kb| filled(&kb.business.market),
    },
    Check {
        section: Section::Business,
        label: "Category maturity",
        passes: |kb| filled(&kb.business.category_maturity),
    },
    Check {
        section: Section::Business,
        label: "Products",
        passes: |kb| kb.business.products.iter().any(|p| filled(&p.name)),
    },
    // A service described but not yet named still counts.
    Check {
        section: Section::Business,
        label: "Services",
        passes: |kb| {
            kb.business
                .services
                .iter()
                .any(|s| filled(&s.name) || filled(&s.description))
        },
    },
    Check {
        section: Section::Audience,
        label: "Demographic profile",
        passes: |kb| {
            kb.audience
                .demographic_profile
                .fields()
                .iter()
                .any(|f| filled(f))
        },
    },
    Check {
        section: Section::Audience,
        label: "Personas",
        passes: |kb| kb.audience.personas.iter().any(|p| filled(&p.name)),
    },
    Check {
        section: Section::Audience,
        label: "FAQs",
        passes: |kb| kb.audience.faqs.iter().any(|f| filled(&f.question)),
    },
    Check {
        section: Section::Seo,
        label: "Main keywords",
        passes: |kb| any_filled(&kb.seo.main_keywords),
    },
    Check {
        section: Section::Seo,
        label: "Search intents",
        passes: |kb| any_filled(&kb.seo.search_intents),
    },
];

/// Number of checks in the completeness checklist.
pub const TOTAL_FIELDS: u32 = CHECKS.len() as u32;

/// Labels of every check, in checklist order.
pub fn all_labels() -> impl Iterator<Item = &'static str> {
    CHECKS.iter().map(|c| c.label)
}

// ---------------------------------------------------------------------------
// CompletenessResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletenessResult {
    pub filled_fields: u32,
    pub total_fields: u32,
    pub completion_percentage: u32,
    /// Labels of failed checks, in checklist order.
    pub missing_fields: Vec<String>,
    pub can_generate_content: bool,
    #[serde(skip)]
    passed: [bool; 15],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCompleteness {
    pub section: Section,
    pub filled: u32,
    pub total: u32,
}

impl CompletenessResult {
    /// Filled/total counts per section, derived from the same checklist.
    pub fn sections(&self) -> Vec<SectionCompleteness> {
        Section::all()
            .iter()
            .map(|&section| {
                let (filled, total) = CHECKS
                    .iter()
                    .zip(self.passed.iter())
                    .filter(|(c, _)| c.section == section)
                    .fold((0, 0), |(f, t), (_, &ok)| (f + u32::from(ok), t + 1));
                SectionCompleteness {
                    section,
                    filled,
                    total,
                }
            })
            .collect()
    }
}

/// Round `100 * filled / total` half-up using integer arithmetic.
pub fn percentage(filled: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (200 * filled + total) / (2 * total)
}

// ---------------------------------------------------------------------------
// score
// ---------------------------------------------------------------------------

/// Score a knowledge base against the checklist. `None` scores as empty.
pub fn score(kb: Option<&KnowledgeBase>) -> CompletenessResult {
    let mut passed = [false; 15];
    if let Some(kb) = kb {
        for (slot, check) in passed.iter_mut().zip(CHECKS.iter()) {
            *slot = (check.passes)(kb);
        }
    }

    let filled_fields = passed.iter().filter(|&&p| p).count() as u32;
    let missing_fields = CHECKS
        .iter()
        .zip(passed.iter())
        .filter(|(_, &ok)| !ok)
        .map(|(c, _)| c.label.to_string())
        .collect();
    let completion_percentage = percentage(filled_fields, TOTAL_FIELDS);

    CompletenessResult {
        filled_fields,
        total_fields: TOTAL_FIELDS,
        completion_percentage,
        missing_fields,
        can_generate_content: completion_percentage >= GENERATION_THRESHOLD,
        passed,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
