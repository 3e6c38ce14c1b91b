//! Per-client knowledge base: brand positioning, business facts, audience and
//! SEO data used to ground generated content.
//!
//! Every sequence defaults to empty and every string to `""`, so a partially
//! written document always deserializes into a complete record. Mutation goes
//! through [`KnowledgeEdit`]; there is no path-based setter.

use crate::error::{CopyloomError, Result};
use serde::{Deserialize, Serialize};

/// Midpoint of every personality slider. A scale sitting here counts as unset.
pub const PERSONALITY_MIDPOINT: u8 = 50;

// ---------------------------------------------------------------------------
// Positioning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityScale {
    FormalVsInformal,
    TechnicalVsAccessible,
    SeriousVsHumorous,
}

impl PersonalityScale {
    pub fn as_str(self) -> &'static str {
        match self {
            PersonalityScale::FormalVsInformal => "formal_vs_informal",
            PersonalityScale::TechnicalVsAccessible => "technical_vs_accessible",
            PersonalityScale::SeriousVsHumorous => "serious_vs_humorous",
        }
    }
}

impl std::str::FromStr for PersonalityScale {
    type Err = CopyloomError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "formal_vs_informal" => Ok(PersonalityScale::FormalVsInformal),
            "technical_vs_accessible" => Ok(PersonalityScale::TechnicalVsAccessible),
            "serious_vs_humorous" => Ok(PersonalityScale::SeriousVsHumorous),
            _ => Err(CopyloomError::InvalidEdit(format!(
                "unknown personality scale '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personality {
    pub formal_vs_informal: u8,
    pub technical_vs_accessible: u8,
    pub serious_vs_humorous: u8,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            formal_vs_informal: PERSONALITY_MIDPOINT,
            technical_vs_accessible: PERSONALITY_MIDPOINT,
            serious_vs_humorous: PERSONALITY_MIDPOINT,
        }
    }
}

impl Personality {
    pub fn get(&self, scale: PersonalityScale) -> u8 {
        match scale {
            PersonalityScale::FormalVsInformal => self.formal_vs_informal,
            PersonalityScale::TechnicalVsAccessible => self.technical_vs_accessible,
            PersonalityScale::SeriousVsHumorous => self.serious_vs_humorous,
        }
    }

    /// Set a scale, clamping to `0..=100`.
    pub fn set(&mut self, scale: PersonalityScale, value: u8) {
        let value = value.min(100);
        match scale {
            PersonalityScale::FormalVsInformal => self.formal_vs_informal = value,
            PersonalityScale::TechnicalVsAccessible => self.technical_vs_accessible = value,
            PersonalityScale::SeriousVsHumorous => self.serious_vs_humorous = value,
        }
    }

    /// Clamp every slider into `0..=100`.
    pub fn normalize(&mut self) {
        for v in [
            &mut self.formal_vs_informal,
            &mut self.technical_vs_accessible,
            &mut self.serious_vs_humorous,
        ] {
            *v = (*v).min(100);
        }
    }

    /// True once any slider has been moved off the midpoint.
    pub fn is_customized(&self) -> bool {
        [
            self.formal_vs_informal,
            self.technical_vs_accessible,
            self.serious_vs_humorous,
        ]
        .iter()
        .any(|&v| v != PERSONALITY_MIDPOINT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Positioning {
    pub value_proposition: String,
    pub differentiators: Vec<String>,
    pub personality: Personality,
    pub words_we_use: Vec<String>,
    pub banned_words: Vec<String>,
}

// ---------------------------------------------------------------------------
// Business
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub name: String,
    pub features: Vec<String>,
    pub price_range: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub name: String,
    pub description: String,
    pub price_range: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Business {
    pub sector: String,
    pub market: String,
    pub category_maturity: String,
    pub regulatory_status: String,
    pub products: Vec<Product>,
    pub services: Vec<Service>,
}

// ---------------------------------------------------------------------------
// Audience
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemographicField {
    AgeRange,
    Gender,
    Income,
    Education,
    Location,
}

impl std::str::FromStr for DemographicField {
    type Err = CopyloomError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "age_range" => Ok(DemographicField::AgeRange),
            "gender" => Ok(DemographicField::Gender),
            "income" => Ok(DemographicField::Income),
            "education" => Ok(DemographicField::Education),
            "location" => Ok(DemographicField::Location),
            _ => Err(CopyloomError::InvalidEdit(format!(
                "unknown demographic field '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographicProfile {
    pub age_range: String,
    pub gender: String,
    pub income: String,
    pub education: String,
    pub location: String,
}

impl DemographicProfile {
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.age_range,
            &self.gender,
            &self.income,
            &self.education,
            &self.location,
        ]
    }

    fn field_mut(&mut self, field: DemographicField) -> &mut String {
        match field {
            DemographicField::AgeRange => &mut self.age_range,
            DemographicField::Gender => &mut self.gender,
            DemographicField::Income => &mut self.income,
            DemographicField::Education => &mut self.education,
            DemographicField::Location => &mut self.location,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmographicProfile {
    pub company_size: String,
    pub industries: Vec<String>,
    pub target_roles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Persona {
    pub name: String,
    pub pains: Vec<String>,
    pub objections: Vec<String>,
    pub purchase_triggers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Audience {
    pub demographic_profile: DemographicProfile,
    pub firmographic_profile: FirmographicProfile,
    pub personas: Vec<Persona>,
    pub faqs: Vec<Faq>,
}

// ---------------------------------------------------------------------------
// Seo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seo {
    pub main_keywords: Vec<String>,
    pub search_intents: Vec<String>,
}

// ---------------------------------------------------------------------------
// KnowledgeBase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBase {
    pub positioning: Positioning,
    pub business: Business,
    pub audience: Audience,
    pub seo: Seo,
}

// ---------------------------------------------------------------------------
// KnowledgeEdit
// ---------------------------------------------------------------------------

/// A single typed change to a knowledge base draft.
///
/// `Remove*` variants address sequence entries by zero-based index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum KnowledgeEdit {
    SetValueProposition(String),
    AddDifferentiator(String),
    RemoveDifferentiator(usize),
    SetPersonality { scale: PersonalityScale, value: u8 },
    AddWordWeUse(String),
    RemoveWordWeUse(usize),
    AddBannedWord(String),
    RemoveBannedWord(usize),

    SetSector(String),
    SetMarket(String),
    SetCategoryMaturity(String),
    SetRegulatoryStatus(String),
    AddProduct(Product),
    RemoveProduct(usize),
    AddService(Service),
    RemoveService(usize),

    SetDemographic { field: DemographicField, value: String },
    SetCompanySize(String),
    AddIndustry(String),
    RemoveIndustry(usize),
    AddTargetRole(String),
    RemoveTargetRole(usize),
    AddPersona(Persona),
    RemovePersona(usize),
    AddFaq(Faq),
    RemoveFaq(usize),

    AddMainKeyword(String),
    RemoveMainKeyword(usize),
    AddSearchIntent(String),
    RemoveSearchIntent(usize),
}

fn remove_at<T>(items: &mut Vec<T>, index: usize, what: &str) -> Result<()> {
    if index >= items.len() {
        return Err(CopyloomError::InvalidEdit(format!(
            "{what} index {index} out of range (len {})",
            items.len()
        )));
    }
    items.remove(index);
    Ok(())
}

impl KnowledgeBase {
    /// Bring a whole record inside the data-model bounds. Applied on every
    /// save, so imported or replaced records are held to the same limits as
    /// edited ones.
    pub fn normalize(&mut self) {
        self.positioning.personality.normalize();
    }

    /// Apply one edit in place. Only out-of-range removals fail; the record
    /// is left untouched in that case.
    pub fn apply(&mut self, edit: KnowledgeEdit) -> Result<()> {
        use KnowledgeEdit::*;

        let p = &mut self.positioning;
        let b = &mut self.business;
        let a = &mut self.audience;
        let s = &mut self.seo;
        match edit {
            SetValueProposition(v) => p.value_proposition = v,
            AddDifferentiator(v) => p.differentiators.push(v),
            RemoveDifferentiator(i) => remove_at(&mut p.differentiators, i, "differentiator")?,
            SetPersonality { scale, value } => p.personality.set(scale, value),
            AddWordWeUse(v) => p.words_we_use.push(v),
            RemoveWordWeUse(i) => remove_at(&mut p.words_we_use, i, "word we use")?,
            AddBannedWord(v) => p.banned_words.push(v),
            RemoveBannedWord(i) => remove_at(&mut p.banned_words, i, "banned word")?,

            SetSector(v) => b.sector = v,
            SetMarket(v) => b.market = v,
            SetCategoryMaturity(v) => b.category_maturity = v,
            SetRegulatoryStatus(v) => b.regulatory_status = v,
            AddProduct(v) => b.products.push(v),
            RemoveProduct(i) => remove_at(&mut b.products, i, "product")?,
            AddService(v) => b.services.push(v),
            RemoveService(i) => remove_at(&mut b.services, i, "service")?,

            SetDemographic { field, value } => *a.demographic_profile.field_mut(field) = value,
            SetCompanySize(v) => a.firmographic_profile.company_size = v,
            AddIndustry(v) => a.firmographic_profile.industries.push(v),
            RemoveIndustry(i) => remove_at(&mut a.firmographic_profile.industries, i, "industry")?,
            AddTargetRole(v) => a.firmographic_profile.target_roles.push(v),
            RemoveTargetRole(i) => {
                remove_at(&mut a.firmographic_profile.target_roles, i, "target role")?
            }
            AddPersona(v) => a.personas.push(v),
            RemovePersona(i) => remove_at(&mut a.personas, i, "persona")?,
            AddFaq(v) => a.faqs.push(v),
            RemoveFaq(i) => remove_at(&mut a.faqs, i, "faq")?,

            AddMainKeyword(v) => s.main_keywords.push(v),
            RemoveMainKeyword(i) => remove_at(&mut s.main_keywords, i, "main keyword")?,
            AddSearchIntent(v) => s.search_intents.push(v),
            RemoveSearchIntent(i) => remove_at(&mut s.search_intents, i, "search intent")?,
        }
        Ok(())
    }

    /// Apply a batch of edits to a copy; the original is only replaced when
    /// every edit succeeds.
    pub fn apply_all(&mut self, edits: impl IntoIterator<Item = KnowledgeEdit>) -> Result<()> {
        let mut draft = self.clone();
        for edit in edits {
            draft.apply(edit)?;
        }
        *self = draft;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
