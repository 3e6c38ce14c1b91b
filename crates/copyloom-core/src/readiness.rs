//! Generation readiness gate.
//!
//! Combines the current generation-form selection with a completeness result
//! and decides whether "Generate" may proceed. Blocking reasons are values,
//! not errors, so callers can render a specific inline message.

use crate::completeness::CompletenessResult;
use crate::types::{ContentCategory, SourceType};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GenerationSelection
// ---------------------------------------------------------------------------

/// What the user has picked in the generation form so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSelection {
    pub client_id: Option<String>,
    /// Raw category as chosen in the form; validated against
    /// [`ContentCategory`].
    pub content_category: Option<String>,
    pub source_type: Option<SourceType>,
    pub source_value: String,
    pub context_text: String,
    pub objective: String,
}

// ---------------------------------------------------------------------------
// ReadinessBlock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadinessBlock {
    NoClientSelected,
    NoCategorySelected,
    NoSourceOrContext,
    KnowledgeBaseIncomplete {
        completion_percentage: u32,
        missing_fields: Vec<String>,
    },
}

impl ReadinessBlock {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessBlock::NoClientSelected => "no_client_selected",
            ReadinessBlock::NoCategorySelected => "no_category_selected",
            ReadinessBlock::NoSourceOrContext => "no_source_or_context",
            ReadinessBlock::KnowledgeBaseIncomplete { .. } => "knowledge_base_incomplete",
        }
    }

    /// User-facing explanation for the blocked generate action.
    pub fn message(&self) -> String {
        match self {
            ReadinessBlock::NoClientSelected => "Select a client first.".to_string(),
            ReadinessBlock::NoCategorySelected => "Choose a content category.".to_string(),
            ReadinessBlock::NoSourceOrContext => {
                "Pick a news or trend source, or describe the context for this piece.".to_string()
            }
            ReadinessBlock::KnowledgeBaseIncomplete {
                completion_percentage,
                missing_fields,
            } => format!(
                "Knowledge base is {completion_percentage}% complete; fill in: {}",
                missing_fields.join(", ")
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReadinessBlock>,
}

impl Readiness {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn blocked(reason: ReadinessBlock) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

fn has_text(s: &str) -> bool {
    !s.trim().is_empty()
}

/// Evaluate the gate. Rules run in a fixed order and the first failure wins:
/// client, category, source-or-context, knowledge base completeness.
pub fn can_proceed(selection: &GenerationSelection, completeness: &CompletenessResult) -> Readiness {
    if !selection.client_id.as_deref().is_some_and(has_text) {
        return Readiness::blocked(ReadinessBlock::NoClientSelected);
    }

    let category_ok = selection
        .content_category
        .as_deref()
        .is_some_and(|c| c.parse::<ContentCategory>().is_ok());
    if !category_ok {
        return Readiness::blocked(ReadinessBlock::NoCategorySelected);
    }

    let has_source = selection
        .source_type
        .is_some_and(|t| !t.is_text() && has_text(&selection.source_value));
    if !has_source && !has_text(&selection.context_text) {
        return Readiness::blocked(ReadinessBlock::NoSourceOrContext);
    }

    if !completeness.can_generate_content {
        return Readiness::blocked(ReadinessBlock::KnowledgeBaseIncomplete {
            completion_percentage: completeness.completion_percentage,
            missing_fields: completeness.missing_fields.clone(),
        });
    }

    Readiness::allowed()
}

// ---------------------------------------------------------------------------
// GenerationParams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSource {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub value: String,
}

/// Parameters for the remote generation call, built from a selection that
/// passed the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub client: String,
    pub category: ContentCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<GenerationSource>,
    pub objective: String,
    pub context: String,
    pub use_knowledge_base: bool,
}

impl GenerationParams {
    /// Re-run the gate and build call parameters. Returns the blocking reason
    /// when the selection is not ready.
    pub fn from_selection(
        selection: &GenerationSelection,
        completeness: &CompletenessResult,
    ) -> std::result::Result<Self, ReadinessBlock> {
        let readiness = can_proceed(selection, completeness);
        if let Some(reason) = readiness.reason {
            return Err(reason);
        }

        // The gate has validated both of these.
        let client = selection.client_id.clone().unwrap_or_default();
        let category = selection
            .content_category
            .as_deref()
            .and_then(|c| c.parse().ok())
            .ok_or(ReadinessBlock::NoCategorySelected)?;

        let source = selection
            .source_type
            .filter(|t| !t.is_text() && has_text(&selection.source_value))
            .map(|source_type| GenerationSource {
                source_type,
                value: selection.source_value.trim().to_string(),
            });

        Ok(Self {
            client: client.trim().to_string(),
            category,
            source,
            objective: selection.objective.trim().to_string(),
            context: selection.context_text.trim().to_string(),
            use_knowledge_base: true,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completeness::score;
    use crate::knowledge::KnowledgeBase;

    fn complete() -> CompletenessResult {
        let mut kb = KnowledgeBase::default();
        kb.positioning.value_proposition = "v".into();
        kb.positioning.differentiators.push("d".into());
        kb.positioning.words_we_use.push("w".into());
        kb.positioning.banned_words.push("b".into());
        kb.business.sector = "s".into();
        kb.business.market = "m".into();
        kb.business.category_maturity = "c".into();
        kb.seo.main_keywords.push("k".into());
        let r = score(Some(&kb));
        assert!(r.can_generate_content);
        r
    }

    fn valid_selection() -> GenerationSelection {
        GenerationSelection {
            client_id: Some("acme".into()),
            content_category: Some("blog".into()),
            source_type: Some(SourceType::Text),
            source_value: String::new(),
            context_text: "Launch of our autumn menu".into(),
            objective: "Drive reservations".into(),
        }
    }

    #[test]
    fn valid_selection_is_allowed() {
        let r = can_proceed(&valid_selection(), &complete());
        assert!(r.allowed);
        assert!(r.reason.is_none());
    }

    #[test]
    fn missing_client_wins_over_everything() {
        let sel = GenerationSelection {
            client_id: None,
            ..Default::default()
        };
        let r = can_proceed(&sel, &score(None));
        assert!(!r.allowed);
        assert_eq!(r.reason, Some(ReadinessBlock::NoClientSelected));

        let sel = GenerationSelection {
            client_id: None,
            ..valid_selection()
        };
        let r = can_proceed(&sel, &complete());
        assert_eq!(r.reason, Some(ReadinessBlock::NoClientSelected));
    }

    #[test]
    fn blank_client_counts_as_unset() {
        let sel = GenerationSelection {
            client_id: Some("  ".into()),
            ..valid_selection()
        };
        assert_eq!(
            can_proceed(&sel, &complete()).reason,
            Some(ReadinessBlock::NoClientSelected)
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        for category in [None, Some("podcast".to_string()), Some(String::new())] {
            let sel = GenerationSelection {
                content_category: category,
                ..valid_selection()
            };
            assert_eq!(
                can_proceed(&sel, &complete()).reason,
                Some(ReadinessBlock::NoCategorySelected)
            );
        }
    }

    #[test]
    fn camel_case_script_categories_are_allowed() {
        for category in ["scriptShort", "scriptYoutube", "script_short"] {
            let sel = GenerationSelection {
                content_category: Some(category.into()),
                ..valid_selection()
            };
            assert!(can_proceed(&sel, &complete()).allowed, "{category}");
        }
    }

    #[test]
    fn news_source_without_value_needs_context() {
        let sel = GenerationSelection {
            source_type: Some(SourceType::News),
            source_value: "  ".into(),
            context_text: "".into(),
            ..valid_selection()
        };
        assert_eq!(
            can_proceed(&sel, &complete()).reason,
            Some(ReadinessBlock::NoSourceOrContext)
        );
    }

    #[test]
    fn text_source_value_is_not_a_source() {
        let sel = GenerationSelection {
            source_type: Some(SourceType::Text),
            source_value: "typed into the source box".into(),
            context_text: "".into(),
            ..valid_selection()
        };
        assert_eq!(
            can_proceed(&sel, &complete()).reason,
            Some(ReadinessBlock::NoSourceOrContext)
        );
    }

    #[test]
    fn trend_source_alone_is_enough() {
        let sel = GenerationSelection {
            source_type: Some(SourceType::Trend),
            source_value: "trend-42".into(),
            context_text: "".into(),
            ..valid_selection()
        };
        assert!(can_proceed(&sel, &complete()).allowed);
    }

    #[test]
    fn incomplete_knowledge_base_carries_details() {
        let r = can_proceed(&valid_selection(), &score(None));
        match r.reason {
            Some(ReadinessBlock::KnowledgeBaseIncomplete {
                completion_percentage,
                missing_fields,
            }) => {
                assert_eq!(completion_percentage, 0);
                assert_eq!(missing_fields.len(), 15);
            }
            other => panic!("unexpected reason: {other:?}"),
        }
    }

    #[test]
    fn gate_reflects_current_state_only() {
        let sel = valid_selection();
        assert!(can_proceed(&sel, &complete()).allowed);
        assert!(!can_proceed(&sel, &score(None)).allowed);
        assert!(can_proceed(&sel, &complete()).allowed);
    }

    #[test]
    fn block_messages_are_specific() {
        let msg = ReadinessBlock::KnowledgeBaseIncomplete {
            completion_percentage: 27,
            missing_fields: vec!["Sector".into(), "Market".into()],
        }
        .message();
        assert!(msg.contains("27%"));
        assert!(msg.contains("Sector, Market"));
        assert!(ReadinessBlock::NoClientSelected.message().contains("client"));
    }

    #[test]
    fn readiness_json_is_tagged() {
        let r = can_proceed(&GenerationSelection::default(), &score(None));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["allowed"], false);
        assert_eq!(json["reason"]["kind"], "no_client_selected");

        let ok = can_proceed(&valid_selection(), &complete());
        let json = serde_json::to_value(&ok).unwrap();
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn params_from_allowed_selection() {
        let sel = GenerationSelection {
            source_type: Some(SourceType::News),
            source_value: " news-7 ".into(),
            ..valid_selection()
        };
        let params = GenerationParams::from_selection(&sel, &complete()).unwrap();
        assert_eq!(params.client, "acme");
        assert_eq!(params.category, ContentCategory::Blog);
        assert_eq!(
            params.source,
            Some(GenerationSource {
                source_type: SourceType::News,
                value: "news-7".into(),
            })
        );
        assert_eq!(params.objective, "Drive reservations");
        assert!(params.use_knowledge_base);
    }

    #[test]
    fn params_from_blocked_selection_returns_reason() {
        let err = GenerationParams::from_selection(&valid_selection(), &score(None)).unwrap_err();
        assert_eq!(err.as_str(), "knowledge_base_incomplete");
    }
}
