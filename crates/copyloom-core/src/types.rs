use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ContentCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Post,
    Carousel,
    #[serde(alias = "scriptShort")]
    ScriptShort,
    #[serde(alias = "scriptYoutube")]
    ScriptYoutube,
    Blog,
    Email,
}

impl ContentCategory {
    pub fn all() -> &'static [ContentCategory] {
        &[
            ContentCategory::Post,
            ContentCategory::Carousel,
            ContentCategory::ScriptShort,
            ContentCategory::ScriptYoutube,
            ContentCategory::Blog,
            ContentCategory::Email,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentCategory::Post => "post",
            ContentCategory::Carousel => "carousel",
            ContentCategory::ScriptShort => "script_short",
            ContentCategory::ScriptYoutube => "script_youtube",
            ContentCategory::Blog => "blog",
            ContentCategory::Email => "email",
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentCategory {
    type Err = crate::error::CopyloomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(ContentCategory::Post),
            "carousel" => Ok(ContentCategory::Carousel),
            "script_short" | "scriptShort" => Ok(ContentCategory::ScriptShort),
            "script_youtube" | "scriptYoutube" => Ok(ContentCategory::ScriptYoutube),
            "blog" => Ok(ContentCategory::Blog),
            "email" => Ok(ContentCategory::Email),
            _ => Err(crate::error::CopyloomError::InvalidCategory(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SourceType
// ---------------------------------------------------------------------------

/// Where the generation input comes from. Everything except `Text` points at
/// an ingested item whose identifier travels in the source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Text,
    News,
    Trend,
    Url,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Text => "text",
            SourceType::News => "news",
            SourceType::Trend => "trend",
            SourceType::Url => "url",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, SourceType::Text)
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = crate::error::CopyloomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(SourceType::Text),
            "news" => Ok(SourceType::News),
            "trend" => Ok(SourceType::Trend),
            "url" => Ok(SourceType::Url),
            _ => Err(crate::error::CopyloomError::InvalidSourceType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Sender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
