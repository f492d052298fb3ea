use serde::{Deserialize, Serialize};
use std::fmt;

/// Content category assigned to a resolved URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Marketplace product page
    Sale,
    /// Newsletter or reader-magnet signup
    LeadGen,
    /// Metadata supplied by the operator
    Manual,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 4] = [Self::Sale, Self::LeadGen, Self::Manual, Self::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::LeadGen => "lead_gen",
            Self::Manual => "manual",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Book metadata attached to a linked ad
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub blurb: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl BookMetadata {
    /// Placeholder used when the external lookup fails
    pub fn unknown(asin: &str) -> Self {
        Self {
            title: "Unknown".to_string(),
            asin: Some(asin.to_string()),
            blurb: None,
            cover_url: None,
        }
    }
}

/// One classified ad, keyed by `ad_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedEntry {
    pub campaign_id: String,
    pub campaign_name: String,
    pub adset_id: String,
    pub adset_name: String,
    pub ad_id: String,
    pub ad_name: String,
    #[serde(default)]
    pub target_url: Option<String>,
    pub category: Category,
    pub book_title: String,
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub blurb: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
}
