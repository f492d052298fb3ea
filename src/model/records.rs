//! Persisted output tree and resume cursor

use crate::model::{Ad, AdSet, Campaign, Creative};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which fallback rule produced an ad's target URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrlSource {
    #[serde(rename = "link_data.link")]
    StoryLink,

    #[serde(rename = "child_attachments.link")]
    ChildAttachment,

    #[serde(rename = "call_to_action.value.link")]
    CallToAction,

    #[serde(rename = "object_url")]
    ObjectUrl,

    /// Creative present but no rule matched
    #[serde(rename = "none")]
    None,

    /// Ad carries no creative reference
    #[serde(rename = "no_creative")]
    NoCreative,
}

impl UrlSource {
    pub const ALL: [UrlSource; 6] = [
        Self::StoryLink,
        Self::ChildAttachment,
        Self::CallToAction,
        Self::ObjectUrl,
        Self::None,
        Self::NoCreative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StoryLink => "link_data.link",
            Self::ChildAttachment => "child_attachments.link",
            Self::CallToAction => "call_to_action.value.link",
            Self::ObjectUrl => "object_url",
            Self::None => "none",
            Self::NoCreative => "no_creative",
        }
    }

    /// Returns true if a target URL was produced
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::None | Self::NoCreative)
    }
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One harvested campaign with its live subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub campaign_id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub adsets: Vec<AdSetRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdSetRecord {
    pub adset_id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub ads: Vec<AdRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative: Option<Creative>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default = "default_url_source")]
    pub url_source: UrlSource,
}

fn default_url_source() -> UrlSource {
    UrlSource::None
}

impl CampaignRecord {
    pub fn new(campaign: &Campaign) -> Self {
        Self {
            campaign_id: campaign.id.clone(),
            name: campaign.name.clone(),
            status: campaign.status.clone(),
            adsets: Vec::new(),
        }
    }

    pub fn ad_count(&self) -> usize {
        self.adsets.iter().map(|a| a.ads.len()).sum()
    }
}

impl AdSetRecord {
    pub fn new(adset: &AdSet) -> Self {
        Self {
            adset_id: adset.id.clone(),
            name: adset.name.clone(),
            status: adset.status.clone(),
            ads: Vec::new(),
        }
    }
}

impl AdRecord {
    /// Builds a record before resolution; `url_source` starts as `NoCreative`
    /// or `None` depending on whether a creative reference exists
    pub fn new(ad: Ad) -> Self {
        let url_source = if ad.creative.is_some() {
            UrlSource::None
        } else {
            UrlSource::NoCreative
        };
        Self {
            id: ad.id,
            name: ad.name,
            status: ad.status,
            creative: ad.creative,
            target_url: None,
            url_source,
        }
    }
}

/// Marker of the last fully committed campaign
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeCursor {
    #[serde(alias = "last_campaign_id", default)]
    pub last_completed_campaign_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResumeCursor {
    pub fn at(campaign_id: &str) -> Self {
        Self {
            last_completed_campaign_id: Some(campaign_id.to_string()),
            updated_at: Some(Utc::now()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last_completed_campaign_id.is_none()
    }
}
