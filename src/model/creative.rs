//! Typed creative payload
//!
//! A creative carries its destination link in one of several optional
//! nested shapes. Each shape gets a named accessor so the fallback chain in
//! the resolver is checked by the compiler instead of by string keys.

use serde::{Deserialize, Serialize};

/// Creative attached to an ad
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Creative {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_story_spec: Option<StorySpec>,

    /// Creative-level fallback destination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_url: Option<String>,
}

/// Primary story specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_data: Option<LinkData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_data: Option<VideoData>,
}

/// Link-ad story shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Carousel cards
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_attachments: Vec<ChildAttachment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<CallToAction>,
}

/// Video-ad story shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<CallToAction>,
}

/// Single carousel card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallToAction {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CallToActionValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallToActionValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl Creative {
    fn link_data(&self) -> Option<&LinkData> {
        self.object_story_spec.as_ref()?.link_data.as_ref()
    }

    /// Direct link on the primary story specification
    pub fn story_link(&self) -> Option<&str> {
        non_empty(self.link_data()?.link.as_ref())
    }

    /// First non-empty link among the carousel cards
    pub fn first_child_attachment_link(&self) -> Option<&str> {
        self.link_data()?
            .child_attachments
            .iter()
            .find_map(|card| non_empty(card.link.as_ref()))
    }

    /// Link inside a call-to-action value, link story first, then video story
    pub fn call_to_action_link(&self) -> Option<&str> {
        let spec = self.object_story_spec.as_ref()?;
        let from_link = spec
            .link_data
            .as_ref()
            .and_then(|d| d.call_to_action.as_ref());
        let from_video = spec
            .video_data
            .as_ref()
            .and_then(|d| d.call_to_action.as_ref());

        [from_link, from_video]
            .into_iter()
            .flatten()
            .find_map(|cta| non_empty(cta.value.as_ref()?.link.as_ref()))
    }

    /// Creative-level fallback object URL
    pub fn fallback_object_url(&self) -> Option<&str> {
        non_empty(self.object_url.as_ref())
    }

    /// Returns true if the payload carries any shape beyond the bare id
    pub fn has_payload(&self) -> bool {
        self.object_story_spec.is_some() || self.object_url.is_some()
    }
}
