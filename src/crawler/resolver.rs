//! Creative resolver
//!
//! Turns an ad's creative into one canonical destination URL. Rules are
//! tried in priority order and the first match wins:
//!
//! 1. `object_story_spec.link_data.link`
//! 2. first `link` among `link_data.child_attachments`
//! 3. `call_to_action.value.link`
//! 4. creative-level `object_url`

use crate::crawler::fetcher::GraphClient;
use crate::model::{AdRecord, Creative, UrlSource};
use crate::url::canonical_url;
use crate::HarvestError;

/// Fields requested when a creative has to be fetched on its own
pub const CREATIVE_FIELDS: &str = "id,object_story_spec,object_url";

/// Outcome of resolving one creative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target_url: Option<String>,
    pub url_source: UrlSource,
}

impl Resolution {
    fn found(raw: &str, url_source: UrlSource) -> Self {
        Self {
            target_url: Some(canonical_url(raw)),
            url_source,
        }
    }

    fn none() -> Self {
        Self {
            target_url: None,
            url_source: UrlSource::None,
        }
    }

    pub fn no_creative() -> Self {
        Self {
            target_url: None,
            url_source: UrlSource::NoCreative,
        }
    }
}

/// Applies the fallback chain to a creative payload
pub fn resolve_creative(creative: &Creative) -> Resolution {
    if let Some(link) = creative.story_link() {
        return Resolution::found(link, UrlSource::StoryLink);
    }
    if let Some(link) = creative.first_child_attachment_link() {
        return Resolution::found(link, UrlSource::ChildAttachment);
    }
    if let Some(link) = creative.call_to_action_link() {
        return Resolution::found(link, UrlSource::CallToAction);
    }
    if let Some(link) = creative.fallback_object_url() {
        return Resolution::found(link, UrlSource::ObjectUrl);
    }
    Resolution::none()
}

/// Resolves an ad record in place
///
/// Ads without a creative reference are tagged `no_creative` without any
/// request. A bare reference (id only) is fetched first so the chain sees
/// the full payload.
pub async fn resolve_ad(client: &GraphClient, ad: &mut AdRecord) -> Result<(), HarvestError> {
    let Some(creative) = ad.creative.as_ref() else {
        apply(ad, Resolution::no_creative());
        return Ok(());
    };

    if !creative.has_payload() {
        if let Some(id) = creative.id.clone() {
            match client.get_object::<Creative>(&id, CREATIVE_FIELDS).await? {
                Some(fetched) => ad.creative = Some(fetched),
                None => tracing::debug!("Creative {} for ad {} returned no data", id, ad.id),
            }
        }
    }

    let resolution = ad
        .creative
        .as_ref()
        .map(resolve_creative)
        .unwrap_or_else(Resolution::no_creative);
    apply(ad, resolution);
    Ok(())
}

fn apply(ad: &mut AdRecord, resolution: Resolution) {
    match &resolution.target_url {
        Some(url) => tracing::debug!("Ad {} → {} ({})", ad.id, url, resolution.url_source),
        None => tracing::debug!("Ad {} has no target URL ({})", ad.id, resolution.url_source),
    }
    ad.target_url = resolution.target_url;
    ad.url_source = resolution.url_source;
}
