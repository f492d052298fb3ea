//! Best-effort bibliographic lookup
//!
//! Treats a product identifier as a catalog number and queries a
//! volumes-search endpoint (`?q=isbn:<id>`). Callers degrade to a
//! placeholder record on any failure.

use crate::model::BookMetadata;
use crate::HarvestError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "imageLinks", default)]
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(rename = "smallThumbnail", default)]
    small_thumbnail: Option<String>,
}

/// Client for the bibliographic lookup service
#[derive(Debug, Clone)]
pub struct BookLookup {
    client: Client,
    endpoint: String,
}

impl BookLookup {
    pub fn new(endpoint: &str) -> Result<Self, HarvestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// Looks up a catalog number
    ///
    /// * `Ok(Some(_))` - a volume with a title was found
    /// * `Ok(None)` - the service answered but knows no such volume
    /// * `Err(_)` - transport or decoding failure
    pub async fn lookup(&self, catalog_number: &str) -> Result<Option<BookMetadata>, HarvestError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", format!("isbn:{}", catalog_number))])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(HarvestError::Lookup(format!(
                "{} returned HTTP {}",
                self.endpoint,
                response.status().as_u16()
            )));
        }

        let volumes: VolumesResponse = response.json().await?;
        let Some(info) = volumes.items.into_iter().map(|v| v.volume_info).next() else {
            return Ok(None);
        };

        let Some(title) = info.title.filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };

        let cover_url = info
            .image_links
            .and_then(|links| links.thumbnail.or(links.small_thumbnail));

        Ok(Some(BookMetadata {
            title,
            asin: Some(catalog_number.to_string()),
            blurb: info.description,
            cover_url,
        }))
    }
}
