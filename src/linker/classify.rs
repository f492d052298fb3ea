//! URL classification
//!
//! Pure rules only: no I/O, no prompting. Metadata resolution happens in
//! [`Classifier`](crate::linker::Classifier).

use crate::config::LinkerConfig;
use crate::url::{extract_asin, extract_host, host_matches_any};
use url::Url;

/// What a destination URL points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlKind {
    /// Newsletter or reader-magnet landing page
    LeadGen,

    /// Marketplace product page with its identifier
    Product { asin: String },

    Unknown,
}

/// Rule set built from configuration
#[derive(Debug, Clone)]
pub struct UrlRules {
    lead_gen_markers: Vec<String>,
    marketplace_domains: Vec<String>,
}

impl UrlRules {
    pub fn new(lead_gen_markers: Vec<String>, marketplace_domains: Vec<String>) -> Self {
        Self {
            lead_gen_markers: lead_gen_markers
                .into_iter()
                .map(|m| m.to_lowercase())
                .collect(),
            marketplace_domains,
        }
    }

    pub fn from_config(config: &LinkerConfig) -> Self {
        Self::new(
            config.lead_gen_markers.clone(),
            config.marketplace_domains.clone(),
        )
    }

    /// Applies the rules in order: lead-gen marker, marketplace product, unknown
    pub fn categorize(&self, url: &str) -> UrlKind {
        let haystack = host_and_path(url);

        if self
            .lead_gen_markers
            .iter()
            .any(|marker| haystack.contains(marker.as_str()))
        {
            return UrlKind::LeadGen;
        }

        if let Some(host) = extract_host(url) {
            if host_matches_any(&host, &self.marketplace_domains) {
                if let Some(asin) = extract_asin(url) {
                    return UrlKind::Product { asin };
                }
            }
        }

        UrlKind::Unknown
    }
}

/// Lowercase host followed by path; user info, query and fragment are left out
fn host_and_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => format!(
            "{}{}",
            parsed.host_str().unwrap_or_default(),
            parsed.path()
        )
        .to_lowercase(),
        Err(_) => {
            let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
            let rest = rest.split(['?', '#']).next().unwrap_or_default();
            let rest = rest.rsplit_once('@').map(|(_, host)| host).unwrap_or(rest);
            rest.to_lowercase()
        }
    }
}

impl Default for UrlRules {
    fn default() -> Self {
        Self::from_config(&LinkerConfig::default())
    }
}
