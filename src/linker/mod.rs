//! Linker module: classifies harvested ads and attaches book metadata
//!
//! This runs as a separate pass over the persisted results:
//! - `classify`: pure URL rules (lead-gen, marketplace product, unknown)
//! - `catalog`: local lookup table from configuration
//! - `lookup`: best-effort external bibliographic lookup
//! - `prompt`: the manual entry boundary for URLs no rule recognizes
//!
//! Linking is idempotent on ad id: an ad already present in the linked
//! document is never reprocessed, re-prompted or duplicated.

mod catalog;
mod classify;
mod lookup;
mod prompt;

pub use catalog::BookCatalog;
pub use classify::{UrlKind, UrlRules};
pub use lookup::BookLookup;
pub use prompt::{
    stdin_prompt, AdContext, LinePrompt, ManualDecision, ManualEntry, RecordedAnswers,
    SkipUnknown,
};

use crate::config::{Config, FreebieConfig};
use crate::model::{BookMetadata, CampaignRecord, Category, LinkedEntry};
use crate::storage::{read_json_or_default, write_json_atomic};
use crate::HarvestError;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Maps a URL to a category and, where possible, book metadata
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: UrlRules,
    catalog: BookCatalog,
    freebie: BookMetadata,
    lookup: Option<BookLookup>,
}

impl Classifier {
    pub fn new(
        rules: UrlRules,
        catalog: BookCatalog,
        freebie: &FreebieConfig,
        lookup: Option<BookLookup>,
    ) -> Self {
        Self {
            rules,
            catalog,
            freebie: BookMetadata {
                title: freebie.title.clone(),
                asin: None,
                blurb: Some(freebie.blurb.clone()),
                cover_url: freebie.cover_url.clone(),
            },
            lookup,
        }
    }

    /// Builds a classifier from configuration; an empty `lookup-url`
    /// disables the external lookup
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let linker = &config.linker;
        let lookup = if linker.lookup_url.is_empty() {
            None
        } else {
            Some(BookLookup::new(&linker.lookup_url)?)
        };

        Ok(Self::new(
            UrlRules::from_config(linker),
            BookCatalog::from_entries(&config.catalog),
            &linker.freebie,
            lookup,
        ))
    }

    /// Classifies a URL
    ///
    /// Never prompts. Product pages resolve metadata from the local
    /// catalog first, then the external lookup; a failed or empty lookup
    /// yields a placeholder titled "Unknown".
    pub async fn classify(&self, url: &str) -> (Category, Option<BookMetadata>) {
        match self.rules.categorize(url) {
            UrlKind::LeadGen => (Category::LeadGen, Some(self.freebie.clone())),
            UrlKind::Product { asin } => (Category::Sale, Some(self.product_metadata(&asin).await)),
            UrlKind::Unknown => (Category::Unknown, None),
        }
    }

    async fn product_metadata(&self, asin: &str) -> BookMetadata {
        if let Some(book) = self.catalog.get(asin) {
            return book.clone();
        }

        let Some(lookup) = &self.lookup else {
            return BookMetadata::unknown(asin);
        };

        match lookup.lookup(asin).await {
            Ok(Some(book)) => {
                tracing::info!("Lookup matched {} → {}", asin, book.title);
                book
            }
            Ok(None) => {
                tracing::warn!("Lookup found nothing for {}", asin);
                BookMetadata::unknown(asin)
            }
            Err(e) => {
                tracing::warn!("Lookup failed for {}: {}", asin, e);
                BookMetadata::unknown(asin)
            }
        }
    }
}

/// Counters for one linking pass
#[derive(Debug, Clone, Default)]
pub struct LinkReport {
    pub linked: usize,
    pub already_linked: usize,
    pub skipped: usize,
    pub by_category: HashMap<Category, usize>,
}

/// Linking pass over harvested campaigns
pub struct Linker<M: ManualEntry> {
    classifier: Classifier,
    manual: M,
    linked_path: PathBuf,
}

impl<M: ManualEntry> Linker<M> {
    pub fn new(classifier: Classifier, manual: M, linked_path: impl Into<PathBuf>) -> Self {
        Self {
            classifier,
            manual,
            linked_path: linked_path.into(),
        }
    }

    pub fn manual(&self) -> &M {
        &self.manual
    }

    /// Links every ad not yet present in `linked`
    ///
    /// The linked document is rewritten after each new entry.
    pub async fn link_all(
        &mut self,
        results: &[CampaignRecord],
        linked: &mut Vec<LinkedEntry>,
    ) -> Result<LinkReport, HarvestError> {
        let mut seen: HashSet<String> = linked.iter().map(|e| e.ad_id.clone()).collect();
        let mut report = LinkReport::default();

        for campaign in results {
            tracing::info!("Campaign: {}", campaign.name);

            for adset in &campaign.adsets {
                for ad in &adset.ads {
                    if seen.contains(&ad.id) {
                        tracing::debug!("Already linked: {} ({})", ad.name, ad.id);
                        report.already_linked += 1;
                        continue;
                    }

                    let (category, metadata) = match ad.target_url.as_deref() {
                        Some(url) => self.classifier.classify(url).await,
                        None => (Category::Unknown, None),
                    };

                    let (category, metadata) = match (category, metadata) {
                        (category, Some(metadata)) => (category, metadata),
                        (_, None) => {
                            let context = AdContext {
                                campaign_name: &campaign.name,
                                ad_id: &ad.id,
                                ad_name: &ad.name,
                                target_url: ad.target_url.as_deref(),
                            };
                            match self.manual.request(&context)? {
                                ManualDecision::Link(metadata) => (Category::Manual, metadata),
                                ManualDecision::Skip => {
                                    report.skipped += 1;
                                    continue;
                                }
                            }
                        }
                    };

                    tracing::info!("Linked {} → {} [{}]", ad.name, metadata.title, category);
                    linked.push(LinkedEntry {
                        campaign_id: campaign.campaign_id.clone(),
                        campaign_name: campaign.name.clone(),
                        adset_id: adset.adset_id.clone(),
                        adset_name: adset.name.clone(),
                        ad_id: ad.id.clone(),
                        ad_name: ad.name.clone(),
                        target_url: ad.target_url.clone(),
                        category,
                        book_title: metadata.title,
                        asin: metadata.asin,
                        blurb: metadata.blurb,
                        cover_url: metadata.cover_url,
                    });
                    seen.insert(ad.id.clone());
                    write_json_atomic(&self.linked_path, linked.as_slice())?;

                    report.linked += 1;
                    *report.by_category.entry(category).or_default() += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Runs the linking pass over the persisted results
///
/// With `interactive` false, unclassified ads are skipped rather than
/// prompted for.
pub async fn run_linking(config: &Config, interactive: bool) -> Result<LinkReport, HarvestError> {
    let results: Vec<CampaignRecord> =
        read_json_or_default(Path::new(&config.output.results_path))?;
    if results.is_empty() {
        tracing::warn!(
            "No harvested campaigns in {}; run a harvest first",
            config.output.results_path
        );
        return Ok(LinkReport::default());
    }

    let linked_path = Path::new(&config.output.linked_path);
    let mut linked: Vec<LinkedEntry> = read_json_or_default(linked_path)?;
    tracing::info!("{} ads already linked", linked.len());

    let classifier = Classifier::from_config(config)?;

    let report = if interactive {
        println!(
            "Type '{}' as the title to skip an ad.",
            config.linker.skip_keyword
        );
        let prompt = stdin_prompt(&config.linker.skip_keyword);
        Linker::new(classifier, prompt, linked_path)
            .link_all(&results, &mut linked)
            .await?
    } else {
        Linker::new(classifier, SkipUnknown, linked_path)
            .link_all(&results, &mut linked)
            .await?
    };

    tracing::info!(
        "Linking done: {} new, {} already linked, {} skipped",
        report.linked,
        report.already_linked,
        report.skipped
    );
    Ok(report)
}
