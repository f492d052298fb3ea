//! Statistics over the persisted harvest documents
//!
//! Reads the results and linked documents and reports counts; nothing is
//! fetched from the remote API.

use crate::config::OutputConfig;
use crate::model::{CampaignRecord, Category, LinkedEntry, UrlSource};
use crate::storage::read_json_or_default;
use crate::HarvestError;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Harvest statistics summary
#[derive(Debug, Clone, Default)]
pub struct HarvestStatistics {
    /// Number of committed campaigns
    pub campaigns: usize,

    pub adsets: usize,

    pub ads: usize,

    /// Count of ads by the rule that produced their destination URL
    pub ads_by_source: HashMap<UrlSource, usize>,

    /// Number of entries in the linked document
    pub linked: usize,

    /// Count of linked entries by category
    pub linked_by_category: HashMap<Category, usize>,

    /// Ads present in the results but not yet linked
    pub unlinked: usize,
}

impl HarvestStatistics {
    /// Computes statistics from in-memory documents
    pub fn from_documents(results: &[CampaignRecord], linked: &[LinkedEntry]) -> Self {
        let mut stats = Self {
            campaigns: results.len(),
            linked: linked.len(),
            ..Default::default()
        };

        for campaign in results {
            stats.adsets += campaign.adsets.len();
            for adset in &campaign.adsets {
                for ad in &adset.ads {
                    stats.ads += 1;
                    *stats.ads_by_source.entry(ad.url_source).or_default() += 1;
                }
            }
        }

        for entry in linked {
            *stats.linked_by_category.entry(entry.category).or_default() += 1;
        }

        let linked_ids: HashSet<&str> =
            linked.iter().map(|e| e.ad_id.as_str()).collect();
        stats.unlinked = results
            .iter()
            .flat_map(|c| &c.adsets)
            .flat_map(|s| &s.ads)
            .filter(|ad| !linked_ids.contains(ad.id.as_str()))
            .count();

        stats
    }

    /// Ads whose destination URL was resolved by one of the link rules
    pub fn resolved_ads(&self) -> usize {
        self.ads_by_source
            .iter()
            .filter(|(source, _)| source.is_resolved())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Loads statistics from the results and linked documents
///
/// Missing documents count as empty.
pub fn load_statistics(output: &OutputConfig) -> Result<HarvestStatistics, HarvestError> {
    let results: Vec<CampaignRecord> = read_json_or_default(Path::new(&output.results_path))?;
    let linked: Vec<LinkedEntry> = read_json_or_default(Path::new(&output.linked_path))?;
    Ok(HarvestStatistics::from_documents(&results, &linked))
}

fn percentage(count: usize, total: usize) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Campaigns: {}", stats.campaigns);
    println!("  Ad sets: {}", stats.adsets);
    println!("  Ads: {}", stats.ads);
    println!();

    println!("Ads by URL Source:");
    for source in UrlSource::ALL {
        let count = stats.ads_by_source.get(&source).copied().unwrap_or(0);
        if count > 0 {
            println!(
                "  {}: {} ({:.1}%)",
                source,
                count,
                percentage(count, stats.ads)
            );
        }
    }
    println!();

    if stats.linked > 0 {
        println!("Linked Entries by Category:");
        for category in Category::ALL {
            let count = stats.linked_by_category.get(&category).copied().unwrap_or(0);
            if count > 0 {
                println!("  {}: {}", category, count);
            }
        }
        println!();
    }

    println!(
        "Resolution Rate: {:.1}% ({} / {} ads with a destination URL)",
        percentage(stats.resolved_ads(), stats.ads),
        stats.resolved_ads(),
        stats.ads
    );
    println!(
        "Linked: {} ({} ads not yet linked)",
        stats.linked, stats.unlinked
    );
}
