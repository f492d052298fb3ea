//! Raw per-ad delivery metrics
//!
//! Walks the committed results and stores the first insights row of each
//! ad as-is. No metric is computed here.

use crate::config::Config;
use crate::crawler::fetcher::GraphClient;
use crate::model::{CampaignRecord, Page};
use crate::storage::{read_json_or_default, write_json_atomic};
use crate::HarvestError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

pub const INSIGHT_FIELDS: &str = "impressions,clicks,spend,cpc,ctr,actions";
pub const DATE_PRESET: &str = "last_30d";

/// Insights row for one ad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdInsights {
    pub campaign_name: String,
    pub campaign_id: String,
    pub adset_name: String,
    pub adset_id: String,
    pub ad_name: String,
    pub ad_id: String,
    pub metrics: Value,
}

/// Fetches insights for every ad in `results`, pausing `delay` between ads
///
/// Ads with no insights rows are left out.
pub async fn collect_insights(
    client: &GraphClient,
    results: &[CampaignRecord],
    delay: Duration,
) -> Result<Vec<AdInsights>, HarvestError> {
    let mut rows = Vec::new();
    let mut first = true;

    for campaign in results {
        tracing::info!("Campaign: {} ({})", campaign.name, campaign.campaign_id);

        for adset in &campaign.adsets {
            for ad in &adset.ads {
                if !first && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                first = false;

                tracing::debug!("Fetching insights for ad {} ({})", ad.name, ad.id);
                let body = client
                    .get(
                        &format!("{}/insights", ad.id),
                        &[
                            ("fields", INSIGHT_FIELDS.to_string()),
                            ("date_preset", DATE_PRESET.to_string()),
                        ],
                    )
                    .await?;

                let page: Page<Value> = match serde_json::from_value(body) {
                    Ok(page) => page,
                    Err(e) => {
                        tracing::warn!("Unexpected insights shape for ad {}: {}", ad.id, e);
                        continue;
                    }
                };

                if let Some(metrics) = page.data.into_iter().next() {
                    rows.push(AdInsights {
                        campaign_name: campaign.name.clone(),
                        campaign_id: campaign.campaign_id.clone(),
                        adset_name: adset.name.clone(),
                        adset_id: adset.adset_id.clone(),
                        ad_name: ad.name.clone(),
                        ad_id: ad.id.clone(),
                        metrics,
                    });
                }
            }
        }
    }

    Ok(rows)
}

/// Runs the insights pass over the persisted results and writes the output
///
/// Returns the number of ads with insights.
pub async fn run_insights(config: &Config) -> Result<usize, HarvestError> {
    let results: Vec<CampaignRecord> =
        read_json_or_default(Path::new(&config.output.results_path))?;
    if results.is_empty() {
        tracing::warn!(
            "No harvested campaigns in {}; run a harvest first",
            config.output.results_path
        );
        return Ok(0);
    }

    let client = GraphClient::new(&config.api, &config.retry)?;
    let delay = Duration::from_millis(config.crawler.adset_delay_ms);
    let rows = collect_insights(&client, &results, delay).await?;

    write_json_atomic(Path::new(&config.output.insights_path), &rows)?;
    tracing::info!(
        "Saved insights for {} ads to {}",
        rows.len(),
        config.output.insights_path
    );

    Ok(rows.len())
}
