//! Crawler module for walking the remote ads hierarchy
//!
//! This module contains the core harvesting logic, including:
//! - Authenticated requests with rate-limit backoff
//! - Cursor pagination over listing endpoints
//! - Campaign → ad set → ad traversal with status filtering
//! - Creative resolution into canonical destination URLs
//! - Per-campaign checkpointing and resumption

mod backoff;
mod coordinator;
mod fetcher;
mod insights;
mod resolver;

pub use backoff::RetryPolicy;
pub use coordinator::{
    pending_campaigns, run_harvest, Coordinator, HarvestSummary, ResumePoint, AD_FIELDS,
    ADSET_FIELDS, CAMPAIGN_FIELDS,
};
pub use fetcher::{build_http_client, classify_response, empty_result, GraphClient, ResponseClass};
pub use insights::{collect_insights, run_insights, AdInsights, DATE_PRESET, INSIGHT_FIELDS};
pub use resolver::{resolve_ad, resolve_creative, Resolution, CREATIVE_FIELDS};

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete harvest operation
///
/// This is the main entry point for a harvest. It will:
/// 1. Load the checkpoint (or clear it when `fresh`)
/// 2. Enumerate live campaigns and pick the resume point
/// 3. Walk each pending campaign's ad sets and ads
/// 4. Resolve creatives into target URLs
/// 5. Commit each campaign and advance the cursor
pub async fn harvest(config: Config, fresh: bool) -> Result<HarvestSummary, HarvestError> {
    run_harvest(config, fresh).await
}
