//! Harvest coordinator - hierarchy walk orchestration
//!
//! This module contains the main harvest loop, which:
//! - Loads the checkpoint and decides where to resume
//! - Enumerates live campaigns, then their live ad sets, then their live ads
//! - Resolves each ad's creative to a destination URL
//! - Commits each finished campaign and advances the resume cursor
//!
//! Execution is strictly sequential. The only waits are the retry backoff
//! inside the client and the pause between ad set fetches.

use crate::config::Config;
use crate::crawler::fetcher::GraphClient;
use crate::crawler::resolver::resolve_ad;
use crate::model::{
    Ad, AdRecord, AdSet, AdSetRecord, Campaign, CampaignRecord, ResumeCursor,
};
use crate::storage::CheckpointStore;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;

pub const CAMPAIGN_FIELDS: &str = "id,name,status,effective_status";
pub const ADSET_FIELDS: &str = "id,name,status";
pub const AD_FIELDS: &str = "id,name,status,creative{id,object_story_spec,object_url}";

/// Where a run picks up relative to the live campaign list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePoint {
    /// No cursor: every live campaign is processed
    Start,

    /// Cursor found at this index; processing starts right after it
    After(usize),

    /// Cursor id is not among the live campaigns; campaigns already in the
    /// accumulated results are skipped instead
    CursorMissing,
}

/// Campaigns still to process, in listing order
pub fn pending_campaigns<'a>(
    campaigns: &'a [Campaign],
    cursor: &ResumeCursor,
    committed: &[CampaignRecord],
) -> (ResumePoint, Vec<&'a Campaign>) {
    let Some(last_id) = cursor.last_completed_campaign_id.as_deref() else {
        return (ResumePoint::Start, campaigns.iter().collect());
    };

    if let Some(index) = campaigns.iter().position(|c| c.id == last_id) {
        return (
            ResumePoint::After(index),
            campaigns[index + 1..].iter().collect(),
        );
    }

    let done: HashSet<&str> = committed.iter().map(|c| c.campaign_id.as_str()).collect();
    let pending = campaigns
        .iter()
        .filter(|c| !done.contains(c.id.as_str()))
        .collect();
    (ResumePoint::CursorMissing, pending)
}

/// Outcome of one harvest run
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub resume_point: ResumePoint,
    pub live_campaigns: usize,
    pub campaigns_skipped: usize,
    pub campaigns_processed: usize,
    pub adsets_processed: usize,
    pub ads_processed: usize,
    pub ads_resolved: usize,
}

/// Main harvest coordinator
pub struct Coordinator<S: CheckpointStore> {
    config: Config,
    client: GraphClient,
    store: S,
    results: Vec<CampaignRecord>,
    cursor: ResumeCursor,
}

impl<S: CheckpointStore> Coordinator<S> {
    /// Creates a coordinator, loading (or clearing, when `fresh`) the checkpoint
    pub fn new(config: Config, mut store: S, fresh: bool) -> Result<Self, HarvestError> {
        let client = GraphClient::new(&config.api, &config.retry)?;

        let checkpoint = if fresh {
            tracing::info!("Fresh harvest requested, discarding previous checkpoint");
            store.clear()?;
            Default::default()
        } else {
            store.load()?
        };

        match &checkpoint.cursor.last_completed_campaign_id {
            Some(id) => tracing::info!(
                "Loaded checkpoint: {} campaigns committed, last completed {}",
                checkpoint.results.len(),
                id
            ),
            None => tracing::info!("No resume cursor, starting from the first campaign"),
        }

        Ok(Self {
            config,
            client,
            store,
            results: checkpoint.results,
            cursor: checkpoint.cursor,
        })
    }

    pub fn results(&self) -> &[CampaignRecord] {
        &self.results
    }

    pub fn cursor(&self) -> &ResumeCursor {
        &self.cursor
    }

    fn is_live(&self, status: &str) -> bool {
        status == self.config.crawler.live_status
    }

    /// Runs the walk to completion
    ///
    /// Returns early only on fatal errors (retry exhaustion, storage
    /// failures); everything committed before that point stays on disk.
    pub async fn run(&mut self) -> Result<HarvestSummary, HarvestError> {
        let started_at = Utc::now();

        tracing::info!("Fetching campaigns for {}", self.config.api.account_path());
        let campaigns: Vec<Campaign> = self
            .fetch_campaigns()
            .await?
            .into_iter()
            .filter(|c| self.is_live(&c.status))
            .collect();
        tracing::info!(
            "{} live campaigns (status {})",
            campaigns.len(),
            self.config.crawler.live_status
        );

        let (resume_point, pending) = pending_campaigns(&campaigns, &self.cursor, &self.results);
        match resume_point {
            ResumePoint::Start => {}
            ResumePoint::After(index) => {
                tracing::info!("Resuming after campaign #{} of {}", index + 1, campaigns.len())
            }
            ResumePoint::CursorMissing => tracing::warn!(
                "Resume cursor {:?} is not among the live campaigns; skipping the {} campaigns already committed instead",
                self.cursor.last_completed_campaign_id,
                self.results.len()
            ),
        }

        let mut summary = HarvestSummary {
            started_at,
            finished_at: started_at,
            resume_point,
            live_campaigns: campaigns.len(),
            campaigns_skipped: campaigns.len() - pending.len(),
            campaigns_processed: 0,
            adsets_processed: 0,
            ads_processed: 0,
            ads_resolved: 0,
        };

        for campaign in pending {
            tracing::info!(
                "[{}] START: {} ({})",
                Utc::now().to_rfc3339(),
                campaign.name,
                campaign.id
            );

            let record = self.process_campaign(campaign).await?;

            summary.campaigns_processed += 1;
            summary.adsets_processed += record.adsets.len();
            summary.ads_processed += record.ad_count();
            summary.ads_resolved += record
                .adsets
                .iter()
                .flat_map(|s| s.ads.iter())
                .filter(|a| a.target_url.is_some())
                .count();

            let (adsets, ads) = (record.adsets.len(), record.ad_count());
            self.commit(record)?;

            tracing::info!(
                "[{}] FINISHED: {} ({}) - {} ad sets, {} ads",
                Utc::now().to_rfc3339(),
                campaign.name,
                campaign.id,
                adsets,
                ads
            );
        }

        summary.finished_at = Utc::now();
        tracing::info!(
            "All campaigns processed: {} new, {} skipped",
            summary.campaigns_processed,
            summary.campaigns_skipped
        );

        Ok(summary)
    }

    /// Walks one campaign's live ad sets and ads
    async fn process_campaign(&self, campaign: &Campaign) -> Result<CampaignRecord, HarvestError> {
        let mut record = CampaignRecord::new(campaign);
        let delay = Duration::from_millis(self.config.crawler.adset_delay_ms);

        let adsets: Vec<AdSet> = self
            .fetch_adsets(&campaign.id)
            .await?
            .into_iter()
            .filter(|s| self.is_live(&s.status))
            .collect();

        for (index, adset) in adsets.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let mut adset_record = AdSetRecord::new(adset);
            let ads = self.fetch_ads(&adset.id).await?;

            for ad in ads.into_iter().filter(|a| self.is_live(&a.status)) {
                let mut ad_record = AdRecord::new(ad);
                if self.config.crawler.resolve_creatives {
                    resolve_ad(&self.client, &mut ad_record).await?;
                }
                adset_record.ads.push(ad_record);
            }

            tracing::debug!(
                "Ad set {} ({}): {} live ads",
                adset.name,
                adset.id,
                adset_record.ads.len()
            );
            record.adsets.push(adset_record);
        }

        Ok(record)
    }

    /// Appends (or replaces) a campaign subtree and advances the cursor
    fn commit(&mut self, record: CampaignRecord) -> Result<(), HarvestError> {
        let cursor = ResumeCursor::at(&record.campaign_id);

        match self
            .results
            .iter_mut()
            .find(|existing| existing.campaign_id == record.campaign_id)
        {
            Some(existing) => {
                tracing::debug!("Replacing committed subtree for {}", record.campaign_id);
                *existing = record;
            }
            None => self.results.push(record),
        }

        self.store.save(&self.results, &cursor)?;
        self.cursor = cursor;
        Ok(())
    }

    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, HarvestError> {
        let path = format!("{}/campaigns", self.config.api.account_path());
        self.client
            .get_all(&path, &[("fields", CAMPAIGN_FIELDS.to_string())])
            .await
    }

    async fn fetch_adsets(&self, campaign_id: &str) -> Result<Vec<AdSet>, HarvestError> {
        let path = format!("{}/adsets", campaign_id);
        self.client
            .get_all(&path, &[("fields", ADSET_FIELDS.to_string())])
            .await
    }

    async fn fetch_ads(&self, adset_id: &str) -> Result<Vec<Ad>, HarvestError> {
        let path = format!("{}/ads", adset_id);
        self.client
            .get_all(&path, &[("fields", AD_FIELDS.to_string())])
            .await
    }
}

/// Runs a complete harvest with the configured checkpoint store
pub async fn run_harvest(config: Config, fresh: bool) -> Result<HarvestSummary, HarvestError> {
    let store = crate::storage::open_checkpoint_store(&config.output);
    let mut coordinator = Coordinator::new(config, store, fresh)?;
    coordinator.run().await
}
