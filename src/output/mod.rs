//! Output module for reporting harvest results
//!
//! This module handles:
//! - Statistics over the persisted results and linked documents
//! - The end-of-run summary printed after a harvest

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics};

use crate::crawler::{HarvestSummary, ResumePoint};

/// Prints the outcome of one harvest run
pub fn print_harvest_summary(summary: &HarvestSummary) {
    let duration = summary.finished_at - summary.started_at;

    println!("=== Harvest Summary ===\n");
    println!("  Started:  {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!("  Duration: {}s", duration.num_seconds());

    match summary.resume_point {
        ResumePoint::Start => println!("  Resume:   from the first campaign"),
        ResumePoint::After(index) => println!("  Resume:   after campaign #{}", index + 1),
        ResumePoint::CursorMissing => {
            println!("  Resume:   cursor not found, skipped committed campaigns")
        }
    }
    println!();

    println!("  Live campaigns:      {}", summary.live_campaigns);
    println!("  Campaigns skipped:   {}", summary.campaigns_skipped);
    println!("  Campaigns processed: {}", summary.campaigns_processed);
    println!("  Ad sets processed:   {}", summary.adsets_processed);
    println!(
        "  Ads processed:       {} ({} with a destination URL)",
        summary.ads_processed, summary.ads_resolved
    );
}
