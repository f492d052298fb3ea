//! Data model for harvested ads
//!
//! # Components
//!
//! - `remote`: Campaign/AdSet/Ad snapshots and the listing page envelope
//! - `creative`: typed creative payload with one accessor per link shape
//! - `records`: the persisted output tree, `UrlSource` and `ResumeCursor`
//! - `linked`: classified entries produced by the linking pass

mod creative;
mod linked;
mod records;
mod remote;

pub use creative::{
    CallToAction, CallToActionValue, ChildAttachment, Creative, LinkData, StorySpec, VideoData,
};
pub use linked::{BookMetadata, Category, LinkedEntry};
pub use records::{AdRecord, AdSetRecord, CampaignRecord, ResumeCursor, UrlSource};
pub use remote::{Ad, AdSet, Campaign, Cursors, Page, Paging};
