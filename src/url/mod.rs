//! URL handling module for Ad-Harvest
//!
//! This module provides destination URL canonicalization, host extraction
//! and marketplace product identifier extraction.

mod domain;
mod normalize;
mod product;

pub use domain::{extract_host, host_matches_any};
pub use normalize::{canonical_url, normalize_url};
pub use product::extract_asin;
