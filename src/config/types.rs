use serde::Deserialize;

/// Main configuration structure for Ad-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub linker: LinkerConfig,
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

/// Remote API access configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Versioned API root, e.g. `https://graph.facebook.com/v19.0`
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Ad account id, with or without the `act_` prefix
    #[serde(rename = "ad-account-id")]
    pub ad_account_id: String,

    /// Literal access token. Takes precedence over `access-token-env`.
    #[serde(rename = "access-token", default)]
    pub access_token: Option<String>,

    /// Environment variable holding the access token
    #[serde(rename = "access-token-env", default = "default_token_env")]
    pub access_token_env: String,

    /// Page size requested from listing endpoints
    #[serde(rename = "page-limit", default = "default_page_limit")]
    pub page_limit: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Account path segment, always carrying the `act_` prefix
    pub fn account_path(&self) -> String {
        if self.ad_account_id.starts_with("act_") {
            self.ad_account_id.clone()
        } else {
            format!("act_{}", self.ad_account_id)
        }
    }
}

/// Rate-limit retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// First backoff delay (milliseconds)
    #[serde(rename = "base-delay-ms", default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Ceiling for any single backoff delay (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Total attempts per request before giving up
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Substring of an error body that marks a rate-limit response
    #[serde(rename = "rate-limit-marker", default = "default_rate_limit_marker")]
    pub rate_limit_marker: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
            rate_limit_marker: default_rate_limit_marker(),
        }
    }
}

/// Hierarchy walk configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Lifecycle status an entity must have to be kept
    #[serde(rename = "live-status", default = "default_live_status")]
    pub live_status: String,

    /// Pause before each ad set fetch (milliseconds)
    #[serde(rename = "adset-delay-ms", default = "default_adset_delay_ms")]
    pub adset_delay_ms: u64,

    /// Resolve each ad's creative into a destination URL
    #[serde(rename = "resolve-creatives", default = "default_true")]
    pub resolve_creatives: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            live_status: default_live_status(),
            adset_delay_ms: default_adset_delay_ms(),
            resolve_creatives: true,
        }
    }
}

/// Output document locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Accumulated campaign subtrees
    #[serde(rename = "results-path", default = "default_results_path")]
    pub results_path: String,

    /// Resume cursor document
    #[serde(rename = "cursor-path", default = "default_cursor_path")]
    pub cursor_path: String,

    /// Linked/classified entries
    #[serde(rename = "linked-path", default = "default_linked_path")]
    pub linked_path: String,

    /// Raw per-ad insights
    #[serde(rename = "insights-path", default = "default_insights_path")]
    pub insights_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
            cursor_path: default_cursor_path(),
            linked_path: default_linked_path(),
            insights_path: default_insights_path(),
        }
    }
}

/// Classifier and linking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LinkerConfig {
    /// Substrings of host or path that mark a lead-generation landing page
    #[serde(rename = "lead-gen-markers", default = "default_lead_gen_markers")]
    pub lead_gen_markers: Vec<String>,

    /// Host substrings identifying the marketplace
    #[serde(rename = "marketplace-domains", default = "default_marketplace_domains")]
    pub marketplace_domains: Vec<String>,

    /// Bibliographic lookup endpoint; empty disables the external lookup
    #[serde(rename = "lookup-url", default = "default_lookup_url")]
    pub lookup_url: String,

    /// Operator input that skips an ad during manual entry
    #[serde(rename = "skip-keyword", default = "default_skip_keyword")]
    pub skip_keyword: String,

    /// Metadata attached to every lead-generation ad
    #[serde(default)]
    pub freebie: FreebieConfig,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            lead_gen_markers: default_lead_gen_markers(),
            marketplace_domains: default_marketplace_domains(),
            lookup_url: default_lookup_url(),
            skip_keyword: default_skip_keyword(),
            freebie: FreebieConfig::default(),
        }
    }
}

/// Fixed metadata record for lead-generation ads
#[derive(Debug, Clone, Deserialize)]
pub struct FreebieConfig {
    #[serde(default = "default_freebie_title")]
    pub title: String,

    #[serde(default = "default_freebie_blurb")]
    pub blurb: String,

    #[serde(rename = "cover-url", default)]
    pub cover_url: Option<String>,
}

impl Default for FreebieConfig {
    fn default() -> Self {
        Self {
            title: default_freebie_title(),
            blurb: default_freebie_blurb(),
            cover_url: None,
        }
    }
}

/// Local lookup table entry keyed by product identifier
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub asin: String,

    pub title: String,

    #[serde(default)]
    pub blurb: Option<String>,

    #[serde(rename = "cover-url", default)]
    pub cover_url: Option<String>,
}

fn default_base_url() -> String {
    "https://graph.facebook.com/v19.0".to_string()
}

fn default_token_env() -> String {
    "FB_ACCESS_TOKEN".to_string()
}

fn default_page_limit() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_rate_limit_marker() -> String {
    "User request limit reached".to_string()
}

fn default_live_status() -> String {
    "ACTIVE".to_string()
}

fn default_adset_delay_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_results_path() -> String {
    "data/ads.json".to_string()
}

fn default_cursor_path() -> String {
    "data/fetch_progress.json".to_string()
}

fn default_linked_path() -> String {
    "data/linked_ads.json".to_string()
}

fn default_insights_path() -> String {
    "data/ad_insights.json".to_string()
}

fn default_lead_gen_markers() -> Vec<String> {
    ["bookfunnel", "storyorigin", "prolificworks", "newsletter"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_marketplace_domains() -> Vec<String> {
    vec!["amazon.".to_string()]
}

fn default_lookup_url() -> String {
    "https://www.googleapis.com/books/v1/volumes".to_string()
}

fn default_skip_keyword() -> String {
    "skip".to_string()
}

fn default_freebie_title() -> String {
    "Free Book (Newsletter Signup)".to_string()
}

fn default_freebie_blurb() -> String {
    "Reader magnet offered in exchange for a newsletter signup".to_string()
}
