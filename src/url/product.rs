use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn product_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|/)(?:dp|gp/product)/([A-Za-z0-9]{10})(?:/|$)")
            .expect("product path pattern is valid")
    })
}

/// Extracts a 10-character product identifier from a marketplace URL
///
/// Two path shapes are recognized: `/dp/<ID>` and `/gp/product/<ID>`,
/// optionally preceded by a slug segment. The identifier is returned
/// uppercased.
///
/// # Examples
///
/// ```
/// use ad_harvest::url::extract_asin;
///
/// assert_eq!(
///     extract_asin("https://amazon.com/Dragons-Kin/dp/B09BW7F5PZ?tag=x"),
///     Some("B09BW7F5PZ".to_string())
/// );
/// assert_eq!(extract_asin("https://amazon.com/s?k=dragons"), None);
/// ```
pub fn extract_asin(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    product_path_pattern()
        .captures(&path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}
