use url::Url;

/// Extracts the lowercase host from a URL string
///
/// # Examples
///
/// ```
/// use ad_harvest::url::extract_host;
///
/// assert_eq!(extract_host("https://WWW.Amazon.com/dp/X"), Some("www.amazon.com".to_string()));
/// assert_eq!(extract_host("not a url"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.to_lowercase())
}

/// Returns true if the host contains any of the given markers
///
/// Markers are plain substrings such as `"amazon."`, which matches
/// `amazon.com`, `www.amazon.co.uk` and `smile.amazon.de` alike.
pub fn host_matches_any(host: &str, markers: &[String]) -> bool {
    let host = host.to_lowercase();
    markers
        .iter()
        .any(|marker| host.contains(&marker.to_lowercase()))
}
