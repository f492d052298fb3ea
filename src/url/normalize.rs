use crate::UrlError;
use url::Url;

/// Normalizes a destination URL to its canonical form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme and a host
/// 3. Keep scheme, lowercase host, explicit non-default port and path
/// 4. Drop user info, every query parameter and the fragment
///
/// Ad variants that differ only by tracking tags collapse to one string,
/// and the function is idempotent.
///
/// # Examples
///
/// ```
/// use ad_harvest::url::normalize_url;
///
/// let url = normalize_url("https://a.co/dp/B001?tag=x").unwrap();
/// assert_eq!(url, "https://a.co/dp/B001");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?;

    let mut canonical = format!("{}://{}", url.scheme(), host.to_lowercase());
    if let Some(port) = url.port() {
        canonical.push_str(&format!(":{}", port));
    }
    canonical.push_str(url.path());

    Ok(canonical)
}

/// Lenient variant used on creative payloads
///
/// Falls back to cutting the raw string at the first `?` or `#` when the
/// value does not parse as an HTTP URL, so a malformed link still loses its
/// tracking tail instead of being dropped.
pub fn canonical_url(raw: &str) -> String {
    match normalize_url(raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Keeping unparseable URL {:?} as-is: {}", raw, e);
            raw.trim()
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string()
        }
    }
}
