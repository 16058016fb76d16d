//! Resolution of `href` attributes against the catalog origin.

use url::Url;

/// Resolves a link found in a catalog page against `base`.
///
/// - empty: `base` itself
/// - absolute (`http:`/`https:`) or protocol-relative (`//host/..`): parsed,
///   taking the base scheme when none is given; links to other hosts are
///   returned untouched
/// - rooted (`/path`): replaces the base path
/// - anything else: appended to the base path
///
/// Paths on the catalog host are cleaned lexically (`.`/`..` resolved,
/// trailing slash dropped).
///
/// # Errors
///
/// Returns the parse error when the link is not a valid URL.
///
/// ```
/// use subscout_core::catalog::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://subscene.com").unwrap();
/// let url = resolve_href(&base, "/subtitles/the-matrix/english/123/").unwrap();
/// assert_eq!(url.as_str(), "https://subscene.com/subtitles/the-matrix/english/123");
/// ```
pub fn resolve_href(base: &Url, href: &str) -> Result<Url, url::ParseError> {
    if href.is_empty() {
        return Ok(base.clone());
    }

    let mut url = if href.starts_with("http:") || href.starts_with("https:") {
        Url::parse(href)?
    } else if href.starts_with('/') {
        // Protocol-relative links pick up the base scheme here too.
        base.join(href)?
    } else {
        let mut url = base.clone();
        url.set_path(&format!("{}/{href}", base.path()));
        url
    };

    if url.host_str() != base.host_str()
        || url.port_or_known_default() != base.port_or_known_default()
    {
        return Ok(url);
    }

    let cleaned = clean_path(url.path());
    url.set_path(&cleaned);
    Ok(url)
}

/// Lexically cleans a rooted URL path.
fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}
