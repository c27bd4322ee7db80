//! URL handling for index pages, detail pages and image sources
//!
//! Index pages are addressed by appending the page number to the configured
//! base URL. Detail links and image sources may be site-relative and are
//! resolved against the page they were found on.

use crate::FetchError;
use url::Url;

/// Builds the URL of a 1-based index page
///
/// The page number is appended verbatim, so the base URL is expected to end
/// with its page parameter (for example `...?page=`).
///
/// # Examples
///
/// ```
/// use kakurizer::url::index_page_url;
///
/// assert_eq!(
///     index_page_url("https://example.com/series/kakuro?page=", 3),
///     "https://example.com/series/kakuro?page=3"
/// );
/// ```
pub fn index_page_url(base_url: &str, page: u32) -> String {
    format!("{}{}", base_url, page)
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Absolute links are used as they are. Relative links need a base; without
/// one they are rejected.
///
/// # Arguments
///
/// * `base` - The page the link was found on, if known
/// * `href` - The raw link
///
/// # Returns
///
/// * `Ok(Url)` - Absolute URL with an http or https scheme
/// * `Err(FetchError::InvalidUrl)` - Empty, unresolvable, or non-HTTP link
pub fn resolve_url(base: Option<&Url>, href: &str) -> Result<Url, FetchError> {
    let href = href.trim();
    let invalid = |message: String| FetchError::InvalidUrl {
        url: href.to_string(),
        message,
    };

    if href.is_empty() {
        return Err(invalid("empty link".to_string()));
    }

    let resolved = match Url::parse(href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base.join(href).map_err(|e| invalid(e.to_string()))?,
            None => return Err(invalid("relative link without a base URL".to_string())),
        },
        Err(e) => return Err(invalid(e.to_string())),
    };

    // Only accept HTTP and HTTPS URLs
    if resolved.scheme() == "http" || resolved.scheme() == "https" {
        Ok(resolved)
    } else {
        Err(invalid(format!("unsupported scheme '{}'", resolved.scheme())))
    }
}
