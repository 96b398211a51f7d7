use regex::Regex;
use url::Url;

/// Hrefs that start a call/mail/script action, or that point at a file type
/// we know is not an HTML document. The extension list is a heuristic to keep
/// obvious non-pages out of the frontier; anything it misses is still caught
/// by the content-type check at fetch time.
const SKIP_PATTERN: &str =
    r"(?i)^(mailto|tel|javascript):|\.(png|jpe?g|gif|pdf|xlsx?|docx?|pptx?|zip|txt|mpeg|mp4|mp3)$";

pub struct LinkFilter {
    skip: Regex,
}

impl LinkFilter {
    pub fn new() -> Self {
        Self {
            skip: Regex::new(SKIP_PATTERN).expect("link filter pattern is valid"),
        }
    }

    /// True if the raw href is worth turning into a crawl candidate.
    pub fn is_navigable(&self, href: &str) -> bool {
        !self.skip.is_match(href)
    }
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reduce a raw href to the canonical form the frontier works with:
/// `https://{host}{path}`, nothing else.
///
/// Absolute hrefs keep their own host, scheme-relative and path-relative
/// hrefs are resolved against the current page. Query string, fragment and
/// port are always dropped and the scheme is forced to https, so two hrefs
/// that reach the same document compare equal. Returns `None` for anything
/// that cannot be parsed into a host-bearing URL.
pub fn normalize_href(href: &str, page: &Url) -> Option<Url> {
    let resolved = match Url::parse(href) {
        Ok(absolute) => absolute,
        Err(url::ParseError::RelativeUrlWithoutBase) => page.join(href).ok()?,
        Err(_) => return None,
    };

    let host = resolved.host_str()?;
    Url::parse(&format!("https://{}{}", host, resolved.path())).ok()
}
