//! Redirect resolution
//!
//! Given a just-completed response and the attempt's method/URL, decides
//! whether the engine should re-issue the request and with what method,
//! target and body. The resolver only signals; the engine owns the bounded
//! loop that acts on the signal.

use url::Url;

use crate::core::headers::Headers;
use crate::core::request::Method;
use crate::utils::error::{Error, Result};

/// The next physical attempt a redirect response asks for.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NextHop {
    /// Resolved target URL
    pub url: Url,
    /// Method for the next attempt
    pub method: Method,
    /// Whether the request body survives the hop (307/308 only)
    pub keep_body: bool,
}

/// Resolve a response against the redirect state machine.
///
/// Returns `None` for terminal responses: non-redirect statuses and 3xx
/// responses without a `Location` header. Statuses 301/302 switch the
/// method to GET (HEAD stays HEAD) and drop the body, 303 always switches
/// to GET and drops the body, 307/308 preserve both.
///
/// An absolute http(s) `Location` is used verbatim; anything else is
/// resolved relative to the current URL. The current query string is not
/// carried over unless the `Location` has its own — `preserve_query` opts
/// into re-attaching it on relative hops.
pub(crate) fn resolve(
    method: Method,
    url: &Url,
    status: u16,
    headers: &Headers,
    preserve_query: bool,
) -> Result<Option<NextHop>> {
    if !matches!(status, 301 | 302 | 303 | 307 | 308) {
        return Ok(None);
    }
    let location = match headers.get("location") {
        Some(location) => location,
        None => return Ok(None),
    };

    let lowercase = location.to_ascii_lowercase();
    let absolute = lowercase.starts_with("http://") || lowercase.starts_with("https://");
    let mut target = if absolute {
        Url::parse(location)
    } else {
        url.join(location)
    }
    .map_err(|e| Error::transport(format!("malformed location header {location:?}: {e}")))?;

    match target.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(Error::transport(format!(
                "redirect to unsupported scheme {scheme:?}"
            )));
        }
    }

    if preserve_query && !absolute && target.query().is_none() {
        target.set_query(url.query());
    }

    let hop = match status {
        301 | 302 => NextHop {
            url: target,
            method: if method == Method::Head {
                Method::Head
            } else {
                Method::Get
            },
            keep_body: false,
        },
        303 => NextHop {
            url: target,
            method: Method::Get,
            keep_body: false,
        },
        // 307 | 308
        _ => NextHop {
            url: target,
            method,
            keep_body: true,
        },
    };

    Ok(Some(hop))
}
