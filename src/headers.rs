//! Parsing of the WebDAV request headers the lock engine consumes.

use crate::error::{DavLockError, Result};
use crate::locks::{LockDepth, LockTimeout, LockToken};
use http::{HeaderMap, HeaderName};
use regex::Regex;
use std::sync::LazyLock;

/// `If` (RFC 4918 §10.4).
pub const IF: HeaderName = HeaderName::from_static("if");
/// `Timeout` (RFC 4918 §10.7).
pub const TIMEOUT: HeaderName = HeaderName::from_static("timeout");
/// `Lock-Token` (RFC 4918 §10.5).
pub const LOCK_TOKEN: HeaderName = HeaderName::from_static("lock-token");
/// `Depth` (RFC 4918 §10.2).
pub const DEPTH: HeaderName = HeaderName::from_static("depth");
/// `Destination` (RFC 4918 §10.3).
pub const DESTINATION: HeaderName = HeaderName::from_static("destination");
/// `Overwrite` (RFC 4918 §10.6).
pub const OVERWRITE: HeaderName = HeaderName::from_static("overwrite");

static SECOND_N: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^second-([0-9]+)$").expect("Invalid timeout regex"));

/// Read a header as trimmed text. Non-ASCII values are a bad request.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Result<Option<&'a str>> {
    match headers.get(name) {
        Some(value) => value
            .to_str()
            .map(|s| Some(s.trim()))
            .map_err(|_| DavLockError::BadRequest(format!("invalid {} header encoding", name))),
        None => Ok(None),
    }
}

/// Parse a `Timeout` header value.
///
/// The value is a comma-separated list of `Second-N` / `Infinite` entries.
/// The first entry decides: a valid entry is returned immediately, an invalid
/// one is rejected before any later entry is looked at.
pub fn parse_timeout(value: &str) -> Result<LockTimeout> {
    for entry in value.split(',').map(str::trim) {
        if entry.eq_ignore_ascii_case("infinite") {
            return Ok(LockTimeout::Infinite);
        }
        if let Some(caps) = SECOND_N.captures(entry) {
            let secs = caps[1].parse::<u64>().unwrap_or(u64::MAX);
            return Ok(LockTimeout::Seconds(secs));
        }
        return Err(DavLockError::BadRequest(format!(
            "invalid Timeout header entry '{}'",
            entry
        )));
    }
    Err(DavLockError::BadRequest("empty Timeout header".to_string()))
}

/// The requested timeout, or `None` when the header is absent.
pub fn timeout_from(headers: &HeaderMap) -> Result<Option<LockTimeout>> {
    header_str(headers, &TIMEOUT)?.map(parse_timeout).transpose()
}

/// Depth of a LOCK request: `0` means zero, anything else (or nothing) infinite.
pub fn lock_depth_from(headers: &HeaderMap) -> Result<LockDepth> {
    Ok(match header_str(headers, &DEPTH)? {
        Some("0") => LockDepth::Zero,
        _ => LockDepth::Infinite,
    })
}

/// The token named by an UNLOCK request's `Lock-Token` header.
pub fn lock_token_from(headers: &HeaderMap) -> Result<LockToken> {
    let value = header_str(headers, &LOCK_TOKEN)?.ok_or_else(|| {
        DavLockError::BadRequest("UNLOCK requires a Lock-Token header".to_string())
    })?;
    LockToken::parse(value)
}

/// Whether a COPY/MOVE may replace an existing destination (`Overwrite: F` forbids it).
pub fn overwrite_from(headers: &HeaderMap) -> Result<bool> {
    Ok(!matches!(
        header_str(headers, &OVERWRITE)?,
        Some(v) if v.eq_ignore_ascii_case("f")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(name: HeaderName, value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn timeout_single_second_value() {
        assert_eq!(parse_timeout("second-100").unwrap(), LockTimeout::Seconds(100));
    }

    #[test]
    fn timeout_first_valid_entry_wins() {
        assert_eq!(
            parse_timeout("second-5, infinite").unwrap(),
            LockTimeout::Seconds(5)
        );
        assert_eq!(
            parse_timeout("infinite, second-5").unwrap(),
            LockTimeout::Infinite
        );
    }

    #[test]
    fn timeout_is_case_insensitive() {
        assert_eq!(parse_timeout("Second-3600").unwrap(), LockTimeout::Seconds(3600));
        assert_eq!(parse_timeout("Infinite").unwrap(), LockTimeout::Infinite);
    }

    #[test]
    fn timeout_garbage_is_bad_request() {
        assert!(matches!(
            parse_timeout("yourmom"),
            Err(DavLockError::BadRequest(_))
        ));
        assert!(matches!(
            parse_timeout("yourmom, second-5"),
            Err(DavLockError::BadRequest(_))
        ));
        assert!(matches!(
            parse_timeout("second-"),
            Err(DavLockError::BadRequest(_))
        ));
        assert!(matches!(parse_timeout(""), Err(DavLockError::BadRequest(_))));
    }

    #[test]
    fn timeout_trailing_garbage_after_valid_entry_is_ignored() {
        assert_eq!(
            parse_timeout("second-5, yourmom").unwrap(),
            LockTimeout::Seconds(5)
        );
    }

    #[test]
    fn timeout_overflow_saturates() {
        assert_eq!(
            parse_timeout("second-99999999999999999999999").unwrap(),
            LockTimeout::Seconds(u64::MAX)
        );
    }

    #[test]
    fn timeout_absent_is_none() {
        assert_eq!(timeout_from(&HeaderMap::new()).unwrap(), None);
        assert_eq!(
            timeout_from(&headers(TIMEOUT, "Second-10")).unwrap(),
            Some(LockTimeout::Seconds(10))
        );
    }

    #[test]
    fn depth_defaults_to_infinite() {
        assert_eq!(lock_depth_from(&HeaderMap::new()).unwrap(), LockDepth::Infinite);
        assert_eq!(
            lock_depth_from(&headers(DEPTH, "infinity")).unwrap(),
            LockDepth::Infinite
        );
        assert_eq!(
            lock_depth_from(&headers(DEPTH, "infinite")).unwrap(),
            LockDepth::Infinite
        );
        assert_eq!(lock_depth_from(&headers(DEPTH, "1")).unwrap(), LockDepth::Infinite);
        assert_eq!(lock_depth_from(&headers(DEPTH, "0")).unwrap(), LockDepth::Zero);
    }

    #[test]
    fn lock_token_header_required() {
        assert!(matches!(
            lock_token_from(&HeaderMap::new()),
            Err(DavLockError::BadRequest(_))
        ));
    }

    #[test]
    fn lock_token_header_accepts_both_forms() {
        let bracketed = lock_token_from(&headers(LOCK_TOKEN, "<opaquelocktoken:abc>")).unwrap();
        let bare = lock_token_from(&headers(LOCK_TOKEN, "opaquelocktoken:abc")).unwrap();
        assert_eq!(bracketed, bare);
    }

    #[test]
    fn overwrite_defaults_to_true() {
        assert!(overwrite_from(&HeaderMap::new()).unwrap());
        assert!(overwrite_from(&headers(OVERWRITE, "T")).unwrap());
        assert!(!overwrite_from(&headers(OVERWRITE, "F")).unwrap());
    }
}
