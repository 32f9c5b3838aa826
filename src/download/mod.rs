//! MovieBox download-listing requests.
//!
//! Turns the raw `url`/`se`/`ep` query values into a [`DownloadRequest`]
//! and derives the private API URL the listing is fetched from.

mod service;

pub use service::{DirectDownloadResponse, DownloadService, FETCH_LISTING_SCRIPT};

use std::sync::LazyLock;

use regex::Regex;

use crate::error::RelayError;

/// Substring every accepted source URL must contain.
pub const SOURCE_DOMAIN: &str = "moviebox.ng";

/// Download-listing endpoint on the source site.
pub const DOWNLOAD_API_BASE: &str = "https://moviebox.ng/wefeed-h5-bff/web/subject/download";

static SUBJECT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"id=(\d+)").expect("static regex"));

/// A validated request for one title's download listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub movie_url: String,
    pub subject_id: String,
    /// Season number as a normalized decimal string, so values of any
    /// magnitude reach the backend URL unchanged.
    pub season: String,
    pub episode: String,
}

impl DownloadRequest {
    /// Validate the query values. Nothing here touches the browser.
    pub fn parse(
        url: Option<&str>,
        season: Option<&str>,
        episode: Option<&str>,
    ) -> Result<Self, RelayError> {
        let movie_url = match url {
            Some(u) if !u.is_empty() && u.contains(SOURCE_DOMAIN) => u,
            _ => return Err(RelayError::InvalidUrl),
        };

        let subject_id = SUBJECT_ID_PATTERN
            .captures(movie_url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(RelayError::MissingSubjectId)?;

        Ok(Self {
            movie_url: movie_url.to_string(),
            subject_id,
            season: parse_int_prefix(season),
            episode: parse_int_prefix(episode),
        })
    }

    pub fn download_api_url(&self) -> String {
        format!(
            "{}?subjectId={}&se={}&ep={}",
            DOWNLOAD_API_BASE, self.subject_id, self.season, self.episode
        )
    }
}

/// Base-10 prefix parse: skips leading whitespace, accepts one sign, then
/// reads the longest run of digits. No digits yields `"0"`.
///
/// The result is the integer in canonical decimal form (leading zeros
/// dropped, `-0` as `0`) with no magnitude limit.
pub fn parse_int_prefix(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "0".to_string();
    };

    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = rest[..end].trim_start_matches('0');

    match (digits.is_empty(), negative) {
        (true, _) => "0".to_string(),
        (false, true) => format!("-{}", digits),
        (false, false) => digits.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_request() {
        let req = DownloadRequest::parse(
            Some("https://moviebox.ng/movie?id=12345"),
            Some("1"),
            Some("2"),
        )
        .unwrap();

        assert_eq!(req.subject_id, "12345");
        assert_eq!(req.season, "1");
        assert_eq!(req.episode, "2");
        assert_eq!(
            req.download_api_url(),
            "https://moviebox.ng/wefeed-h5-bff/web/subject/download?subjectId=12345&se=1&ep=2"
        );
    }

    #[test]
    fn test_missing_or_foreign_url_rejected() {
        for url in [None, Some(""), Some("https://example.com/foo?id=1")] {
            assert!(matches!(
                DownloadRequest::parse(url, None, None),
                Err(RelayError::InvalidUrl)
            ));
        }
    }

    #[test]
    fn test_url_without_numeric_id_rejected() {
        for url in [
            "https://moviebox.ng/movie",
            "https://moviebox.ng/movie?id=abc",
            "https://moviebox.ng/movie?id=",
        ] {
            assert!(matches!(
                DownloadRequest::parse(Some(url), None, None),
                Err(RelayError::MissingSubjectId)
            ));
        }
    }

    #[test]
    fn test_subject_id_taken_from_first_match() {
        let req = DownloadRequest::parse(
            Some("https://moviebox.ng/detail/some-title?id=8906247916759695608&type=/movie/detail"),
            None,
            None,
        )
        .unwrap();
        assert_eq!(req.subject_id, "8906247916759695608");
        assert_eq!((req.season.as_str(), req.episode.as_str()), ("0", "0"));
    }

    #[test]
    fn test_parse_int_defaults_to_zero() {
        for raw in [None, Some(""), Some("abc"), Some("-"), Some("x12"), Some("-0"), Some("000")] {
            assert_eq!(parse_int_prefix(raw), "0", "{:?}", raw);
        }
    }

    #[test]
    fn test_parse_int_reads_numeric_prefix() {
        assert_eq!(parse_int_prefix(Some("3")), "3");
        assert_eq!(parse_int_prefix(Some("  7")), "7");
        assert_eq!(parse_int_prefix(Some("+4")), "4");
        assert_eq!(parse_int_prefix(Some("-2")), "-2");
        assert_eq!(parse_int_prefix(Some("12abc")), "12");
        assert_eq!(parse_int_prefix(Some("1.9")), "1");
        assert_eq!(parse_int_prefix(Some("007")), "7");
        assert_eq!(parse_int_prefix(Some("-0042")), "-42");
    }

    #[test]
    fn test_parse_int_keeps_large_magnitudes() {
        assert_eq!(
            parse_int_prefix(Some("99999999999999999999")),
            "99999999999999999999"
        );
        assert_eq!(
            parse_int_prefix(Some("-123456789012345678901234567890")),
            "-123456789012345678901234567890"
        );

        let req = DownloadRequest::parse(
            Some("https://moviebox.ng/m?id=5"),
            Some("99999999999999999999"),
            Some("1"),
        )
        .unwrap();
        assert_eq!(
            req.download_api_url(),
            "https://moviebox.ng/wefeed-h5-bff/web/subject/download?subjectId=5&se=99999999999999999999&ep=1"
        );
    }
}
