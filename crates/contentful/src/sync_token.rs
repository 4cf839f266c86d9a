//! Extraction of sync cursors from `nextPageUrl` / `nextSyncUrl`.

use once_cell::sync::Lazy;
use regex::Regex;

static SYNC_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sync_token=([A-Za-z0-9_-]+)").expect("valid sync token pattern"));

/// Return the first `sync_token=` value found in `url`.
///
/// The match is unanchored; the first occurrence wins.
#[must_use]
pub fn extract_sync_token(url: &str) -> Option<&str> {
    SYNC_TOKEN_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "/spaces/yadj1kx9rmg0/sync?access_token=fdb4e7a3102747a02ea69ebac5e282b9";

    #[test]
    fn no_token_returns_none() {
        assert_eq!(extract_sync_token(BASE), None);
        assert_eq!(extract_sync_token(""), None);
        assert_eq!(extract_sync_token("https://cdn.contentful.com/sync?sync_token="), None);
    }

    #[test]
    fn extracts_alphanumeric_token() {
        let url = format!("{BASE}&sync_token=w7Ese3kdwpMbMhhgw7QAUsKiw6bCi09CwpFYwpwy");
        assert_eq!(
            extract_sync_token(&url),
            Some("w7Ese3kdwpMbMhhgw7QAUsKiw6bCi09CwpFYwpwy")
        );
    }

    #[test]
    fn extracts_token_with_underscore_and_hyphen() {
        let url = format!("{BASE}&sync_token=w_-se3kdwpMbMhhgw7QAUsKiw6bCi09C");
        assert_eq!(extract_sync_token(&url), Some("w_-se3kdwpMbMhhgw7QAUsKiw6bCi09C"));

        assert_eq!(
            extract_sync_token(".../sync?initial=true&sync_token=AbC-12_3"),
            Some("AbC-12_3")
        );
    }

    #[test]
    fn token_stops_at_first_disallowed_character() {
        assert_eq!(
            extract_sync_token("https://cdn.contentful.com/spaces/x/sync?sync_token=abc123&limit=5"),
            Some("abc123")
        );
        assert_eq!(extract_sync_token("sync_token=abc.def"), Some("abc"));
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(
            extract_sync_token("?sync_token=first&sync_token=second"),
            Some("first")
        );
    }
}
