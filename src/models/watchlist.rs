use serde::{Deserialize, Serialize};

use super::MediaKind;

/// Status of a catalog item in the user's watchlist
///
/// `Remove` is both a transition target (take the item off the list) and
/// the "no prior status" value on an item's first transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    Watchlist,
    Watched,
    NotInterested,
    Remove,
}

/// One watchlist entry, owned by the watchlist collaborator and consumed
/// read-only here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub status: WatchStatus,
    pub order: u32,
    #[serde(default)]
    pub user_rating: Option<f64>,
}

/// Key under which the watchlist collaborator stores an item: `<kind>:<id>`
pub fn watchlist_key(kind: MediaKind, id: u64) -> String {
    format!("{}:{}", kind, id)
}

/// Parse a watchlist key back into its kind and id
pub fn parse_watchlist_key(key: &str) -> Option<(MediaKind, u64)> {
    let (kind, id) = key.split_once(':')?;
    Some((MediaKind::parse(kind)?, id.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watchlist_key_format() {
        assert_eq!(watchlist_key(MediaKind::Movie, 550), "movie:550");
        assert_eq!(watchlist_key(MediaKind::Tv, 1399), "tv:1399");
    }

    #[test]
    fn test_watchlist_key_round_trip() {
        assert_eq!(parse_watchlist_key("movie:550"), Some((MediaKind::Movie, 550)));
        assert_eq!(parse_watchlist_key("tv:1399"), Some((MediaKind::Tv, 1399)));
        assert_eq!(parse_watchlist_key("person:42"), None);
        assert_eq!(parse_watchlist_key("movie:abc"), None);
        assert_eq!(parse_watchlist_key("garbage"), None);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&WatchStatus::NotInterested).unwrap(),
            r#""not_interested""#
        );
        let status: WatchStatus = serde_json::from_str(r#""watchlist""#).unwrap();
        assert_eq!(status, WatchStatus::Watchlist);
    }

    #[test]
    fn test_entry_optional_rating() {
        let entry: WatchlistEntry =
            serde_json::from_str(r#"{"status": "watched", "order": 3}"#).unwrap();
        assert_eq!(entry.status, WatchStatus::Watched);
        assert_eq!(entry.order, 3);
        assert_eq!(entry.user_rating, None);
    }
}
