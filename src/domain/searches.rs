use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;
use super::store::Document;

pub const RECENT_SEARCHES_COLLECTION: &str = "recentSearches";

/// Maximum rows retained per user. The reader trims any excess after each
/// load; trimming is eventually consistent, not transactional.
pub const RETAINED_SEARCHES: usize = 5;

/// One recorded search, with its store-assigned document key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentSearch {
    pub id: String,
    pub uid: UserId,
    pub keyword: String,
    pub timestamp: DateTime<Utc>,
}

/// Stored payload shape of a recent search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearchRecord {
    pub uid: UserId,
    pub keyword: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl RecentSearch {
    pub fn from_document(document: &Document) -> Result<Self, serde_json::Error> {
        let record: RecentSearchRecord = serde_json::from_value(document.data.clone())?;
        Ok(Self {
            id: document.key.clone(),
            uid: record.uid,
            keyword: record.keyword,
            timestamp: record.timestamp,
        })
    }
}

/// Sort newest-first and split into the retained rows and the excess to
/// delete. Ties on timestamp are broken by id to keep trimming
/// deterministic.
pub fn partition_newest(mut rows: Vec<RecentSearch>) -> (Vec<RecentSearch>, Vec<RecentSearch>) {
    rows.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.id.cmp(&a.id))
    });

    if rows.len() <= RETAINED_SEARCHES {
        return (rows, Vec::new());
    }

    let excess = rows.split_off(RETAINED_SEARCHES);
    (rows, excess)
}
