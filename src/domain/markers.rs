use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{UserId, VolumeId};

/// The two user-book marker kinds. Each kind is a physically separate
/// store collection with an identical document shape, not a field.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Favourite,
    Read,
}

impl MarkerKind {
    /// Name of the backing store collection.
    pub fn collection(&self) -> &'static str {
        match self {
            MarkerKind::Favourite => "favourites",
            MarkerKind::Read => "markedasread",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::Favourite => "favourite",
            MarkerKind::Read => "read",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            MarkerKind::Favourite => "Favourites",
            MarkerKind::Read => "Finished Books",
        }
    }
}

impl FromStr for MarkerKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "favourite" | "favorite" => Ok(MarkerKind::Favourite),
            "read" => Ok(MarkerKind::Read),
            _ => Err(()),
        }
    }
}

/// Deterministic document key for a (user, book) pair. Existence of this
/// key in a marker collection IS the boolean marked state.
pub fn composite_key(uid: &UserId, book_id: &VolumeId) -> String {
    format!("{}_{}", uid.as_str(), book_id.as_str())
}

/// One marker document. Created on "add", physically deleted on "remove",
/// never mutated in place. The title is cached at marking time and not
/// refreshed if the catalog's title changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMarker {
    pub uid: UserId,
    pub book_id: VolumeId,
    pub book_title: String,
    /// Creation time, display/audit only. Toggle ordering never reads it.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl UserMarker {
    pub fn key(&self) -> String {
        composite_key(&self.uid, &self.book_id)
    }
}

/// What a list view holds per marked book, decoded from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerEntry {
    pub book_id: VolumeId,
    pub book_title: String,
}

impl From<UserMarker> for MarkerEntry {
    fn from(marker: UserMarker) -> Self {
        Self {
            book_id: marker.book_id,
            book_title: marker.book_title,
        }
    }
}
