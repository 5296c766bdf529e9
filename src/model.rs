//! Book entity and the request payloads that create or modify it.

use crate::entity::CacheEntity;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned book identifier. Always positive.
///
/// The only ways to build one are [`BookId::new`] and [`str::parse`], both of
/// which reject zero, negatives and non-numeric input, so an invalid id can
/// never reach the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct BookId(i64);

impl BookId {
    /// Validate a raw integer id.
    ///
    /// # Errors
    /// Returns `Error::ClientInput` if `raw` is not positive.
    pub fn new(raw: i64) -> Result<Self> {
        if raw > 0 {
            Ok(BookId(raw))
        } else {
            Err(Error::ClientInput(format!(
                "id must be a positive integer, got {}",
                raw
            )))
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for BookId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::ClientInput(format!("id must be a positive integer, got {:?}", s)))?;
        BookId::new(raw)
    }
}

impl TryFrom<i64> for BookId {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self> {
        BookId::new(raw)
    }
}

impl From<BookId> for i64 {
    fn from(id: BookId) -> Self {
        id.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted book.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// `None` means the publication date is unknown.
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CacheEntity for Book {
    type Key = BookId;

    fn cache_key(&self) -> Self::Key {
        self.id
    }

    fn cache_prefix() -> &'static str {
        "book"
    }
}

/// Payload for creating a book. The store assigns the id and the service
/// stamps both timestamps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        NewBook {
            title: title.into(),
            author: author.into(),
            published_at: None,
        }
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }
}

/// Partial update. Every field is an explicit optional:
///
/// | JSON                         | effect                    |
/// |------------------------------|---------------------------|
/// | field absent                 | keep current value        |
/// | `"title": ""`                | set title to empty string |
/// | `"published_at": null`       | clear publication date    |
/// | `"published_at": "2020-..."` | set publication date      |
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<Option<DateTime<Utc>>>,
}

impl BookPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn published_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.published_at = Some(at);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.published_at.is_none()
    }

    /// Overwrite the fields of `book` that this patch carries.
    ///
    /// Never touches `id`, `created_at` or `updated_at`.
    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(published_at) = self.published_at {
            book.published_at = published_at;
        }
    }
}

/// Maps a present field (even `null`) to `Some`, so `#[serde(default)]`
/// alone yields `None` only when the field is missing.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
