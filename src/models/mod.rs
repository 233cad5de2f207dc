//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

use chrono::{Datelike, NaiveDate};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

// Re-export commonly used types
pub use author::{Author, AuthorDraft};
pub use book::{Book, BookDraft, BookSummary};
pub use book_instance::{BookInstance, BookInstanceDraft, BookInstanceStatus};
pub use genre::{Genre, GenreDraft};

/// Collection a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Author,
    Genre,
    Book,
    BookInstance,
}

impl EntityKind {
    /// Storage key, also the URL segment of a record
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Author => "author",
            EntityKind::Genre => "genre",
            EntityKind::Book => "book",
            EntityKind::BookInstance => "bookinstance",
        }
    }

    /// Canonical URL of the record with the given id
    pub fn url(&self, id: Uuid) -> String {
        format!("/catalog/{}/{}", self.as_str(), id)
    }

    /// URL of the collection listing
    pub fn list_url(&self) -> String {
        format!("/catalog/{}s", self.as_str())
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityKind::Author => "Author",
            EntityKind::Genre => "Genre",
            EntityKind::Book => "Book",
            EntityKind::BookInstance => "Book copy",
        };
        write!(f, "{}", label)
    }
}

/// A persisted record, or a projection of one, read back from the store
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    fn url(&self) -> String {
        Self::KIND.url(self.id())
    }
}

/// Field values of a record about to be inserted or replaced
pub trait Draft: Serialize + Send + Sync {
    type Record: Entity;
}

/// A reference field: the bare id, or the referenced record once populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(Uuid),
    Populated(T),
}

impl<T: Entity> Ref<T> {
    pub fn id(&self) -> Uuid {
        match self {
            Ref::Id(id) => *id,
            Ref::Populated(record) => record.id(),
        }
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Populated(record) => Some(record),
        }
    }
}

/// `May 14th, 1990`
pub fn long_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {}{}, {}", date.format("%B"), day, suffix, date.year())
}
