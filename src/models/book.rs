//! Book model and projections

use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use super::{Author, Draft, Entity, EntityKind, Genre, Ref};
use crate::{error::AppResult, validation::FormValues};

/// Full book record; `author` and `genre` are populated on detail reads
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: Ref<Author>,
    pub summary: String,
    pub isbn: String,
    #[serde(default)]
    pub genre: Vec<Ref<Genre>>,
}

impl Book {
    /// Ids of the genres this book is filed under
    pub fn genre_ids(&self) -> Vec<Uuid> {
        self.genre.iter().map(Ref::id).collect()
    }
}

impl Entity for Book {
    const KIND: EntityKind = EntityKind::Book;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Serialize)]
struct BookView<'a> {
    id: Uuid,
    title: &'a str,
    author: &'a Ref<Author>,
    summary: &'a str,
    isbn: &'a str,
    genre: &'a [Ref<Genre>],
    url: String,
}

impl Serialize for Book {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BookView {
            id: self.id,
            title: &self.title,
            author: &self.author,
            summary: &self.summary,
            isbn: &self.isbn,
            genre: &self.genre,
            url: self.url(),
        }
        .serialize(serializer)
    }
}

/// Projection used by listings, pickers and dependent-record lists
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub author: Option<Ref<Author>>,
}

impl Entity for BookSummary {
    const KIND: EntityKind = EntityKind::Book;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Serialize)]
struct BookSummaryView<'a> {
    id: Uuid,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a Ref<Author>>,
    url: String,
}

impl Serialize for BookSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BookSummaryView {
            id: self.id,
            title: &self.title,
            summary: self.summary.as_deref(),
            author: self.author.as_ref(),
            url: self.url(),
        }
        .serialize(serializer)
    }
}

/// Validated book form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookDraft {
    pub title: String,
    pub author: Uuid,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<Uuid>,
}

impl BookDraft {
    pub fn from_values(values: &FormValues) -> AppResult<Self> {
        Ok(Self {
            title: values.text("title").to_string(),
            author: values.id("author")?,
            summary: values.text("summary").to_string(),
            isbn: values.text("isbn").to_string(),
            genre: values.ids("genre")?,
        })
    }
}

impl Draft for BookDraft {
    type Record = Book;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_bare_and_populated_references() {
        let author_id = Uuid::new_v4();
        let genre_id = Uuid::new_v4();

        let bare: Book = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "title": "Dune",
            "author": author_id,
            "summary": "desc",
            "isbn": "0441013597",
            "genre": [genre_id],
        }))
        .unwrap();
        assert_eq!(bare.author, Ref::Id(author_id));
        assert_eq!(bare.genre_ids(), vec![genre_id]);

        let populated: Book = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "title": "Dune",
            "author": { "id": author_id, "firstName": "Frank", "lastName": "Herbert" },
            "summary": "desc",
            "isbn": "0441013597",
            "genre": [{ "id": genre_id, "name": "SciFi" }],
        }))
        .unwrap();
        assert_eq!(populated.author.id(), author_id);
        assert_eq!(
            populated.author.populated().map(|a| a.name()),
            Some("Herbert, Frank".to_string())
        );
        assert_eq!(populated.genre_ids(), vec![genre_id]);
    }

    #[test]
    fn test_missing_genre_defaults_to_empty() {
        let book: Book = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "title": "Dune",
            "author": Uuid::nil(),
            "summary": "desc",
            "isbn": "0441013597",
        }))
        .unwrap();
        assert!(book.genre.is_empty());
    }
}
