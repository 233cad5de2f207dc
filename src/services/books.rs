//! Books service

use serde::Serialize;
use uuid::Uuid;

use super::Submission;
use crate::{
    error::AppResult,
    models::{Author, Book, BookDraft, BookInstance, BookSummary, EntityKind, Genre},
    repository::{Filter, Populate, Query, Repository},
    validation::{rules, FormInput},
};

const DETAIL_POPULATE: &[Populate] = &[
    Populate::new("author", EntityKind::Author),
    Populate::new("genre", EntityKind::Genre),
];

/// A genre checkbox on the book form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreOption {
    #[serde(flatten)]
    pub genre: Genre,
    pub checked: bool,
}

/// Option lists the book form is rendered with
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookFormContext {
    pub authors: Vec<Author>,
    pub genres: Vec<GenreOption>,
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Title and author of every book, by title
    pub async fn list(&self) -> AppResult<Vec<BookSummary>> {
        let query = Query::all()
            .project(&["title", "author"])
            .sort_by("title")
            .populate("author", EntityKind::Author);
        self.repository.find(&query).await
    }

    /// Book with author and genres resolved, plus its copies
    pub async fn detail(&self, id: Uuid) -> AppResult<(Book, Vec<BookInstance>)> {
        let copies = Query::filter(Filter::eq("book", id.to_string()));
        tokio::try_join!(
            self.repository.find_by_id::<Book>(id, DETAIL_POPULATE),
            self.repository.find::<BookInstance>(&copies),
        )
    }

    /// Every author and genre, genres flagged when their id is in `selected`
    pub async fn form_context(&self, selected: &[String]) -> AppResult<BookFormContext> {
        let by_last_name = Query::all().sort_by("lastName");
        let by_name = Query::all().sort_by("name");
        let (authors, genres) = tokio::try_join!(
            self.repository.find::<Author>(&by_last_name),
            self.repository.find::<Genre>(&by_name),
        )?;

        let genres = genres
            .into_iter()
            .map(|genre| {
                let checked = selected.contains(&genre.id.to_string());
                GenreOption { genre, checked }
            })
            .collect();

        Ok(BookFormContext { authors, genres })
    }

    /// Stored book and the form context checked against its genres
    pub async fn edit_form(&self, id: Uuid) -> AppResult<(Book, BookFormContext)> {
        let book: Book = self.repository.find_by_id(id, &[]).await?;
        let selected: Vec<String> = book.genre_ids().iter().map(Uuid::to_string).collect();
        let context = self.form_context(&selected).await?;
        Ok((book, context))
    }

    pub async fn create(&self, input: &FormInput) -> AppResult<Submission<Book, BookFormContext>> {
        let values = match rules::BOOK.validate(input).into_result() {
            Ok(values) => values,
            Err(form) => {
                let context = self.form_context(form.values.list("genre")).await?;
                return Ok(Submission::Rejected { form, context });
            }
        };

        let book = self
            .repository
            .create(&BookDraft::from_values(&values)?)
            .await?;
        tracing::info!("Created book {} ({})", book.id, book.title);
        Ok(Submission::Saved(book))
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &FormInput,
    ) -> AppResult<Submission<Book, BookFormContext>> {
        let values = match rules::BOOK.validate(input).into_result() {
            Ok(values) => values,
            Err(form) => {
                let context = self.form_context(form.values.list("genre")).await?;
                return Ok(Submission::Rejected { form, context });
            }
        };

        let book = self
            .repository
            .replace(id, &BookDraft::from_values(&values)?)
            .await?;
        tracing::info!("Updated book {}", book.id);
        Ok(Submission::Saved(book))
    }
}
