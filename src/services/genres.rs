//! Genres service

use uuid::Uuid;

use super::Submission;
use crate::{
    error::AppResult,
    models::{BookSummary, Genre, GenreDraft},
    repository::{Filter, Query, Repository},
    validation::{rules, FormInput},
};

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
}

impl GenresService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All genres ordered by name
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        self.repository.find(&Query::all().sort_by("name")).await
    }

    /// Genre with the books filed under it
    pub async fn detail(&self, id: Uuid) -> AppResult<(Genre, Vec<BookSummary>)> {
        let books =
            Query::filter(Filter::contains("genre", id.to_string())).project(&["title", "summary"]);
        tokio::try_join!(
            self.repository.find_by_id::<Genre>(id, &[]),
            self.repository.find::<BookSummary>(&books),
        )
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Genre> {
        self.repository.find_by_id(id, &[]).await
    }

    /// Create a genre; an existing genre with the same name is returned instead
    pub async fn create(&self, input: &FormInput) -> AppResult<Submission<Genre>> {
        let values = match rules::GENRE.validate(input).into_result() {
            Ok(values) => values,
            Err(form) => return Ok(Submission::Rejected { form, context: () }),
        };
        let draft = GenreDraft::from_values(&values);

        let existing: Vec<Genre> = self
            .repository
            .find(&Query::filter(Filter::eq("name", draft.name.as_str())))
            .await?;
        if let Some(genre) = existing.into_iter().next() {
            tracing::debug!("Genre {} already exists as {}", genre.name, genre.id);
            return Ok(Submission::Saved(genre));
        }

        let genre = self.repository.create(&draft).await?;
        tracing::info!("Created genre {} ({})", genre.id, genre.name);
        Ok(Submission::Saved(genre))
    }

    pub async fn update(&self, id: Uuid, input: &FormInput) -> AppResult<Submission<Genre>> {
        let values = match rules::GENRE.validate(input).into_result() {
            Ok(values) => values,
            Err(form) => return Ok(Submission::Rejected { form, context: () }),
        };

        let genre = self
            .repository
            .replace(id, &GenreDraft::from_values(&values))
            .await?;
        tracing::info!("Updated genre {}", genre.id);
        Ok(Submission::Saved(genre))
    }
}
