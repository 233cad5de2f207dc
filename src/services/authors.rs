//! Authors service

use uuid::Uuid;

use super::Submission;
use crate::{
    error::AppResult,
    models::{Author, AuthorDraft, BookSummary},
    repository::{Filter, Query, Repository},
    validation::{rules, FormInput},
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All authors ordered by last name
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        self.repository
            .find(&Query::all().sort_by("lastName"))
            .await
    }

    /// Author with the books they wrote (title and summary only)
    pub async fn detail(&self, id: Uuid) -> AppResult<(Author, Vec<BookSummary>)> {
        let books = Query::filter(Filter::eq("author", id.to_string())).project(&["title", "summary"]);
        tokio::try_join!(
            self.repository.find_by_id::<Author>(id, &[]),
            self.repository.find::<BookSummary>(&books),
        )
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Author> {
        self.repository.find_by_id(id, &[]).await
    }

    pub async fn create(&self, input: &FormInput) -> AppResult<Submission<Author>> {
        let values = match rules::AUTHOR.validate(input).into_result() {
            Ok(values) => values,
            Err(form) => return Ok(Submission::Rejected { form, context: () }),
        };

        let author = self
            .repository
            .create(&AuthorDraft::from_values(&values))
            .await?;
        tracing::info!("Created author {} ({})", author.id, author.name());
        Ok(Submission::Saved(author))
    }

    pub async fn update(&self, id: Uuid, input: &FormInput) -> AppResult<Submission<Author>> {
        let values = match rules::AUTHOR.validate(input).into_result() {
            Ok(values) => values,
            Err(form) => return Ok(Submission::Rejected { form, context: () }),
        };

        let author = self
            .repository
            .replace(id, &AuthorDraft::from_values(&values))
            .await?;
        tracing::info!("Updated author {}", author.id);
        Ok(Submission::Saved(author))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn input() -> FormInput {
        FormInput::new()
            .with("firstName", "  Frank ")
            .with("lastName", "Herbert")
            .with("dateOfBirth", "1920-10-08")
            .with("dateOfDeath", "")
    }

    #[tokio::test]
    async fn test_create_stores_sanitized_values() {
        let service = AuthorsService::new(Repository::in_memory());

        let author = service.create(&input()).await.unwrap().saved().unwrap();
        assert_eq!(author.first_name, "Frank");
        assert_eq!(author.date_of_birth, NaiveDate::from_ymd_opt(1920, 10, 8));
        assert_eq!(author.date_of_death, None);

        assert_eq!(service.get(author.id).await.unwrap(), author);
    }

    #[tokio::test]
    async fn test_invalid_create_returns_every_error_and_stores_nothing() {
        let service = AuthorsService::new(Repository::in_memory());
        let input = FormInput::new()
            .with("firstName", "Jo@n")
            .with("lastName", " ")
            .with("dateOfBirth", "not-a-date");

        let (form, ()) = service.create(&input).await.unwrap().rejected().unwrap();
        let fields: Vec<_> = form.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["firstName", "lastName", "dateOfBirth"]);
        assert_eq!(form.values.text("firstName"), "Jo@n");
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let service = AuthorsService::new(Repository::in_memory());
        let author = service.create(&input()).await.unwrap().saved().unwrap();

        let changed = FormInput::new()
            .with("firstName", "Franklin")
            .with("lastName", "Herbert");
        let updated = service
            .update(author.id, &changed)
            .await
            .unwrap()
            .saved()
            .unwrap();

        assert_eq!(updated.id, author.id);
        assert_eq!(updated.first_name, "Franklin");
        assert_eq!(updated.date_of_birth, None);
    }

    #[tokio::test]
    async fn test_update_of_missing_author_is_not_found() {
        let service = AuthorsService::new(Repository::in_memory());
        let err = service.update(Uuid::new_v4(), &input()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_last_name() {
        let service = AuthorsService::new(Repository::in_memory());
        for (first, last) in [("Ursula", "LeGuin"), ("Isaac", "Asimov")] {
            let input = FormInput::new().with("firstName", first).with("lastName", last);
            service.create(&input).await.unwrap();
        }

        let names: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.last_name)
            .collect();
        assert_eq!(names, vec!["Asimov", "LeGuin"]);
    }
}
