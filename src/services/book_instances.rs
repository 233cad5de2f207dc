//! Book copies service

use uuid::Uuid;

use super::Submission;
use crate::{
    error::AppResult,
    models::{BookInstance, BookInstanceDraft, BookSummary, EntityKind},
    repository::{Populate, Query, Repository},
    validation::{rules, FormInput},
};

const BOOK_POPULATE: &[Populate] = &[Populate::new("book", EntityKind::Book)];

#[derive(Clone)]
pub struct BookInstancesService {
    repository: Repository,
}

impl BookInstancesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Every copy with its book resolved
    pub async fn list(&self) -> AppResult<Vec<BookInstance>> {
        self.repository
            .find(&Query::all().populate("book", EntityKind::Book))
            .await
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository.find_by_id(id, BOOK_POPULATE).await
    }

    /// Book titles offered by the copy form
    pub async fn form_context(&self) -> AppResult<Vec<BookSummary>> {
        self.repository
            .find(&Query::all().project(&["title"]).sort_by("title"))
            .await
    }

    pub async fn edit_form(&self, id: Uuid) -> AppResult<(BookInstance, Vec<BookSummary>)> {
        tokio::try_join!(
            self.repository.find_by_id::<BookInstance>(id, &[]),
            self.form_context(),
        )
    }

    pub async fn create(
        &self,
        input: &FormInput,
    ) -> AppResult<Submission<BookInstance, Vec<BookSummary>>> {
        let values = match rules::BOOK_INSTANCE.validate(input).into_result() {
            Ok(values) => values,
            Err(form) => {
                let context = self.form_context().await?;
                return Ok(Submission::Rejected { form, context });
            }
        };

        let copy = self
            .repository
            .create(&BookInstanceDraft::from_values(&values)?)
            .await?;
        tracing::info!("Created book copy {} of book {}", copy.id, copy.book.id());
        Ok(Submission::Saved(copy))
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &FormInput,
    ) -> AppResult<Submission<BookInstance, Vec<BookSummary>>> {
        let values = match rules::BOOK_INSTANCE.validate(input).into_result() {
            Ok(values) => values,
            Err(form) => {
                let context = self.form_context().await?;
                return Ok(Submission::Rejected { form, context });
            }
        };

        let copy = self
            .repository
            .replace(id, &BookInstanceDraft::from_values(&values)?)
            .await?;
        tracing::info!("Updated book copy {}", copy.id);
        Ok(Submission::Saved(copy))
    }
}
