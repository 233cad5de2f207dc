//! Guarded delete: a record is only removed while nothing references it
//!
//! The target and its dependents are fetched concurrently; the removal is a
//! separate call. A dependent created between the check and the removal is
//! not detected: there is no transaction spanning the two steps.

use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Author, Book, BookInstance, BookSummary, Entity, EntityKind, Genre},
    repository::{Filter, Populate, Query, Repository},
};

/// Per-entity delete policy
pub trait DeleteGuard: Entity + Serialize {
    /// Records that block the delete while they exist
    type Dependent: Entity + Serialize;

    /// References resolved on the target for the confirmation page
    const TARGET_POPULATE: &'static [Populate] = &[];

    /// Query for records referencing `id`; `None` when nothing can
    fn dependents(id: Uuid) -> Option<Query>;
}

impl DeleteGuard for Author {
    type Dependent = BookSummary;

    fn dependents(id: Uuid) -> Option<Query> {
        Some(Query::filter(Filter::eq("author", id.to_string())).project(&["title", "summary"]))
    }
}

impl DeleteGuard for Genre {
    type Dependent = BookSummary;

    fn dependents(id: Uuid) -> Option<Query> {
        Some(
            Query::filter(Filter::contains("genre", id.to_string()))
                .project(&["title", "author", "summary"])
                .populate("author", EntityKind::Author),
        )
    }
}

impl DeleteGuard for Book {
    type Dependent = BookInstance;

    const TARGET_POPULATE: &'static [Populate] = &[Populate::new("author", EntityKind::Author)];

    fn dependents(id: Uuid) -> Option<Query> {
        Some(Query::filter(Filter::eq("book", id.to_string())))
    }
}

impl DeleteGuard for BookInstance {
    // Copies are never referenced
    type Dependent = BookInstance;

    const TARGET_POPULATE: &'static [Populate] = &[Populate::new("book", EntityKind::Book)];

    fn dependents(_id: Uuid) -> Option<Query> {
        None
    }
}

/// Target and dependents as fetched by the inspecting step
#[derive(Debug)]
pub struct Inspection<T: DeleteGuard> {
    pub target: Option<T>,
    pub dependents: Vec<T::Dependent>,
}

/// Terminal state of a delete request
#[derive(Debug)]
pub enum DeleteOutcome<T: DeleteGuard> {
    Deleted,
    /// The record did not exist; callers treat this like `Deleted`
    AlreadyAbsent,
    Blocked {
        target: T,
        dependents: Vec<T::Dependent>,
    },
}

impl<T: DeleteGuard> DeleteOutcome<T> {
    /// True unless the delete was blocked
    pub fn is_gone(&self) -> bool {
        !matches!(self, DeleteOutcome::Blocked { .. })
    }
}

#[derive(Clone)]
pub struct DeletionService {
    repository: Repository,
}

impl DeletionService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Fetch the target and everything referencing it, concurrently
    pub async fn inspect<T: DeleteGuard>(&self, id: Uuid) -> AppResult<Inspection<T>> {
        let dependents_query = T::dependents(id);
        let dependents = async {
            match &dependents_query {
                Some(query) => self.repository.find::<T::Dependent>(query).await,
                None => Ok(Vec::new()),
            }
        };

        let (target, dependents) = tokio::try_join!(
            self.repository.find_optional::<T>(id, T::TARGET_POPULATE),
            dependents,
        )?;

        Ok(Inspection { target, dependents })
    }

    /// Remove the record unless dependents exist; a missing record is not an error
    pub async fn delete<T: DeleteGuard>(&self, id: Uuid) -> AppResult<DeleteOutcome<T>> {
        let Inspection { target, dependents } = self.inspect::<T>(id).await?;

        let Some(target) = target else {
            tracing::debug!("{} {} already absent", T::KIND, id);
            return Ok(DeleteOutcome::AlreadyAbsent);
        };

        if !dependents.is_empty() {
            tracing::info!(
                "Delete of {} {} blocked by {} dependent record(s)",
                T::KIND,
                id,
                dependents.len()
            );
            return Ok(DeleteOutcome::Blocked { target, dependents });
        }

        match self.repository.remove(T::KIND, id).await {
            Ok(()) => {
                tracing::info!("Deleted {} {}", T::KIND, id);
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) if e.is_not_found() => Ok(DeleteOutcome::AlreadyAbsent),
            Err(e) => Err(e),
        }
    }
}
