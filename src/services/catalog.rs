//! Catalog-wide figures for the home page

use serde::Serialize;

use crate::{
    error::AppResult,
    models::{BookInstanceStatus, EntityKind},
    repository::{Filter, Repository},
};

/// Record counts shown on the home page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCounts {
    pub book_count: u64,
    pub book_instance_count: u64,
    pub book_instance_available_count: u64,
    pub author_count: u64,
    pub genre_count: u64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        let all = Filter::all();
        let available = Filter::eq("status", BookInstanceStatus::Available.as_str());

        let (books, copies, available, authors, genres) = tokio::try_join!(
            self.repository.count(EntityKind::Book, &all),
            self.repository.count(EntityKind::BookInstance, &all),
            self.repository.count(EntityKind::BookInstance, &available),
            self.repository.count(EntityKind::Author, &all),
            self.repository.count(EntityKind::Genre, &all),
        )?;

        Ok(CatalogCounts {
            book_count: books,
            book_instance_count: copies,
            book_instance_available_count: available,
            author_count: authors,
            genre_count: genres,
        })
    }

    /// Round trip to the store, for readiness checks
    pub async fn ping(&self) -> AppResult<()> {
        self.repository
            .count(EntityKind::Author, &Filter::all())
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::{
        error::AppError,
        models::{BookInstanceDraft, GenreDraft},
        repository::MockDocumentStore,
    };

    #[tokio::test]
    async fn test_counts_available_copies_separately() {
        let repository = Repository::in_memory();
        let service = CatalogService::new(repository.clone());

        repository
            .create(&GenreDraft { name: "Poetry".into() })
            .await
            .unwrap();
        for status in [BookInstanceStatus::Available, BookInstanceStatus::Loaned] {
            repository
                .create(&BookInstanceDraft {
                    book: Uuid::new_v4(),
                    imprint: "Ace".into(),
                    status,
                    due_back: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                })
                .await
                .unwrap();
        }

        let counts = service.counts().await.unwrap();
        assert_eq!(counts.book_count, 0);
        assert_eq!(counts.book_instance_count, 2);
        assert_eq!(counts.book_instance_available_count, 1);
        assert_eq!(counts.genre_count, 1);
    }

    #[tokio::test]
    async fn test_ping_surfaces_storage_failure() {
        let mut store = MockDocumentStore::new();
        store
            .expect_count()
            .times(1)
            .returning(|_, _| Err(AppError::StorageFailure("down".into())));

        let service = CatalogService::new(Repository::new(Arc::new(store)));
        assert!(matches!(
            service.ping().await.unwrap_err(),
            AppError::StorageFailure(_)
        ));
    }
}
