//! Business logic services

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod deletion;
pub mod genres;

use crate::{repository::Repository, validation::Rejected};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub authors: authors::AuthorsService,
    pub genres: genres::GenresService,
    pub books: books::BooksService,
    pub book_instances: book_instances::BookInstancesService,
    pub deletion: deletion::DeletionService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            authors: authors::AuthorsService::new(repository.clone()),
            genres: genres::GenresService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            book_instances: book_instances::BookInstancesService::new(repository.clone()),
            deletion: deletion::DeletionService::new(repository),
        }
    }
}

/// Result of a create or update form submission
///
/// `context` carries the auxiliary data the form needs to be shown again
/// (option lists), freshly loaded after the rejection.
#[derive(Debug)]
pub enum Submission<T, C = ()> {
    Saved(T),
    Rejected { form: Rejected, context: C },
}

impl<T, C> Submission<T, C> {
    pub fn saved(self) -> Option<T> {
        match self {
            Submission::Saved(record) => Some(record),
            Submission::Rejected { .. } => None,
        }
    }

    pub fn rejected(self) -> Option<(Rejected, C)> {
        match self {
            Submission::Saved(_) => None,
            Submission::Rejected { form, context } => Some((form, context)),
        }
    }
}
