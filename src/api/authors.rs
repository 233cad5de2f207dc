//! Author pages

use axum::{
    extract::{Path, State},
    Form,
};
use serde_json::json;

use super::{delete_confirmation, delete_record, parse_id, DeleteView, Page};
use crate::{
    error::AppResult,
    models::{Author, Entity, EntityKind},
    services::Submission,
    validation::FormInput,
    AppState,
};

const DELETE_VIEW: DeleteView = DeleteView {
    template: "author_delete",
    title: "Delete Author",
    target_key: "author",
    dependents_key: Some("authorBooks"),
};

pub async fn list(State(state): State<AppState>) -> AppResult<Page> {
    let authors = state.services.authors.list().await?;
    Ok(Page::render(
        "author_list",
        json!({ "title": "Author List", "listOfAuthors": authors }),
    ))
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    let id = parse_id(EntityKind::Author, &id)?;
    let (author, books) = state.services.authors.detail(id).await?;
    Ok(Page::render(
        "author_detail",
        json!({ "title": "Author Detail", "author": author, "authorsBooks": books }),
    ))
}

pub async fn create_form() -> Page {
    Page::render("author_form", json!({ "title": "Create Author" }))
}

pub async fn create(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Page> {
    let input = FormInput::from(fields);
    Ok(match state.services.authors.create(&input).await? {
        Submission::Saved(author) => Page::redirect(author.url()),
        Submission::Rejected { form, .. } => Page::render(
            "author_form",
            json!({ "title": "Create Author", "author": form.values, "errors": form.errors }),
        ),
    })
}

pub async fn delete_form(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    delete_confirmation::<Author>(&state, &id, &DELETE_VIEW).await
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    delete_record::<Author>(&state, &id, &DELETE_VIEW).await
}

pub async fn update_form(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    let id = parse_id(EntityKind::Author, &id)?;
    let author = state.services.authors.get(id).await?;
    Ok(Page::render(
        "author_form",
        json!({ "title": "Update Author", "author": author }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Page> {
    let id = parse_id(EntityKind::Author, &id)?;
    let input = FormInput::from(fields);
    Ok(match state.services.authors.update(id, &input).await? {
        Submission::Saved(author) => Page::redirect(author.url()),
        Submission::Rejected { form, .. } => Page::render(
            "author_form",
            json!({ "title": "Update Author", "author": form.values, "errors": form.errors }),
        ),
    })
}
