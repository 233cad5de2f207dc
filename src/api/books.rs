//! Book pages

use axum::{
    extract::{Path, State},
    Form,
};
use serde_json::json;

use super::{delete_confirmation, delete_record, parse_id, DeleteView, Page};
use crate::{
    error::AppResult,
    models::{Book, Entity, EntityKind},
    services::Submission,
    validation::FormInput,
    AppState,
};

const DELETE_VIEW: DeleteView = DeleteView {
    template: "book_delete",
    title: "Delete Book",
    target_key: "book",
    dependents_key: Some("bookInstances"),
};

pub async fn list(State(state): State<AppState>) -> AppResult<Page> {
    let books = state.services.books.list().await?;
    Ok(Page::render(
        "book_list",
        json!({ "title": "Book List", "listOfBooks": books }),
    ))
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    let id = parse_id(EntityKind::Book, &id)?;
    let (book, copies) = state.services.books.detail(id).await?;
    Ok(Page::render(
        "book_detail",
        json!({ "title": book.title, "book": book, "bookInstances": copies }),
    ))
}

pub async fn create_form(State(state): State<AppState>) -> AppResult<Page> {
    let context = state.services.books.form_context(&[]).await?;
    Ok(Page::render(
        "book_form",
        json!({ "title": "Create Book", "authors": context.authors, "genres": context.genres }),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Page> {
    let input = FormInput::from(fields);
    Ok(match state.services.books.create(&input).await? {
        Submission::Saved(book) => Page::redirect(book.url()),
        Submission::Rejected { form, context } => Page::render(
            "book_form",
            json!({
                "title": "Create Book",
                "authors": context.authors,
                "genres": context.genres,
                "book": form.values,
                "errors": form.errors,
            }),
        ),
    })
}

pub async fn delete_form(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    delete_confirmation::<Book>(&state, &id, &DELETE_VIEW).await
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    delete_record::<Book>(&state, &id, &DELETE_VIEW).await
}

pub async fn update_form(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    let id = parse_id(EntityKind::Book, &id)?;
    let (book, context) = state.services.books.edit_form(id).await?;
    Ok(Page::render(
        "book_form",
        json!({
            "title": "Update Book",
            "authors": context.authors,
            "genres": context.genres,
            "book": book,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Page> {
    let id = parse_id(EntityKind::Book, &id)?;
    let input = FormInput::from(fields);
    Ok(match state.services.books.update(id, &input).await? {
        Submission::Saved(book) => Page::redirect(book.url()),
        Submission::Rejected { form, context } => Page::render(
            "book_form",
            json!({
                "title": "Update Book",
                "authors": context.authors,
                "genres": context.genres,
                "book": form.values,
                "errors": form.errors,
            }),
        ),
    })
}
