//! Book copy pages

use axum::{
    extract::{Path, State},
    Form,
};
use serde_json::json;

use super::{delete_confirmation, delete_record, parse_id, DeleteView, Page};
use crate::{
    error::AppResult,
    models::{BookInstance, BookInstanceStatus, Entity, EntityKind},
    services::Submission,
    validation::FormInput,
    AppState,
};

const DELETE_VIEW: DeleteView = DeleteView {
    template: "bookinstance_delete",
    title: "Delete Copy",
    target_key: "bookInstance",
    dependents_key: None,
};

pub async fn list(State(state): State<AppState>) -> AppResult<Page> {
    let copies = state.services.book_instances.list().await?;
    Ok(Page::render(
        "bookinstance_list",
        json!({ "title": "Book Instance List", "listOfBookInstances": copies }),
    ))
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    let id = parse_id(EntityKind::BookInstance, &id)?;
    let copy = state.services.book_instances.detail(id).await?;
    let title = match copy.book.populated() {
        Some(book) => format!("Copy: {}", book.title),
        None => "Copy".to_string(),
    };
    Ok(Page::render(
        "bookinstance_detail",
        json!({ "title": title, "bookInstance": copy }),
    ))
}

pub async fn create_form(State(state): State<AppState>) -> AppResult<Page> {
    let books = state.services.book_instances.form_context().await?;
    Ok(Page::render(
        "bookinstance_form",
        json!({
            "title": "Create BookInstance",
            "books": books,
            "statuses": BookInstanceStatus::NAMES,
        }),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Page> {
    let input = FormInput::from(fields);
    Ok(match state.services.book_instances.create(&input).await? {
        Submission::Saved(copy) => Page::redirect(copy.url()),
        Submission::Rejected { form, context } => Page::render(
            "bookinstance_form",
            json!({
                "title": "Create BookInstance",
                "books": context,
                "statuses": BookInstanceStatus::NAMES,
                "selectedBook": form.values.text("book"),
                "bookInstance": form.values,
                "errors": form.errors,
            }),
        ),
    })
}

pub async fn delete_form(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    delete_confirmation::<BookInstance>(&state, &id, &DELETE_VIEW).await
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    delete_record::<BookInstance>(&state, &id, &DELETE_VIEW).await
}

pub async fn update_form(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    let id = parse_id(EntityKind::BookInstance, &id)?;
    let (copy, books) = state.services.book_instances.edit_form(id).await?;
    Ok(Page::render(
        "bookinstance_form",
        json!({
            "title": "Update BookInstance",
            "books": books,
            "statuses": BookInstanceStatus::NAMES,
            "selectedBook": copy.book.id(),
            "bookInstance": copy,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Page> {
    let id = parse_id(EntityKind::BookInstance, &id)?;
    let input = FormInput::from(fields);
    Ok(match state.services.book_instances.update(id, &input).await? {
        Submission::Saved(copy) => Page::redirect(copy.url()),
        Submission::Rejected { form, context } => Page::render(
            "bookinstance_form",
            json!({
                "title": "Update BookInstance",
                "books": context,
                "statuses": BookInstanceStatus::NAMES,
                "selectedBook": form.values.text("book"),
                "bookInstance": form.values,
                "errors": form.errors,
            }),
        ),
    })
}
