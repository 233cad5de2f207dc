//! Genre pages

use axum::{
    extract::{Path, State},
    Form,
};
use serde_json::json;

use super::{delete_confirmation, delete_record, parse_id, DeleteView, Page};
use crate::{
    error::AppResult,
    models::{Entity, EntityKind, Genre},
    services::Submission,
    validation::FormInput,
    AppState,
};

const DELETE_VIEW: DeleteView = DeleteView {
    template: "genre_delete",
    title: "Delete Genre",
    target_key: "genre",
    dependents_key: Some("books"),
};

pub async fn list(State(state): State<AppState>) -> AppResult<Page> {
    let genres = state.services.genres.list().await?;
    Ok(Page::render(
        "genre_list",
        json!({ "title": "Genre List", "listOfGenres": genres }),
    ))
}

pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    let id = parse_id(EntityKind::Genre, &id)?;
    let (genre, books) = state.services.genres.detail(id).await?;
    Ok(Page::render(
        "genre_detail",
        json!({ "title": "Genre Detail", "genre": genre, "genreBooks": books }),
    ))
}

pub async fn create_form() -> Page {
    Page::render("genre_form", json!({ "title": "Create Genre" }))
}

pub async fn create(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Page> {
    let input = FormInput::from(fields);
    Ok(match state.services.genres.create(&input).await? {
        Submission::Saved(genre) => Page::redirect(genre.url()),
        Submission::Rejected { form, .. } => Page::render(
            "genre_form",
            json!({ "title": "Create Genre", "genre": form.values, "errors": form.errors }),
        ),
    })
}

pub async fn delete_form(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    delete_confirmation::<Genre>(&state, &id, &DELETE_VIEW).await
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    delete_record::<Genre>(&state, &id, &DELETE_VIEW).await
}

pub async fn update_form(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Page> {
    let id = parse_id(EntityKind::Genre, &id)?;
    let genre = state.services.genres.get(id).await?;
    Ok(Page::render(
        "genre_form",
        json!({ "title": "Update Genre", "genre": genre }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Page> {
    let id = parse_id(EntityKind::Genre, &id)?;
    let input = FormInput::from(fields);
    Ok(match state.services.genres.update(id, &input).await? {
        Submission::Saved(genre) => Page::redirect(genre.url()),
        Submission::Rejected { form, .. } => Page::render(
            "genre_form",
            json!({ "title": "Update Genre", "genre": form.values, "errors": form.errors }),
        ),
    })
}
