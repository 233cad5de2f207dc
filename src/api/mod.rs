//! HTTP handlers for the catalog pages
//!
//! Handlers never produce markup. Each returns a [`Page`]: either a template
//! name with its data bag, or a redirect. The default presenter sends the
//! render instruction as JSON.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::EntityKind,
    services::deletion::{DeleteGuard, DeleteOutcome},
    AppState,
};

/// What a handler asks the presenter to do
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Render { template: &'static str, data: Value },
    Redirect { target: String },
}

impl Page {
    pub fn render(template: &'static str, data: Value) -> Self {
        Page::Render { template, data }
    }

    pub fn redirect(target: impl Into<String>) -> Self {
        Page::Redirect {
            target: target.into(),
        }
    }
}

#[derive(Serialize)]
struct RenderBody<'a> {
    template: &'a str,
    data: &'a Value,
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        match self {
            Page::Render { template, data } => (
                StatusCode::OK,
                Json(RenderBody {
                    template,
                    data: &data,
                }),
            )
                .into_response(),
            Page::Redirect { target } => Redirect::to(&target).into_response(),
        }
    }
}

/// Path id of an existing record; anything unparsable cannot exist
pub(crate) fn parse_id(kind: EntityKind, raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{} {} not found", kind, raw)))
}

/// Template and data-bag keys of an entity's delete page
pub(crate) struct DeleteView {
    pub template: &'static str,
    pub title: &'static str,
    pub target_key: &'static str,
    pub dependents_key: Option<&'static str>,
}

impl DeleteView {
    fn render<T: Serialize, D: Serialize>(&self, target: &T, dependents: &[D]) -> AppResult<Page> {
        let mut data = Map::new();
        data.insert("title".to_string(), Value::from(self.title));
        data.insert(self.target_key.to_string(), serde_json::to_value(target)?);
        if let Some(key) = self.dependents_key {
            data.insert(key.to_string(), serde_json::to_value(dependents)?);
        }
        Ok(Page::render(self.template, Value::Object(data)))
    }
}

/// GET delete: the confirmation page, or the list when the record is gone
pub(crate) async fn delete_confirmation<T: DeleteGuard>(
    state: &AppState,
    raw_id: &str,
    view: &DeleteView,
) -> AppResult<Page> {
    let Ok(id) = Uuid::parse_str(raw_id) else {
        return Ok(Page::redirect(T::KIND.list_url()));
    };

    let inspection = state.services.deletion.inspect::<T>(id).await?;
    match inspection.target {
        Some(target) => view.render(&target, &inspection.dependents),
        None => Ok(Page::redirect(T::KIND.list_url())),
    }
}

/// POST delete: back to the list unless dependents block it
pub(crate) async fn delete_record<T: DeleteGuard>(
    state: &AppState,
    raw_id: &str,
    view: &DeleteView,
) -> AppResult<Page> {
    let Ok(id) = Uuid::parse_str(raw_id) else {
        return Ok(Page::redirect(T::KIND.list_url()));
    };

    match state.services.deletion.delete::<T>(id).await? {
        DeleteOutcome::Blocked { target, dependents } => view.render(&target, &dependents),
        DeleteOutcome::Deleted | DeleteOutcome::AlreadyAbsent => {
            Ok(Page::redirect(T::KIND.list_url()))
        }
    }
}

async fn home() -> Redirect {
    Redirect::to("/catalog")
}

/// Build the application router with all routes and layers
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let catalog = Router::new()
        .route("/", get(catalog::index))
        // Authors
        .route("/authors", get(authors::list))
        .route("/author/create", get(authors::create_form).post(authors::create))
        .route("/author/:id/delete", get(authors::delete_form).post(authors::delete))
        .route("/author/:id/update", get(authors::update_form).post(authors::update))
        .route("/author/:id", get(authors::detail))
        // Books
        .route("/books", get(books::list))
        .route("/book/create", get(books::create_form).post(books::create))
        .route("/book/:id/delete", get(books::delete_form).post(books::delete))
        .route("/book/:id/update", get(books::update_form).post(books::update))
        .route("/book/:id", get(books::detail))
        // Genres
        .route("/genres", get(genres::list))
        .route("/genre/create", get(genres::create_form).post(genres::create))
        .route("/genre/:id/delete", get(genres::delete_form).post(genres::delete))
        .route("/genre/:id/update", get(genres::update_form).post(genres::update))
        .route("/genre/:id", get(genres::detail))
        // Book copies
        .route("/bookinstances", get(book_instances::list))
        .route(
            "/bookinstance/create",
            get(book_instances::create_form).post(book_instances::create),
        )
        .route(
            "/bookinstance/:id/delete",
            get(book_instances::delete_form).post(book_instances::delete),
        )
        .route(
            "/bookinstance/:id/update",
            get(book_instances::update_form).post(book_instances::update),
        )
        .route("/bookinstance/:id", get(book_instances::detail));

    Router::new()
        .route("/", get(home))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/catalog", catalog)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparsable_id_is_not_found() {
        let err = parse_id(EntityKind::Author, "not-an-id").unwrap_err();
        assert!(err.is_not_found());
        assert!(parse_id(EntityKind::Author, "1b4e28ba-2fa1-11d2-883f-0016d3cca427").is_ok());
    }

    #[test]
    fn test_redirect_is_see_other() {
        let response = Page::redirect("/catalog/authors").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/catalog/authors");
    }
}
