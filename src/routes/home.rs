//! Home and about pages.

use axum::{extract::Query, response::Html, routing::get, Router};

use super::AppState;
use crate::pages::{self, Flash};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/", get(index))
        .route("/about", get(about))
}

async fn index(Query(flash): Query<Flash>) -> Html<String> {
    Html(pages::render_home(&flash))
}

async fn about() -> Html<String> {
    Html(pages::render_about())
}
