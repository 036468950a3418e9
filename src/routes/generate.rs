//! Dummy-data generation form: GET shows the form, POST validates and asks
//! the microservice to generate synthetic records.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::pages::{self, Flash};

// ---

pub fn router() -> Router<AppState> {
    Router::new().route("/generate-dummy-data", get(show_form).post(submit))
}

async fn show_form(Query(flash): Query<Flash>) -> Html<String> {
    Html(pages::render_generate_form(&flash))
}

#[derive(Debug, Deserialize)]
struct GenerateForm {
    user_id: Option<String>,
    days: Option<String>,
    include_time_series: Option<String>,
    sleep_quality_trend: Option<String>,
    sleep_duration_trend: Option<String>,
}

/// `POST /generate-dummy-data`.
///
/// Validation happens before any remote call: a missing user or a days
/// count outside [1, 365] sends the form back with a message.
async fn submit(State((client, config)): State<AppState>, Form(form): Form<GenerateForm>) -> Response {
    // ---
    let Some(user_id) = form.user_id.filter(|u| !u.is_empty()) else {
        return form_redirect("User ID is required");
    };

    let days = match form.days.as_deref().filter(|d| !d.is_empty()) {
        None => 30,
        Some(text) => match text.parse::<u32>() {
            Ok(days) => days,
            Err(_) => return form_redirect("Days must be a whole number"),
        },
    };
    if !(1..=365).contains(&days) {
        return form_redirect("Days must be between 1 and 365");
    }

    let include_time_series = form.include_time_series.as_deref() == Some("on");
    let quality_trend = form.sleep_quality_trend.as_deref().filter(|t| !t.is_empty());
    let duration_trend = form
        .sleep_duration_trend
        .as_deref()
        .filter(|t| !t.is_empty());

    match client
        .generate_dummy_data(
            &user_id,
            days,
            include_time_series,
            quality_trend,
            duration_trend,
        )
        .await
    {
        Ok(outcome) => {
            info!("generated {} records for {user_id}", outcome.count);
            let target = format!(
                "/dashboard/view?user_id={}&days={}&message={}",
                urlencoding::encode(&user_id),
                config.default_range_days,
                urlencoding::encode(&format!(
                    "Successfully generated {} sleep records",
                    outcome.count
                ))
            );
            Redirect::to(&target).into_response()
        }
        Err(error) => form_redirect(&format!("Error generating data: {error:#}")),
    }
}

// ---

fn form_redirect(message: &str) -> Response {
    Redirect::to(&format!(
        "/generate-dummy-data?error={}",
        urlencoding::encode(message)
    ))
    .into_response()
}
