//! HTML dashboard routes: the per-user dashboard, single-record detail and
//! the analytics page.
//!
//! These handlers are the catch-all boundary for this side of the app: any
//! adapter or parse failure becomes a redirect carrying a user-facing
//! message, never an unhandled fault.

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::{date_window, parse_days, AppState};
use crate::client::RECORD_PAGE_LIMIT;
use crate::models::format_timestamp;
use crate::pages::{self, AnalyticsContext, DashboardContext, Flash};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/dashboard", get(index))
        .route("/dashboard/view", get(view))
        .route("/dashboard/record/{record_id}", get(record_detail))
        .route("/dashboard/analytics", get(analytics))
}

async fn index(Query(flash): Query<Flash>) -> Html<String> {
    Html(pages::render_dashboard_index(&flash))
}

#[derive(Debug, Deserialize)]
struct ViewQuery {
    user_id: Option<String>,
    days: Option<String>,
}

/// `GET /dashboard/view` - the main per-user dashboard.
async fn view(
    Query(query): Query<ViewQuery>,
    Query(flash): Query<Flash>,
    State((client, config)): State<AppState>,
) -> Response {
    // ---
    let Some(user_id) = query.user_id.filter(|u| !u.is_empty()) else {
        return error_redirect("/", "User ID is required");
    };
    let days = parse_days(query.days.as_deref(), config.default_range_days);
    let (start_date, end_date) = date_window(days);

    info!("dashboard view for {user_id}, {days} day window");

    let page = match client
        .get_sleep_data(
            &user_id,
            Some(start_date),
            Some(end_date),
            RECORD_PAGE_LIMIT,
            0,
        )
        .await
    {
        Ok(page) => page,
        Err(error) => {
            return error_redirect("/", &format!("Error retrieving sleep data: {error:#}"))
        }
    };

    let analytics = match client
        .get_sleep_analytics(&user_id, start_date, end_date)
        .await
    {
        Ok(analytics) => analytics,
        Err(error) => {
            return error_redirect("/", &format!("Error retrieving sleep data: {error:#}"))
        }
    };

    let context = DashboardContext {
        user_id: &user_id,
        days,
        start_date: format_timestamp(start_date),
        end_date: format_timestamp(end_date),
        records: &page.records,
        analytics: &analytics,
    };
    Html(pages::render_dashboard_view(&context, &flash)).into_response()
}

#[derive(Debug, Deserialize)]
struct RecordQuery {
    user_id: Option<String>,
}

/// `GET /dashboard/record/{record_id}` - detail view for a single record.
///
/// Only the first page of the user's records is searched; an identifier
/// beyond that page is reported as not found.
async fn record_detail(
    Path(record_id): Path<String>,
    Query(query): Query<RecordQuery>,
    State((client, _config)): State<AppState>,
) -> Response {
    // ---
    let Some(user_id) = query.user_id.filter(|u| !u.is_empty()) else {
        return error_redirect("/", "User ID and Record ID are required");
    };

    let page = match client
        .get_sleep_data(&user_id, None, None, RECORD_PAGE_LIMIT, 0)
        .await
    {
        Ok(page) => page,
        Err(error) => {
            return dashboard_redirect(
                &user_id,
                &format!("Error retrieving sleep record: {error:#}"),
            )
        }
    };

    let record = page
        .records
        .into_iter()
        .find(|r| r.id.as_deref() == Some(record_id.as_str()));

    match record {
        Some(record) => Html(pages::render_record_detail(&user_id, &record)).into_response(),
        None => {
            warn!("record {record_id} not in the first page for {user_id}");
            dashboard_redirect(&user_id, &format!("Sleep record not found: {record_id}"))
        }
    }
}

/// `GET /dashboard/analytics` - in-depth analytics for a user.
async fn analytics(
    Query(query): Query<ViewQuery>,
    State((client, _config)): State<AppState>,
) -> Response {
    // ---
    let Some(user_id) = query.user_id.filter(|u| !u.is_empty()) else {
        return error_redirect("/", "User ID is required");
    };
    let days = parse_days(query.days.as_deref(), 30);
    let (start_date, end_date) = date_window(days);

    let analytics = match client
        .get_sleep_analytics(&user_id, start_date, end_date)
        .await
    {
        Ok(analytics) => analytics,
        Err(error) => {
            return error_redirect("/", &format!("Error retrieving sleep analytics: {error:#}"))
        }
    };

    let page = match client
        .get_sleep_data(
            &user_id,
            Some(start_date),
            Some(end_date),
            RECORD_PAGE_LIMIT,
            0,
        )
        .await
    {
        Ok(page) => page,
        Err(error) => {
            return error_redirect("/", &format!("Error retrieving sleep analytics: {error:#}"))
        }
    };

    let context = AnalyticsContext {
        user_id: &user_id,
        days,
        records: &page.records,
        analytics: &analytics,
    };
    Html(pages::render_analytics(&context)).into_response()
}

// ---

fn error_redirect(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{path}?error={}", urlencoding::encode(message))).into_response()
}

fn dashboard_redirect(user_id: &str, message: &str) -> Response {
    let target = format!(
        "/dashboard/view?user_id={}&error={}",
        urlencoding::encode(user_id),
        urlencoding::encode(message)
    );
    Redirect::to(&target).into_response()
}
