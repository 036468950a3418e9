//! JSON API routes backing the dashboard's client-side charts and the
//! user selection dropdown.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{date_window, parse_days, AppState};
use crate::charts::ChartData;
use crate::client::RECORD_PAGE_LIMIT;
use crate::errors::AppError;
use crate::models::UserSummary;

/// Users returned for the selection dropdown.
const USER_LIST_LIMIT: u32 = 50;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/dashboard/api/sleep-data", get(sleep_data))
        .route("/dashboard/api/users", get(users))
}

#[derive(Debug, Deserialize)]
struct ChartQuery {
    user_id: Option<String>,
    days: Option<String>,
}

/// `GET /dashboard/api/sleep-data` - chart-ready series for one user.
async fn sleep_data(
    Query(query): Query<ChartQuery>,
    State((client, _config)): State<AppState>,
) -> Result<Json<ChartData>, AppError> {
    // ---
    let user_id = query
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::bad_request("user_id is required"))?;
    let days = parse_days(query.days.as_deref(), 30);
    let (start_date, end_date) = date_window(days);

    let page = client
        .get_sleep_data(
            &user_id,
            Some(start_date),
            Some(end_date),
            RECORD_PAGE_LIMIT,
            0,
        )
        .await?;

    Ok(Json(ChartData::from_records(&page.records)))
}

/// `GET /dashboard/api/users` - users for the dropdown, as a bare array.
async fn users(
    State((client, _config)): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    // ---
    let page = client.get_users(USER_LIST_LIMIT, 0).await?;
    Ok(Json(page.users))
}
