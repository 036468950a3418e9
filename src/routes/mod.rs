use axum::Router;
use chrono::NaiveDateTime;

use crate::client::SleepApiClient;
use crate::Config;

mod dashboard;
mod generate;
mod health;
mod home;
mod sleep_api;

// ---

/// Shared state for every route: the remote client and the immutable
/// configuration snapshot.
pub(crate) type AppState = (SleepApiClient, Config);

pub fn router(client: SleepApiClient, config: Config) -> Router {
    // ---
    Router::new()
        .merge(home::router())
        .merge(dashboard::router())
        .merge(sleep_api::router())
        .merge(generate::router())
        .merge(health::router())
        .with_state((client, config))
}

// ---

/// Resolve the analytics window `[now - days, now]`.
pub(crate) fn date_window(days: u32) -> (NaiveDateTime, NaiveDateTime) {
    // ---
    let end = chrono::Utc::now().naive_utc();
    let start = end - chrono::Duration::days(i64::from(days));
    (start, end)
}

/// Parse a user-supplied days count; anything unparseable silently falls
/// back to the given default rather than failing the request.
pub(crate) fn parse_days(days: Option<&str>, fallback: u32) -> u32 {
    days.and_then(|text| text.parse().ok()).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn unparseable_days_falls_back_to_default() {
        assert_eq!(parse_days(Some("abc"), 7), 7);
        assert_eq!(parse_days(None, 7), 7);
        assert_eq!(parse_days(Some("14"), 7), 14);
        assert_eq!(parse_days(Some("-3"), 7), 7);
    }

    #[test]
    fn date_window_spans_the_requested_days() {
        let (start, end) = date_window(30);
        assert_eq!((end - start).num_days(), 30);
    }
}
