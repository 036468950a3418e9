//! End-to-end tests over real HTTP. An in-process axum router plays the
//! sleep data microservice with canned payloads and call counters; the
//! dashboard app is mounted against it and driven with reqwest.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use reqwest::{redirect, Client};
use serde_json::{json, Value};

use sleep_dashboard::{routes, Config, SleepApiClient};

// ---

/// Canned behavior for the stub microservice, shared with the test body so
/// it can assert on call counts and captured query parameters.
#[derive(Clone)]
struct Stub {
    data_status: u16,
    data_response: Value,
    analytics_response: Value,
    users_response: Value,
    generate_response: Value,
    data_calls: Arc<AtomicUsize>,
    analytics_calls: Arc<AtomicUsize>,
    generate_calls: Arc<AtomicUsize>,
    data_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl Stub {
    fn new() -> Self {
        // ---
        Self {
            data_status: 200,
            data_response: json!({ "records": [], "count": 0 }),
            analytics_response: json!({}),
            users_response: json!({ "users": [], "count": 0 }),
            generate_response: json!({ "count": 0 }),
            data_calls: Arc::new(AtomicUsize::new(0)),
            analytics_calls: Arc::new(AtomicUsize::new(0)),
            generate_calls: Arc::new(AtomicUsize::new(0)),
            data_queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn router(&self) -> Router {
        // ---
        Router::new()
            .route("/sleep/data", get(stub_data))
            .route("/sleep/analytics", get(stub_analytics))
            .route("/sleep/generate", post(stub_generate))
            .route("/sleep/users", get(stub_users))
            .with_state(self.clone())
    }
}

async fn stub_data(
    State(stub): State<Stub>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    // ---
    stub.data_calls.fetch_add(1, Ordering::SeqCst);
    stub.data_queries.lock().unwrap().push(params);
    (
        StatusCode::from_u16(stub.data_status).unwrap(),
        Json(stub.data_response.clone()),
    )
}

async fn stub_analytics(State(stub): State<Stub>) -> Json<Value> {
    stub.analytics_calls.fetch_add(1, Ordering::SeqCst);
    Json(stub.analytics_response.clone())
}

async fn stub_generate(State(stub): State<Stub>) -> Json<Value> {
    stub.generate_calls.fetch_add(1, Ordering::SeqCst);
    Json(stub.generate_response.clone())
}

async fn stub_users(State(stub): State<Stub>) -> Json<Value> {
    Json(stub.users_response.clone())
}

// ---

/// Serve a router on an ephemeral local port, returning its base URL.
async fn serve(router: Router) -> Result<String> {
    // ---
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Ok(format!("http://{addr}"))
}

/// Mount the dashboard app against a stub microservice at `api_base_url`.
async fn spawn_app(api_base_url: &str) -> Result<String> {
    // ---
    let config = Config {
        api_base_url: api_base_url.to_string(),
        api_timeout_secs: 5,
        items_per_page: 10,
        default_range_days: 7,
        secret_key: "test-secret".to_string(),
        debug: false,
        bind_addr: "127.0.0.1:0".to_string(),
    };
    let client = SleepApiClient::new(&config.api_base_url, u64::from(config.api_timeout_secs))?;
    serve(routes::router(client, config)).await
}

/// A client that does not follow redirects, for asserting on them.
fn no_redirect_client() -> Client {
    Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .expect("redirect should carry a location header")
        .to_str()
        .unwrap()
        .to_string()
}

fn sample_records() -> Value {
    // ---
    json!({
        "records": [
            {
                "id": "rec-2",
                "user_id": "user-1",
                "date": "2026-03-02",
                "sleep_start": "2026-03-02T23:00:00",
                "sleep_end": "2026-03-03T06:30:00",
                "duration_minutes": 450,
                "sleep_quality": 74.0
            },
            {
                "id": "rec-1",
                "user_id": "user-1",
                "date": "2026-03-01",
                "sleep_start": "2026-03-01T22:30:00",
                "sleep_end": "2026-03-02T06:30:00",
                "duration_minutes": 480,
                "sleep_quality": 81.0,
                "sleep_phases": { "deep_sleep_minutes": 120, "awake_minutes": 15 },
                "heart_rate": { "average": 57.0 }
            }
        ],
        "count": 2
    })
}

// ---

#[tokio::test]
async fn dashboard_view_renders_records_and_analytics() -> Result<()> {
    // ---
    let mut stub = Stub::new();
    stub.data_response = sample_records();
    stub.analytics_response = json!({
        "user_id": "user-1",
        "stats": { "average_duration_minutes": 465.0, "average_sleep_quality": 77.5 },
        "recommendations": ["Keep a consistent bedtime"]
    });

    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let response = Client::new()
        .get(format!("{app}/dashboard/view?user_id=user-1&days=14"))
        .send()
        .await?;
    assert!(response.status().is_success());

    let body = response.text().await?;
    assert!(body.contains("Sleep Dashboard - user-1"));
    assert!(body.contains("2026-03-01"));
    assert!(body.contains("Keep a consistent bedtime"));

    assert_eq!(stub.data_calls.load(Ordering::SeqCst), 1);
    assert_eq!(stub.analytics_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn unparseable_days_falls_back_to_configured_default() -> Result<()> {
    // ---
    let stub = Stub::new();
    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let response = Client::new()
        .get(format!("{app}/dashboard/view?user_id=user-1&days=abc"))
        .send()
        .await?;
    assert!(response.status().is_success());

    let queries = stub.data_queries.lock().unwrap();
    let query = queries.first().expect("data endpoint should be called");
    let start = parse_stamp(&query["start_date"]);
    let end = parse_stamp(&query["end_date"]);
    // The app was configured with a 7 day default window.
    assert_eq!((end - start).num_days(), 7);
    Ok(())
}

fn parse_stamp(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").expect("stamp should parse")
}

#[tokio::test]
async fn missing_user_redirects_home_without_remote_calls() -> Result<()> {
    // ---
    let stub = Stub::new();
    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let response = no_redirect_client()
        .get(format!("{app}/dashboard/view"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/?error="));
    assert_eq!(stub.data_calls.load(Ordering::SeqCst), 0);
    assert_eq!(stub.analytics_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn upstream_failure_redirects_with_error_and_stops() -> Result<()> {
    // ---
    let mut stub = Stub::new();
    stub.data_status = 503;

    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let response = no_redirect_client()
        .get(format!("{app}/dashboard/view?user_id=user-1"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/?error="));
    assert!(target.contains("Error%20retrieving%20sleep%20data"));

    // The failing records fetch aborts the route before the analytics call.
    assert_eq!(stub.data_calls.load(Ordering::SeqCst), 1);
    assert_eq!(stub.analytics_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn chart_data_for_zero_records_is_empty_series() -> Result<()> {
    // ---
    let stub = Stub::new();
    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let response = Client::new()
        .get(format!("{app}/dashboard/api/sleep-data?user_id=user-1"))
        .send()
        .await?;
    assert!(response.status().is_success());

    let body: Value = response.json().await?;
    for key in [
        "dates",
        "sleep_quality",
        "duration_hours",
        "deep_sleep_percentage",
        "rem_sleep_percentage",
        "light_sleep_percentage",
        "heart_rate_avg",
    ] {
        assert_eq!(body[key], json!([]), "series {key} should be empty");
    }
    Ok(())
}

#[tokio::test]
async fn chart_data_is_sorted_and_sparse_aware() -> Result<()> {
    // ---
    let mut stub = Stub::new();
    stub.data_response = sample_records();

    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let body: Value = Client::new()
        .get(format!("{app}/dashboard/api/sleep-data?user_id=user-1"))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["dates"], json!(["2026-03-01", "2026-03-02"]));
    assert_eq!(body["sleep_quality"], json!([81.0, 74.0]));
    // Only the first record carries phases and heart rate data.
    assert_eq!(body["deep_sleep_percentage"], json!([25.0]));
    assert_eq!(body["heart_rate_avg"], json!([57.0]));
    Ok(())
}

#[tokio::test]
async fn chart_data_requires_a_user() -> Result<()> {
    // ---
    let stub = Stub::new();
    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let response = Client::new()
        .get(format!("{app}/dashboard/api/sleep-data"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], json!("user_id is required"));
    assert_eq!(stub.data_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn users_endpoint_returns_the_user_list() -> Result<()> {
    // ---
    let mut stub = Stub::new();
    stub.users_response = json!({
        "users": [
            { "user_id": "user-1", "record_count": 31 },
            { "user_id": "user-2" }
        ],
        "count": 2
    });

    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let body: Value = Client::new()
        .get(format!("{app}/dashboard/api/users"))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(
        body,
        json!([
            { "user_id": "user-1", "record_count": 31 },
            { "user_id": "user-2" }
        ])
    );
    Ok(())
}

#[tokio::test]
async fn record_detail_finds_a_record_in_the_first_page() -> Result<()> {
    // ---
    let mut stub = Stub::new();
    stub.data_response = sample_records();

    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let response = Client::new()
        .get(format!("{app}/dashboard/record/rec-1?user_id=user-1"))
        .send()
        .await?;
    assert!(response.status().is_success());

    let body = response.text().await?;
    assert!(body.contains("Sleep Record - 2026-03-01"));
    assert!(body.contains("Sleep phases"));
    Ok(())
}

#[tokio::test]
async fn record_detail_not_found_redirects_to_dashboard() -> Result<()> {
    // ---
    let mut stub = Stub::new();
    stub.data_response = sample_records();

    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let response = no_redirect_client()
        .get(format!("{app}/dashboard/record/rec-99?user_id=user-1"))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/dashboard/view?user_id=user-1"));
    assert!(target.contains("not%20found"));
    Ok(())
}

#[tokio::test]
async fn generate_rejects_out_of_range_days_before_any_remote_call() -> Result<()> {
    // ---
    let stub = Stub::new();
    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let response = no_redirect_client()
        .post(format!("{app}/generate-dummy-data"))
        .form(&[("user_id", "user-1"), ("days", "400")])
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/generate-dummy-data?error="));
    assert!(target.contains("between%201%20and%20365"));
    assert_eq!(stub.generate_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn generate_success_redirects_to_the_dashboard_with_a_message() -> Result<()> {
    // ---
    let mut stub = Stub::new();
    stub.generate_response = json!({ "count": 30 });

    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let response = no_redirect_client()
        .post(format!("{app}/generate-dummy-data"))
        .form(&[
            ("user_id", "user-1"),
            ("days", "30"),
            ("include_time_series", "on"),
            ("sleep_quality_trend", "improving"),
            ("sleep_duration_trend", ""),
        ])
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/dashboard/view?user_id=user-1&days=7"));
    assert!(target.contains("generated%2030%20sleep%20records"));
    assert_eq!(stub.generate_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn health_endpoint_reports_ok() -> Result<()> {
    // ---
    let stub = Stub::new();
    let api = serve(stub.router()).await?;
    let app = spawn_app(&api).await?;

    let body: Value = Client::new()
        .get(format!("{app}/health"))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body, json!({ "status": "ok" }));
    Ok(())
}
