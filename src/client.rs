//! HTTP client for the sleep data microservice.
//!
//! Every operation issues exactly one request against the configured base
//! URL and decodes the body into its typed payload at this boundary. Any
//! transport failure (network error, timeout, non-2xx status, undecodable
//! body) is logged and propagated unchanged; there are no retries and no
//! caching.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};

use crate::models::{format_timestamp, GenerateOutcome, SleepAnalytics, SleepDataPage, UserPage};

/// Page size used when fetching a user's records for a single view.
pub const RECORD_PAGE_LIMIT: u32 = 100;

// ---

#[derive(Debug, Clone)]
pub struct SleepApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl SleepApiClient {
    /// Build a client for the service at `base_url`. The timeout applies to
    /// every request made through this client.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        // ---
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one page of sleep records for a user, optionally bounded by a
    /// date range.
    pub async fn get_sleep_data(
        &self,
        user_id: &str,
        start_date: Option<NaiveDateTime>,
        end_date: Option<NaiveDateTime>,
        limit: u32,
        offset: u32,
    ) -> Result<SleepDataPage> {
        // ---
        let mut params: Vec<(&str, String)> = vec![
            ("user_id", user_id.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        if let Some(start) = start_date {
            params.push(("start_date", format_timestamp(start)));
        }
        if let Some(end) = end_date {
            params.push(("end_date", format_timestamp(end)));
        }

        let url = self.url("/sleep/data");
        self.send(self.http.get(&url).query(&params), "/sleep/data")
            .await
    }

    /// Fetch aggregate analytics for a user over `[start_date, end_date]`.
    pub async fn get_sleep_analytics(
        &self,
        user_id: &str,
        start_date: NaiveDateTime,
        end_date: NaiveDateTime,
    ) -> Result<SleepAnalytics> {
        // ---
        let params = [
            ("user_id", user_id.to_string()),
            ("start_date", format_timestamp(start_date)),
            ("end_date", format_timestamp(end_date)),
        ];

        let url = self.url("/sleep/analytics");
        self.send(self.http.get(&url).query(&params), "/sleep/analytics")
            .await
    }

    /// Ask the service to generate synthetic records for a trailing window
    /// of `days` ending now.
    pub async fn generate_dummy_data(
        &self,
        user_id: &str,
        days: u32,
        include_time_series: bool,
        sleep_quality_trend: Option<&str>,
        sleep_duration_trend: Option<&str>,
    ) -> Result<GenerateOutcome> {
        // ---
        let end_date = Utc::now().naive_utc();
        let start_date = end_date - chrono::Duration::days(i64::from(days));

        let body = GenerateRequest {
            user_id,
            start_date: format_timestamp(start_date),
            end_date: format_timestamp(end_date),
            include_time_series,
            sleep_quality_trend,
            sleep_duration_trend,
        };

        let url = self.url("/sleep/generate");
        self.send(self.http.post(&url).json(&body), "/sleep/generate")
            .await
    }

    /// Fetch one page of known users with their record counts.
    pub async fn get_users(&self, limit: u32, offset: u32) -> Result<UserPage> {
        // ---
        let params = [("limit", limit.to_string()), ("offset", offset.to_string())];

        let url = self.url("/sleep/users");
        self.send(self.http.get(&url).query(&params), "/sleep/users")
            .await
    }

    // ---

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Issue the request and decode the body, folding every failure mode
    /// into one contextualized error, logged before propagation.
    async fn send<T>(&self, request: reqwest::RequestBuilder, endpoint: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        // ---
        debug!("sleep API request: {endpoint}");

        let outcome = async {
            let response = request
                .send()
                .await
                .with_context(|| format!("request to {endpoint} failed"))?;
            let response = response
                .error_for_status()
                .with_context(|| format!("request to {endpoint} returned an error status"))?;
            response
                .json::<T>()
                .await
                .with_context(|| format!("response from {endpoint} failed to decode"))
        }
        .await;

        if let Err(error) = &outcome {
            error!("sleep API request failed: {error:#}");
        }
        outcome
    }
}

// ---

/// Body of `POST /sleep/generate`. Trend fields are included only when a
/// trend was requested.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    user_id: &'a str,
    start_date: String,
    end_date: String,
    include_time_series: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    sleep_quality_trend: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sleep_duration_trend: Option<&'a str>,
}
