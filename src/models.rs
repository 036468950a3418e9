//! Domain models for sleep metrics returned by the sleep data microservice.
//!
//! Raw payloads deserialize into the typed entities below; derived metrics
//! (hour conversions, phase percentages) are computed on access; the
//! `*View` structs are the serialized form used by both HTML rendering and
//! the JSON API, omitting fields that were absent from the source payload.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

// ---

/// Parse a timestamp that may carry a UTC offset (RFC 3339) or not
/// (naive ISO-8601). Both normalize to the same naive UTC wall clock.
fn parse_timestamp(text: &str) -> Result<NaiveDateTime, String> {
    // ---
    if let Ok(with_offset) = chrono::DateTime::parse_from_rfc3339(text) {
        return Ok(with_offset.naive_utc());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| format!("invalid timestamp {text:?}: {e}"))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text).map_err(serde::de::Error::custom)
}

/// Timestamps serialize without an offset, fractional seconds only when set.
pub(crate) fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Treat an explicit JSON `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---

/// Per-stage minute breakdown of one sleep session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SleepPhases {
    pub deep_sleep_minutes: Option<u32>,
    pub rem_sleep_minutes: Option<u32>,
    pub light_sleep_minutes: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub awake_minutes: u32,
}

impl SleepPhases {
    /// Total minutes across all phases, absent phases counted as zero.
    pub fn total_minutes(&self) -> u32 {
        self.deep_sleep_minutes.unwrap_or(0)
            + self.rem_sleep_minutes.unwrap_or(0)
            + self.light_sleep_minutes.unwrap_or(0)
            + self.awake_minutes
    }

    pub fn to_view(&self) -> SleepPhasesView {
        SleepPhasesView {
            deep_sleep_minutes: self.deep_sleep_minutes,
            rem_sleep_minutes: self.rem_sleep_minutes,
            light_sleep_minutes: self.light_sleep_minutes,
            awake_minutes: self.awake_minutes,
            total_minutes: self.total_minutes(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SleepPhasesView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_sleep_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rem_sleep_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_sleep_minutes: Option<u32>,
    pub awake_minutes: u32,
    pub total_minutes: u32,
}

// ---

/// Heart rate summary measured during sleep. No invariants beyond
/// non-negativity; serializes as-is.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HeartRateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resting: Option<f64>,
}

// ---

/// One sample in a record's intra-night time series. Order is
/// caller-supplied and preserved.
#[derive(Debug, Clone, Deserialize)]
pub struct SleepTimeSeriesPoint {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub heart_rate: Option<f64>,
    #[serde(default)]
    pub movement: Option<f64>,
    #[serde(default)]
    pub respiration_rate: Option<f64>,
}

impl SleepTimeSeriesPoint {
    pub fn to_view(&self) -> SleepTimeSeriesPointView {
        SleepTimeSeriesPointView {
            timestamp: format_timestamp(self.timestamp),
            stage: self.stage.clone(),
            heart_rate: self.heart_rate,
            movement: self.movement,
            respiration_rate: self.respiration_rate,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SleepTimeSeriesPointView {
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiration_rate: Option<f64>,
}

// ---

/// One night's (or one session's) measured sleep data for a user.
///
/// `sleep_start` and `sleep_end` are the only fields whose absence or
/// malformation fails parsing; everything else defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SleepRecord {
    // The wire names this either `id` or `record_id` depending on endpoint.
    #[serde(default, alias = "record_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub sleep_start: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub sleep_end: NaiveDateTime,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub sleep_phases: Option<SleepPhases>,
    #[serde(default)]
    pub sleep_quality: Option<f64>,
    #[serde(default)]
    pub heart_rate: Option<HeartRateData>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_series: Vec<SleepTimeSeriesPoint>,
}

impl SleepRecord {
    /// Sleep duration in hours, zero when the duration is unknown.
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes.map_or(0.0, |m| f64::from(m) / 60.0)
    }

    pub fn deep_sleep_percentage(&self) -> Option<f64> {
        self.phase_percentage(|p| p.deep_sleep_minutes)
    }

    pub fn rem_sleep_percentage(&self) -> Option<f64> {
        self.phase_percentage(|p| p.rem_sleep_minutes)
    }

    pub fn light_sleep_percentage(&self) -> Option<f64> {
        self.phase_percentage(|p| p.light_sleep_minutes)
    }

    pub fn awake_percentage(&self) -> Option<f64> {
        self.phase_percentage(|p| Some(p.awake_minutes))
    }

    /// Phase minutes as a share of the whole session. `None` when the phase
    /// value or the duration is absent or zero; a zero phase degrades to
    /// `None` rather than `Some(0.0)`, which chart consumers rely on to
    /// skip the point.
    fn phase_percentage(&self, minutes: impl Fn(&SleepPhases) -> Option<u32>) -> Option<f64> {
        // ---
        let phases = self.sleep_phases.as_ref()?;
        let value = minutes(phases)?;
        if value == 0 {
            return None;
        }
        let duration = self.duration_minutes?;
        if duration == 0 {
            return None;
        }
        Some(f64::from(value) / f64::from(duration) * 100.0)
    }

    pub fn to_view(&self) -> SleepRecordView {
        // ---
        SleepRecordView {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            date: self.date.clone(),
            sleep_start: format_timestamp(self.sleep_start),
            sleep_end: format_timestamp(self.sleep_end),
            duration_minutes: self.duration_minutes,
            duration_hours: self.duration_hours(),
            sleep_quality: self.sleep_quality,
            sleep_phases: self.sleep_phases.as_ref().map(SleepPhases::to_view),
            deep_sleep_percentage: self.deep_sleep_percentage(),
            rem_sleep_percentage: self.rem_sleep_percentage(),
            light_sleep_percentage: self.light_sleep_percentage(),
            awake_percentage: self.awake_percentage(),
            heart_rate: self.heart_rate.clone(),
            time_series: self
                .time_series
                .iter()
                .map(SleepTimeSeriesPoint::to_view)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SleepRecordView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub sleep_start: String,
    pub sleep_end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    pub duration_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_phases: Option<SleepPhasesView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_sleep_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rem_sleep_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_sleep_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awake_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<HeartRateData>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub time_series: Vec<SleepTimeSeriesPointView>,
}

// ---

/// Directional summary of a metric across the analytics window.
///
/// The wire key for the per-day delta is `average_change_per_day`; it
/// serializes back out as `average_change`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SleepTrend {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(
        rename(deserialize = "average_change_per_day"),
        skip_serializing_if = "Option::is_none"
    )]
    pub average_change: Option<f64>,
}

// ---

/// Wire shape of the analytics payload: averages nested under `stats`,
/// trend data under `trends`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSleepAnalytics {
    user_id: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    stats: RawAnalyticsStats,
    trends: RawAnalyticsTrends,
    #[serde(deserialize_with = "null_as_default")]
    recommendations: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalyticsStats {
    average_duration_minutes: Option<f64>,
    average_sleep_quality: Option<f64>,
    average_deep_sleep_minutes: Option<f64>,
    average_rem_sleep_minutes: Option<f64>,
    average_light_sleep_minutes: Option<f64>,
    total_records: Option<u64>,
    date_range_days: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalyticsTrends {
    duration_trend: Option<SleepTrend>,
    quality_trend: Option<SleepTrend>,
    schedule_consistency: Option<f64>,
    duration_variability: Option<f64>,
}

/// Aggregate statistics and trends for one user over a date range,
/// flattened out of the nested wire shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawSleepAnalytics")]
pub struct SleepAnalytics {
    pub user_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub average_duration_minutes: Option<f64>,
    pub average_sleep_quality: Option<f64>,
    pub average_deep_sleep_minutes: Option<f64>,
    pub average_rem_sleep_minutes: Option<f64>,
    pub average_light_sleep_minutes: Option<f64>,
    pub total_records: Option<u64>,
    pub date_range_days: Option<u64>,
    pub duration_trend: Option<SleepTrend>,
    pub quality_trend: Option<SleepTrend>,
    pub schedule_consistency: Option<f64>,
    pub duration_variability: Option<f64>,
    pub recommendations: Vec<String>,
}

impl From<RawSleepAnalytics> for SleepAnalytics {
    fn from(raw: RawSleepAnalytics) -> Self {
        // ---
        Self {
            user_id: raw.user_id,
            start_date: raw.start_date,
            end_date: raw.end_date,
            average_duration_minutes: raw.stats.average_duration_minutes,
            average_sleep_quality: raw.stats.average_sleep_quality,
            average_deep_sleep_minutes: raw.stats.average_deep_sleep_minutes,
            average_rem_sleep_minutes: raw.stats.average_rem_sleep_minutes,
            average_light_sleep_minutes: raw.stats.average_light_sleep_minutes,
            total_records: raw.stats.total_records,
            date_range_days: raw.stats.date_range_days,
            duration_trend: raw.trends.duration_trend,
            quality_trend: raw.trends.quality_trend,
            schedule_consistency: raw.trends.schedule_consistency,
            duration_variability: raw.trends.duration_variability,
            recommendations: raw.recommendations,
        }
    }
}

impl SleepAnalytics {
    /// Average sleep duration in hours, `None` when the average is unknown.
    pub fn average_duration_hours(&self) -> Option<f64> {
        self.average_duration_minutes.map(|m| m / 60.0)
    }

    pub fn to_view(&self) -> SleepAnalyticsView {
        // ---
        SleepAnalyticsView {
            user_id: self.user_id.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            stats: AnalyticsStatsView {
                average_duration_minutes: self.average_duration_minutes,
                average_duration_hours: self.average_duration_hours(),
                average_sleep_quality: self.average_sleep_quality,
                average_deep_sleep_minutes: self.average_deep_sleep_minutes,
                average_rem_sleep_minutes: self.average_rem_sleep_minutes,
                average_light_sleep_minutes: self.average_light_sleep_minutes,
                total_records: self.total_records,
                date_range_days: self.date_range_days,
            },
            recommendations: self.recommendations.clone(),
            trends: AnalyticsTrendsView {
                duration: self.duration_trend.clone(),
                quality: self.quality_trend.clone(),
                schedule_consistency: self.schedule_consistency,
                duration_variability: self.duration_variability,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SleepAnalyticsView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub stats: AnalyticsStatsView,
    pub recommendations: Vec<String>,
    pub trends: AnalyticsTrendsView,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsStatsView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_duration_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_duration_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_sleep_quality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_deep_sleep_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rem_sleep_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_light_sleep_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range_days: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsTrendsView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<SleepTrend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<SleepTrend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_consistency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_variability: Option<f64>,
}

// ---

/// One page of sleep records from `GET /sleep/data`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SleepDataPage {
    #[serde(deserialize_with = "null_as_default")]
    pub records: Vec<SleepRecord>,
    pub count: u64,
}

/// A known user and how many records the service holds for them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UserSummary {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u64>,
}

/// One page of users from `GET /sleep/users`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserPage {
    #[serde(deserialize_with = "null_as_default")]
    pub users: Vec<UserSummary>,
    pub count: u64,
}

/// Result of a server-side dummy-data generation request.
#[derive(Debug, Deserialize)]
pub struct GenerateOutcome {
    pub count: u64,
}

// ---
