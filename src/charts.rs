//! Chart-series assembly for the dashboard's client-side charts.

use serde::Serialize;

use crate::models::SleepRecord;

/// Date-aligned parallel arrays, one per metric.
///
/// Phase and heart-rate arrays only receive values from records that carry
/// that nested data, so they can be shorter than `dates` when records are
/// sparse — consumers match points by date, not by index.
#[derive(Debug, Default, Serialize)]
pub struct ChartData {
    pub dates: Vec<Option<String>>,
    pub sleep_quality: Vec<Option<f64>>,
    pub duration_hours: Vec<f64>,
    pub deep_sleep_percentage: Vec<Option<f64>>,
    pub rem_sleep_percentage: Vec<Option<f64>>,
    pub light_sleep_percentage: Vec<Option<f64>>,
    pub heart_rate_avg: Vec<Option<f64>>,
}

impl ChartData {
    /// Project records into chart series, sorted ascending by date string.
    /// Records without a date sort first. Zero records produce empty
    /// arrays for every series.
    pub fn from_records(records: &[SleepRecord]) -> Self {
        // ---
        let mut ordered: Vec<&SleepRecord> = records.iter().collect();
        ordered.sort_by(|a, b| a.date.cmp(&b.date));

        let mut chart = Self::default();
        for record in ordered {
            chart.dates.push(record.date.clone());
            chart.sleep_quality.push(record.sleep_quality);
            chart.duration_hours.push(record.duration_hours());

            if record.sleep_phases.is_some() {
                chart
                    .deep_sleep_percentage
                    .push(record.deep_sleep_percentage());
                chart
                    .rem_sleep_percentage
                    .push(record.rem_sleep_percentage());
                chart
                    .light_sleep_percentage
                    .push(record.light_sleep_percentage());
            }

            if let Some(heart_rate) = &record.heart_rate {
                chart.heart_rate_avg.push(heart_rate.average);
            }
        }
        chart
    }
}
