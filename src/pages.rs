//! Server-rendered pages: static HTML skeletons with placeholder
//! substitution. Charts on these pages are fed by the JSON API routes.

use serde::Deserialize;

use crate::models::{SleepAnalytics, SleepRecord};

/// One-shot messages carried on the query string of a redirect target.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Inputs for the main dashboard page.
pub struct DashboardContext<'a> {
    pub user_id: &'a str,
    pub days: u32,
    pub start_date: String,
    pub end_date: String,
    pub records: &'a [SleepRecord],
    pub analytics: &'a SleepAnalytics,
}

/// Inputs for the analytics page.
pub struct AnalyticsContext<'a> {
    pub user_id: &'a str,
    pub days: u32,
    pub records: &'a [SleepRecord],
    pub analytics: &'a SleepAnalytics,
}

// ---

pub fn render_home(flash: &Flash) -> String {
    // ---
    let content = r#"<h1>Sleep Data Visualization</h1>
<p>Inspect sleep records, phase breakdowns and trends fetched from the sleep data microservice.</p>
<form action="/dashboard/view" method="get">
  <label for="user_id">User ID</label>
  <input type="text" id="user_id" name="user_id" required />
  <label for="days">Days</label>
  <input type="number" id="days" name="days" value="7" min="1" />
  <p><button type="submit">View dashboard</button></p>
</form>"#;
    page("Sleep Data Visualization", flash, content)
}

pub fn render_about() -> String {
    // ---
    let content = r#"<h1>About</h1>
<p>This dashboard is a thin presentation layer over the sleep data
microservice. It holds no data of its own: every page fetches the user's
records and analytics for the requested window and renders them.</p>"#;
    page("About", flash_none(), content)
}

pub fn render_dashboard_index(flash: &Flash) -> String {
    // ---
    let content = r#"<h1>Dashboard</h1>
<p>Pick a user on the <a href="/">home page</a> to view their sleep data,
or <a href="/generate-dummy-data">generate test data</a> first.</p>"#;
    page("Dashboard", flash, content)
}

pub fn render_dashboard_view(ctx: &DashboardContext, flash: &Flash) -> String {
    // ---
    let mut content = String::new();
    content.push_str(&format!(
        "<h1>Sleep Dashboard - {}</h1>\n<p>Window: {} to {} ({} days)</p>\n",
        escape(ctx.user_id),
        escape(&ctx.start_date),
        escape(&ctx.end_date),
        ctx.days
    ));

    content.push_str("<h2>Summary</h2>\n<table>\n");
    content.push_str(&format!(
        "<tr><th>Average duration</th><td>{} h</td></tr>\n",
        fmt_opt(ctx.analytics.average_duration_hours())
    ));
    content.push_str(&format!(
        "<tr><th>Average quality</th><td>{}</td></tr>\n",
        fmt_opt(ctx.analytics.average_sleep_quality)
    ));
    content.push_str(&format!(
        "<tr><th>Records</th><td>{}</td></tr>\n",
        ctx.analytics
            .total_records
            .map_or("-".to_string(), |n| n.to_string())
    ));
    content.push_str("</table>\n");

    if !ctx.analytics.recommendations.is_empty() {
        content.push_str("<h2>Recommendations</h2>\n<ul>\n");
        for recommendation in &ctx.analytics.recommendations {
            content.push_str(&format!("<li>{}</li>\n", escape(recommendation)));
        }
        content.push_str("</ul>\n");
    }

    content.push_str("<h2>Records</h2>\n");
    if ctx.records.is_empty() {
        content.push_str("<p>No sleep records in this window.</p>\n");
    } else {
        content.push_str(
            "<table>\n<tr><th>Date</th><th>Duration (h)</th><th>Quality</th>\
             <th>Deep %</th><th>REM %</th><th>Light %</th><th></th></tr>\n",
        );
        for record in ctx.records {
            content.push_str(&record_row(ctx.user_id, record));
        }
        content.push_str("</table>\n");
    }

    content.push_str(&format!(
        "<p><a href=\"/dashboard/analytics?user_id={}&days={}\">Full analytics</a></p>\n",
        urlencoding::encode(ctx.user_id),
        ctx.days
    ));

    page(&format!("Sleep Dashboard - {}", ctx.user_id), flash, &content)
}

fn record_row(user_id: &str, record: &SleepRecord) -> String {
    // ---
    let date = record.date.as_deref().unwrap_or("-");
    let detail = match &record.id {
        Some(id) => format!(
            "<a href=\"/dashboard/record/{}?user_id={}\">detail</a>",
            urlencoding::encode(id),
            urlencoding::encode(user_id)
        ),
        None => String::new(),
    };
    format!(
        "<tr><td>{}</td><td>{:.1}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        escape(date),
        record.duration_hours(),
        fmt_opt(record.sleep_quality),
        fmt_opt(record.deep_sleep_percentage()),
        fmt_opt(record.rem_sleep_percentage()),
        fmt_opt(record.light_sleep_percentage()),
        detail
    )
}

pub fn render_record_detail(user_id: &str, record: &SleepRecord) -> String {
    // ---
    let date = record.date.as_deref().unwrap_or("-");
    let mut content = format!(
        "<h1>Sleep Record - {}</h1>\n<table>\n\
         <tr><th>User</th><td>{}</td></tr>\n\
         <tr><th>Start</th><td>{}</td></tr>\n\
         <tr><th>End</th><td>{}</td></tr>\n\
         <tr><th>Duration</th><td>{:.1} h</td></tr>\n\
         <tr><th>Quality</th><td>{}</td></tr>\n</table>\n",
        escape(date),
        escape(user_id),
        record.sleep_start,
        record.sleep_end,
        record.duration_hours(),
        fmt_opt(record.sleep_quality),
    );

    if let Some(phases) = &record.sleep_phases {
        content.push_str(&format!(
            "<h2>Sleep phases</h2>\n<table>\n\
             <tr><th>Deep</th><td>{} min</td><td>{}</td></tr>\n\
             <tr><th>REM</th><td>{} min</td><td>{}</td></tr>\n\
             <tr><th>Light</th><td>{} min</td><td>{}</td></tr>\n\
             <tr><th>Awake</th><td>{} min</td><td>{}</td></tr>\n\
             <tr><th>Total</th><td>{} min</td><td></td></tr>\n</table>\n",
            fmt_opt_u32(phases.deep_sleep_minutes),
            fmt_pct(record.deep_sleep_percentage()),
            fmt_opt_u32(phases.rem_sleep_minutes),
            fmt_pct(record.rem_sleep_percentage()),
            fmt_opt_u32(phases.light_sleep_minutes),
            fmt_pct(record.light_sleep_percentage()),
            phases.awake_minutes,
            fmt_pct(record.awake_percentage()),
            phases.total_minutes(),
        ));
    }

    if let Some(heart_rate) = &record.heart_rate {
        content.push_str(&format!(
            "<h2>Heart rate</h2>\n<table>\n\
             <tr><th>Average</th><td>{}</td></tr>\n\
             <tr><th>Min</th><td>{}</td></tr>\n\
             <tr><th>Max</th><td>{}</td></tr>\n\
             <tr><th>Resting</th><td>{}</td></tr>\n</table>\n",
            fmt_opt(heart_rate.average),
            fmt_opt(heart_rate.min),
            fmt_opt(heart_rate.max),
            fmt_opt(heart_rate.resting),
        ));
    }

    if !record.time_series.is_empty() {
        content.push_str(&format!(
            "<h2>Time series</h2>\n<p>{} samples</p>\n\
             <table>\n<tr><th>Time</th><th>Stage</th><th>Heart rate</th><th>Movement</th><th>Respiration</th></tr>\n",
            record.time_series.len()
        ));
        for point in &record.time_series {
            content.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                point.timestamp,
                escape(point.stage.as_deref().unwrap_or("-")),
                fmt_opt(point.heart_rate),
                fmt_opt(point.movement),
                fmt_opt(point.respiration_rate),
            ));
        }
        content.push_str("</table>\n");
    }

    content.push_str(&format!(
        "<p><a href=\"/dashboard/view?user_id={}\">Back to dashboard</a></p>\n",
        urlencoding::encode(user_id)
    ));

    page(&format!("Sleep Record - {date}"), flash_none(), &content)
}

pub fn render_analytics(ctx: &AnalyticsContext) -> String {
    // ---
    let analytics = ctx.analytics;
    let mut content = format!(
        "<h1>Sleep Analytics - {}</h1>\n<p>Last {} days, {} records fetched</p>\n",
        escape(ctx.user_id),
        ctx.days,
        ctx.records.len()
    );

    content.push_str("<h2>Averages</h2>\n<table>\n");
    for (label, value) in [
        ("Duration (h)", analytics.average_duration_hours()),
        ("Quality", analytics.average_sleep_quality),
        ("Deep sleep (min)", analytics.average_deep_sleep_minutes),
        ("REM sleep (min)", analytics.average_rem_sleep_minutes),
        ("Light sleep (min)", analytics.average_light_sleep_minutes),
    ] {
        content.push_str(&format!(
            "<tr><th>{label}</th><td>{}</td></tr>\n",
            fmt_opt(value)
        ));
    }
    content.push_str("</table>\n");

    content.push_str("<h2>Trends</h2>\n<table>\n<tr><th>Metric</th><th>Direction</th><th>Strength</th><th>Change/day</th></tr>\n");
    for trend in [&analytics.duration_trend, &analytics.quality_trend]
        .into_iter()
        .flatten()
    {
        content.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(trend.metric.as_deref().unwrap_or("-")),
            escape(trend.direction.as_deref().unwrap_or("-")),
            fmt_opt(trend.strength),
            fmt_opt(trend.average_change),
        ));
    }
    content.push_str("</table>\n");

    content.push_str(&format!(
        "<table>\n<tr><th>Schedule consistency</th><td>{}</td></tr>\n\
         <tr><th>Duration variability</th><td>{}</td></tr>\n</table>\n",
        fmt_opt(analytics.schedule_consistency),
        fmt_opt(analytics.duration_variability),
    ));

    if !analytics.recommendations.is_empty() {
        content.push_str("<h2>Recommendations</h2>\n<ul>\n");
        for recommendation in &analytics.recommendations {
            content.push_str(&format!("<li>{}</li>\n", escape(recommendation)));
        }
        content.push_str("</ul>\n");
    }

    page(
        &format!("Sleep Analytics - {}", ctx.user_id),
        flash_none(),
        &content,
    )
}

pub fn render_generate_form(flash: &Flash) -> String {
    // ---
    let content = r#"<h1>Generate Dummy Data</h1>
<p>Ask the microservice to generate synthetic sleep records for testing.</p>
<form action="/generate-dummy-data" method="post">
  <label for="user_id">User ID</label>
  <input type="text" id="user_id" name="user_id" required />
  <label for="days">Days (1-365)</label>
  <input type="number" id="days" name="days" value="30" />
  <label><input type="checkbox" name="include_time_series" /> Include time series</label>
  <label for="sleep_quality_trend">Sleep quality trend</label>
  <select id="sleep_quality_trend" name="sleep_quality_trend">
    <option value="">None</option>
    <option value="improving">Improving</option>
    <option value="declining">Declining</option>
  </select>
  <label for="sleep_duration_trend">Sleep duration trend</label>
  <select id="sleep_duration_trend" name="sleep_duration_trend">
    <option value="">None</option>
    <option value="increasing">Increasing</option>
    <option value="decreasing">Decreasing</option>
  </select>
  <p><button type="submit">Generate</button></p>
</form>"#;
    page("Generate Dummy Data", flash, content)
}

// ---

fn page(title: &str, flash: &Flash, content: &str) -> String {
    PAGE_SHELL
        .replace("{{TITLE}}", &escape(title))
        .replace("{{FLASH}}", &flash_html(flash))
        .replace("{{CONTENT}}", content)
}

fn flash_none() -> &'static Flash {
    static NONE: Flash = Flash {
        error: None,
        message: None,
    };
    &NONE
}

fn flash_html(flash: &Flash) -> String {
    // ---
    let mut html = String::new();
    if let Some(error) = &flash.error {
        html.push_str(&format!(
            "<p class=\"flash error\">{}</p>\n",
            escape(error)
        ));
    }
    if let Some(message) = &flash.message {
        html.push_str(&format!(
            "<p class=\"flash success\">{}</p>\n",
            escape(message)
        ));
    }
    html
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or("-".to_string(), |v| format!("{v:.1}"))
}

fn fmt_opt_u32(value: Option<u32>) -> String {
    value.map_or("-".to_string(), |v| v.to_string())
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or(String::new(), |v| format!("{v:.1}%"))
}

const PAGE_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 0; background: #f4f6fb; color: #1f2633; }
    main { max-width: 960px; margin: 0 auto; padding: 24px 16px 48px; }
    nav { background: #2f4858; padding: 12px 16px; }
    nav a { color: #fff; margin-right: 16px; text-decoration: none; }
    table { border-collapse: collapse; margin: 16px 0; }
    th, td { border: 1px solid #d5dbe5; padding: 6px 10px; text-align: left; }
    th { background: #e8edf5; }
    .flash { padding: 10px 14px; border-radius: 6px; margin: 16px 0; }
    .flash.error { background: #fbe3e0; color: #8c2f24; }
    .flash.success { background: #e2f3e5; color: #215f2c; }
    form label { display: block; margin: 10px 0 4px; }
  </style>
</head>
<body>
  <nav>
    <a href="/">Home</a>
    <a href="/dashboard">Dashboard</a>
    <a href="/generate-dummy-data">Generate Data</a>
    <a href="/about">About</a>
  </nav>
  <main>
{{FLASH}}
{{CONTENT}}
  </main>
</body>
</html>
"#;
