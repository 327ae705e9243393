use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};

use crate::settings::Settings;
use crate::source::CalendarSource;

/// Login form fields, posted as-is.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Credentials in {} must be a JSON object of strings", path.display()))
    }

    pub fn form(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// `name=value` pair from the login response cookie; may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// First `; `-separated segment of a `Set-Cookie` value.
    pub fn from_set_cookie(header: &str) -> Self {
        SessionToken(header.split("; ").next().unwrap_or_default().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct SessionClient<'a> {
    http: Client,
    settings: &'a Settings,
}

impl<'a> SessionClient<'a> {
    pub fn new(settings: &'a Settings) -> Result<Self> {
        let http = Client::builder()
            .redirect(Policy::none())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(SessionClient { http, settings })
    }

    /// A rejected login is logged, not raised; the calendar request then
    /// goes out with whatever cookie came back.
    pub fn login(&self, credentials: &Credentials) -> Result<SessionToken> {
        let url = self.settings.login_url();
        info!("Logging in: {}", url);
        let res = self
            .http
            .post(&url)
            .form(credentials.form())
            .send()
            .context("Login request failed")?;

        if res.status() != StatusCode::OK {
            warn!(status = %res.status(), "Login did not return 200, continuing");
        }

        let token = res
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(SessionToken::from_set_cookie)
            .unwrap_or_default();
        if token.is_empty() {
            warn!("Login response carried no session cookie");
        }
        Ok(token)
    }

    pub fn fetch_calendar_body(
        &self,
        token: &SessionToken,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<String> {
        let form = calendar_form(from, to, &self.settings.form_date_format);
        let url = self.settings.calendar_url();

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner} [{elapsed_precise}] {msg}")?);
        pb.set_message(format!("Requesting events {} to {}", from, to));
        pb.enable_steady_tick(Duration::from_millis(120));

        info!("Beginning events request: {}", url);
        let start = Instant::now();
        let body = self
            .http
            .post(&url)
            .header(COOKIE, token.as_str())
            .form(&form)
            .send()
            .and_then(|r| r.text())
            .context("Calendar request failed");
        pb.finish_and_clear();

        let body = body?;
        info!(
            bytes = body.len(),
            "Completed events request in {:.1}s",
            start.elapsed().as_secs_f64()
        );
        Ok(body)
    }
}

/// Search form the calendar page posts back to itself.
pub fn calendar_form(from: NaiveDate, to: NaiveDate, date_format: &str) -> Vec<(&'static str, String)> {
    vec![
        ("__EVENTTARGET", String::new()),
        ("__EVENTARGUMENT", String::new()),
        ("ctl00$ddSearchType", "-1".to_string()),
        ("ctl00$ddDateRange", "Custom".to_string()),
        ("ctl00$txtDateFrom", from.format(date_format).to_string()),
        ("ctl00$txtDateTo", to.format(date_format).to_string()),
    ]
}

/// Logs in on every fetch, then posts the search form.
pub struct SiteSource<'a> {
    client: SessionClient<'a>,
    credentials: Credentials,
}

impl<'a> SiteSource<'a> {
    pub fn new(settings: &'a Settings, credentials: Credentials) -> Result<Self> {
        Ok(SiteSource {
            client: SessionClient::new(settings)?,
            credentials,
        })
    }
}

impl CalendarSource for SiteSource<'_> {
    fn fetch(&self, from: NaiveDate, to: NaiveDate) -> Result<String> {
        let token = self.client.login(&self.credentials)?;
        self.client.fetch_calendar_body(&token, from, to)
    }
}

// ── Tests ──
