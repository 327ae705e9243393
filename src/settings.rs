use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// CSS selectors and formats for the calendar page layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Flat sequence of markers and entries, in document order.
    pub nodes: String,
    pub date_marker: String,
    /// Heading inside a marker holding the date text.
    pub date_heading: String,
    pub date_format: String,
    pub organization: String,
    pub title: String,
    pub description: String,
    pub extra_info: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            nodes: ".evtList_Evt, .evtList_Date".into(),
            date_marker: ".evtList_Date".into(),
            date_heading: "h1, h2, h3, h4, h5, h6".into(),
            date_format: "%B %d, %Y".into(),
            organization: ".evtList_Org".into(),
            title: ".evtList_Title".into(),
            description: ".evtList_Desc".into(),
            extra_info: ".evtList_Extra".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub region: String,
    /// Format of the date range form fields.
    pub form_date_format: String,
    pub credentials_path: PathBuf,
    pub cache_path: PathBuf,
    pub selectors: Selectors,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: "http://masterplanneronline.com".into(),
            region: "newyork".into(),
            form_date_format: "%m/%d/%Y".into(),
            credentials_path: "credentials.json".into(),
            cache_path: "data/calendar.html".into(),
            selectors: Selectors::default(),
        }
    }
}

impl Settings {
    /// Defaults, then `masterplanner.toml` if present, then `MP_*` env vars.
    pub fn load() -> Result<Self> {
        Config::builder()
            .add_source(File::with_name("masterplanner").required(false))
            .add_source(Environment::with_prefix("MP").prefix_separator("_").separator("__"))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn login_url(&self) -> String {
        format!("{}/Handlers/Login.ashx?region={}", self.base_url, self.region)
    }

    pub fn calendar_url(&self) -> String {
        format!("{}/{}", self.base_url, self.region)
    }
}

/// Load once for the whole process. Later calls return the first value.
pub fn init() -> Result<&'static Settings> {
    if let Some(s) = SETTINGS.get() {
        return Ok(s);
    }
    let loaded = Settings::load()?;
    Ok(SETTINGS.get_or_init(|| loaded))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_region() {
        let s = Settings {
            region: "boston".into(),
            ..Default::default()
        };
        assert_eq!(
            s.login_url(),
            "http://masterplanneronline.com/Handlers/Login.ashx?region=boston"
        );
        assert_eq!(s.calendar_url(), "http://masterplanneronline.com/boston");
    }

    #[test]
    fn partial_source_keeps_defaults() {
        let s: Settings = Config::builder()
            .set_override("region", "dc")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(s.region, "dc");
        assert_eq!(s.selectors.date_marker, ".evtList_Date");
        assert_eq!(s.form_date_format, "%m/%d/%Y");
    }
}
