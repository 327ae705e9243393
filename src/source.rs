use anyhow::Result;
use chrono::{Months, NaiveDate};

use crate::cache::PageCache;

/// Anything that can hand back the raw calendar HTML for a date range.
pub trait CalendarSource {
    fn fetch(&self, from: NaiveDate, to: NaiveDate) -> Result<String>;
}

/// Serves the cached page when there is one, otherwise fetches and caches.
pub struct CachedSource<S> {
    inner: S,
    cache: PageCache,
}

impl<S: CalendarSource> CachedSource<S> {
    pub fn new(inner: S, cache: PageCache) -> Self {
        CachedSource { inner, cache }
    }
}

impl<S: CalendarSource> CalendarSource for CachedSource<S> {
    fn fetch(&self, from: NaiveDate, to: NaiveDate) -> Result<String> {
        if let Some(html) = self.cache.read_if_present()? {
            return Ok(html);
        }
        let html = self.inner.fetch(from, to)?;
        self.cache.write(&html)?;
        Ok(html)
    }
}

/// `today` through twelve months later.
pub fn default_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let to = today.checked_add_months(Months::new(12)).unwrap_or(NaiveDate::MAX);
    (today, to)
}

// ── Tests ──
