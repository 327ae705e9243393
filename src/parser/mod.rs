pub mod event;
pub mod fields;
pub mod segment;
pub mod text;
pub mod venue;

use std::fmt;

use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::error::ParseError;
use crate::settings::Selectors;
use event::Event;
use fields::TAXONOMY;
use text::CandidatePool;

/// Compiled form of [`Selectors`].
pub struct PageSelectors {
    pub nodes: Selector,
    pub marker: Selector,
    pub heading: Selector,
    pub organization: Selector,
    pub title: Selector,
    pub description: Selector,
    pub extra_info: Selector,
    pub date_format: String,
}

impl PageSelectors {
    pub fn compile(s: &Selectors) -> Result<Self, ParseError> {
        Ok(PageSelectors {
            nodes: compile(&s.nodes)?,
            marker: compile(&s.date_marker)?,
            heading: compile(&s.date_heading)?,
            organization: compile(&s.organization)?,
            title: compile(&s.title)?,
            description: compile(&s.description)?,
            extra_info: compile(&s.extra_info)?,
            date_format: s.date_format.clone(),
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Something worth a manual look; never stops processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Conflict {
        event: String,
        rule: &'static str,
        candidates: Vec<String>,
    },
    Unmatched {
        event: String,
        leftovers: Vec<String>,
    },
    Untyped {
        event: String,
        rule: &'static str,
        candidate: String,
    },
    OrphanEntries {
        count: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Conflict { event, rule, candidates } => {
                write!(f, "{}: ambiguous {} ({})", event, rule, candidates.join(" | "))
            }
            Diagnostic::Unmatched { event, leftovers } => {
                write!(f, "{}: unmatched {}", event, leftovers.join(" | "))
            }
            Diagnostic::Untyped { event, rule, candidate } => {
                write!(f, "{}: unusable {} value `{}`", event, rule, candidate)
            }
            Diagnostic::OrphanEntries { count } => {
                write!(f, "{} entries before the first date were skipped", count)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct PageReport {
    pub events: Vec<Event>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Calendar HTML → dated entries → candidates → fields → events.
pub fn process_page(html: &str, selectors: &Selectors) -> Result<PageReport, ParseError> {
    let sel = PageSelectors::compile(selectors)?;
    let doc = Html::parse_document(html);
    let nodes: Vec<_> = doc.select(&sel.nodes).collect();

    let segmented = segment::segment(&nodes, &sel)?;
    let mut report = PageReport::default();

    if segmented.orphans > 0 {
        warn!(count = segmented.orphans, "Entries before the first date marker");
        report.diagnostics.push(Diagnostic::OrphanEntries {
            count: segmented.orphans,
        });
    }

    for (date, index, node) in segmented.entries {
        let head = event::header(&node, index, &sel.organization, &sel.title)?;
        let label = head.1.clone();

        let pool = CandidatePool::from_blocks(
            &event::block_text(&node, &sel.description),
            &event::block_text(&node, &sel.extra_info),
        );
        let classified = fields::classify(pool, &TAXONOMY);
        let location = venue::resolve(classified.residual);

        for c in classified.conflicts {
            report.diagnostics.push(Diagnostic::Conflict {
                event: label.clone(),
                rule: c.rule,
                candidates: c.candidates,
            });
        }
        for (rule, candidate) in classified.untyped {
            report.diagnostics.push(Diagnostic::Untyped {
                event: label.clone(),
                rule,
                candidate,
            });
        }
        if !location.leftovers.is_empty() {
            warn!(event = %label, leftovers = ?location.leftovers, "Unmatched fields");
            report.diagnostics.push(Diagnostic::Unmatched {
                event: label.clone(),
                leftovers: location.leftovers.clone(),
            });
        }

        report
            .events
            .push(event::assemble(head, date, classified.fields, &location));
    }

    info!(
        events = report.events.len(),
        days = segmented.groups.len(),
        warnings = report.diagnostics.len(),
        "Processed calendar page"
    );
    Ok(report)
}

// ── Tests ──
