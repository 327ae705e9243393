use std::collections::BTreeMap;

use chrono::NaiveDate;
use scraper::{ElementRef, Selector};
use serde::Serialize;

use super::fields::FieldValue;
use super::venue::Location;
use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub organization: String,
    pub name: String,
    pub date: NaiveDate,
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
}

/// Organization and title from the entry's header.
pub fn header(
    node: &ElementRef,
    index: usize,
    organization: &Selector,
    title: &Selector,
) -> Result<(String, String), ParseError> {
    let organization = required_text(node, organization)
        .ok_or(ParseError::MissingHeader { index, field: "organization" })?;
    let name = required_text(node, title).ok_or(ParseError::MissingHeader { index, field: "title" })?;
    Ok((organization, name))
}

pub fn assemble(
    (organization, name): (String, String),
    date: NaiveDate,
    fields: BTreeMap<String, FieldValue>,
    location: &Location,
) -> Event {
    Event {
        organization,
        name,
        date,
        fields,
        city: location.city.clone(),
        venue: location.venue.clone(),
    }
}

/// Raw text of every element matching `sel`, concatenated.
pub fn block_text(node: &ElementRef, sel: &Selector) -> String {
    node.select(sel)
        .flat_map(|el| el.text())
        .collect::<Vec<_>>()
        .concat()
}

fn required_text(node: &ElementRef, sel: &Selector) -> Option<String> {
    let el = node.select(sel).next()?;
    let text = el.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// ── Tests ──
