use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::text::CandidatePool;

/// How a matched candidate becomes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Keep capture group 1.
    PrefixStrip,
    /// Keep the whole candidate.
    Unprefixed,
    /// Record `true`.
    Presence,
    /// Capture group 1 split on ", ".
    ListSplit,
    /// Capture group 1 without thousands separators, as an integer.
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
    Number(i64),
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub mode: ExtractionMode,
}

impl FieldRule {
    /// `pattern` is anchored on both ends; candidates must match in full.
    pub fn new(name: &'static str, pattern: &str, mode: ExtractionMode) -> Self {
        let anchored = format!("^(?:{})$", pattern);
        FieldRule {
            name,
            pattern: Regex::new(&anchored).unwrap(),
            mode,
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.pattern.is_match(candidate)
    }

    /// `None` when the payload can't be typed (numeric overflow).
    pub fn extract(&self, candidate: &str) -> Option<FieldValue> {
        let payload = || {
            self.pattern
                .captures(candidate)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim())
                .unwrap_or(candidate)
        };

        match self.mode {
            ExtractionMode::Unprefixed => Some(FieldValue::Text(candidate.to_string())),
            ExtractionMode::PrefixStrip => Some(FieldValue::Text(payload().to_string())),
            ExtractionMode::Presence => Some(FieldValue::Flag(true)),
            ExtractionMode::ListSplit => Some(FieldValue::List(
                payload()
                    .split(", ")
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            )),
            ExtractionMode::Numeric => payload()
                .replace(',', "")
                .parse::<i64>()
                .ok()
                .map(FieldValue::Number),
        }
    }
}

const TIME: &str = r"(?:\d{1,2}(?::\d{2})?\s?[AaPp]\.?[Mm]\.?|[Nn]oon)";

/// Rule order is significant: earlier rules consume candidates first.
pub static TAXONOMY: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    use ExtractionMode::*;
    vec![
        FieldRule::new("start_time", &format!(r"{TIME}(?:\s?(?:-|–|to)\s?{TIME})?"), Unprefixed),
        FieldRule::new("attire", r"(.+?)\s+[Aa]ttire", PrefixStrip),
        FieldRule::new("invitation_only", r"[Ii]nvitation [Oo]nly", Presence),
        FieldRule::new("speakers", r"Speaker\(s\): (.+)", ListSplit),
        FieldRule::new("honorees", r"Honoring (.+)", ListSplit),
        FieldRule::new("chairs", r"Chaired by (.+)", ListSplit),
        FieldRule::new("co_chairs", r"Co-chaired by (.+)", ListSplit),
        FieldRule::new("hosts", r"Hosted by (.+)", ListSplit),
        FieldRule::new("ticket_price", r"Tickets from\s?\$([\d,]+)\.?", Numeric),
        FieldRule::new("table_price", r"Tables from\s?\$([\d,]+)\.?", Numeric),
        FieldRule::new("contact_name", r"Contact: (.+)", PrefixStrip),
        FieldRule::new("contact_phone", r"\(?\d{3}\)?[\s.-]?\d{3}[\s.-]\d{4}", Unprefixed),
        FieldRule::new("website", r"Event web address: (.+)", PrefixStrip),
        FieldRule::new("address", r"Event address: (.+)", PrefixStrip),
    ]
});

/// Two or more candidates matched one rule; none were consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub rule: &'static str,
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub fields: BTreeMap<String, FieldValue>,
    pub residual: CandidatePool,
    pub conflicts: Vec<Conflict>,
    /// Single matches whose payload could not be typed; left in the pool.
    pub untyped: Vec<(&'static str, String)>,
}

/// Run `rules` in order against the remaining pool.
pub fn classify(pool: CandidatePool, rules: &[FieldRule]) -> Classification {
    let mut out = Classification::default();
    let mut pool = pool;

    for rule in rules {
        let hits = pool.positions(|c| rule.matches(c));
        match hits.as_slice() {
            [] => {}
            [idx] => {
                let candidate = pool.get(*idx).unwrap_or_default().to_string();
                match rule.extract(&candidate) {
                    Some(value) => {
                        out.fields.insert(rule.name.to_string(), value);
                        pool = pool.without(*idx);
                    }
                    None => {
                        warn!(rule = rule.name, %candidate, "Matched candidate has no usable value");
                        out.untyped.push((rule.name, candidate));
                    }
                }
            }
            many => {
                let candidates: Vec<String> = many
                    .iter()
                    .filter_map(|i| pool.get(*i))
                    .map(str::to_string)
                    .collect();
                warn!(rule = rule.name, ?candidates, "Ambiguous field, skipping");
                out.conflicts.push(Conflict {
                    rule: rule.name,
                    candidates,
                });
            }
        }
    }

    out.residual = pool;
    out
}

// ── Tests ──
