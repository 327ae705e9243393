use std::ops::Range;

use chrono::NaiveDate;
use scraper::ElementRef;
use tracing::debug;

use super::PageSelectors;
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Marker,
    Entry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroup {
    pub date: NaiveDate,
    /// Entry indices in the node sequence; the marker itself is excluded.
    pub range: Range<usize>,
}

/// Index ranges owned by each marker, keyed by the marker's index.
///
/// A group runs from just after its marker to just before the next one. The
/// last group runs through the final node of the sequence, inclusive.
pub fn group_ranges(kinds: &[NodeKind]) -> Vec<(usize, Range<usize>)> {
    let markers: Vec<usize> = kinds
        .iter()
        .enumerate()
        .filter(|(_, k)| **k == NodeKind::Marker)
        .map(|(i, _)| i)
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = markers.get(n + 1).copied().unwrap_or(kinds.len());
            (start, start + 1..end)
        })
        .collect()
}

pub struct Segmented<'a> {
    pub groups: Vec<DateGroup>,
    /// Every entry after the first marker, in document order.
    pub entries: Vec<(NaiveDate, usize, ElementRef<'a>)>,
    /// Entries before the first marker.
    pub orphans: usize,
}

/// Split the flat node sequence into dated entries.
pub fn segment<'a>(
    nodes: &[ElementRef<'a>],
    sel: &PageSelectors,
) -> Result<Segmented<'a>, ParseError> {
    let kinds: Vec<NodeKind> = nodes
        .iter()
        .map(|n| {
            if sel.marker.matches(n) {
                NodeKind::Marker
            } else {
                NodeKind::Entry
            }
        })
        .collect();

    let ranges = group_ranges(&kinds);
    let orphans = ranges.first().map(|(m, _)| *m).unwrap_or(kinds.len());

    let mut groups = Vec::with_capacity(ranges.len());
    let mut entries = Vec::new();
    for (marker, range) in ranges {
        let date = marker_date(&nodes[marker], marker, sel)?;
        debug!(%date, entries = range.len(), "Date group at node {}", marker);
        entries.extend(range.clone().map(|i| (date, i, nodes[i])));
        groups.push(DateGroup { date, range });
    }

    Ok(Segmented {
        groups,
        entries,
        orphans,
    })
}

fn marker_date(node: &ElementRef, index: usize, sel: &PageSelectors) -> Result<NaiveDate, ParseError> {
    let heading = node
        .select(&sel.heading)
        .next()
        .ok_or(ParseError::MissingHeading { index })?;
    let text = heading.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    NaiveDate::parse_from_str(&text, &sel.date_format).map_err(|source| ParseError::BadDate {
        index,
        text,
        source,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Selectors;
    use scraper::Html;
    use NodeKind::*;

    fn covered(kinds: &[NodeKind]) -> Vec<usize> {
        group_ranges(kinds)
            .into_iter()
            .flat_map(|(_, r)| r)
            .collect()
    }

    #[test]
    fn last_group_includes_final_index() {
        let ranges = group_ranges(&[Marker, Entry, Entry]);
        assert_eq!(ranges, vec![(0, 1..3)]);
    }

    #[test]
    fn groups_stop_before_next_marker() {
        let ranges = group_ranges(&[Marker, Entry, Marker, Entry, Entry, Marker]);
        assert_eq!(ranges, vec![(0, 1..2), (2, 3..5), (5, 6..6)]);
    }

    #[test]
    fn partition_covers_every_entry_once() {
        let layouts: &[&[NodeKind]] = &[
            &[Marker, Entry, Entry, Marker, Entry],
            &[Marker, Marker, Entry],
            &[Entry, Marker, Entry, Entry, Marker, Marker, Entry, Entry, Entry],
            &[Marker],
            &[Entry, Entry],
            &[],
        ];
        for kinds in layouts {
            let first = kinds.iter().position(|k| *k == Marker).unwrap_or(kinds.len());
            let expected: Vec<usize> = (first..kinds.len()).filter(|&i| kinds[i] == Entry).collect();
            assert_eq!(covered(kinds), expected, "layout {:?}", kinds);
        }
    }

    fn page(body: &str) -> Html {
        Html::parse_document(&format!("<html><body><div id=\"evtList\">{}</div></body></html>", body))
    }

    fn run(doc: &Html) -> Result<Segmented<'_>, ParseError> {
        let sel = PageSelectors::compile(&Selectors::default()).unwrap();
        let nodes: Vec<_> = doc.select(&sel.nodes).collect();
        segment(&nodes, &sel)
    }

    #[test]
    fn dates_assigned_per_group() {
        let doc = page(
            r#"<div class="evtList_Date"><h2>January 15, 2015</h2></div>
               <div class="evtList_Evt">a</div>
               <div class="evtList_Date"><h2>February 2, 2015</h2></div>
               <div class="evtList_Evt">b</div>
               <div class="evtList_Evt">c</div>"#,
        );
        let seg = run(&doc).unwrap();
        let dates: Vec<String> = seg.entries.iter().map(|(d, _, _)| d.to_string()).collect();
        assert_eq!(dates, ["2015-01-15", "2015-02-02", "2015-02-02"]);
        assert_eq!(seg.groups[1].range, 3..5);
        assert_eq!(seg.orphans, 0);
    }

    #[test]
    fn entries_before_first_marker_are_orphans() {
        let doc = page(
            r#"<div class="evtList_Evt">early</div>
               <div class="evtList_Date"><h3>March 3, 2015</h3></div>
               <div class="evtList_Evt">a</div>"#,
        );
        let seg = run(&doc).unwrap();
        assert_eq!(seg.orphans, 1);
        assert_eq!(seg.entries.len(), 1);
        assert_eq!(seg.entries[0].1, 2);
    }

    #[test]
    fn bad_heading_aborts() {
        let doc = page(
            r#"<div class="evtList_Date"><h2>January 15, 2015</h2></div>
               <div class="evtList_Evt">a</div>
               <div class="evtList_Date"><h2>Someday soon</h2></div>"#,
        );
        match run(&doc) {
            Err(ParseError::BadDate { index, text, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(text, "Someday soon");
            }
            other => panic!("expected BadDate, got {:?}", other.map(|s| s.entries.len())),
        }
    }

    #[test]
    fn marker_without_heading_aborts() {
        let doc = page(r#"<div class="evtList_Date">January 15, 2015</div>"#);
        assert!(matches!(run(&doc), Err(ParseError::MissingHeading { index: 0 })));
    }
}
