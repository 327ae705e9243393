use std::sync::LazyLock;

use regex::Regex;

/// Any whitespace except U+00A0, which the site uses as a field delimiter.
static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\x{A0}]+").unwrap());

const FIELD_DELIMITER: &str = "\u{a0}\u{a0}";

/// Split one free-text block into ordered candidate fields.
pub fn candidates(raw: &str) -> Vec<String> {
    let joined = raw.replace("\r\n", "").replace(['\n', '\r'], "");
    let collapsed = SPACE_RUN_RE.replace_all(&joined, " ");

    collapsed
        .split(FIELD_DELIMITER)
        .map(|fragment| {
            let t = fragment.trim();
            t.strip_suffix('.').unwrap_or(t).to_string()
        })
        .filter(|c| !c.is_empty())
        .collect()
}

/// Ordered pool of candidates still waiting for a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePool {
    items: Vec<String>,
}

impl CandidatePool {
    pub fn new(items: Vec<String>) -> Self {
        CandidatePool { items }
    }

    /// Set union of both blocks: primary first, then extra info, each
    /// fragment kept at its first occurrence.
    pub fn from_blocks(primary: &str, extra: &str) -> Self {
        let mut items: Vec<String> = Vec::new();
        for c in candidates(primary).into_iter().chain(candidates(extra)) {
            if !items.contains(&c) {
                items.push(c);
            }
        }
        CandidatePool { items }
    }

    /// Copy of the pool with the entry at `idx` removed.
    pub fn without(&self, idx: usize) -> Self {
        let mut items = self.items.clone();
        items.remove(idx);
        CandidatePool { items }
    }

    pub fn positions<F>(&self, f: F) -> Vec<usize>
    where
        F: Fn(&str) -> bool,
    {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, c)| f(c.as_str()))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.items.get(idx).map(String::as_str)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn into_items(self) -> Vec<String> {
        self.items
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_double_nbsp() {
        let raw = "Benefit dinner.\u{a0}\u{a0}7:00 PM\u{a0}\u{a0}Black tie attire.";
        assert_eq!(candidates(raw), vec!["Benefit dinner", "7:00 PM", "Black tie attire"]);
    }

    #[test]
    fn removes_line_breaks_and_collapses_spaces() {
        let raw = "Hosted by\r\n   Jane   Doe\u{a0}\u{a0}\n\tMetropolitan   Club";
        assert_eq!(candidates(raw), vec!["Hosted by Jane Doe", "Metropolitan Club"]);
    }

    #[test]
    fn single_nbsp_is_not_a_delimiter() {
        let raw = "Tickets from\u{a0}$500";
        assert_eq!(candidates(raw), vec!["Tickets from\u{a0}$500"]);
    }

    #[test]
    fn strips_only_one_trailing_period() {
        assert_eq!(candidates("Gala Inc.."), vec!["Gala Inc."]);
    }

    #[test]
    fn period_stripped_after_trim() {
        assert_eq!(candidates("Foo .\u{a0}\u{a0}Bar."), vec!["Foo ", "Bar"]);
    }

    #[test]
    fn union_collapses_repeats_within_a_block() {
        let pool = CandidatePool::from_blocks(
            "Invitation only\u{a0}\u{a0}Metropolitan Club\u{a0}\u{a0}Invitation only",
            "Metropolitan Club\u{a0}\u{a0}New York",
        );
        assert_eq!(pool.items(), ["Invitation only", "Metropolitan Club", "New York"]);
    }

    #[test]
    fn drops_empty_fragments_keeps_duplicates() {
        let raw = "\u{a0}\u{a0} . \u{a0}\u{a0}New York\u{a0}\u{a0}New York\u{a0}\u{a0}";
        assert_eq!(candidates(raw), vec!["New York", "New York"]);
    }

    #[test]
    fn empty_block() {
        assert!(candidates("").is_empty());
        assert!(candidates("   \n  ").is_empty());
    }

    #[test]
    fn union_appends_new_extra_fragments() {
        let pool = CandidatePool::from_blocks(
            "7:00 PM\u{a0}\u{a0}Cocktail attire",
            "Cocktail attire\u{a0}\u{a0}Contact: Jane Doe",
        );
        assert_eq!(pool.items(), ["7:00 PM", "Cocktail attire", "Contact: Jane Doe"]);
    }

    #[test]
    fn without_leaves_original_untouched() {
        let pool = CandidatePool::new(vec!["a".into(), "b".into(), "c".into()]);
        let reduced = pool.without(1);
        assert_eq!(reduced.items(), ["a", "c"]);
        assert_eq!(pool.len(), 3);
    }
}
