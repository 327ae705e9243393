use super::text::CandidatePool;

const CITIES: &[&str] = &[
    "New York",
    "NYC",
    "Manhattan",
    "Brooklyn",
    "Queens",
    "Bronx",
    "The Bronx",
    "Staten Island",
    "Long Island",
    "Hamptons",
    "Southampton",
    "East Hampton",
    "Greenwich",
    "Westchester",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub city: Option<String>,
    pub venue: Option<String>,
    /// Whatever nothing claimed.
    pub leftovers: Vec<String>,
}

pub fn is_city(candidate: &str) -> bool {
    CITIES.contains(&candidate)
}

/// The first recognized city, plus the entry right before it as the venue.
pub fn resolve(residual: CandidatePool) -> Location {
    let mut items = residual.into_items();

    let Some(idx) = items.iter().position(|c| is_city(c)) else {
        return Location {
            leftovers: items,
            ..Default::default()
        };
    };

    let city = items.remove(idx);
    let venue = if idx > 0 {
        Some(items.remove(idx - 1))
    } else {
        None
    };

    Location {
        city: Some(city),
        venue,
        leftovers: items,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(items: &[&str]) -> CandidatePool {
        CandidatePool::new(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn venue_precedes_city() {
        let loc = resolve(pool(&[
            "Annual benefit",
            "Metropolitan Club",
            "New York",
            "Reception follows",
        ]));
        assert_eq!(loc.city.as_deref(), Some("New York"));
        assert_eq!(loc.venue.as_deref(), Some("Metropolitan Club"));
        assert_eq!(loc.leftovers, ["Annual benefit", "Reception follows"]);
    }

    #[test]
    fn no_city_leaves_everything() {
        let loc = resolve(pool(&["Metropolitan Club", "Reception follows"]));
        assert!(loc.city.is_none());
        assert!(loc.venue.is_none());
        assert_eq!(loc.leftovers.len(), 2);
    }

    #[test]
    fn city_first_has_no_venue() {
        let loc = resolve(pool(&["Brooklyn", "Reception follows"]));
        assert_eq!(loc.city.as_deref(), Some("Brooklyn"));
        assert!(loc.venue.is_none());
        assert_eq!(loc.leftovers, ["Reception follows"]);
    }

    #[test]
    fn exact_match_only() {
        assert!(!is_city("New York City"));
        assert!(!is_city("new york"));
        assert!(is_city("The Bronx"));
    }

    #[test]
    fn first_city_wins() {
        let loc = resolve(pool(&["Pier Sixty", "Manhattan", "Boathouse", "Brooklyn"]));
        assert_eq!(loc.city.as_deref(), Some("Manhattan"));
        assert_eq!(loc.venue.as_deref(), Some("Pier Sixty"));
        assert_eq!(loc.leftovers, ["Boathouse", "Brooklyn"]);
    }

    #[test]
    fn empty_residual() {
        assert_eq!(resolve(CandidatePool::default()), Location::default());
    }
}
