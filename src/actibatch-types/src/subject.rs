use std::cmp::Ordering;
use std::fmt;

/// Identifier of one study participant, as written in the export headers.
///
/// Most studies number their subjects, so ordering compares numerically
/// whenever both sides parse as integers ("7" sorts before "11"). Everything
/// else falls back to plain string order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SubjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for SubjectId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
            // Tie-break textually so "07" and "7" stay distinct keys
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            _ => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for SubjectId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_sort_numerically() {
        let mut ids = vec![SubjectId::new("11"), SubjectId::new("7"), SubjectId::new("2")];
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(SubjectId::as_str).collect();
        assert_eq!(sorted, vec!["2", "7", "11"]);
    }

    #[test]
    fn text_ids_sort_lexicographically() {
        let mut ids = vec![SubjectId::new("p10"), SubjectId::new("p2")];
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(SubjectId::as_str).collect();
        assert_eq!(sorted, vec!["p10", "p2"]);
    }

    #[test]
    fn padded_and_plain_numbers_stay_distinct() {
        let a = SubjectId::new("07");
        let b = SubjectId::new("7");
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn display_keeps_the_raw_id() {
        assert_eq!(SubjectId::new("7").to_string(), "7");
    }
}
