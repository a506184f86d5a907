/// Specifies the direction for sorting documents.
///
/// # Purpose
/// Defines whether documents should be sorted in ascending (low to high) or
/// descending (high to low) order. The sort normalizer canonicalizes every
/// accepted sort shape to `(field, direction)` pairs using the numeric
/// direction of this enum.
///
/// # Characteristics
/// - **Copy**: Can be copied instead of cloned
/// - **Comparable**: Can be compared for equality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in ascending order (smallest to largest, A-Z, oldest to newest)
    Ascending,
    /// Sort in descending order (largest to smallest, Z-A, newest to oldest)
    Descending,
}

impl SortOrder {
    /// The numeric direction used in canonical sort pairs: `1` for ascending,
    /// `-1` for descending.
    #[inline]
    pub fn direction(&self) -> i64 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }

    /// Parses a direction word, case-insensitively. Anything other than
    /// `asc` sorts descending; a missing direction defaults to ascending.
    pub fn from_word(word: Option<&str>) -> SortOrder {
        match word {
            None => SortOrder::Ascending,
            Some(w) => {
                if w.eq_ignore_ascii_case("asc") {
                    SortOrder::Ascending
                } else {
                    SortOrder::Descending
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_values() {
        assert_eq!(SortOrder::Ascending.direction(), 1);
        assert_eq!(SortOrder::Descending.direction(), -1);
    }

    #[test]
    fn test_from_word() {
        assert_eq!(SortOrder::from_word(None), SortOrder::Ascending);
        assert_eq!(SortOrder::from_word(Some("asc")), SortOrder::Ascending);
        assert_eq!(SortOrder::from_word(Some("ASC")), SortOrder::Ascending);
        assert_eq!(SortOrder::from_word(Some("desc")), SortOrder::Descending);
        assert_eq!(SortOrder::from_word(Some("DESC")), SortOrder::Descending);
        assert_eq!(SortOrder::from_word(Some("sideways")), SortOrder::Descending);
    }
}
