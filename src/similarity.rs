//! Name similarity: edit distance corrected for length gap, and the one
//! closeness threshold shared by enum and property matching.

/// Fraction of the shorter name's length tolerated as distance.
const CLOSENESS_RATIO_DENOM: usize = 2;

/// Edit distance of the lower-cased names minus their length difference.
///
/// Plain edit distance punishes `city` vs `homecity` for the four letters
/// of prefix; subtracting the gap scores containment as a near match.
pub fn distance(a: &str, b: &str) -> usize {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let gap = a.chars().count().abs_diff(b.chars().count());
    // Edit distance is never below the length gap.
    strsim::levenshtein(&a, &b) - gap
}

/// `floor(min(len a, len b) * 0.5)`.
pub fn closeness_threshold(a: &str, b: &str) -> usize {
    let shorter = a.to_lowercase().chars().count().min(b.to_lowercase().chars().count());
    shorter / CLOSENESS_RATIO_DENOM
}

pub fn is_close_enough(a: &str, b: &str) -> bool {
    distance(a, b) <= closeness_threshold(a, b)
}

/// Case-insensitive equality; always stronger than [`is_close_enough`].
pub fn names_equal(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_discounts_length_gap() {
        assert_eq!(distance("city", "homeCity"), 0);
        assert_eq!(distance("Colour", "Color"), 0);
        assert_eq!(distance("Name", "NAME"), 0);
        // kitten/sitting: edit distance 3, gap 1
        assert_eq!(distance("kitten", "sitting"), 2);
    }

    #[test]
    fn distance_counts_characters_not_bytes() {
        assert_eq!(distance("Größe", "grösse"), 1);
        assert_eq!(distance("café", "cafe"), 1);
    }

    #[test]
    fn distance_is_symmetric() {
        for (a, b) in [("address", "city"), ("FirstName", "first"), ("", "abc"), ("Red", "Ultraviolet")] {
            assert_eq!(distance(a, b), distance(b, a), "{a} / {b}");
        }
    }

    #[test]
    fn threshold_law_holds_on_boundaries() {
        let pairs = [
            ("", ""),
            ("", "abc"),
            ("a", "b"),
            ("ab", "cd"),
            ("Name", "name"),
            ("Colour", "Color"),
            ("Yellow", "Red"),
            ("Yellow", "Blue"),
            ("Ultraviolet", "Green"),
            ("surname", "lastName"),
        ];
        for (a, b) in pairs {
            let shorter = a.chars().count().min(b.chars().count());
            let expected = distance(a, b) <= (shorter as f64 * 0.5).floor() as usize;
            assert_eq!(is_close_enough(a, b), expected, "{a} / {b}");
        }
    }

    #[test]
    fn equal_names_are_always_close() {
        for s in ["", "x", "Name", "CustomerIdentifier"] {
            assert_eq!(distance(s, s), 0);
            assert!(is_close_enough(s, &s.to_uppercase()));
        }
    }

    #[test]
    fn single_letter_names_need_exact_match() {
        assert!(!is_close_enough("a", "b"));
        assert!(is_close_enough("x", "X"));
    }

    #[test]
    fn names_equal_ignores_case_only() {
        assert!(names_equal("FirstName", "firstname"));
        assert!(!names_equal("FirstName", "first_name"));
    }
}
