//! Splitting a one-line street address into street name and house number.

use std::sync::LazyLock;

use regex::Regex;

/// `<street> <digits><optional letter>` at the end of the line.
static STREET_HOUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<street>.*?\S)\s+(?P<house>\d+\p{L}?)$").expect("Invalid regex")
});

/// Street name and house number extracted from an address line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub street: String,
    /// Empty when the line carries no trailing house number.
    pub house: String,
}

/// Split `"Herzl 12"` into `("Herzl", "12")`.
///
/// A trailing token of digits with an optional one-letter suffix (`5B`, `7א`)
/// is taken as the house number. Without one, the whole trimmed line is the
/// street and the house number is empty.
#[must_use]
pub fn split_address(line: &str) -> AddressParts {
    let line = line.trim();

    STREET_HOUSE_RE.captures(line).map_or_else(
        || AddressParts {
            street: line.to_string(),
            house: String::new(),
        },
        |caps| AddressParts {
            street: caps["street"].to_string(),
            house: caps["house"].to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(street: &str, house: &str) -> AddressParts {
        AddressParts {
            street: street.to_string(),
            house: house.to_string(),
        }
    }

    #[test]
    fn test_split_street_and_number() {
        assert_eq!(split_address("Herzl 12"), parts("Herzl", "12"));
    }

    #[test]
    fn test_split_without_number_keeps_street() {
        assert_eq!(split_address("Herzl"), parts("Herzl", ""));
    }

    #[test]
    fn test_split_multi_word_street_with_letter_suffix() {
        assert_eq!(
            split_address("  Sderot Rothschild 5B "),
            parts("Sderot Rothschild", "5B")
        );
    }

    #[test]
    fn test_split_hebrew_street_and_suffix() {
        assert_eq!(split_address("הרצל 7א"), parts("הרצל", "7א"));
    }

    #[test]
    fn test_split_number_not_at_end_is_street() {
        assert_eq!(
            split_address("Derech 2000 North"),
            parts("Derech 2000 North", "")
        );
    }

    #[test]
    fn test_split_lone_number_is_street() {
        assert_eq!(split_address("12"), parts("12", ""));
    }

    #[test]
    fn test_split_empty_line() {
        assert_eq!(split_address("   "), AddressParts::default());
    }
}
