//! Text cleanup applied to record values before they reach the sheet.

/// Values the profile pages use in place of "unknown".
const PLACEHOLDERS: &[&str] = &[
    "not set", "no city", "no set", "none", "n/a", "null", "no age",
];

/// Trims, replaces non-breaking spaces and line breaks with spaces, and
/// collapses runs of whitespace into one space.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns an empty string for placeholder values, the cleaned text otherwise.
#[must_use]
pub fn blank_placeholder(text: &str) -> String {
    let cleaned = clean_text(text);
    if PLACEHOLDERS.contains(&cleaned.to_lowercase().as_str()) {
        String::new()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  hello\n\nworld \t !  "), "hello world !");
    }

    #[test]
    fn clean_text_replaces_non_breaking_space() {
        assert_eq!(clean_text("a\u{a0}\u{a0}b"), "a b");
    }

    #[test]
    fn clean_text_empty_stays_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n "), "");
    }

    #[test]
    fn blank_placeholder_is_case_insensitive() {
        assert_eq!(blank_placeholder("Not Set"), "");
        assert_eq!(blank_placeholder(" NO CITY "), "");
        assert_eq!(blank_placeholder("N/A"), "");
    }

    #[test]
    fn blank_placeholder_keeps_real_values() {
        assert_eq!(blank_placeholder(" Karachi "), "Karachi");
        assert_eq!(blank_placeholder("None of your business"), "None of your business");
    }
}
