//! Common utility functions shared across the codebase.

/// Checks if the text contains at least one Unicode alphabetic character.
///
/// Returns false for empty strings, pure numbers, or pure symbols.
///
/// # Examples
///
/// ```
/// use glotx::utils::contains_alphabetic;
///
/// assert!(contains_alphabetic("Hello"));
/// assert!(contains_alphabetic("你好"));
/// assert!(contains_alphabetic("Hello123"));
/// assert!(!contains_alphabetic("123"));
/// assert!(!contains_alphabetic("---"));
/// assert!(!contains_alphabetic(""));
/// ```
pub fn contains_alphabetic(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic())
}

/// Collapses every run of whitespace into a single space and trims both ends.
///
/// Idempotent: `normalize_whitespace(normalize_whitespace(x)) == normalize_whitespace(x)`.
///
/// ```
/// use glotx::utils::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  Hello \n\t world  "), "Hello world");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns arbitrary text into lowercase ASCII words joined by `_`.
///
/// Non-ASCII characters act as separators, so text without any ASCII
/// letters or digits yields an empty slug. `max_words` limits how many
/// words are kept.
///
/// ```
/// use glotx::utils::slugify;
///
/// assert_eq!(slugify("Hello, World!", None), "hello_world");
/// assert_eq!(slugify("UserProfileCard", None), "user_profile_card");
/// assert_eq!(slugify("one two three four five", Some(3)), "one_two_three");
/// ```
pub fn slugify(text: &str, max_words: Option<usize>) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            // Split camelCase / PascalCase boundaries into separate words.
            if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            current.push(c.to_ascii_lowercase());
        } else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    let limit = max_words.unwrap_or(usize::MAX);
    words.into_iter().take(limit).collect::<Vec<_>>().join("_")
}

/// Returns the 1-based line number that contains `offset`.
pub fn line_of_offset(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}
