//! String constraints shared by identities, parameters and catalog entries.
//!
//! Each check returns a human-readable message naming the field, the offending
//! value and the expected constraint; callers wrap it in their own error type.

/// Check that `value` is between `min` and `max` characters long.
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(format!(
            "{} '{}' must be {}-{} characters long, got {}",
            field, value, min, max, len
        ));
    }
    Ok(())
}

/// Check a lowercase identifier: a letter `a-z` followed by `a-z`, `0-9` or `_`.
pub fn check_identifier(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    check_length(field, value, min, max)?;

    let mut chars = value.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_valid = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !starts_with_letter || !rest_valid {
        return Err(format!(
            "{} '{}' must start with a lowercase letter and contain only a-z, 0-9 and '_'",
            field, value
        ));
    }
    Ok(())
}

/// Check a display name made of capitalized words, e.g. "Harmonie Arome".
///
/// The first word is letters only; later words may contain digits.
pub fn check_capitalized_words(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    check_length(field, value, min, max)?;

    let invalid = || {
        format!(
            "{} '{}' must be capitalized words separated by single spaces",
            field, value
        )
    };

    for (index, word) in value.split(' ').enumerate() {
        let mut chars = word.chars();
        if !chars.next().is_some_and(|c| c.is_ascii_uppercase()) {
            return Err(invalid());
        }
        let rest_valid = if index == 0 {
            chars.all(|c| c.is_ascii_alphabetic())
        } else {
            chars.all(|c| c.is_ascii_alphanumeric())
        };
        if !rest_valid {
            return Err(invalid());
        }
    }
    Ok(())
}
