//! Write-time text normalization for profile fields.

/// Render a name with every word capitalized: `"budi SANTOSO"` becomes
/// `"Budi Santoso"`. A word starts at any alphanumeric character that follows
/// a non-word character, so `"o'neil"` becomes `"O'Neil"`.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_is_word = false;

    for ch in input.to_lowercase().chars() {
        let is_word = ch.is_alphanumeric() || ch == '_';
        if is_word && !prev_is_word {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        prev_is_word = is_word;
    }

    out
}

/// Addresses are stored fully upper-case.
pub fn upper_case(input: &str) -> String {
    input.to_uppercase()
}
