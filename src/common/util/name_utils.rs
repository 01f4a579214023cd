/// Strips SQL identifier quoting from a column or attribute name.
///
/// Removes any leading or trailing bracket, double-quote, single-quote or
/// backtick characters. The interior of the name is left untouched.
pub fn unquote_name(name: &str) -> String {
    name.trim()
        .trim_matches(|c| matches!(c, '[' | ']' | '"' | '\'' | '`'))
        .to_string()
}

/// Returns the lowercased, unquoted form of a name used for
/// case-insensitive column/attribute matching.
pub fn matching_name(name: &str) -> String {
    unquote_name(name).to_lowercase()
}
