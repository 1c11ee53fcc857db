//! Small text helpers.

/// Truncate `text` to at most `max_length` characters, ending with `suffix`
/// when anything was cut.
pub fn truncate(text: &str, max_length: usize, suffix: &str) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let keep = max_length.saturating_sub(suffix.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(suffix);
    out
}

/// Trim surrounding whitespace and drop embedded newlines and tabs.
pub fn sanitize_smiles(smiles: &str) -> String {
    smiles
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect()
}
