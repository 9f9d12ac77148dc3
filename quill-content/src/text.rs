//! Shared text helpers

/// Separator between markdown paragraphs
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Split markdown into paragraphs on blank lines
pub fn paragraphs(content: &str) -> Vec<&str> {
    content.split(PARAGRAPH_SEPARATOR).collect()
}

/// Case-insensitive substring count, overlapping matches included
///
/// Partial-word matches count: "savings" is found inside "savingsaccount".
/// Each match start is counted, so "ああ" occurs three times in "ああああ".
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    let needle = needle.trim();
    if needle.is_empty() {
        return 0;
    }
    let haystack = haystack.to_lowercase();
    let needle = needle.to_lowercase();

    let mut count = 0;
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(&needle) {
        count += 1;
        let start = from + offset;
        // Resume one character past the match start
        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    count
}

/// Length of the article in characters
///
/// Japanese text has no word separators, so the character count is used as
/// the article's word count.
pub fn character_count(content: &str) -> usize {
    content.chars().count()
}
