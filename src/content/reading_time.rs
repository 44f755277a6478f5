//! Reading time estimate for a post body

use super::ContentBlock;

/// Default reading speed in words per minute
pub const WORDS_PER_MINUTE: usize = 200;

/// Count whitespace-separated words across all block bodies
///
/// Headings are not counted.
pub fn word_count(blocks: &[ContentBlock]) -> usize {
    blocks
        .iter()
        .map(|b| b.text().split_whitespace().count())
        .sum()
}

/// Minutes needed to read the body, rounded up
pub fn reading_minutes(blocks: &[ContentBlock], words_per_minute: usize) -> usize {
    word_count(blocks).div_ceil(words_per_minute.max(1))
}

/// Reading time label, e.g. `4 min`
pub fn reading_time(blocks: &[ContentBlock], words_per_minute: usize) -> String {
    format!("{} min", reading_minutes(blocks, words_per_minute))
}
