/// 1 (easy) to 5 (hard) from word length and syllable count.
pub fn difficulty(word: &str, syllable_count: u32) -> u8 {
    let length_score = (word.chars().count() as f64 / 4.0).min(5.0);
    let syllable_score = f64::from(syllable_count).min(5.0);
    let raw = ((length_score + syllable_score) / 2.0).round();
    raw.clamp(1.0, 5.0) as u8
}

/// Shorter words are presumed more common. Not corpus-derived.
pub fn frequency_rank(word: &str) -> u32 {
    word.chars().count() as u32 * 100
}
