//! Frequency defaults (C3.4): a deterministic heuristic used whenever a
//! corpus supplies no real frequency data. This is the *only* source of
//! frequency the fuzzy matcher's candidate sampling and tie-breaking ever
//! see for such corpora.

const BASE: f64 = 1000.0;
const COMMON_SUFFIXES: &[&str] = &["ing", "tion", "ed", "er", "ly", "s"];
const COMMON_PREFIXES: &[&str] = &["un", "re", "in", "dis"];

/// Deterministic frequency heuristic for a normalized word with no observed
/// corpus frequency: base 1000, length penalty above a small threshold,
/// common-affix and balanced-vowel-ratio bonuses, floor 1.
pub fn heuristic(normalized: &str) -> u64 {
    let len = normalized.chars().count();
    if len == 0 {
        return 1;
    }

    let mut score = BASE;

    const LENGTH_THRESHOLD: usize = 6;
    if len > LENGTH_THRESHOLD {
        score -= ((len - LENGTH_THRESHOLD) as f64) * 40.0;
    }

    if COMMON_SUFFIXES.iter().any(|suf| normalized.ends_with(suf)) {
        score += 50.0;
    }
    if COMMON_PREFIXES.iter().any(|pre| normalized.starts_with(pre)) {
        score += 30.0;
    }

    let vowels = normalized.chars().filter(|c| "aeiou".contains(*c)).count();
    let ratio = vowels as f64 / len as f64;
    // Reward ratios near the typical English 0.4, penalize extremes.
    let balance_bonus = (1.0 - (ratio - 0.4).abs() * 2.0).max(0.0) * 40.0;
    score += balance_bonus;

    score.max(1.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[test]
    fn empty_word_floors_at_one() {
        check!(heuristic("") == 1);
    }

    #[test]
    fn is_deterministic() {
        check!(heuristic("apple") == heuristic("apple"));
    }

    #[rstest]
    #[case("a")]
    #[case("verylongandunusualtechnicalterm")]
    #[case("running")]
    #[case("unhelpful")]
    fn never_below_floor(#[case] word: &str) {
        check!(heuristic(word) >= 1);
    }

    #[test]
    fn long_words_score_lower_than_short_common_ones() {
        check!(heuristic("cat") > heuristic("supercalifragilisticexpialidocious"));
    }
}
