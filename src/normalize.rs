//! Text normalizer (C1): folds a raw query or vocabulary entry into the
//! canonical form every matcher operates on.
//!
//! Grounded in `unicode-normalization`, the crate the `harryzorus-sorex`
//! sibling example in this pack already depends on for the identical
//! NFD-then-strip-combining-marks diacritic stripping.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fixed table of punctuation variants folded to their ASCII equivalents
/// before diacritic stripping. Order matters: longer look-alikes first is
/// unnecessary here since every entry is a single `char`.
const PUNCTUATION_FOLDS: &[(char, char)] = &[
    ('\u{2018}', '\''), // left single quote
    ('\u{2019}', '\''), // right single quote / apostrophe
    ('\u{201B}', '\''), // single high-reversed-9 quote
    ('\u{02BC}', '\''), // modifier letter apostrophe
    ('\u{201C}', '"'),  // left double quote
    ('\u{201D}', '"'),  // right double quote
    ('\u{2013}', '-'),  // en dash
    ('\u{2014}', '-'),  // em dash
    ('\u{2212}', '-'),  // minus sign
    ('\u{00A0}', ' '),  // non-breaking space
    ('\u{2009}', ' '),  // thin space
    ('\u{200B}', ' '),  // zero-width space
];

fn fold_punctuation(c: char) -> char {
    PUNCTUATION_FOLDS
        .iter()
        .find(|(from, _)| *from == c)
        .map_or(c, |(_, to)| *to)
}

fn is_keepable(c: char) -> bool {
    c.is_alphanumeric() || c == ' ' || c == '\'' || c == '-'
}

/// Normalize a raw string into the canonical matching key.
///
/// Total, pure, deterministic, idempotent, and length-non-increasing in
/// codepoints. Preserves the word/phrase distinction (a multi-word input
/// remains multi-word; spaces survive step 5's filter).
pub fn normalize(s: &str) -> String {
    // 1. NFC
    let nfc: String = s.nfc().collect();

    // 2. Fold quote/dash/space variants to ASCII equivalents.
    let folded: String = nfc.chars().map(fold_punctuation).collect();

    // 3. Strip combining marks via NFD-then-filter-then-recompose.
    let stripped: String = folded
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .nfc()
        .collect();

    // 4. Lowercase.
    let lower = stripped.to_lowercase();

    // 5. Replace anything outside [alnum, space, apostrophe, hyphen] with space.
    let filtered: String = lower
        .chars()
        .map(|c| if is_keepable(c) { c } else { ' ' })
        .collect();

    // 6. Collapse whitespace runs, 7. trim.
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical anagram key: sort the characters of `normalize(s)` with spaces
/// removed. Used to bucket fuzzy-match candidates by letter bag.
pub fn signature(s: &str) -> String {
    let mut chars: Vec<char> = normalize(s).chars().filter(|c| *c != ' ').collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

/// Normalize a batch of strings, preserving input order. Independent per
/// element, so callers on a worker pool may parallelize freely.
pub fn batch_normalize(items: &[String]) -> Vec<String> {
    items.iter().map(|s| normalize(s)).collect()
}

/// Whether a normalized string is a phrase (contains a space) rather than a
/// single word.
pub fn is_phrase(normalized: &str) -> bool {
    normalized.contains(' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("Café", "cafe")]
    #[case("  Hello   World  ", "hello world")]
    #[case("don’t", "don't")]
    #[case("naïve—approach", "naive-approach")]
    #[case("résumé, CV!", "resume cv")]
    #[case("", "")]
    #[case("   ", "")]
    fn normalize_cases(#[case] input: &str, #[case] expected: &str) {
        check!(normalize(input) == expected);
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = ["Café naïve", "HELLO-world", "  déjà vu  ", "plain"];
        for s in samples {
            let once = normalize(s);
            let twice = normalize(&once);
            check!(once == twice);
        }
    }

    #[test]
    fn normalize_is_length_non_increasing() {
        for s in ["Café", "HELLO WORLD!!!", "  spacey   text  "] {
            check!(normalize(s).chars().count() <= s.chars().count());
        }
    }

    #[test]
    fn normalize_preserves_word_vs_phrase_distinction() {
        check!(!is_phrase(&normalize("apple")));
        check!(is_phrase(&normalize("bon vivant")));
    }

    #[test]
    fn signature_is_anagram_invariant() {
        check!(signature("listen") == signature("silent"));
        check!(signature("Bon Vivant") == signature("bovntaivn"));
    }

    #[test]
    fn batch_normalize_preserves_order() {
        let input = vec!["Banana".to_string(), "Apple".to_string(), "Cherry".to_string()];
        let out = batch_normalize(&input);
        check!(out == vec!["banana", "apple", "cherry"]);
    }
}
