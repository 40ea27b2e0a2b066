//! Language-dependent lemmatization (§3 supplement): derives
//! `lemmatized_vocabulary` and the bidirectional word↔lemma maps from an
//! already-built vocabulary. Snowball stemming stands in for true
//! lemmatization, same tradeoff the teacher's own dependency table already
//! commits to without ever wiring it up.

use super::Language;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};

fn algorithm_for(language: Language) -> Option<Algorithm> {
    match language {
        Language::English => Some(Algorithm::English),
        Language::Spanish => Some(Algorithm::Spanish),
        Language::French => Some(Algorithm::French),
        Language::German => Some(Algorithm::German),
        Language::Italian => Some(Algorithm::Italian),
        Language::Portuguese => Some(Algorithm::Portuguese),
        Language::Unknown => None,
    }
}

/// `None` for languages with no configured stemmer (per the data model,
/// lemmatization is optional and language-dependent); `Some` otherwise,
/// even for a corpus with zero words, for a stable "lemmatization enabled"
/// signal independent of corpus size.
pub(super) fn lemmatize(
    vocabulary: &[String],
    language: Language,
) -> Option<(Vec<String>, HashMap<String, String>, HashMap<String, HashSet<String>>)> {
    let algorithm = algorithm_for(language)?;
    let stemmer = Stemmer::create(algorithm);

    let mut lemmatized_vocabulary = Vec::with_capacity(vocabulary.len());
    let mut word_to_lemma = HashMap::with_capacity(vocabulary.len());
    let mut lemma_to_words: HashMap<String, HashSet<String>> = HashMap::new();

    for word in vocabulary {
        let lemma = stem_phrase(&stemmer, word);
        lemma_to_words.entry(lemma.clone()).or_default().insert(word.clone());
        word_to_lemma.insert(word.clone(), lemma.clone());
        lemmatized_vocabulary.push(lemma);
    }

    Some((lemmatized_vocabulary, word_to_lemma, lemma_to_words))
}

/// Stems a normalized entry word by word, so multi-word phrases keep their
/// word boundaries (`"running shoes"` -> `"run shoe"`, not one opaque stem).
fn stem_phrase(stemmer: &Stemmer, normalized: &str) -> String {
    normalized
        .split(' ')
        .map(|word| stemmer.stem(word).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn english_stems_share_a_lemma() {
        let vocabulary = vec!["running".to_string(), "runs".to_string(), "cat".to_string()];
        let (lemmatized, word_to_lemma, lemma_to_words) =
            lemmatize(&vocabulary, Language::English).unwrap();
        check!(lemmatized.len() == 3);
        check!(word_to_lemma["running"] == word_to_lemma["runs"]);
        check!(lemma_to_words[&word_to_lemma["running"]].len() == 2);
    }

    #[test]
    fn unknown_language_disables_lemmatization() {
        check!(lemmatize(&["word".to_string()], Language::Unknown).is_none());
    }

    #[test]
    fn phrases_stem_per_word() {
        let vocabulary = vec!["running shoes".to_string()];
        let (lemmatized, _, _) = lemmatize(&vocabulary, Language::English).unwrap();
        check!(lemmatized[0].contains(' '));
    }
}
