//! Length-aware fuzzy scoring correction (§4.4.1). The sole authority on
//! whether short candidates outrank phrase matches — the fuzzy matcher must
//! not layer any other length heuristic on top of this.

fn first_word(s: &str) -> &str {
    s.split(' ').next().unwrap_or("")
}

/// Apply the length-aware correction to a base fuzzy similarity `s0 ∈
/// [0,1]` for a `(query, candidate)` pair, both already normalized.
///
/// `max_len == 0` (both sides empty after normalization) is defined as a
/// perfect match; any other degenerate length combination falls through the
/// ordinary formula, where `rho` naturally drives the score to 0.
pub fn correct_fuzzy_score(base_score: f32, query_normalized: &str, candidate_normalized: &str) -> f32 {
    if base_score >= 0.99 {
        return base_score;
    }

    let l_q = query_normalized.chars().count();
    let l_c = candidate_normalized.chars().count();

    if l_q == 0 && l_c == 0 {
        return 1.0;
    }
    let max_len = l_q.max(l_c);
    if max_len == 0 {
        return 0.0;
    }

    let rho = l_q.min(l_c) as f32 / max_len as f32;

    let is_prefix = !query_normalized.is_empty() && candidate_normalized.starts_with(query_normalized);
    let is_query_phrase = crate::normalize::is_phrase(query_normalized);
    let is_candidate_phrase = crate::normalize::is_phrase(candidate_normalized);
    let first_word_match =
        !is_query_phrase && is_candidate_phrase && query_normalized == first_word(candidate_normalized);

    let phrase_penalty = match (is_query_phrase, is_candidate_phrase) {
        (true, false) => 0.7,
        (false, true) if is_prefix || first_word_match => 1.2,
        (false, true) => 0.95,
        (true, true) => {
            if rho > 0.6 {
                1.1
            } else {
                1.0
            }
        }
        (false, false) => 1.0,
    };

    let short_fragment_penalty = if l_c <= 3 && l_q > 6 {
        0.5
    } else if (l_c as f32) < 0.5 * l_q as f32 {
        0.75
    } else {
        1.0
    };

    let prefix_bonus = if is_prefix { 1.3 } else { 1.0 };
    let first_word_bonus = if first_word_match { 1.2 } else { 1.0 };

    (base_score * rho * phrase_penalty * short_fragment_penalty * prefix_bonus * first_word_bonus)
        .clamp(0.0, 1.0)
}
