//! RAKE (Rapid Automatic Keyword Extraction) over short English text.
//!
//! Candidate phrases are runs of non-stopwords between stopword/punctuation
//! boundaries. Each phrase scores `Σ degree(w)/freq(w)` over its words,
//! where `degree(w) = freq(w) + |distinct co-occurring words|` (phrases
//! longer than 5 words are excluded from co-occurrence counting to keep
//! this O(n) rather than O(n²) on pathological input). The top 10 phrases
//! by score are returned.

use std::collections::{HashMap, HashSet};

const MAX_KEYWORDS: usize = 10;
const COOCCURRENCE_PHRASE_LIMIT: usize = 5;

pub fn extract_keywords(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let stop_words = default_stop_words();
    let candidates = candidate_phrases(text, &stop_words);

    let mut word_freq: HashMap<String, u32> = HashMap::new();
    let mut cooccurrence: HashMap<String, HashSet<String>> = HashMap::new();

    for phrase in &candidates {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.len() > COOCCURRENCE_PHRASE_LIMIT {
            continue;
        }
        let mut unique = HashSet::new();
        for w in &words {
            let w = w.to_lowercase();
            *word_freq.entry(w.clone()).or_insert(0) += 1;
            unique.insert(w);
        }
        for w1 in &unique {
            for w2 in &unique {
                if w1 != w2 {
                    cooccurrence
                        .entry(w1.clone())
                        .or_default()
                        .insert(w2.clone());
                }
            }
        }
    }

    let word_degree: HashMap<String, u32> = word_freq
        .iter()
        .map(|(w, &freq)| {
            let co = cooccurrence.get(w).map(|s| s.len() as u32).unwrap_or(0);
            (w.clone(), freq + co)
        })
        .collect();

    let mut scored: Vec<(String, f64)> = candidates
        .iter()
        .map(|phrase| {
            let score: f64 = phrase
                .split_whitespace()
                .map(|w| {
                    let w = w.to_lowercase();
                    let deg = *word_degree.get(&w).unwrap_or(&0) as f64;
                    let freq = *word_freq.get(&w).unwrap_or(&1) as f64;
                    if deg > 0.0 {
                        deg / freq
                    } else {
                        0.0
                    }
                })
                .sum();
            (phrase.clone(), score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(MAX_KEYWORDS);
    scored.into_iter().map(|(phrase, _)| phrase).collect()
}

fn candidate_phrases(text: &str, stop_words: &HashSet<&'static str>) -> Vec<String> {
    let text = text.to_lowercase();
    let sentences: Vec<&str> = text
        .split(|c: char| ".!?;。!?;".contains(c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut candidates = Vec::new();
    for sentence in sentences {
        let words: Vec<String> = sentence
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();

        let mut phrase: Vec<String> = Vec::new();
        for word in words {
            if stop_words.contains(word.as_str()) {
                if !phrase.is_empty() {
                    candidates.push(phrase.join(" "));
                    phrase.clear();
                }
            } else {
                phrase.push(word);
            }
        }
        if !phrase.is_empty() {
            candidates.push(phrase.join(" "));
        }
    }
    candidates
}

fn default_stop_words() -> HashSet<&'static str> {
    [
        "a", "an", "the", "and", "or", "but", "if", "while", "is", "are", "was", "were", "of",
        "at", "by", "for", "with", "about", "against", "between", "into", "through", "during",
        "before", "after", "above", "below", "to", "from", "up", "down", "in", "out", "on",
        "off", "over", "under", "again", "further", "then", "once", "here", "there", "when",
        "where", "why", "how", "all", "any", "both", "each", "few", "more", "most", "other",
        "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very",
        "can", "will", "just", "don", "should", "now",
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_keywords() {
        assert!(extract_keywords("").is_empty());
    }

    #[test]
    fn extracts_multi_word_phrase_over_stopwords() {
        let keywords = extract_keywords(
            "Linear diophantine equations are systems that are solved using elimination.",
        );
        assert!(keywords
            .iter()
            .any(|k| k.contains("diophantine") || k.contains("equations")));
    }

    #[test]
    fn caps_result_at_ten() {
        let text = "alpha beta. gamma delta. epsilon zeta. eta theta. iota kappa. \
                     lambda mu. nu xi. omicron pi. rho sigma. tau upsilon. phi chi.";
        assert!(extract_keywords(text).len() <= 10);
    }
}
