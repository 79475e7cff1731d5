//! Token-level helpers shared by the extractor, the lexical fallback and the metrics.

use std::collections::HashSet;
use std::sync::OnceLock;

use strsim::jaro_winkler;

/// Tokens at or above this Jaro-Winkler similarity are treated as the same word.
const FUZZY_TOKEN_THRESHOLD: f64 = 0.93;
/// Fuzzy matching only applies to tokens at least this long; short tokens must match exactly.
const FUZZY_MIN_LEN: usize = 5;

fn stop_words() -> &'static HashSet<&'static str> {
    static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP_WORDS.get_or_init(|| {
        [
            "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in",
            "is", "it", "its", "of", "on", "or", "our", "that", "the", "their", "this", "to",
            "was", "we", "were", "will", "with", "you", "your", "us", "who", "can", "must",
            "should", "would", "able", "etc", "plus", "using", "into", "across", "within", "any",
            "all", "other", "such", "well", "also", "strong", "excellent", "good", "solid",
            "proven", "including", "like", "least", "more", "some", "very",
        ]
        .into_iter()
        .collect()
    })
}

pub fn is_stop_word(token: &str) -> bool {
    stop_words().contains(token)
}

/// Lowercases and splits on anything that is not part of a word.
/// Keeps `+`, `#` and inner `.` so "C++", "C#" and "node.js" survive.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '\'')))
        .map(|t| t.trim_matches(|c: char| c == '.' || c == '\''))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Tokens that carry meaning: not stop words, at least one letter or a multi-digit number.
pub fn content_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stop_word(t))
        .filter(|t| t.chars().any(char::is_alphabetic) || t.len() > 1)
        .collect()
}

/// Crude suffix stripper so "leadership", "leading" and "leads" compare equal to "lead".
pub fn stem(token: &str) -> &str {
    const SUFFIXES: &[&str] = &[
        "ership", "ments", "ment", "ings", "ing", "ship", "ness", "ities", "ity", "ers", "er",
        "ies", "ed", "es", "s",
    ];
    for suffix in SUFFIXES {
        if let Some(base) = token.strip_suffix(suffix) {
            if base.chars().count() >= 3 {
                return base;
            }
        }
    }
    token
}

/// Whether two normalized tokens should count as the same word.
pub fn tokens_equivalent(a: &str, b: &str) -> bool {
    if a == b || stem(a) == stem(b) {
        return true;
    }
    a.len() >= FUZZY_MIN_LEN
        && b.len() >= FUZZY_MIN_LEN
        && jaro_winkler(a, b) >= FUZZY_TOKEN_THRESHOLD
}

/// Whether `needle` occurs as a contiguous run inside `haystack`, token by token.
pub fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|w| w.iter().zip(needle).all(|(h, n)| tokens_equivalent(h, n)))
}

/// Fraction of `requirement`'s content tokens found in `sentence`, in [0, 1].
/// This is the similarity used when the provider response for a batch is unusable.
pub fn lexical_overlap(sentence: &str, requirement: &str) -> f32 {
    let wanted = content_tokens(requirement);
    if wanted.is_empty() {
        return 0.0;
    }
    let present = content_tokens(sentence);
    let hits = wanted
        .iter()
        .filter(|w| present.iter().any(|p| tokens_equivalent(p, w)))
        .count();
    hits as f32 / wanted.len() as f32
}

/// Whitespace-delimited word count, as a reader would count words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}
