//! Sentence Segmenter — splits extracted resume text into ordered sentences.
//!
//! Boundaries: line breaks, bullet markers, and `.`/`!`/`?` followed by whitespace.
//! A period is NOT a boundary after a known abbreviation ("Inc.", "B.S."), after a
//! single-letter initial (unless an action verb follows), inside a number ("3.5"), or
//! when the next word is lowercase.

use std::sync::OnceLock;

use regex::Regex;

use crate::analysis::lexicon::Lexicons;
use crate::analysis::models::Sentence;
use crate::errors::AnalysisError;

/// Glyphs treated as bullet markers wherever they appear.
const BULLET_GLYPHS: &[char] = &['•', '▪', '◦', '●', '○', '■', '□', '►', '▸', '‣', '⁃', '∙', '·', '➢', '✓', '✔'];

/// ASCII/typographic dashes count as bullets only at the start of a line, before whitespace.
const LEADING_DASH_BULLETS: &[char] = &['-', '*', '–', '—', '>', '+'];

fn numbered_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\(?(?:\d{1,2}|[a-zA-Z])[.)]\s+").expect("valid regex"))
}

/// Splits `text` into sentences, preserving document order.
///
/// Text with no recognizable boundary yields a single sentence spanning the whole (trimmed) text.
/// Fails with `Validation` on empty or whitespace-only input.
pub fn segment(text: &str, lexicons: &Lexicons) -> Result<Vec<Sentence>, AnalysisError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::Validation("text cannot be empty".to_string()));
    }

    let mut fragments: Vec<(String, bool)> = Vec::new();
    for line in trimmed.lines() {
        for (n, raw) in line.split(BULLET_GLYPHS).enumerate() {
            let piece = strip_list_marker(raw);
            if piece.is_empty() {
                continue;
            }
            let list_item = n > 0 || piece.len() != raw.trim().len();
            let mut texts = Vec::new();
            split_on_terminals(piece, lexicons, &mut texts);
            fragments.extend(texts.into_iter().map(|t| (t, list_item)));
        }
    }

    fragments.retain(|(f, _)| f.chars().any(char::is_alphanumeric));
    if fragments.is_empty() {
        fragments.push((trimmed.to_string(), false));
    }

    Ok(fragments
        .into_iter()
        .enumerate()
        .map(|(index, (text, list_item))| Sentence {
            index,
            text,
            list_item,
        })
        .collect())
}

/// Removes a leading dash/star bullet or a "1." / "a)" list marker.
pub fn strip_list_marker(piece: &str) -> &str {
    let mut rest = piece.trim();
    loop {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(c), Some(next)) if LEADING_DASH_BULLETS.contains(&c) && next.is_whitespace() => {
                rest = rest[c.len_utf8()..].trim_start();
            }
            (Some(c), None) if LEADING_DASH_BULLETS.contains(&c) => return "",
            _ => break,
        }
    }
    if let Some(m) = numbered_marker().find(rest) {
        rest = &rest[m.end()..];
    }
    rest.trim()
}

fn split_on_terminals(piece: &str, lexicons: &Lexicons, out: &mut Vec<String>) {
    let chars: Vec<(usize, char)> = piece.char_indices().collect();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if !matches!(c, '.' | '!' | '?') {
            i += 1;
            continue;
        }

        // Swallow runs like "?!" or ".)" or '."'
        let mut end = i + 1;
        while end < chars.len() && matches!(chars[end].1, '.' | '!' | '?' | ')' | '"' | '\'' | '”' | '’') {
            end += 1;
        }
        let at_end = end >= chars.len();
        let followed_by_space = at_end || chars[end].1.is_whitespace();

        if followed_by_space && (c != '.' || !is_non_terminal_period(piece, pos, &chars, end, lexicons)) {
            let cut = if at_end { piece.len() } else { chars[end].0 };
            push_fragment(&piece[start..cut], out);
            start = cut;
        }
        i = end;
    }

    if start < piece.len() {
        push_fragment(&piece[start..], out);
    }
}

fn push_fragment(fragment: &str, out: &mut Vec<String>) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        out.push(fragment.to_string());
    }
}

/// Whether the period at byte `pos` belongs to an abbreviation or initial rather than ending a sentence.
fn is_non_terminal_period(
    piece: &str,
    pos: usize,
    chars: &[(usize, char)],
    after: usize,
    lexicons: &Lexicons,
) -> bool {
    let word_start = piece[..pos]
        .rfind(|c: char| c.is_whitespace() || c == '(')
        .map(|i| i + 1)
        .unwrap_or(0);
    let word = &piece[word_start..pos];

    if word.is_empty() {
        return false;
    }
    if lexicons.is_abbreviation(word) {
        return true;
    }
    // Single initial ("J. Smith") or dotted acronym ("U.S.A.")
    let is_initials = word
        .split('.')
        .all(|part| part.chars().count() == 1 && part.chars().all(char::is_alphabetic));
    let next_word: String = chars[after..]
        .iter()
        .map(|(_, c)| *c)
        .skip_while(|c| c.is_whitespace())
        .take_while(|c| c.is_alphanumeric())
        .collect();

    if is_initials && word.chars().next().is_some_and(char::is_uppercase) {
        // "Proficient in R. Led analytics.": a lone letter before an action verb ends the sentence.
        let lone_letter = word.chars().count() == 1;
        return !(lone_letter && lexicons.is_action_verb(&next_word));
    }

    // "approx. five": the next word starts lowercase, so this period did not end a sentence.
    next_word.chars().next().is_some_and(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        segment(text, &Lexicons::default())
            .unwrap()
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_empty_input_is_validation_error() {
        let lex = Lexicons::default();
        assert!(matches!(segment("", &lex), Err(AnalysisError::Validation(_))));
        assert!(matches!(segment("  \n\t ", &lex), Err(AnalysisError::Validation(_))));
    }

    #[test]
    fn test_splits_on_terminal_punctuation() {
        assert_eq!(
            texts("Built APIs in Rust. Led a team of 5! Shipped on time?"),
            vec!["Built APIs in Rust.", "Led a team of 5!", "Shipped on time?"]
        );
    }

    #[test]
    fn test_line_breaks_and_bullets_are_boundaries() {
        assert_eq!(
            texts("Experience\n• Built APIs\n• Led migrations\n- Mentored interns\n1. Wrote docs"),
            vec!["Experience", "Built APIs", "Led migrations", "Mentored interns", "Wrote docs"]
        );
    }

    #[test]
    fn test_inline_bullets_split() {
        assert_eq!(
            texts("Skills: Rust • Go • SQL"),
            vec!["Skills: Rust", "Go", "SQL"]
        );
    }

    #[test]
    fn test_abbreviations_do_not_split() {
        assert_eq!(
            texts("B.S. in Computer Science from MIT. Worked at Acme Inc. Built tools."),
            vec![
                "B.S. in Computer Science from MIT.",
                "Worked at Acme Inc. Built tools."
            ]
        );
    }

    #[test]
    fn test_decimals_do_not_split() {
        assert_eq!(
            texts("Maintained a 3.9 GPA. Cut latency by 2.5x."),
            vec!["Maintained a 3.9 GPA.", "Cut latency by 2.5x."]
        );
    }

    #[test]
    fn test_initials_do_not_split() {
        assert_eq!(
            texts("Reported to J. Smith directly. Owned billing."),
            vec!["Reported to J. Smith directly.", "Owned billing."]
        );
    }

    #[test]
    fn test_single_letter_language_before_action_verb_splits() {
        assert_eq!(
            texts("Proficient in R. Led analytics."),
            vec!["Proficient in R.", "Led analytics."]
        );
        assert_eq!(
            texts("Wrote firmware in C. Shipped 3 devices."),
            vec!["Wrote firmware in C.", "Shipped 3 devices."]
        );
    }

    #[test]
    fn test_list_items_are_flagged() {
        let sentences = segment(
            "Summary line\n- Led a team\n• Built tools\n2) Shipped it",
            &Lexicons::default(),
        )
        .unwrap();
        let flags: Vec<bool> = sentences.iter().map(|s| s.list_item).collect();
        assert_eq!(flags, vec![false, true, true, true]);
    }

    #[test]
    fn test_lowercase_continuation_does_not_split() {
        assert_eq!(
            texts("Handled approx. forty tickets a day."),
            vec!["Handled approx. forty tickets a day."]
        );
    }

    #[test]
    fn test_no_boundaries_yields_single_sentence() {
        let sentences = segment("rust go sql kafka", &Lexicons::default()).unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].text, "rust go sql kafka");
        assert_eq!(sentences[0].index, 0);
    }

    #[test]
    fn test_markup_only_text_falls_back_to_whole_text() {
        let sentences = segment("• • •", &Lexicons::default()).unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].text, "• • •");
    }

    #[test]
    fn test_indices_are_sequential() {
        let sentences = segment("One.\nTwo.\nThree.", &Lexicons::default()).unwrap();
        let indices: Vec<usize> = sentences.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_strip_list_marker() {
        assert_eq!(strip_list_marker("- Led a team"), "Led a team");
        assert_eq!(strip_list_marker("  * * Built it"), "Built it");
        assert_eq!(strip_list_marker("2) Shipped"), "Shipped");
        assert_eq!(strip_list_marker("-5% churn"), "-5% churn");
        assert_eq!(strip_list_marker("5 years of Rust"), "5 years of Rust");
        assert_eq!(strip_list_marker("-"), "");
    }
}
