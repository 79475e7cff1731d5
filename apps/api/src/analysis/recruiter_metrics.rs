//! Recruiter Metrics — deterministic statistics about the resume text alone.

use crate::analysis::lexicon::Lexicons;
use crate::analysis::models::{RecruiterMetrics, ResumeDocument};
use crate::analysis::segmenter::strip_list_marker;
use crate::analysis::text::{tokenize, word_count};

pub fn compute(
    resume: &ResumeDocument,
    lexicons: &Lexicons,
    words_per_minute: u32,
) -> RecruiterMetrics {
    let words = word_count(resume.text());
    let buzzword_count = lexicons.count_buzzwords(resume.text());
    let action_verb_count = resume
        .sentences()
        .iter()
        .filter(|s| starts_with_action_verb(&s.text, lexicons))
        .count();

    RecruiterMetrics {
        reading_time: format_reading_time(words, words_per_minute),
        buzzword_count: u32::try_from(buzzword_count).unwrap_or(u32::MAX),
        action_verb_count: u32::try_from(action_verb_count).unwrap_or(u32::MAX),
    }
}

/// "{m}m {s}s" at `words_per_minute`, seconds floored.
pub fn format_reading_time(words: usize, words_per_minute: u32) -> String {
    let wpm = u64::from(words_per_minute.max(1));
    let seconds = words as u64 * 60 / wpm;
    format!("{}m {}s", seconds / 60, seconds % 60)
}

fn starts_with_action_verb(sentence: &str, lexicons: &Lexicons) -> bool {
    tokenize(strip_list_marker(sentence))
        .first()
        .is_some_and(|word| lexicons.is_action_verb(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(text: &str) -> RecruiterMetrics {
        let lex = Lexicons::default();
        let resume = ResumeDocument::parse(text, &lex).unwrap();
        compute(&resume, &lex, 250)
    }

    #[test]
    fn test_reading_time_format() {
        assert_eq!(format_reading_time(0, 250), "0m 0s");
        assert_eq!(format_reading_time(1000, 250), "4m 0s");
        assert_eq!(format_reading_time(130, 250), "0m 31s");
        assert_eq!(format_reading_time(400, 250), "1m 36s");
    }

    #[test]
    fn test_thousand_words_with_two_buzzwords() {
        let mut text = String::from("Drove synergy across teams. ");
        text.push_str(&"word ".repeat(995));
        text.push_str("More synergy.");
        let m = metrics(&text);
        assert_eq!(m.reading_time, "4m 0s");
        assert_eq!(m.buzzword_count, 2);
    }

    #[test]
    fn test_action_verbs_counted_per_sentence_start() {
        let m = metrics(
            "• Led a team of 5 engineers.\n- Built the billing service.\nResponsible for on-call.\nI led hiring.",
        );
        assert_eq!(m.action_verb_count, 2);
    }

    #[test]
    fn test_no_buzzwords_or_verbs() {
        let m = metrics("Responsible for reports. Member of the data guild.");
        assert_eq!(m.buzzword_count, 0);
        assert_eq!(m.action_verb_count, 0);
    }
}
