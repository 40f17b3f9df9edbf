//! Text predicates and normalization used by the heuristics.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\w+").expect("word pattern is valid"))
}

/// Share of alphabetic words that start with an upper-case letter.
///
/// Words starting with a digit ("2024", "3.1") are not counted either way.
/// Returns `None` when the text has no alphabetic word.
pub fn capitalized_ratio(text: &str) -> Option<f32> {
    let mut words = 0usize;
    let mut capitalized = 0usize;
    for word in word_regex().find_iter(text) {
        let Some(first) = word.as_str().chars().next() else {
            continue;
        };
        if !first.is_alphabetic() {
            continue;
        }
        words += 1;
        if first.is_uppercase() {
            capitalized += 1;
        }
    }
    (words > 0).then(|| capitalized as f32 / words as f32)
}

/// Title Case: at least `ratio` of the words are capitalized.
pub fn is_title_case(text: &str, ratio: f32) -> bool {
    capitalized_ratio(text).is_some_and(|r| r >= ratio)
}

/// ALL CAPS: has cased letters and none of them is lower case.
pub fn is_all_caps(text: &str) -> bool {
    let mut cased = text
        .chars()
        .filter(|c| c.is_lowercase() || c.is_uppercase())
        .peekable();
    cased.peek().is_some() && cased.all(|c| c.is_uppercase())
}

/// Key used to spot the same heading rendered twice.
///
/// NFKC folds ligatures and compatibility forms; whitespace runs collapse
/// and case is ignored.
pub fn normalize_for_dedup(text: &str) -> String {
    let folded: String = text.nfkc().collect();
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Append `piece` to `out`, separated by one space unless either side is a
/// spaceless-script character. Only the ends of `piece` are trimmed.
pub fn push_joined(out: &mut String, piece: &str) {
    let piece = piece.trim();
    if piece.is_empty() {
        return;
    }
    let needs_space = match (out.chars().last(), piece.chars().next()) {
        (Some(prev), Some(next)) => {
            !(is_spaceless_script_char(prev) && is_spaceless_script_char(next))
        }
        _ => false,
    };
    if needs_space {
        out.push(' ');
    }
    out.push_str(piece);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert!(is_title_case("Executive Summary", 0.6));
        assert!(is_title_case("Annual Report 2024", 0.6));
        assert!(is_title_case("Terms of Agreement", 0.6));
        assert!(!is_title_case("Terms of the agreement", 0.6));
        assert!(!is_title_case("the quick brown fox", 0.6));
        assert!(!is_title_case("2024", 0.6));
    }

    #[test]
    fn test_all_caps() {
        assert!(is_all_caps("INTRODUCTION"));
        assert!(is_all_caps("PART 2: RESULTS"));
        assert!(!is_all_caps("Introduction"));
        assert!(!is_all_caps("1.2.3"));
    }

    #[test]
    fn test_capitalized_ratio_unicode() {
        assert_eq!(capitalized_ratio("Über alles"), Some(0.5));
        assert_eq!(capitalized_ratio("..."), None);
    }

    #[test]
    fn test_normalize_for_dedup() {
        assert_eq!(normalize_for_dedup("  Chapter\t1  "), "chapter 1");
        assert_eq!(normalize_for_dedup("\u{FB01}nal Words"), "final words");
    }

    #[test]
    fn test_push_joined() {
        let mut s = String::new();
        push_joined(&mut s, " Chapter 1: ");
        push_joined(&mut s, "Introduction ");
        assert_eq!(s, "Chapter 1: Introduction");

        let mut cjk = String::from("日本");
        push_joined(&mut cjk, "語");
        assert_eq!(cjk, "日本語");
    }

    #[test]
    fn test_push_joined_preserves_inner_text() {
        let mut s = String::new();
        push_joined(&mut s, "  A  B  ");
        assert_eq!(s, "A  B");
    }
}
