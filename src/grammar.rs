//! Grammar matching - tests transcripts for any of the target phrases
//!
//! Phrases are escaped and joined into one case-insensitive alternation, so a
//! phrase like "c'est ça?" is matched literally. The match is unanchored: the
//! phrase may appear anywhere in the sentence.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::error::{DetectorError, Result};

#[derive(Debug, Clone)]
pub struct Grammar {
    regex: Regex,
}

impl Grammar {
    /// Build from literal phrases. Blank phrases are skipped.
    pub fn from_phrases<S: AsRef<str>>(phrases: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = phrases
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Err(DetectorError::EmptyGrammar);
        }
        Self::new(&format!("({})", alternatives.join("|")))
    }

    /// Build from a raw regex pattern, always case-insensitive.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    pub fn test(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Byte ranges of every non-overlapping match, left to right
    pub fn spans(&self, text: &str) -> Vec<Range<usize>> {
        self.regex.find_iter(text).map(|m| m.range()).collect()
    }

    /// Wrap every match in `open`/`close`, e.g. `<mark>` and `</mark>`
    pub fn highlight(&self, text: &str, open: &str, close: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for span in self.spans(text) {
            out.push_str(&text[last..span.start]);
            out.push_str(open);
            out.push_str(&text[span.clone()]);
            out.push_str(close);
            last = span.end;
        }
        out.push_str(&text[last..]);
        out
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_unanchored() {
        let grammar = Grammar::new("bonjour|salut").unwrap();
        assert!(grammar.test("Oh, BONJOUR monsieur"));
        assert!(grammar.test("salut les amis"));
        assert!(!grammar.test("au revoir"));
    }

    #[test]
    fn test_from_phrases_escapes() {
        let grammar = Grammar::from_phrases(&["c'est ça?", "a.b"]).unwrap();
        assert!(grammar.test("alors c'est ça? oui"));
        assert!(!grammar.test("alors c'est ç"));
        assert!(grammar.test("A.B"));
        assert!(!grammar.test("axb"));
    }

    #[test]
    fn test_empty_phrases_rejected() {
        assert!(matches!(
            Grammar::from_phrases(&["", "   "]),
            Err(DetectorError::EmptyGrammar)
        ));
        let none: [&str; 0] = [];
        assert!(Grammar::from_phrases(&none).is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(Grammar::new("(unclosed"), Err(DetectorError::Pattern(_))));
    }

    #[test]
    fn test_spans() {
        let grammar = Grammar::from_phrases(&["bonjour", "salut"]).unwrap();
        let text = "Salut, et bonjour";
        let spans = grammar.spans(text);
        assert_eq!(spans, vec![0..5, 10..17]);
        assert_eq!(&text[spans[1].clone()], "bonjour");
    }

    #[test]
    fn test_highlight() {
        let grammar = Grammar::from_phrases(&["bonjour", "salut"]).unwrap();
        assert_eq!(
            grammar.highlight("Oh, BONJOUR monsieur", "<mark>", "</mark>"),
            "Oh, <mark>BONJOUR</mark> monsieur"
        );
        assert_eq!(grammar.highlight("rien", "[", "]"), "rien");
    }

    #[test]
    fn test_repeatable() {
        let grammar = Grammar::from_phrases(&["salut"]).unwrap();
        // No hidden cursor between calls
        assert!(grammar.test("salut"));
        assert!(grammar.test("salut"));
    }
}
