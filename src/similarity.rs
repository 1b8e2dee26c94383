//! Edit similarity between utterances using Levenshtein distance
//!
//! Recognizers often emit the same final sentence twice in a row (echo, or a
//! restart replaying the tail of the previous turn). The ratio computed here is
//! what the confidence-scan policy compares against `same_sentence_tolerance`.

/// Normalized similarity in `[0, 1]`, case-insensitive.
///
/// `1 - levenshtein(a, b) / len(longer)`; two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let longer = a.len().max(b.len());
    if longer == 0 {
        return 1.0;
    }
    (longer - levenshtein(&a, &b)) as f64 / longer as f64
}

/// Levenshtein distance over chars, unit cost for insert/delete/substitute
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    // Two rows are enough, only the previous row is ever read.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein(&chars("hello"), &chars("hello")), 0);
        assert_eq!(levenshtein(&chars("hello"), &chars("helo")), 1);
        assert_eq!(levenshtein(&chars("hello"), &chars("world")), 4);
        assert_eq!(levenshtein(&chars(""), &chars("abc")), 3);
        assert_eq!(levenshtein(&chars("kitten"), &chars("sitting")), 3);
    }

    #[test]
    fn test_identity() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("bonjour", "bonjour"), 1.0);
        assert_eq!(similarity("Salut les amis", "Salut les amis"), 1.0);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(similarity("BONJOUR", "bonjour"), 1.0);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("bonjour", "bonsoir"),
            ("", "salut"),
            ("oh bonjour monsieur", "bonjour"),
            ("été", "ete"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a), "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn test_one_empty() {
        assert_eq!(similarity("", "abcd"), 0.0);
    }

    #[test]
    fn test_ratio() {
        // one substitution over four chars
        assert_eq!(similarity("abcd", "abcx"), 0.75);
        // unrelated words share nothing
        assert!(similarity("hello", "world") < 0.5);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // 'é' is two bytes but a single edit
        assert_eq!(similarity("café", "cafe"), 0.75);
    }
}
