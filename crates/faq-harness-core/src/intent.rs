//! Keyword-based intent detection.
//!
//! A [`KeywordSet`] answers one question: does a message mention any of a
//! configured list of tokens? Matching is case-insensitive substring
//! containment, so `"contatt"` matches both "contatto" and "contattare".

/// A case-insensitive set of trigger tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    tokens: Vec<String>,
}

impl KeywordSet {
    /// Build a set from raw tokens. Tokens are lower-cased; blank tokens are dropped.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    /// True if `text` contains any token, ignoring case.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.tokens.iter().any(|t| text.contains(t.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_case_insensitive() {
        let greetings = KeywordSet::new(["Hello", "ciao"]);
        assert!(greetings.matches("HELLO there"));
        assert!(greetings.matches("Ciao!"));
        assert!(!greetings.matches("good morning"));
    }

    #[test]
    fn test_matches_substrings() {
        let contact = KeywordSet::new(["contatt"]);
        assert!(contact.matches("Come posso contattarti?"));
    }

    #[test]
    fn test_blank_tokens_dropped() {
        let set = KeywordSet::new(["", "  ", "hey"]);
        assert_eq!(set.tokens(), &["hey".to_string()]);
        assert!(!set.matches("anything at all"));
    }

    #[test]
    fn test_empty_set_never_matches() {
        let set = KeywordSet::default();
        assert!(set.is_empty());
        assert!(!set.matches("hello"));
    }
}
