use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[^a-z0-9_]+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &["import", "from", "def", "class", "return", "self"];
        words.iter().copied().collect()
    };
}

/// Tokens of this length or shorter are dropped.
pub const MIN_TOKEN_LEN: usize = 2;

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text into identifier-like terms: lowercase, split on anything outside
/// `[a-z0-9_]`, drop short tokens and keyword stopwords.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    SEPARATORS
        .split(&lowered)
        .filter(|t| t.len() > MIN_TOKEN_LEN && !is_stopword(t))
        .map(str::to_string)
        .collect()
}
