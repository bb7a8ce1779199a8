use regex::Regex;
use std::sync::LazyLock;

/// 包裝/數量相關的填充字，不適合當作關鍵字
pub const STOP_WORDS: &[&str] = &["ממגוון", "יח", "גרם", "ליטר", "מל", "ב", "עד", "מוגבל", "למימוש"];

pub const LEARNED_PREFIX: &str = "learned_from_";

const MAX_LEARNED_KEYWORDS: usize = 3;
const NAME_TITLE_CHARS: usize = 20;
const MIN_TOKEN_CHARS: usize = 3;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// Splits a title into lower-cased word tokens (Unicode letters, digits, `_`).
pub fn tokenize(title: &str) -> Vec<String> {
    let lowered = title.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 從標題萃取最多三個有意義的關鍵字
pub fn extract_keywords(title: &str) -> Vec<String> {
    tokenize(title)
        .into_iter()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .take(MAX_LEARNED_KEYWORDS)
        .collect()
}

pub fn learned_category_name(title: &str) -> String {
    let prefix: String = title.chars().take(NAME_TITLE_CHARS).collect();
    format!("{}{}", LEARNED_PREFIX, prefix)
}

pub fn learned_notes(title: &str) -> String {
    format!("Learned from user feedback on: {}", title)
}
