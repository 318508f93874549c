//! Keyword matching used by the reports: literal, case-insensitive substring search.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde_json::Value;

/// Case-insensitive literal matcher for one keyword.
/// Regex metacharacters in the keyword are matched literally.
#[derive(Clone, Debug)]
pub struct KeywordMatcher {
    keyword: String,
    re: Regex,
}

impl KeywordMatcher {
    pub fn new(keyword: impl AsRef<str>) -> Result<Self> {
        let keyword = keyword.as_ref().to_string();
        let re = RegexBuilder::new(&regex::escape(&keyword))
            .case_insensitive(true)
            .build()
            .with_context(|| format!("building matcher for keyword {keyword:?}"))?;
        Ok(Self { keyword, re })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.re.is_match(haystack)
    }

    /// Only string cells can match; null and the `false` sentinel never do.
    pub fn matches_cell(&self, v: Option<&Value>) -> bool {
        match v {
            Some(Value::String(s)) => self.is_match(s),
            _ => false,
        }
    }
}

/// Matchers for a keyword list, order kept.
pub fn matchers_for<I, S>(keywords: I) -> Result<Vec<KeywordMatcher>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords.into_iter().map(KeywordMatcher::new).collect()
}

/// True when the cell matches any of the matchers.
pub fn matches_any(matchers: &[KeywordMatcher], v: Option<&Value>) -> bool {
    matchers.iter().any(|m| m.matches_cell(v))
}
