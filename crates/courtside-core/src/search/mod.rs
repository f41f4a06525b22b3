//! Text search: modes, match predicates and relevance expressions.
//!
//! Everything here builds plain data ([`Predicate`], [`RankExpr`]). Storage
//! backends decide how to evaluate it: `courtside-db` renders SQL, the
//! in-memory store calls [`Predicate::matches`] and [`RankExpr::score`].

mod fulltext;
mod predicate;
mod rank;
mod ranker;
mod trigram;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::locations::LocationRecord;

pub use fulltext::{lexemes, text_matches, text_rank};
pub use predicate::Predicate;
pub use rank::RankExpr;
pub use ranker::{rank_query, RankedMatch};
pub use trigram::similarity;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    Exact,
    Fuzzy,
    Phrase,
    #[default]
    Combined,
}

impl SearchMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::Phrase => "phrase",
            Self::Combined => "combined",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = CoreError;

    /// Case-insensitive. Unknown modes are an error, never a silent fallback.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "fuzzy" => Ok(Self::Fuzzy),
            "phrase" => Ok(Self::Phrase),
            "combined" => Ok(Self::Combined),
            _ => Err(CoreError::InvalidSearchMode(s.to_string())),
        }
    }
}

/// Searchable text columns of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    City,
    State,
    Street,
}

impl TextField {
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::City => "city",
            Self::State => "state",
            Self::Street => "street",
        }
    }

    #[must_use]
    pub fn value(self, record: &LocationRecord) -> Option<&str> {
        match self {
            Self::Name => record.name.as_deref(),
            Self::City => record.city.as_deref(),
            Self::State => record.state.as_deref(),
            Self::Street => record.street.as_deref(),
        }
    }
}

/// A validated free-text query.
#[derive(Debug, Clone, PartialEq)]
pub struct TextQuery {
    raw: String,
    pub mode: SearchMode,
    pub threshold: f64,
}

impl TextQuery {
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when the query is blank or the
    /// threshold lies outside `[0, 1]`.
    pub fn new(raw: &str, mode: SearchMode, threshold: f64) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("query must not be blank".to_string()));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CoreError::Validation(format!(
                "similarity threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(Self {
            raw: trimmed.to_string(),
            mode,
            threshold,
        })
    }

    /// The trimmed query as typed; used for exact, prefix and substring
    /// comparisons.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The query normalized for full-text matching.
    #[must_use]
    pub fn normalized(&self) -> String {
        normalize_query(&self.raw)
    }
}

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("valid punctuation regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Trim, replace punctuation with spaces, collapse whitespace, lower-case.
#[must_use]
pub fn normalize_query(raw: &str) -> String {
    let spaced = PUNCTUATION.replace_all(raw, " ");
    WHITESPACE
        .replace_all(spaced.trim(), " ")
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("EXACT".parse::<SearchMode>(), Ok(SearchMode::Exact));
        assert_eq!("fuzzy".parse::<SearchMode>(), Ok(SearchMode::Fuzzy));
        assert_eq!(" Phrase ".parse::<SearchMode>(), Ok(SearchMode::Phrase));
        assert_eq!("combined".parse::<SearchMode>(), Ok(SearchMode::Combined));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert_eq!(
            "semantic".parse::<SearchMode>(),
            Err(CoreError::InvalidSearchMode("semantic".to_string()))
        );
    }

    #[test]
    fn default_mode_is_combined() {
        assert_eq!(SearchMode::default(), SearchMode::Combined);
    }

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_query("  Central-Park,  COURTS!! "), "central park courts");
        assert_eq!(normalize_query("o'neil   field"), "o neil field");
        assert_eq!(normalize_query("..."), "");
    }

    #[test]
    fn text_query_rejects_bad_threshold() {
        assert!(TextQuery::new("park", SearchMode::Fuzzy, 1.5).is_err());
        assert!(TextQuery::new("park", SearchMode::Fuzzy, -0.1).is_err());
        assert!(TextQuery::new("park", SearchMode::Fuzzy, 0.0).is_ok());
    }

    #[test]
    fn text_query_rejects_blank_and_trims() {
        assert!(TextQuery::new("   ", SearchMode::Combined, 0.3).is_err());
        let q = TextQuery::new("  Park ", SearchMode::Combined, 0.3).unwrap();
        assert_eq!(q.raw(), "Park");
    }
}
