//! In-process approximation of Postgres `english` full-text search.
//!
//! Used by the in-memory store only. Stemming is limited to dropping a plural
//! `s`, and ranks are scaled to stay in the same small range `ts_rank` uses so
//! they combine with the other rank terms the same way.

use crate::locations::LocationRecord;
use crate::search::TextField;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of", "on",
    "or", "the", "to", "with",
];

/// Ceiling of a full match, close to what `ts_rank` returns for short
/// documents.
const FULL_MATCH_RANK: f64 = 0.1;

/// Lower-cased, stopword-free, crudely stemmed tokens of `text`, in order.
#[must_use]
pub fn lexemes(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .map(|w| stem(&w))
        .collect()
}

fn stem(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

fn document(record: &LocationRecord) -> Vec<String> {
    [
        TextField::Name,
        TextField::City,
        TextField::State,
        TextField::Street,
    ]
    .into_iter()
    .filter_map(|field| field.value(record))
    .flat_map(lexemes)
    .collect()
}

/// Whether `record` matches a normalized query. A plain match needs every
/// query lexeme somewhere in the document; a phrase match needs them
/// adjacent and in order.
#[must_use]
pub fn text_matches(record: &LocationRecord, query: &str, phrase: bool) -> bool {
    let terms = lexemes(query);
    if terms.is_empty() {
        return false;
    }
    let doc = document(record);
    if phrase {
        doc.windows(terms.len()).any(|w| w == terms.as_slice())
    } else {
        terms.iter().all(|t| doc.contains(t))
    }
}

/// Share of query lexemes present in the document, scaled to
/// [`FULL_MATCH_RANK`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn text_rank(record: &LocationRecord, query: &str) -> f64 {
    let terms = lexemes(query);
    if terms.is_empty() {
        return 0.0;
    }
    let doc = document(record);
    let hits = terms.iter().filter(|t| doc.contains(t)).count();
    FULL_MATCH_RANK * hits as f64 / terms.len() as f64
}
