//! Per-mode match predicates and relevance expressions.

use crate::search::{Predicate, RankExpr, SearchMode, TextField, TextQuery};

/// Minimum token length used for partial sport-tag matching.
const PARTIAL_TAG_MIN_LEN: usize = 3;

/// What to filter on and what to sort by for one text query.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch {
    pub predicate: Predicate,
    pub rank: RankExpr,
}

#[must_use]
pub fn rank_query(query: &TextQuery) -> RankedMatch {
    match query.mode {
        SearchMode::Exact => exact(query),
        SearchMode::Fuzzy => fuzzy(query),
        SearchMode::Phrase => phrase(query),
        SearchMode::Combined => combined(query),
    }
}

fn equals(field: TextField, query: &TextQuery) -> Predicate {
    Predicate::EqualsIgnoreCase {
        field,
        value: query.raw().to_string(),
    }
}

fn prefix(field: TextField, query: &TextQuery) -> Predicate {
    Predicate::HasPrefix {
        field,
        prefix: query.raw().to_string(),
    }
}

fn similar(field: TextField, query: &TextQuery) -> Predicate {
    Predicate::Similar {
        field,
        value: query.raw().to_string(),
        threshold: query.threshold,
    }
}

fn similarity(field: TextField, query: &TextQuery, weight: f64) -> RankExpr {
    RankExpr::Similarity {
        field,
        value: query.raw().to_string(),
        weight,
    }
}

fn sport_tag(query: &TextQuery) -> Predicate {
    Predicate::SportTag(query.raw().to_lowercase())
}

/// The whole query plus every normalized token long enough to be useful.
fn partial_tag(query: &TextQuery) -> Predicate {
    let mut needles = vec![query.raw().to_lowercase()];
    for token in query.normalized().split(' ') {
        if token.chars().count() >= PARTIAL_TAG_MIN_LEN && !needles.iter().any(|n| n == token) {
            needles.push(token.to_string());
        }
    }
    Predicate::SportTagPartial(needles)
}

fn exact(query: &TextQuery) -> RankedMatch {
    let predicate = Predicate::Or(vec![
        equals(TextField::Name, query),
        equals(TextField::City, query),
        equals(TextField::State, query),
        equals(TextField::Street, query),
        sport_tag(query),
    ]);
    let rank = RankExpr::Tiered(vec![
        (equals(TextField::Name, query), 1.0),
        (equals(TextField::City, query), 0.8),
        (equals(TextField::Street, query), 0.6),
        (sport_tag(query), 0.5),
    ]);
    RankedMatch { predicate, rank }
}

fn fuzzy(query: &TextQuery) -> RankedMatch {
    let predicate = Predicate::Or(vec![
        similar(TextField::Name, query),
        similar(TextField::City, query),
        similar(TextField::Street, query),
    ]);
    let rank = RankExpr::Greatest(vec![
        similarity(TextField::Name, query, 1.0),
        similarity(TextField::City, query, 0.8),
        similarity(TextField::Street, query, 0.6),
    ]);
    RankedMatch { predicate, rank }
}

fn phrase(query: &TextQuery) -> RankedMatch {
    let normalized = query.normalized();
    RankedMatch {
        predicate: Predicate::FullText {
            query: normalized.clone(),
            phrase: true,
        },
        rank: RankExpr::FullTextRank {
            query: normalized,
            phrase: true,
            weight: 1.2,
        },
    }
}

fn combined(query: &TextQuery) -> RankedMatch {
    let normalized = query.normalized();
    let predicate = Predicate::Or(vec![
        Predicate::FullText {
            query: normalized.clone(),
            phrase: false,
        },
        similar(TextField::Name, query),
        similar(TextField::City, query),
        similar(TextField::Street, query),
        prefix(TextField::Name, query),
        prefix(TextField::City, query),
        prefix(TextField::Street, query),
        sport_tag(query),
        partial_tag(query),
    ]);
    let rank = RankExpr::Sum(vec![
        RankExpr::FullTextRank {
            query: normalized,
            phrase: false,
            weight: 1.0,
        },
        RankExpr::Greatest(vec![
            similarity(TextField::Name, query, 0.8),
            similarity(TextField::City, query, 0.6),
            similarity(TextField::Street, query, 0.4),
        ]),
        RankExpr::Tiered(vec![
            (prefix(TextField::Name, query), 0.9),
            (prefix(TextField::City, query), 0.7),
            (prefix(TextField::Street, query), 0.5),
        ]),
        RankExpr::Tiered(vec![(sport_tag(query), 0.95), (partial_tag(query), 0.6)]),
    ]);
    RankedMatch { predicate, rank }
}
