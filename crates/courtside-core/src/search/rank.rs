use crate::locations::LocationRecord;
use crate::search::{fulltext, trigram, Predicate, TextField};

/// Numeric relevance expression; higher is better.
#[derive(Debug, Clone, PartialEq)]
pub enum RankExpr {
    Sum(Vec<RankExpr>),
    Greatest(Vec<RankExpr>),
    /// Score of the first predicate that matches, else zero.
    Tiered(Vec<(Predicate, f64)>),
    /// `similarity(field, value) * weight`; a missing field scores zero.
    Similarity {
        field: TextField,
        value: String,
        weight: f64,
    },
    /// Full-text rank of a normalized query, times `weight`.
    FullTextRank {
        query: String,
        phrase: bool,
        weight: f64,
    },
}

impl RankExpr {
    /// Evaluate against a record in process.
    #[must_use]
    pub fn score(&self, record: &LocationRecord) -> f64 {
        match self {
            RankExpr::Sum(parts) => parts.iter().map(|p| p.score(record)).sum(),
            RankExpr::Greatest(parts) => parts
                .iter()
                .map(|p| p.score(record))
                .fold(0.0, f64::max),
            RankExpr::Tiered(tiers) => tiers
                .iter()
                .find(|(predicate, _)| predicate.matches(record))
                .map_or(0.0, |(_, score)| *score),
            RankExpr::Similarity {
                field,
                value,
                weight,
            } => trigram::similarity(field.value(record).unwrap_or(""), value) * weight,
            RankExpr::FullTextRank { query, weight, .. } => {
                fulltext::text_rank(record, query) * weight
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(name: &str, city: &str) -> LocationRecord {
        LocationRecord {
            id: "r".to_string(),
            name: Some(name.to_string()),
            street: None,
            street2: None,
            city: Some(city.to_string()),
            state: None,
            postal_code: None,
            latitude: 0.0,
            longitude: 0.0,
            sports: vec![],
            bounds: vec![],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn tiered_takes_first_match() {
        let rec = record("Austin", "Austin");
        let expr = RankExpr::Tiered(vec![
            (
                Predicate::EqualsIgnoreCase {
                    field: TextField::Name,
                    value: "austin".into(),
                },
                1.0,
            ),
            (
                Predicate::EqualsIgnoreCase {
                    field: TextField::City,
                    value: "austin".into(),
                },
                0.8,
            ),
        ]);
        assert!((expr.score(&rec) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tiered_without_match_is_zero() {
        let rec = record("Austin", "Austin");
        let expr = RankExpr::Tiered(vec![(Predicate::SportTag("golf".into()), 0.5)]);
        assert!(expr.score(&rec).abs() < f64::EPSILON);
    }

    #[test]
    fn greatest_and_sum_combine() {
        let rec = record("Riverside", "Riverside");
        let name = RankExpr::Similarity {
            field: TextField::Name,
            value: "riverside".into(),
            weight: 1.0,
        };
        let city = RankExpr::Similarity {
            field: TextField::City,
            value: "riverside".into(),
            weight: 0.8,
        };
        let greatest = RankExpr::Greatest(vec![name.clone(), city.clone()]);
        let sum = RankExpr::Sum(vec![name, city]);
        assert!((greatest.score(&rec) - 1.0).abs() < 1e-9);
        assert!((sum.score(&rec) - 1.8).abs() < 1e-9);
    }
}
