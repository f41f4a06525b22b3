use crate::geo;
use crate::locations::{BoundingBox, GeoPoint, LocationRecord};
use crate::search::{fulltext, trigram, TextField};

/// Boolean filter over location rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row.
    All,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    EqualsIgnoreCase {
        field: TextField,
        value: String,
    },
    /// Case-insensitive literal prefix; wildcard characters in `prefix`
    /// carry no special meaning.
    HasPrefix {
        field: TextField,
        prefix: String,
    },
    /// Trigram similarity strictly above `threshold`.
    Similar {
        field: TextField,
        value: String,
        threshold: f64,
    },
    /// Full-text match of an already normalized query.
    FullText {
        query: String,
        phrase: bool,
    },
    /// Exact (lower-case) tag membership.
    SportTag(String),
    /// Some tag contains one of the needles as a literal substring.
    SportTagPartial(Vec<String>),
    /// Tag set overlaps the given tags.
    AnySport(Vec<String>),
    WithinEnvelope(BoundingBox),
    WithinDistance {
        center: GeoPoint,
        meters: f64,
    },
}

impl Predicate {
    /// Conjunction of `parts`, flattening nested `And`s and dropping `All`.
    #[must_use]
    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Predicate::All => {}
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Predicate::All,
            1 => flat.remove(0),
            _ => Predicate::And(flat),
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Predicate::All)
    }

    /// Evaluate against a record in process.
    #[must_use]
    pub fn matches(&self, record: &LocationRecord) -> bool {
        match self {
            Predicate::All => true,
            Predicate::And(parts) => parts.iter().all(|p| p.matches(record)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(record)),
            Predicate::EqualsIgnoreCase { field, value } => field
                .value(record)
                .is_some_and(|v| v.to_lowercase() == value.to_lowercase()),
            Predicate::HasPrefix { field, prefix } => field
                .value(record)
                .is_some_and(|v| v.to_lowercase().starts_with(&prefix.to_lowercase())),
            Predicate::Similar {
                field,
                value,
                threshold,
            } => trigram::similarity(field.value(record).unwrap_or(""), value) > *threshold,
            Predicate::FullText { query, phrase } => {
                fulltext::text_matches(record, query, *phrase)
            }
            Predicate::SportTag(tag) => record.sports.iter().any(|s| s == tag),
            Predicate::SportTagPartial(needles) => record.sports.iter().any(|s| {
                let s = s.to_lowercase();
                needles.iter().any(|n| s.contains(n.as_str()))
            }),
            Predicate::AnySport(tags) => record.sports.iter().any(|s| tags.contains(s)),
            Predicate::WithinEnvelope(bbox) => geo::within_envelope(bbox, record.point()),
            Predicate::WithinDistance { center, meters } => {
                geo::haversine_meters(*center, record.point()) <= *meters
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(name: &str, sports: &[&str]) -> LocationRecord {
        LocationRecord {
            id: name.to_lowercase(),
            name: Some(name.to_string()),
            street: Some("12 Elm St".to_string()),
            street2: None,
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            postal_code: Some("62701".to_string()),
            latitude: 39.8,
            longitude: -89.6,
            sports: sports.iter().map(|s| (*s).to_string()).collect(),
            bounds: vec![],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn and_flattens_and_drops_identity() {
        let p = Predicate::and([
            Predicate::All,
            Predicate::And(vec![
                Predicate::SportTag("tennis".into()),
                Predicate::SportTag("court".into()),
            ]),
            Predicate::SportTag("golf".into()),
        ]);
        assert_eq!(
            p,
            Predicate::And(vec![
                Predicate::SportTag("tennis".into()),
                Predicate::SportTag("court".into()),
                Predicate::SportTag("golf".into()),
            ])
        );
    }

    #[test]
    fn and_of_nothing_is_all() {
        assert!(Predicate::and([]).is_all());
        assert!(Predicate::and([Predicate::All, Predicate::All]).is_all());
    }

    #[test]
    fn and_of_one_is_that_one() {
        let p = Predicate::and([Predicate::SportTag("golf".into())]);
        assert_eq!(p, Predicate::SportTag("golf".into()));
    }

    #[test]
    fn prefix_is_literal_and_case_insensitive() {
        let rec = record("100% Fun Park", &[]);
        let hit = Predicate::HasPrefix {
            field: TextField::Name,
            prefix: "100%".into(),
        };
        let miss = Predicate::HasPrefix {
            field: TextField::Name,
            prefix: "1_0".into(),
        };
        assert!(hit.matches(&rec));
        assert!(!miss.matches(&rec));
    }

    #[test]
    fn equals_ignores_case() {
        let rec = record("Riverside Courts", &[]);
        let p = Predicate::EqualsIgnoreCase {
            field: TextField::Name,
            value: "riverside COURTS".into(),
        };
        assert!(p.matches(&rec));
    }

    #[test]
    fn similar_on_missing_field_never_matches() {
        let mut rec = record("Riverside Courts", &[]);
        rec.street = None;
        let p = Predicate::Similar {
            field: TextField::Street,
            value: "elm".into(),
            threshold: 0.0,
        };
        assert!(!p.matches(&rec));
    }

    #[test]
    fn any_sport_checks_overlap() {
        let rec = record("Riverside Courts", &["tennis", "court"]);
        assert!(Predicate::AnySport(vec!["golf".into(), "tennis".into()]).matches(&rec));
        assert!(!Predicate::AnySport(vec!["golf".into()]).matches(&rec));
    }

    #[test]
    fn partial_tag_matches_substring() {
        let rec = record("Riverside Courts", &["basketball"]);
        assert!(Predicate::SportTagPartial(vec!["ball".into()]).matches(&rec));
        assert!(!Predicate::SportTagPartial(vec!["soccer".into()]).matches(&rec));
    }
}
