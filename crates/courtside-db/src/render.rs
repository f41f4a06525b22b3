//! Render [`Predicate`] and [`RankExpr`] trees onto a `QueryBuilder`.
//!
//! Every user-supplied value goes through `push_bind`; only column names from
//! [`TextField::column`] and fixed SQL fragments are pushed as text.

use courtside_core::{Predicate, RankExpr, TextField};
use sqlx::{Postgres, QueryBuilder};

const TS_CONFIG: &str = "'english'";

/// Escape `%`, `_` and `\` so a value matches literally under `LIKE`.
#[must_use]
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '%' | '_' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn coalesced(qb: &mut QueryBuilder<'_, Postgres>, field: TextField) {
    qb.push("coalesce(").push(field.column()).push(", '')");
}

fn push_tsquery(qb: &mut QueryBuilder<'_, Postgres>, query: &str, phrase: bool) {
    let func = if phrase {
        "phraseto_tsquery("
    } else {
        "plainto_tsquery("
    };
    qb.push(func)
        .push(TS_CONFIG)
        .push(", ")
        .push_bind(query.to_string())
        .push(")");
}

fn push_joined<T>(
    qb: &mut QueryBuilder<'_, Postgres>,
    items: &[T],
    separator: &str,
    mut push_item: impl FnMut(&mut QueryBuilder<'_, Postgres>, &T),
) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        push_item(qb, item);
    }
}

/// Append a boolean SQL expression for `predicate` over the `locations` row.
pub fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::All => {
            qb.push("TRUE");
        }
        Predicate::And(parts) if parts.is_empty() => {
            qb.push("TRUE");
        }
        Predicate::Or(parts) if parts.is_empty() => {
            qb.push("FALSE");
        }
        Predicate::And(parts) => {
            qb.push("(");
            push_joined(qb, parts, " AND ", push_predicate);
            qb.push(")");
        }
        Predicate::Or(parts) => {
            qb.push("(");
            push_joined(qb, parts, " OR ", push_predicate);
            qb.push(")");
        }
        Predicate::EqualsIgnoreCase { field, value } => {
            qb.push("lower(")
                .push(field.column())
                .push(") = lower(")
                .push_bind(value.clone())
                .push(")");
        }
        Predicate::HasPrefix { field, prefix } => {
            qb.push(field.column())
                .push(" ILIKE ")
                .push_bind(format!("{}%", escape_like(prefix)));
        }
        Predicate::Similar {
            field,
            value,
            threshold,
        } => {
            qb.push("similarity(");
            coalesced(qb, *field);
            qb.push(", ")
                .push_bind(value.clone())
                .push(") > ")
                .push_bind(*threshold);
        }
        Predicate::FullText { query, phrase } => {
            qb.push("search_vector @@ ");
            push_tsquery(qb, query, *phrase);
        }
        Predicate::SportTag(tag) => {
            qb.push_bind(tag.clone()).push(" = ANY(sports)");
        }
        Predicate::SportTagPartial(needles) => {
            let patterns: Vec<String> = needles
                .iter()
                .map(|n| format!("%{}%", escape_like(n)))
                .collect();
            qb.push("EXISTS (SELECT 1 FROM unnest(sports) AS tag WHERE tag ILIKE ANY(")
                .push_bind(patterns)
                .push("))");
        }
        Predicate::AnySport(tags) => {
            qb.push("sports && ").push_bind(tags.clone());
        }
        Predicate::WithinEnvelope(bbox) => {
            qb.push("ST_Within(location, ST_MakeEnvelope(")
                .push_bind(bbox.south_west.longitude)
                .push(", ")
                .push_bind(bbox.south_west.latitude)
                .push(", ")
                .push_bind(bbox.north_east.longitude)
                .push(", ")
                .push_bind(bbox.north_east.latitude)
                .push(", 4326))");
        }
        Predicate::WithinDistance { center, meters } => {
            qb.push("ST_DWithin(location::geography, ST_SetSRID(ST_MakePoint(")
                .push_bind(center.longitude)
                .push(", ")
                .push_bind(center.latitude)
                .push("), 4326)::geography, ")
                .push_bind(*meters)
                .push(")");
        }
    }
}

/// Append a numeric SQL expression for `rank`.
pub fn push_rank(qb: &mut QueryBuilder<'_, Postgres>, rank: &RankExpr) {
    match rank {
        RankExpr::Sum(parts) if parts.is_empty() => {
            qb.push("0");
        }
        RankExpr::Greatest(parts) if parts.is_empty() => {
            qb.push("0");
        }
        RankExpr::Sum(parts) => {
            qb.push("(");
            push_joined(qb, parts, " + ", push_rank);
            qb.push(")");
        }
        RankExpr::Greatest(parts) => {
            qb.push("GREATEST(");
            push_joined(qb, parts, ", ", push_rank);
            qb.push(")");
        }
        RankExpr::Tiered(tiers) => {
            qb.push("(CASE");
            for (predicate, score) in tiers {
                qb.push(" WHEN ");
                push_predicate(qb, predicate);
                qb.push(" THEN ").push_bind(*score);
            }
            qb.push(" ELSE 0 END)");
        }
        RankExpr::Similarity {
            field,
            value,
            weight,
        } => {
            qb.push("(similarity(");
            coalesced(qb, *field);
            qb.push(", ")
                .push_bind(value.clone())
                .push(") * ")
                .push_bind(*weight)
                .push(")");
        }
        RankExpr::FullTextRank {
            query,
            phrase,
            weight,
        } => {
            qb.push("(ts_rank(search_vector, ");
            push_tsquery(qb, query, *phrase);
            qb.push(") * ").push_bind(*weight).push(")");
        }
    }
}

#[cfg(test)]
mod tests {
    use courtside_core::{BoundingBox, GeoPoint};

    use super::*;

    fn render_predicate(predicate: &Predicate) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_predicate(&mut qb, predicate);
        qb.sql().to_string()
    }

    fn render_rank(rank: &RankExpr) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_rank(&mut qb, rank);
        qb.sql().to_string()
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn all_renders_true() {
        assert_eq!(render_predicate(&Predicate::All), "TRUE");
    }

    #[test]
    fn or_of_nothing_renders_false() {
        assert_eq!(render_predicate(&Predicate::Or(vec![])), "FALSE");
    }

    #[test]
    fn values_are_bound_not_inlined() {
        let sql = render_predicate(&Predicate::EqualsIgnoreCase {
            field: TextField::Name,
            value: "x'; DROP TABLE locations; --".to_string(),
        });
        assert_eq!(sql, "lower(name) = lower($1)");
    }

    #[test]
    fn conjunction_numbers_placeholders_in_order() {
        let sql = render_predicate(&Predicate::And(vec![
            Predicate::AnySport(vec!["tennis".to_string()]),
            Predicate::Similar {
                field: TextField::City,
                value: "austin".to_string(),
                threshold: 0.3,
            },
        ]));
        assert_eq!(sql, "(sports && $1 AND similarity(coalesce(city, ''), $2) > $3)");
    }

    #[test]
    fn envelope_uses_lon_lat_corner_order() {
        let sql = render_predicate(&Predicate::WithinEnvelope(BoundingBox {
            north_east: GeoPoint::new(41.0, -73.0),
            south_west: GeoPoint::new(40.0, -74.0),
        }));
        assert_eq!(sql, "ST_Within(location, ST_MakeEnvelope($1, $2, $3, $4, 4326))");
    }

    #[test]
    fn distance_is_geography_aware() {
        let sql = render_predicate(&Predicate::WithinDistance {
            center: GeoPoint::new(40.0, -75.0),
            meters: 8046.72,
        });
        assert!(sql.starts_with("ST_DWithin(location::geography"));
        assert!(sql.contains("::geography, $3)"));
    }

    #[test]
    fn phrase_uses_phraseto_tsquery() {
        let sql = render_predicate(&Predicate::FullText {
            query: "park courts".to_string(),
            phrase: true,
        });
        assert_eq!(sql, "search_vector @@ phraseto_tsquery('english', $1)");
    }

    #[test]
    fn tiered_rank_renders_case() {
        let sql = render_rank(&RankExpr::Tiered(vec![
            (Predicate::SportTag("court".to_string()), 0.95),
            (Predicate::SportTagPartial(vec!["court".to_string()]), 0.6),
        ]));
        assert_eq!(
            sql,
            "(CASE WHEN $1 = ANY(sports) THEN $2 \
             WHEN EXISTS (SELECT 1 FROM unnest(sports) AS tag WHERE tag ILIKE ANY($3)) THEN $4 \
             ELSE 0 END)"
        );
    }

    #[test]
    fn sum_and_greatest_nest() {
        let sql = render_rank(&RankExpr::Sum(vec![
            RankExpr::FullTextRank {
                query: "central".to_string(),
                phrase: false,
                weight: 1.0,
            },
            RankExpr::Greatest(vec![RankExpr::Similarity {
                field: TextField::Name,
                value: "central".to_string(),
                weight: 0.8,
            }]),
        ]));
        assert_eq!(
            sql,
            "((ts_rank(search_vector, plainto_tsquery('english', $1)) * $2) + \
             GREATEST((similarity(coalesce(name, ''), $3) * $4)))"
        );
    }
}
