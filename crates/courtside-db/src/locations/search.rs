//! Ranked, filtered, keyset-paginated reads for the query service.

use courtside_core::{PageQuery, Predicate, RankExpr, SortKey};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::types::RankedLocationRow;
use super::LOCATION_COLUMNS;
use crate::render::{push_predicate, push_rank};

fn push_score(qb: &mut QueryBuilder<'_, Postgres>, rank: Option<&RankExpr>) {
    match rank {
        Some(rank) => {
            qb.push("(");
            push_rank(qb, rank);
            qb.push(")::float8");
        }
        None => {
            qb.push("NULL::float8");
        }
    }
}

/// Rows strictly after `anchor` in page order. A rank-less anchor compares
/// on `(created_at, id)` only.
fn push_keyset(qb: &mut QueryBuilder<'_, Postgres>, anchor: &SortKey, ranked: bool) {
    let time_then_id = |qb: &mut QueryBuilder<'_, Postgres>| {
        qb.push("(created_at < ")
            .push_bind(anchor.created_at)
            .push(" OR (created_at = ")
            .push_bind(anchor.created_at)
            .push(" AND id > ")
            .push_bind(anchor.id.clone())
            .push("))");
    };

    match anchor.rank {
        Some(score) if ranked => {
            qb.push("(score < ")
                .push_bind(score)
                .push(" OR (score = ")
                .push_bind(score)
                .push(" AND ");
            time_then_id(qb);
            qb.push("))");
        }
        _ => time_then_id(qb),
    }
}

/// The page statement. The inner select computes `score` so the keyset
/// filter and the ordering can refer to it.
fn page_query<'a>(query: &PageQuery<'a>) -> QueryBuilder<'a, Postgres> {
    let ranked = query.rank.is_some();

    let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM (SELECT ");
    qb.push(LOCATION_COLUMNS).push(", ");
    push_score(&mut qb, query.rank);
    qb.push(" AS score FROM locations WHERE ");
    push_predicate(&mut qb, query.predicate);
    qb.push(") AS page");

    if let Some(anchor) = query.after {
        qb.push(" WHERE ");
        push_keyset(&mut qb, anchor, ranked);
    }

    qb.push(if ranked {
        " ORDER BY score DESC, created_at DESC, id ASC"
    } else {
        " ORDER BY created_at DESC, id ASC"
    });
    qb.push(" LIMIT ")
        .push_bind(i64::try_from(query.limit).unwrap_or(i64::MAX));
    qb
}

/// One page of matching rows in page order.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn fetch_page(
    pool: &PgPool,
    query: &PageQuery<'_>,
) -> Result<Vec<RankedLocationRow>, sqlx::Error> {
    let mut qb = page_query(query);
    let rows = qb
        .build_query_as::<RankedLocationRow>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Number of rows matching `predicate`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_matching(pool: &PgPool, predicate: &Predicate) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM locations WHERE ");
    push_predicate(&mut qb, predicate);
    let count = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(count)
}

#[derive(sqlx::FromRow)]
struct SortKeyRow {
    id: String,
    created_at: chrono::DateTime<chrono::Utc>,
    score: Option<f64>,
}

/// Sort key of row `id`, scored with the same expression the page query uses.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn sort_key(
    pool: &PgPool,
    id: &str,
    rank: Option<&RankExpr>,
) -> Result<Option<SortKey>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT id, created_at, ");
    push_score(&mut qb, rank);
    qb.push(" AS score FROM locations WHERE id = ")
        .push_bind(id.to_string());

    let row = qb
        .build_query_as::<SortKeyRow>()
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| SortKey {
        rank: r.score,
        created_at: r.created_at,
        id: r.id,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn anchor(rank: Option<f64>) -> SortKey {
        SortKey {
            rank,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            id: "loc-9".to_string(),
        }
    }

    #[test]
    fn unranked_keyset_is_time_then_id() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_keyset(&mut qb, &anchor(None), false);
        assert_eq!(qb.sql(), "(created_at < $1 OR (created_at = $2 AND id > $3))");
    }

    #[test]
    fn ranked_keyset_leads_with_score() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_keyset(&mut qb, &anchor(Some(0.5)), true);
        assert_eq!(
            qb.sql(),
            "(score < $1 OR (score = $2 AND (created_at < $3 OR (created_at = $4 AND id > $5))))"
        );
    }

    #[test]
    fn rankless_anchor_in_ranked_query_skips_score() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_keyset(&mut qb, &anchor(None), true);
        assert!(qb.sql().starts_with("(created_at < $1"));
    }

    fn page_sql(rank: Option<&RankExpr>, after: Option<&SortKey>) -> String {
        let predicate = Predicate::All;
        let query = PageQuery {
            predicate: &predicate,
            rank,
            after,
            limit: 3,
        };
        let qb = page_query(&query);
        qb.sql().to_string()
    }

    #[test]
    fn ranked_page_filters_on_projected_score() {
        let rank = RankExpr::Sum(vec![]);
        let sql = page_sql(Some(&rank), Some(&anchor(Some(0.5))));
        assert_eq!(
            sql,
            format!(
                "SELECT * FROM (SELECT {LOCATION_COLUMNS}, (0)::float8 AS score \
                 FROM locations WHERE TRUE) AS page \
                 WHERE (score < $1 OR (score = $2 AND (created_at < $3 OR (created_at = $4 AND id > $5)))) \
                 ORDER BY score DESC, created_at DESC, id ASC LIMIT $6"
            )
        );
    }

    #[test]
    fn ranked_page_with_rankless_anchor_keeps_score_order() {
        let rank = RankExpr::Sum(vec![]);
        let sql = page_sql(Some(&rank), Some(&anchor(None)));
        assert!(sql.ends_with(
            ") AS page WHERE (created_at < $1 OR (created_at = $2 AND id > $3)) \
             ORDER BY score DESC, created_at DESC, id ASC LIMIT $4"
        ));
        assert!(!sql.contains("score <"));
    }

    #[test]
    fn unranked_page_orders_by_time_then_id() {
        let sql = page_sql(None, None);
        assert!(sql.contains("NULL::float8 AS score"));
        assert!(sql.ends_with(") AS page ORDER BY created_at DESC, id ASC LIMIT $1"));
    }

    #[test]
    fn unranked_score_is_null() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_score(&mut qb, None);
        assert_eq!(qb.sql(), "NULL::float8");
    }
}
