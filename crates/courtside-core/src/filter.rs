use crate::geo::region_predicate;
use crate::locations::Region;
use crate::search::{rank_query, Predicate, RankExpr, TextQuery};

/// Optional read-path filters; any combination may be present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationFilters {
    /// Lowercase tags; a row matches when it has any of them.
    pub sports: Vec<String>,
    pub region: Option<Region>,
    pub text: Option<TextQuery>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedFilter {
    pub predicate: Predicate,
    /// Present only when a text query is.
    pub rank: Option<RankExpr>,
}

/// AND together whichever filters are present. No filters yields
/// [`Predicate::All`].
#[must_use]
pub fn compose(filters: &LocationFilters) -> ComposedFilter {
    let mut parts = Vec::with_capacity(3);

    if !filters.sports.is_empty() {
        parts.push(Predicate::AnySport(filters.sports.clone()));
    }
    if let Some(region) = &filters.region {
        parts.push(region_predicate(region));
    }

    let rank = filters.text.as_ref().map(|text| {
        let ranked = rank_query(text);
        parts.push(ranked.predicate);
        ranked.rank
    });

    ComposedFilter {
        predicate: Predicate::and(parts),
        rank,
    }
}
