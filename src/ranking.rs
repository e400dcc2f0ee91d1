use crate::types::{Ranking, Row};
use std::collections::BTreeMap;

/// Top `limit` units of a cohort by summed active members.
///
/// Rows are grouped by unit name. Groups are visited in ascending name
/// order and sorted with a stable sort, so equal totals keep name order.
pub fn top_units(cohort: &[&Row], limit: usize) -> Ranking {
    let mut totals: BTreeMap<&str, u128> = BTreeMap::new();
    for r in cohort {
        *totals.entry(r.name.as_str()).or_default() += u128::from(r.active_members);
    }
    let mut ranked: Vec<(String, u128)> = totals
        .into_iter()
        .map(|(name, total)| (name.to_string(), total))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    Ranking(ranked)
}
