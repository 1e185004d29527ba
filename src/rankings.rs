use std::cmp::Ordering;

use serde::Serialize;

use crate::aggregate::AggregateRow;

/// One leaderboard row: the fixed projection every board shares plus the
/// metric that ranked it.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub stadium_name: String,
    pub team_primary: String,
    pub capacity: u32,
    pub municipality_name: String,
    pub province_name: String,
    pub ccaa_name: String,
    pub matches: u32,
    pub att_total: u64,
    pub att_avg: u32,
    pub occ_avg_pct: Option<f64>,
    pub metric: f64,
}

/// Rank rows descending by an extracted metric and keep the first `limit`.
/// Rows whose metric is absent or non-finite are dropped, so a board may be
/// shorter than `limit` but never padded. Ties keep the input order (the
/// sort is stable), so reruns over the same rows rank identically.
pub fn top_by<F>(rows: &[AggregateRow], metric: F, limit: usize) -> Vec<LeaderboardEntry>
where
    F: Fn(&AggregateRow) -> Option<f64>,
{
    let mut ranked: Vec<(&AggregateRow, f64)> = rows
        .iter()
        .filter_map(|row| {
            let value = metric(row)?;
            value.is_finite().then_some((row, value))
        })
        .collect();

    ranked.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(row, value)| LeaderboardEntry {
            stadium_name: row.stadium_name.clone(),
            team_primary: row.team_primary.clone(),
            capacity: row.capacity,
            municipality_name: row.municipality.clone(),
            province_name: row.province.clone(),
            ccaa_name: row.ccaa.clone(),
            matches: row.matches,
            att_total: row.att_total,
            att_avg: row.att_avg,
            occ_avg_pct: row.occ_avg_pct,
            metric: value,
        })
        .collect()
}
