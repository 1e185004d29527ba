use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::aggregate::{EnrichedMatch, round2};

/// Per-stadium attendance summary inside one weekday bucket.
#[derive(Debug, Clone, Serialize)]
pub struct WeekdayStadiumRow {
    pub stadium_name: String,
    pub matches: u32,
    pub att_avg: u32,
}

/// One day-by-hour heatmap cell. Only cells with at least one match exist.
#[derive(Debug, Clone, Serialize)]
pub struct HeatCell {
    pub weekday: u8,
    pub hour: u8,
    pub matches: u32,
    pub att_avg: u32,
    pub occ_avg_pct: Option<f64>,
}

/// Group matches by local weekday and rank each day's stadiums by average
/// attendance. All seven weekdays are always present (keys "0" through "6",
/// Sunday first); a day without matches gets an empty list, never a missing
/// key.
pub fn weekday_top(
    matches: &[EnrichedMatch],
    limit: usize,
) -> BTreeMap<String, Vec<WeekdayStadiumRow>> {
    let mut by_day: HashMap<u8, HashMap<String, (u32, u64)>> = HashMap::new();

    for m in matches {
        let (Some(att), Some(stadium)) = (m.attendance, m.stadium_name.as_deref()) else {
            continue;
        };
        let slot = by_day
            .entry(m.kickoff.weekday)
            .or_default()
            .entry(stadium.to_string())
            .or_insert((0, 0));
        slot.0 += 1;
        slot.1 += u64::from(att);
    }

    let mut out = BTreeMap::new();
    for day in 0u8..7 {
        let mut list: Vec<WeekdayStadiumRow> = by_day
            .remove(&day)
            .unwrap_or_default()
            .into_iter()
            .map(|(stadium_name, (n, total))| WeekdayStadiumRow {
                stadium_name,
                matches: n,
                att_avg: (total as f64 / n.max(1) as f64).round() as u32,
            })
            .collect();
        list.sort_by(|a, b| {
            b.att_avg
                .cmp(&a.att_avg)
                .then_with(|| a.stadium_name.cmp(&b.stadium_name))
        });
        list.truncate(limit);
        out.insert(day.to_string(), list);
    }
    out
}

/// Day-by-hour cells for the kickoff heatmap. Matches whose local time is
/// unreliable (malformed source date) are left out rather than smeared over
/// today's weekday. Cells come back sorted by (weekday, hour).
pub fn hour_heatmap(matches: &[EnrichedMatch]) -> Vec<HeatCell> {
    struct Cell {
        matches: u32,
        att_total: u64,
        occ_total: f64,
        occ_count: u32,
    }

    let mut cells: HashMap<(u8, u8), Cell> = HashMap::new();
    for m in matches {
        if !m.kickoff.reliable {
            continue;
        }
        let Some(att) = m.attendance else { continue };
        let cell = cells
            .entry((m.kickoff.weekday, m.kickoff.hour))
            .or_insert(Cell {
                matches: 0,
                att_total: 0,
                occ_total: 0.0,
                occ_count: 0,
            });
        cell.matches += 1;
        cell.att_total += u64::from(att);
        if let Some(occ) = m.occupancy_pct {
            cell.occ_total += occ;
            cell.occ_count += 1;
        }
    }

    let mut out: Vec<HeatCell> = cells
        .into_iter()
        .map(|((weekday, hour), cell)| HeatCell {
            weekday,
            hour,
            matches: cell.matches,
            att_avg: (cell.att_total as f64 / cell.matches.max(1) as f64).round() as u32,
            occ_avg_pct: (cell.occ_count > 0)
                .then(|| round2(cell.occ_total / cell.occ_count as f64)),
        })
        .collect();
    out.sort_by(|a, b| a.weekday.cmp(&b.weekday).then_with(|| a.hour.cmp(&b.hour)));
    out
}
