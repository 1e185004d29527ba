use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::aggregate::{AggregateRow, EnrichedMatch, JornadaAggregate};
use crate::buckets::{HeatCell, WeekdayStadiumRow, hour_heatmap, weekday_top};
use crate::rankings::{LeaderboardEntry, top_by};
use crate::records::{Division, PopulationLevel};
use crate::reference::ReferenceIndex;

const TOP_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Totals {
    pub stadiums_count: usize,
    pub matches_count: usize,
}

/// The per-stadium row shape the dashboard's main table consumes.
#[derive(Debug, Clone, Serialize)]
pub struct StadiumSummary {
    pub stadium_name: String,
    pub team_primary: String,
    pub capacity: u32,
    pub att_avg: u32,
    pub occ_avg_pct: Option<f64>,
    pub matches: u32,
    pub municipality: String,
    pub province: String,
    pub ccaa: String,
    pub pop_muni: Option<u64>,
    pub pop_prov: Option<u64>,
    pub pop_ccaa: Option<u64>,
}

/// `home_metrics.json`: the dashboard's landing-page document.
#[derive(Debug, Serialize)]
pub struct HomeMetricsDoc {
    pub generated_at: String,
    pub totals: Totals,
    pub all_stadiums: Vec<StadiumSummary>,
    pub top_total_attendance: Vec<LeaderboardEntry>,
    pub top_avg_attendance: Vec<LeaderboardEntry>,
    pub top_occ_pct: Vec<LeaderboardEntry>,
    pub top_per1k_muni: Vec<LeaderboardEntry>,
    pub top_per1k_prov: Vec<LeaderboardEntry>,
    pub top_per1k_ccaa: Vec<LeaderboardEntry>,
    pub top_by_weekday: BTreeMap<String, Vec<WeekdayStadiumRow>>,
    pub weekday_hour_heatmap: Vec<HeatCell>,
}

/// Assemble the home metrics document. `rows` arrive sorted by average
/// attendance descending from the fold, which is also the order the full
/// table ships in.
pub fn build_home_metrics(
    rows: &[AggregateRow],
    enriched: &[EnrichedMatch],
    totals: Totals,
) -> HomeMetricsDoc {
    let all_stadiums = rows
        .iter()
        .map(|r| StadiumSummary {
            stadium_name: r.stadium_name.clone(),
            team_primary: r.team_primary.clone(),
            capacity: r.capacity,
            att_avg: r.att_avg,
            occ_avg_pct: r.occ_avg_pct,
            matches: r.matches,
            municipality: r.municipality.clone(),
            province: r.province.clone(),
            ccaa: r.ccaa.clone(),
            pop_muni: r.pop_muni,
            pop_prov: r.pop_prov,
            pop_ccaa: r.pop_ccaa,
        })
        .collect();

    HomeMetricsDoc {
        generated_at: Utc::now().to_rfc3339(),
        totals,
        all_stadiums,
        top_total_attendance: top_by(rows, |r| Some(r.att_total as f64), TOP_LIMIT),
        top_avg_attendance: top_by(rows, |r| Some(r.att_avg as f64), TOP_LIMIT),
        top_occ_pct: top_by(rows, |r| r.occ_avg_pct, TOP_LIMIT),
        top_per1k_muni: top_by(rows, |r| r.att_avg_per1k_muni, TOP_LIMIT),
        top_per1k_prov: top_by(rows, |r| r.att_avg_per1k_prov, TOP_LIMIT),
        top_per1k_ccaa: top_by(rows, |r| r.att_avg_per1k_ccaa, TOP_LIMIT),
        top_by_weekday: weekday_top(enriched, TOP_LIMIT),
        weekday_hour_heatmap: hour_heatmap(enriched),
    }
}

/// `jornada_occupancy.json`: per-matchday occupancy per division plus the
/// combined dually-sorted view.
#[derive(Debug, Serialize)]
pub struct JornadaOccupancyDoc {
    pub generated_at: String,
    pub primera: Vec<JornadaAggregate>,
    pub segunda: Vec<JornadaAggregate>,
    pub combined: Vec<JornadaAggregate>,
}

/// Split the sorted jornada aggregates into the document's three views.
/// `jornadas` is already sorted division-then-jornada, which is exactly the
/// combined ordering.
pub fn build_jornada_doc(jornadas: Vec<JornadaAggregate>) -> JornadaOccupancyDoc {
    let primera: Vec<JornadaAggregate> = jornadas
        .iter()
        .filter(|j| j.division == Division::Primera.label())
        .cloned()
        .collect();
    let segunda: Vec<JornadaAggregate> = jornadas
        .iter()
        .filter(|j| j.division == Division::Segunda.label())
        .cloned()
        .collect();
    JornadaOccupancyDoc {
        generated_at: Utc::now().to_rfc3339(),
        primera,
        segunda,
        combined: jornadas,
    }
}

/// One stadium's surrounding population figures at the three administrative
/// levels. Unknown lookups stay null; the row itself always exists.
#[derive(Debug, Clone, Serialize)]
pub struct StadiumPopulation {
    pub municipality: Option<String>,
    pub province: Option<String>,
    pub ccaa: Option<String>,
    pub pop_muni: Option<u64>,
    pub pop_prov: Option<u64>,
    pub pop_ccaa: Option<u64>,
}

/// `stadium_populations.json`, keyed by stadium name, plus the list of
/// stadiums with no population figure at any level for the run report.
pub fn build_stadium_populations(
    index: &ReferenceIndex,
) -> (BTreeMap<String, StadiumPopulation>, Vec<String>) {
    let mut out = BTreeMap::new();
    let mut missing = Vec::new();

    for s in index.roster() {
        let pop_muni = index.population(PopulationLevel::Municipality, &s.municipality);
        let pop_prov = index.population(PopulationLevel::Province, &s.province);
        let pop_ccaa = index.population(PopulationLevel::Ccaa, &s.ccaa);

        if pop_muni.is_none() && pop_prov.is_none() && pop_ccaa.is_none() {
            missing.push(s.name.clone());
        }

        let nonblank = |v: &str| {
            let t = v.trim();
            (!t.is_empty()).then(|| t.to_string())
        };
        out.insert(
            s.name.clone(),
            StadiumPopulation {
                municipality: nonblank(&s.municipality),
                province: nonblank(&s.province),
                ccaa: nonblank(&s.ccaa),
                pop_muni,
                pop_prov,
                pop_ccaa,
            },
        );
    }
    (out, missing)
}

/// Write a document as pretty JSON, atomically: the temp file is swapped in
/// only after the full body is on disk, so consumers never see a torn file.
pub fn write_json<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(doc).context("serialize output document")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap into place {}", path.display()))?;
    Ok(())
}
