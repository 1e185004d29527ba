use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::localtime::{LocalKickoff, is_canary_home, localize};
use crate::names::{canonical_team, team_key};
use crate::records::{Division, MatchRecord, PopulationLevel};
use crate::reference::ReferenceIndex;
use crate::resolve::{ResolvedVenue, Resolver, VenueKey};

/// Round a derived metric to two decimals, the precision everything emitted
/// by the pipeline carries.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Aggregation identity. The tenant component is set only for stadiums with
/// a secondary tenant, so a shared ground tracks each club's home record
/// separately while sole-tenant grounds keep one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateKey {
    pub venue: VenueKey,
    pub tenant: Option<String>,
}

/// One finalized per-stadium (or per-stadium-per-tenant) row.
///
/// Derived ratios are `None` whenever their denominator is unknown or zero;
/// they are never coerced to a numeric zero.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateRow {
    pub stadium_name: String,
    pub team_primary: String,
    pub team_sec: Option<String>,
    pub capacity: u32,
    pub capacity_estimated: bool,
    pub municipality: String,
    pub province: String,
    pub ccaa: String,
    pub matches: u32,
    pub att_total: u64,
    pub att_avg: u32,
    pub occ_avg_pct: Option<f64>,
    pub pop_muni: Option<u64>,
    pub pop_prov: Option<u64>,
    pub pop_ccaa: Option<u64>,
    pub att_avg_per1k_muni: Option<f64>,
    pub att_avg_per1k_prov: Option<f64>,
    pub att_avg_per1k_ccaa: Option<f64>,
}

/// Counters from one aggregation fold, surfaced by the binaries.
#[derive(Debug, Clone, Default)]
pub struct FoldReport {
    pub matches_seen: usize,
    pub matches_aggregated: usize,
    pub skipped_no_attendance: usize,
    pub skipped_unresolved: usize,
}

struct Accum {
    venue: ResolvedVenue,
    team_display: String,
    other_tenant: Option<String>,
    matches: u32,
    att_total: u64,
}

/// Fold all matches into per-stadium aggregate rows. A match with no
/// resolvable stadium or no valid attendance contributes nothing at all.
/// Rows come back sorted by average attendance descending (name as the tie
/// break), so downstream consumers never depend on map iteration order.
pub fn fold_matches(
    matches: &[MatchRecord],
    resolver: &Resolver<'_>,
    index: &ReferenceIndex,
) -> (Vec<AggregateRow>, FoldReport) {
    let mut report = FoldReport {
        matches_seen: matches.len(),
        ..FoldReport::default()
    };

    // Resolution is a pure function of the match and the read-only index,
    // the one stage worth running in parallel.
    let resolved: Vec<Option<ResolvedVenue>> = matches
        .par_iter()
        .map(|m| resolver.resolve(&m.home_team, m.season, m.jornada, m.attendance))
        .collect();

    let mut agg: HashMap<AggregateKey, Accum> = HashMap::new();
    for (m, venue) in matches.iter().zip(resolved) {
        let Some(att) = m.attendance else {
            report.skipped_no_attendance += 1;
            continue;
        };
        let Some(venue) = venue else {
            report.skipped_unresolved += 1;
            continue;
        };

        let tenant_key = team_key(&m.home_team);
        let key = AggregateKey {
            venue: venue.key.clone(),
            tenant: venue.is_shared().then(|| tenant_key.clone()),
        };

        let entry = agg.entry(key).or_insert_with(|| {
            let (team_display, other_tenant) = tenant_labels(&venue, &m.home_team, &tenant_key);
            Accum {
                venue,
                team_display,
                other_tenant,
                matches: 0,
                att_total: 0,
            }
        });
        entry.matches += 1;
        entry.att_total += u64::from(att);
        report.matches_aggregated += 1;
    }

    let mut rows: Vec<AggregateRow> = agg.into_values().map(|a| finalize(a, index)).collect();
    rows.sort_by(|a, b| {
        b.att_avg
            .cmp(&a.att_avg)
            .then_with(|| a.stadium_name.cmp(&b.stadium_name))
            .then_with(|| a.team_primary.cmp(&b.team_primary))
    });
    (rows, report)
}

/// On a shared ground each tenant's row leads with that tenant's name and
/// lists the co-tenant second, whichever of the two played at home.
fn tenant_labels(
    venue: &ResolvedVenue,
    home_team_raw: &str,
    tenant_key: &str,
) -> (String, Option<String>) {
    let is_primary = team_key(&venue.team_primary) == tenant_key;
    let is_secondary = venue
        .team_sec
        .as_deref()
        .is_some_and(|t| team_key(t) == tenant_key);

    if is_secondary && let Some(sec) = venue.team_sec.clone() {
        return (sec, Some(venue.team_primary.clone()));
    }
    if is_primary {
        return (venue.team_primary.clone(), venue.team_sec.clone());
    }
    (
        canonical_team(home_team_raw).to_string(),
        venue.team_sec.clone(),
    )
}

fn finalize(a: Accum, index: &ReferenceIndex) -> AggregateRow {
    let att_avg = if a.matches > 0 {
        (a.att_total as f64 / a.matches as f64).round() as u32
    } else {
        0
    };
    let occ_avg_pct = (a.venue.capacity > 0)
        .then(|| round2(att_avg as f64 / a.venue.capacity as f64 * 100.0));

    let pop_muni = index.population(PopulationLevel::Municipality, &a.venue.municipality);
    let pop_prov = index.population(PopulationLevel::Province, &a.venue.province);
    let pop_ccaa = index.population(PopulationLevel::Ccaa, &a.venue.ccaa);
    let per1k = |pop: Option<u64>| pop.map(|p| round2(att_avg as f64 / p as f64 * 1000.0));

    AggregateRow {
        stadium_name: a.venue.name.clone(),
        team_primary: a.team_display,
        team_sec: a.other_tenant,
        capacity: a.venue.capacity,
        capacity_estimated: a.venue.capacity_estimated,
        municipality: a.venue.municipality.clone(),
        province: a.venue.province.clone(),
        ccaa: a.venue.ccaa.clone(),
        matches: a.matches,
        att_total: a.att_total,
        att_avg,
        occ_avg_pct,
        pop_muni,
        pop_prov,
        pop_ccaa,
        att_avg_per1k_muni: per1k(pop_muni),
        att_avg_per1k_prov: per1k(pop_prov),
        att_avg_per1k_ccaa: per1k(pop_ccaa),
    }
}

/// Per-matchday occupancy across a division.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JornadaAggregate {
    pub jornada: u32,
    pub division: String,
    pub total_attendance: u64,
    pub total_capacity: u64,
    pub matches: u32,
    pub occupancy_pct: Option<f64>,
}

/// Fold matches into per-(division, jornada) occupancy totals. Matches with
/// no resolved stadium or no valid attendance are excluded entirely, never
/// counted as zero. Output is sorted by division then jornada.
pub fn fold_jornadas(
    matches: &[MatchRecord],
    resolver: &Resolver<'_>,
) -> (Vec<JornadaAggregate>, FoldReport) {
    let mut report = FoldReport {
        matches_seen: matches.len(),
        ..FoldReport::default()
    };

    let resolved: Vec<Option<ResolvedVenue>> = matches
        .par_iter()
        .map(|m| resolver.resolve(&m.home_team, m.season, m.jornada, m.attendance))
        .collect();

    let mut agg: HashMap<(Division, u32), (u64, u64, u32)> = HashMap::new();
    for (m, venue) in matches.iter().zip(resolved) {
        let Some(att) = m.attendance else {
            report.skipped_no_attendance += 1;
            continue;
        };
        let Some(venue) = venue else {
            report.skipped_unresolved += 1;
            continue;
        };
        if venue.capacity == 0 {
            report.skipped_unresolved += 1;
            continue;
        }
        let slot = agg.entry((m.division, m.jornada)).or_insert((0, 0, 0));
        slot.0 += u64::from(att);
        slot.1 += u64::from(venue.capacity);
        slot.2 += 1;
        report.matches_aggregated += 1;
    }

    let mut out: Vec<JornadaAggregate> = agg
        .into_iter()
        .map(|((division, jornada), (att, cap, n))| JornadaAggregate {
            jornada,
            division: division.label().to_string(),
            total_attendance: att,
            total_capacity: cap,
            matches: n,
            occupancy_pct: (cap > 0).then(|| round2(att as f64 / cap as f64 * 100.0)),
        })
        .collect();
    out.sort_by(|a, b| {
        a.division
            .cmp(&b.division)
            .then_with(|| a.jornada.cmp(&b.jornada))
    });
    (out, report)
}

/// A match with its derived fields attached. The base record is untouched;
/// this is what the weekday and hour views consume.
#[derive(Debug, Clone)]
pub struct EnrichedMatch {
    pub season: u16,
    pub jornada: u32,
    pub division: Division,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u8,
    pub away_goals: u8,
    pub attendance: Option<u32>,
    pub stadium_name: Option<String>,
    pub occupancy_pct: Option<f64>,
    pub kickoff: LocalKickoff,
}

/// Enrich every match with its resolved venue, per-match occupancy and local
/// kickoff. Runs the resolution stage in parallel like the folds do.
pub fn enrich_matches(matches: &[MatchRecord], resolver: &Resolver<'_>) -> Vec<EnrichedMatch> {
    matches
        .par_iter()
        .map(|m| {
            let venue = resolver.resolve(&m.home_team, m.season, m.jornada, m.attendance);
            let canary = is_canary_home(&m.home_team, venue.as_ref());
            let kickoff = localize(&m.date_raw, &m.time_raw, canary);
            let occupancy_pct = match (&venue, m.attendance) {
                (Some(v), Some(att)) if v.capacity > 0 => {
                    Some(round2(att as f64 / v.capacity as f64 * 100.0))
                }
                _ => None,
            };
            EnrichedMatch {
                season: m.season,
                jornada: m.jornada,
                division: m.division,
                home_team: canonical_team(&m.home_team).to_string(),
                away_team: canonical_team(&m.away_team).to_string(),
                home_goals: m.home_goals,
                away_goals: m.away_goals,
                attendance: m.attendance,
                stadium_name: venue.map(|v| v.name),
                occupancy_pct,
                kickoff,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(66.6666), 66.67);
        assert_eq!(round2(100.0), 100.0);
        assert_eq!(round2(0.005), 0.01);
    }
}
