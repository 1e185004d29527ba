use std::collections::HashMap;

use crate::names::{index_alias, normalize, team_key};
use crate::records::{OverrideRecord, StadiumRecord};
use crate::reference::ReferenceIndex;

/// Identity of a resolved venue for aggregation keys.
///
/// `Estimated` marks an override venue the roster does not know: the name is
/// trusted but the capacity is borrowed from the team's usual ground, so
/// downstream code must not treat it as a fully known stadium. Making that a
/// variant instead of a null id keeps the distinction type-checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VenueKey {
    Roster(String),
    Estimated { name: String, team: String },
}

/// A stadium instance picked for one match, carrying everything aggregation
/// needs so the resolver is the only component touching the roster.
#[derive(Debug, Clone)]
pub struct ResolvedVenue {
    pub key: VenueKey,
    pub name: String,
    pub capacity: u32,
    pub capacity_estimated: bool,
    pub team_primary: String,
    pub team_sec: Option<String>,
    pub municipality: String,
    pub province: String,
    pub ccaa: String,
}

impl ResolvedVenue {
    fn from_roster(s: &StadiumRecord) -> Self {
        let key = s
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| normalize(&s.name));
        ResolvedVenue {
            key: VenueKey::Roster(key),
            name: s.name.clone(),
            capacity: s.capacity,
            capacity_estimated: false,
            team_primary: s.team_primary.clone(),
            team_sec: s.team_sec.clone(),
            municipality: s.municipality.clone(),
            province: s.province.clone(),
            ccaa: s.ccaa.clone(),
        }
    }

    /// Override venue absent from the roster. Geography and capacity come
    /// from the donor (the team's default ground); the name comes from the
    /// override row.
    fn estimated(name: &str, team: &str, donor: &StadiumRecord) -> Self {
        ResolvedVenue {
            key: VenueKey::Estimated {
                name: normalize(name),
                team: team.to_string(),
            },
            name: name.to_string(),
            capacity: donor.capacity,
            capacity_estimated: true,
            team_primary: donor.team_primary.clone(),
            team_sec: donor.team_sec.clone(),
            municipality: donor.municipality.clone(),
            province: donor.province.clone(),
            ccaa: donor.ccaa.clone(),
        }
    }

    pub fn is_shared(&self) -> bool {
        self.team_sec.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Picks the most plausible stadium instance for each home match. Overrides
/// first, then the team alias fallback, then the capacity-fit heuristic.
/// Pure: same inputs and index always give the same venue, which is what
/// lets the per-match stage run in parallel.
pub struct Resolver<'a> {
    index: &'a ReferenceIndex,
    overrides: HashMap<(u16, u32, String), String>,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a ReferenceIndex, overrides: &[OverrideRecord]) -> Self {
        let mut map = HashMap::new();
        for o in overrides {
            map.insert(
                (o.season, o.jornada, team_key(&o.home_team)),
                o.stadium_name.clone(),
            );
        }
        Resolver {
            index,
            overrides: map,
        }
    }

    /// Resolve a home match to a venue. `None` means the team has no known
    /// stadium at all; the match then stays out of stadium-keyed aggregates
    /// but remains in flat match lists.
    pub fn resolve(
        &self,
        home_team_raw: &str,
        season: u16,
        jornada: u32,
        attendance: Option<u32>,
    ) -> Option<ResolvedVenue> {
        let key = team_key(home_team_raw);
        if key.is_empty() {
            return None;
        }

        if let Some(name) = self.overrides.get(&(season, jornada, key.clone())) {
            if let Some(s) = self.index.stadium_by_name(name) {
                return Some(ResolvedVenue::from_roster(s));
            }
            // One-off venue the roster has never heard of (neutral ground,
            // temporary relocation). Estimate capacity from the team's
            // default ground; with no known ground at all resolution fails.
            let candidates = self.candidates_for(&key)?;
            let donor = candidates.last()?;
            return Some(ResolvedVenue::estimated(name, &key, donor));
        }

        let candidates = self.candidates_for(&key)?;
        pick_by_capacity(candidates, attendance).map(ResolvedVenue::from_roster)
    }

    fn candidates_for(&self, key: &str) -> Option<&[StadiumRecord]> {
        if let Some(found) = self.index.candidates(key) {
            return Some(found);
        }
        let alias = index_alias(key)?;
        self.index.candidates(&normalize(alias))
    }
}

/// Smallest ground that could have held the crowd; the largest one when the
/// crowd exceeds every known capacity (overbooking or bad data) or when the
/// attendance is unknown. Candidates arrive sorted ascending by capacity.
fn pick_by_capacity(candidates: &[StadiumRecord], attendance: Option<u32>) -> Option<&StadiumRecord> {
    if let Some(att) = attendance.filter(|a| *a > 0)
        && let Some(fit) = candidates.iter().find(|s| s.capacity >= att)
    {
        return Some(fit);
    }
    candidates.last()
}
