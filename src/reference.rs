use std::collections::HashMap;

use crate::names::normalize;
use crate::records::{PopulationLevel, PopulationRecord, StadiumRecord};

/// Population lookup for one administrative level. Keeps the insertion order
/// alongside the exact-match map so the substring fallback is deterministic:
/// the first-inserted qualifying key wins.
#[derive(Debug, Default)]
pub struct PopulationTable {
    exact: HashMap<String, u64>,
    ordered: Vec<(String, u64)>,
}

impl PopulationTable {
    fn insert(&mut self, record: &PopulationRecord) {
        let key = normalize(&record.name);
        let Some(pop) = record.population.filter(|p| *p > 0) else {
            return;
        };
        if key.is_empty() {
            return;
        }
        if !self.exact.contains_key(&key) {
            self.ordered.push((key.clone(), pop));
        }
        self.exact.insert(key, pop);
    }

    /// Exact normalized match first; failing that, scan keys in insertion
    /// order and accept the first where either side contains the other.
    /// The soft match tolerates naming drift between the roster and the
    /// census tables ("Las Palmas de Gran Canaria" vs "Las Palmas").
    pub fn lookup(&self, raw: &str) -> Option<u64> {
        let key = normalize(raw);
        if key.is_empty() {
            return None;
        }
        if let Some(pop) = self.exact.get(&key) {
            return Some(*pop);
        }
        self.ordered
            .iter()
            .find(|(k, _)| k.contains(&key) || key.contains(k.as_str()))
            .map(|(_, pop)| *pop)
    }

}

/// Counters from building the reference index, printed by the binaries.
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    pub stadiums_indexed: usize,
    pub duplicate_names: usize,
    pub teams_indexed: usize,
    pub warnings: Vec<String>,
}

/// Read-only lookup structures shared by every pipeline stage. Built once at
/// startup from the roster and population tables and passed by reference;
/// nothing here mutates afterwards.
#[derive(Debug)]
pub struct ReferenceIndex {
    roster: Vec<StadiumRecord>,
    stadium_by_name: HashMap<String, StadiumRecord>,
    stadiums_by_team: HashMap<String, Vec<StadiumRecord>>,
    municipalities: PopulationTable,
    provinces: PopulationTable,
    regions: PopulationTable,
}

impl ReferenceIndex {
    pub fn build(
        stadiums: Vec<StadiumRecord>,
        municipalities: &[PopulationRecord],
        provinces: &[PopulationRecord],
        regions: &[PopulationRecord],
    ) -> (Self, IndexReport) {
        let mut report = IndexReport::default();
        let mut by_name: HashMap<String, StadiumRecord> = HashMap::new();
        let mut by_team: HashMap<String, Vec<StadiumRecord>> = HashMap::new();

        for s in &stadiums {
            let name_key = normalize(&s.name);
            if !name_key.is_empty() {
                // Last write wins on duplicate roster names; counted so a
                // silently shadowed row shows up in the run report.
                if let Some(prev) = by_name.insert(name_key, s.clone()) {
                    report.duplicate_names += 1;
                    report
                        .warnings
                        .push(format!("duplicate stadium name in roster: {}", prev.name));
                }
            }

            // Teams are indexed under the roster's own spelling; mapping a
            // scraped name onto that spelling is the resolver's job.
            let primary = normalize(&s.team_primary);
            if !primary.is_empty() {
                by_team.entry(primary).or_default().push(s.clone());
            }
            if let Some(sec) = s.team_sec.as_deref() {
                let secondary = normalize(sec);
                if !secondary.is_empty() {
                    by_team.entry(secondary).or_default().push(s.clone());
                }
            }
        }

        // The capacity-fit heuristic walks candidates smallest first.
        for candidates in by_team.values_mut() {
            candidates.sort_by(|a, b| a.capacity.cmp(&b.capacity).then(a.name.cmp(&b.name)));
        }

        let mut mun_table = PopulationTable::default();
        let mut prov_table = PopulationTable::default();
        let mut ccaa_table = PopulationTable::default();
        for r in municipalities {
            mun_table.insert(r);
        }
        for r in provinces {
            prov_table.insert(r);
        }
        for r in regions {
            ccaa_table.insert(r);
        }

        report.stadiums_indexed = by_name.len();
        report.teams_indexed = by_team.len();

        let index = ReferenceIndex {
            roster: stadiums,
            stadium_by_name: by_name,
            stadiums_by_team: by_team,
            municipalities: mun_table,
            provinces: prov_table,
            regions: ccaa_table,
        };
        (index, report)
    }

    /// The roster as loaded, in file order. Drives the stadium-populations
    /// document and the totals counter.
    pub fn roster(&self) -> &[StadiumRecord] {
        &self.roster
    }

    pub fn stadium_by_name(&self, raw: &str) -> Option<&StadiumRecord> {
        let key = normalize(raw);
        if key.is_empty() {
            return None;
        }
        self.stadium_by_name.get(&key)
    }

    /// Candidate home grounds for a normalized team key, ascending by
    /// capacity. `None` when the team is unknown to the roster.
    pub fn candidates(&self, team_key: &str) -> Option<&[StadiumRecord]> {
        self.stadiums_by_team
            .get(team_key)
            .map(|v| v.as_slice())
            .filter(|v| !v.is_empty())
    }

    pub fn population(&self, level: PopulationLevel, raw: &str) -> Option<u64> {
        match level {
            PopulationLevel::Municipality => self.municipalities.lookup(raw),
            PopulationLevel::Province => self.provinces.lookup(raw),
            PopulationLevel::Ccaa => self.regions.lookup(raw),
        }
    }
}
