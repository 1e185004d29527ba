use serde::{Deserialize, Serialize};

/// Competition a match file belongs to, inferred from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Division {
    Primera,
    Segunda,
}

impl Division {
    pub fn label(self) -> &'static str {
        match self {
            Division::Primera => "Primera División",
            Division::Segunda => "Segunda División",
        }
    }

    /// Match CSVs are named by competition chunk (`laliga_2025_j1-13.csv`,
    /// `segunda_2025_j1-15.csv`). Files with an unknown prefix are skipped
    /// by the loader.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.starts_with("laliga") || lower.starts_with("primera") {
            Some(Division::Primera)
        } else if lower.starts_with("segunda") {
            Some(Division::Segunda)
        } else {
            None
        }
    }
}

/// One scraped match row. Built once at the parse boundary and never mutated;
/// derived fields live on `EnrichedMatch` instead.
///
/// An attendance of zero is indistinguishable from "not recorded" in the
/// source, so both are stored as `None` here and every consumer inherits the
/// exclusion rule from this one place.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub season: u16,
    pub jornada: u32,
    pub date_raw: String,
    pub time_raw: String,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u8,
    pub away_goals: u8,
    pub attendance: Option<u32>,
    pub division: Division,
}

/// One stadium roster row. Capacity is validated positive at load time; rows
/// that fail validation are dropped and counted, so aggregation can rely on
/// `capacity > 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StadiumRecord {
    pub id: Option<String>,
    pub name: String,
    pub capacity: u32,
    pub team_primary: String,
    pub team_sec: Option<String>,
    pub municipality: String,
    pub province: String,
    pub ccaa: String,
}

/// Administrative level a population table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationLevel {
    Municipality,
    Province,
    Ccaa,
}

/// One population table row. Population is `None` when the source cell is
/// missing, zero or unparseable; a `None` denominator keeps per-capita
/// metrics null instead of coercing them to zero.
#[derive(Debug, Clone)]
pub struct PopulationRecord {
    pub name: String,
    pub population: Option<u64>,
}

/// Manually curated exception redirecting one (season, jornada, home team)
/// match to a non-default stadium.
#[derive(Debug, Clone)]
pub struct OverrideRecord {
    pub season: u16,
    pub jornada: u32,
    pub home_team: String,
    pub stadium_name: String,
}
