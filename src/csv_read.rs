use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;

use crate::records::{Division, MatchRecord, OverrideRecord, PopulationRecord, StadiumRecord};

/// What happened while loading one input file (or one directory of files).
/// Row-level problems never abort a load; they end up in these counters and
/// the binaries print them.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub rows_seen: usize,
    pub rows_kept: usize,
    pub rows_skipped: usize,
    pub warnings: Vec<String>,
}

impl LoadReport {
    fn skip(&mut self, why: String) {
        self.rows_skipped += 1;
        if self.warnings.len() < 20 {
            self.warnings.push(why);
        }
    }

    fn merge(&mut self, other: LoadReport) {
        self.rows_seen += other.rows_seen;
        self.rows_kept += other.rows_kept;
        self.rows_skipped += other.rows_skipped;
        self.warnings.extend(other.warnings);
    }
}

/// Lenient count parser tolerating thousands separators in any of the styles
/// the sources use ("1.234", "12,345", "12 345"). Empty, dash and
/// non-numeric cells come back as `None`.
pub fn parse_count(raw: &str) -> Option<u64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// The roster file ships semicolon-delimited while match and population files
/// use commas; both must be tolerated. Decided per file from the header line.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let semis = header.matches(';').count();
    let commas = header.matches(',').count();
    if semis > commas { b';' } else { b',' }
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read input file {}", path.display()))
}

fn reader_for(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .delimiter(sniff_delimiter(text))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
}

#[derive(Debug, Deserialize)]
struct RawMatchRow {
    #[serde(default)]
    season: String,
    #[serde(default, alias = "jornada")]
    spieltag: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    time: String,
    #[serde(default)]
    home_team: String,
    #[serde(default)]
    away_team: String,
    #[serde(default)]
    home_goals: String,
    #[serde(default)]
    away_goals: String,
    #[serde(default)]
    attendance: String,
}

/// Load a single competition-chunk match CSV. Rows missing the fields every
/// aggregate needs (season, jornada, home team) are dropped and counted;
/// a missing or zero attendance is kept as `None`.
pub fn load_match_file(path: &Path, division: Division) -> Result<(Vec<MatchRecord>, LoadReport)> {
    let text = read_input(path)?;
    let mut report = LoadReport::default();
    let mut out = Vec::new();

    for (line, row) in reader_for(&text).deserialize::<RawMatchRow>().enumerate() {
        report.rows_seen += 1;
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                report.skip(format!("{}: row {}: {err}", path.display(), line + 2));
                continue;
            }
        };

        let (Some(season), Some(jornada)) = (
            row.season.trim().parse::<u16>().ok(),
            row.spieltag.trim().parse::<u32>().ok(),
        ) else {
            report.skip(format!(
                "{}: row {}: bad season/jornada",
                path.display(),
                line + 2
            ));
            continue;
        };
        if row.home_team.trim().is_empty() {
            report.skip(format!("{}: row {}: empty home team", path.display(), line + 2));
            continue;
        }

        let attendance = parse_count(&row.attendance)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0);

        out.push(MatchRecord {
            season,
            jornada,
            date_raw: row.date.trim().to_string(),
            time_raw: row.time.trim().to_string(),
            home_team: row.home_team.trim().to_string(),
            away_team: row.away_team.trim().to_string(),
            home_goals: row.home_goals.trim().parse().unwrap_or(0),
            away_goals: row.away_goals.trim().parse().unwrap_or(0),
            attendance,
            division,
        });
        report.rows_kept += 1;
    }

    Ok((out, report))
}

/// Load every `*.csv` under the matches directory, tagging each file with the
/// division its name announces. Files with an unrecognized prefix are skipped
/// with a warning rather than guessed at.
pub fn load_match_dir(dir: &Path) -> Result<(Vec<MatchRecord>, LoadReport)> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("read matches directory {}", dir.display()))?;

    let mut files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    let mut all = Vec::new();
    let mut report = LoadReport::default();
    for path in files {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let Some(division) = Division::from_file_name(&file_name) else {
            report
                .warnings
                .push(format!("{file_name}: unknown competition prefix, skipped"));
            continue;
        };
        let (rows, file_report) = load_match_file(&path, division)?;
        all.extend(rows);
        report.merge(file_report);
    }
    Ok((all, report))
}

#[derive(Debug, Deserialize)]
struct RawStadiumRow {
    #[serde(default)]
    stadium_id: String,
    #[serde(default, alias = "stadium")]
    stadium_name: String,
    #[serde(default)]
    capacity: String,
    #[serde(default)]
    team_primary: String,
    #[serde(default)]
    team_sec: String,
    #[serde(default, alias = "mun_name", alias = "municipality")]
    municipality_name: String,
    #[serde(default, alias = "prov_name", alias = "province")]
    province_name: String,
    #[serde(default, alias = "ccaa")]
    ccaa_name: String,
}

/// Load the stadium roster. Rows without a name, a primary tenant or a
/// positive capacity cannot participate in resolution or occupancy math and
/// are dropped with a counter.
pub fn load_stadiums(path: &Path) -> Result<(Vec<StadiumRecord>, LoadReport)> {
    let text = read_input(path)?;
    let mut report = LoadReport::default();
    let mut out = Vec::new();

    for (line, row) in reader_for(&text).deserialize::<RawStadiumRow>().enumerate() {
        report.rows_seen += 1;
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                report.skip(format!("{}: row {}: {err}", path.display(), line + 2));
                continue;
            }
        };

        if row.stadium_name.trim().is_empty() || row.team_primary.trim().is_empty() {
            report.skip(format!(
                "{}: row {}: missing stadium or primary tenant",
                path.display(),
                line + 2
            ));
            continue;
        }
        let Some(capacity) = parse_count(&row.capacity)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
        else {
            report.skip(format!(
                "{}: row {}: invalid capacity for {}",
                path.display(),
                line + 2,
                row.stadium_name.trim()
            ));
            continue;
        };

        let team_sec = row.team_sec.trim();
        out.push(StadiumRecord {
            id: Some(row.stadium_id.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            name: row.stadium_name.trim().to_string(),
            capacity,
            team_primary: row.team_primary.trim().to_string(),
            team_sec: if team_sec.is_empty() {
                None
            } else {
                Some(team_sec.to_string())
            },
            municipality: row.municipality_name.trim().to_string(),
            province: row.province_name.trim().to_string(),
            ccaa: row.ccaa_name.trim().to_string(),
        });
        report.rows_kept += 1;
    }

    Ok((out, report))
}

/// Population tables vary their column names across files; every known header
/// spelling is accepted via aliases.
#[derive(Debug, Deserialize)]
struct RawPopulationRow {
    #[serde(
        default,
        alias = "mun_name",
        alias = "municipality",
        alias = "municipality_name",
        alias = "prov_name",
        alias = "province",
        alias = "province_name",
        alias = "ccaa_name",
        alias = "ccaa"
    )]
    name: String,
    #[serde(
        default,
        alias = "poblacion",
        alias = "población",
        alias = "pob_muni",
        alias = "pob_prov",
        alias = "pob_ccaa"
    )]
    pob: String,
}

/// Load one per-level population table. Unknown or zero populations are kept
/// as `None` so per-capita metrics stay null instead of dividing by zero.
pub fn load_population(path: &Path) -> Result<(Vec<PopulationRecord>, LoadReport)> {
    let text = read_input(path)?;
    let mut report = LoadReport::default();
    let mut out = Vec::new();

    for (line, row) in reader_for(&text).deserialize::<RawPopulationRow>().enumerate() {
        report.rows_seen += 1;
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                report.skip(format!("{}: row {}: {err}", path.display(), line + 2));
                continue;
            }
        };
        if row.name.trim().is_empty() {
            report.skip(format!("{}: row {}: empty entity name", path.display(), line + 2));
            continue;
        }
        out.push(PopulationRecord {
            name: row.name.trim().to_string(),
            population: parse_count(&row.pob).filter(|n| *n > 0),
        });
        report.rows_kept += 1;
    }

    Ok((out, report))
}

#[derive(Debug, Deserialize)]
struct RawOverrideRow {
    #[serde(default)]
    season: String,
    #[serde(default, alias = "jornada")]
    spieltag: String,
    #[serde(default)]
    home_team: String,
    #[serde(default)]
    stadium_name: String,
}

/// Load the manual override table. A missing file means "no overrides", the
/// one input whose absence is not an error.
pub fn load_overrides(path: &Path) -> Result<(Vec<OverrideRecord>, LoadReport)> {
    if !path.exists() {
        let mut report = LoadReport::default();
        report
            .warnings
            .push(format!("{}: not present, no overrides applied", path.display()));
        return Ok((Vec::new(), report));
    }

    let text = read_input(path)?;
    let mut report = LoadReport::default();
    let mut out = Vec::new();

    for (line, row) in reader_for(&text).deserialize::<RawOverrideRow>().enumerate() {
        report.rows_seen += 1;
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                report.skip(format!("{}: row {}: {err}", path.display(), line + 2));
                continue;
            }
        };
        let (Some(season), Some(jornada)) = (
            row.season.trim().parse::<u16>().ok(),
            row.spieltag.trim().parse::<u32>().ok(),
        ) else {
            report.skip(format!(
                "{}: row {}: bad season/jornada",
                path.display(),
                line + 2
            ));
            continue;
        };
        if row.home_team.trim().is_empty() || row.stadium_name.trim().is_empty() {
            report.skip(format!(
                "{}: row {}: missing team or stadium",
                path.display(),
                line + 2
            ));
            continue;
        }
        out.push(OverrideRecord {
            season,
            jornada,
            home_team: row.home_team.trim().to_string(),
            stadium_name: row.stadium_name.trim().to_string(),
        });
        report.rows_kept += 1;
    }

    Ok((out, report))
}
