use std::path::PathBuf;

use anyhow::Result;

use aforo::aggregate::fold_jornadas;
use aforo::csv_read::{load_match_dir, load_overrides, load_stadiums};
use aforo::export::{build_jornada_doc, write_json};
use aforo::records::Division;
use aforo::reference::ReferenceIndex;
use aforo::resolve::Resolver;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let data_dir = parse_path_arg("--data-dir")
        .or_else(|| env_path("AFORO_DATA_DIR"))
        .unwrap_or_else(|| PathBuf::from("data"));
    let out_dir = parse_path_arg("--out-dir")
        .or_else(|| env_path("AFORO_PUBLIC_DIR"))
        .unwrap_or_else(|| PathBuf::from("public/data"));

    let (stadiums, stadium_report) = load_stadiums(&data_dir.join("stadium.csv"))?;
    let (overrides, _) = load_overrides(&data_dir.join("stadium_overrides.csv"))?;
    let (matches, match_report) = load_match_dir(&data_dir.join("matches"))?;

    // The jornada fold needs no population data.
    let (index, _) = ReferenceIndex::build(stadiums, &[], &[], &[]);
    let resolver = Resolver::new(&index, &overrides);

    let (jornadas, fold_report) = fold_jornadas(&matches, &resolver);
    let primera = jornadas
        .iter()
        .filter(|j| j.division == Division::Primera.label())
        .count();
    let segunda = jornadas.len() - primera;
    let doc = build_jornada_doc(jornadas);

    let out = out_dir.join("jornada_occupancy.json");
    write_json(&out, &doc)?;

    println!("Jornada occupancy build complete");
    println!("Output: {}", out.display());
    println!("Jornadas: {primera} Primera, {segunda} Segunda");
    println!(
        "Matches: {}/{} rows kept, {} aggregated ({} without attendance, {} unresolved)",
        match_report.rows_kept,
        match_report.rows_seen,
        fold_report.matches_aggregated,
        fold_report.skipped_no_attendance,
        fold_report.skipped_unresolved
    );
    for w in stadium_report.warnings.iter().chain(&match_report.warnings).take(10) {
        println!("  warn: {w}");
    }

    Ok(())
}

fn parse_path_arg(flag: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}

fn env_path(key: &str) -> Option<PathBuf> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}
