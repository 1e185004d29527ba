use std::path::PathBuf;

use anyhow::Result;

use aforo::aggregate::{enrich_matches, fold_matches};
use aforo::csv_read::{
    load_match_dir, load_overrides, load_population, load_stadiums,
};
use aforo::export::{Totals, build_home_metrics, write_json};
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
    let (mun, _) = load_population(&data_dir.join("mun_data.csv"))?;
    let (prov, _) = load_population(&data_dir.join("prov_data.csv"))?;
    let (ccaa, _) = load_population(&data_dir.join("ccaa_data.csv"))?;
    let (overrides, override_report) = load_overrides(&data_dir.join("stadium_overrides.csv"))?;
    let (matches, match_report) = load_match_dir(&data_dir.join("matches"))?;

    let (index, index_report) = ReferenceIndex::build(stadiums, &mun, &prov, &ccaa);
    let resolver = Resolver::new(&index, &overrides);

    let (rows, fold_report) = fold_matches(&matches, &resolver, &index);
    let enriched = enrich_matches(&matches, &resolver);
    let doc = build_home_metrics(
        &rows,
        &enriched,
        Totals {
            stadiums_count: index.roster().len(),
            matches_count: matches.len(),
        },
    );

    let out = out_dir.join("home_metrics.json");
    write_json(&out, &doc)?;

    println!("Home metrics build complete");
    println!("Output: {}", out.display());
    println!(
        "Stadiums: {}/{} rows kept ({} duplicate names)",
        stadium_report.rows_kept, stadium_report.rows_seen, index_report.duplicate_names
    );
    println!(
        "Matches: {}/{} rows kept, overrides loaded: {}",
        match_report.rows_kept, match_report.rows_seen, override_report.rows_kept
    );
    println!(
        "Aggregated: {} matches into {} rows ({} without attendance, {} unresolved)",
        fold_report.matches_aggregated,
        rows.len(),
        fold_report.skipped_no_attendance,
        fold_report.skipped_unresolved
    );
    let warnings = stadium_report
        .warnings
        .iter()
        .chain(&match_report.warnings)
        .chain(&override_report.warnings)
        .chain(&index_report.warnings);
    for w in warnings.take(10) {
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
