use std::path::PathBuf;

use anyhow::Result;

use aforo::csv_read::{load_population, load_stadiums};
use aforo::export::{build_stadium_populations, write_json};
use aforo::reference::ReferenceIndex;

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

    let (index, _) = ReferenceIndex::build(stadiums, &mun, &prov, &ccaa);
    let (doc, missing) = build_stadium_populations(&index);

    let out = out_dir.join("stadium_populations.json");
    write_json(&out, &doc)?;

    println!("Stadium populations build complete");
    println!("Output: {}", out.display());
    println!(
        "Stadiums: {}/{} rows kept",
        stadium_report.rows_kept, stadium_report.rows_seen
    );
    println!("Missing population info for {} stadiums", missing.len());
    for name in &missing {
        println!("  - {name}");
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
