use aforo::aggregate::{fold_jornadas, fold_matches};
use aforo::records::{Division, MatchRecord, PopulationRecord, StadiumRecord};
use aforo::reference::ReferenceIndex;
use aforo::resolve::Resolver;

fn stadium(name: &str, capacity: u32, primary: &str, sec: Option<&str>) -> StadiumRecord {
    StadiumRecord {
        id: None,
        name: name.to_string(),
        capacity,
        team_primary: primary.to_string(),
        team_sec: sec.map(str::to_string),
        municipality: "Ciudad".to_string(),
        province: "Provincia".to_string(),
        ccaa: "Region".to_string(),
    }
}

fn match_row(jornada: u32, home: &str, attendance: Option<u32>) -> MatchRecord {
    MatchRecord {
        season: 2025,
        jornada,
        date_raw: "17/08/2025".to_string(),
        time_raw: "21:00".to_string(),
        home_team: home.to_string(),
        away_team: "Visitante CF".to_string(),
        home_goals: 1,
        away_goals: 1,
        attendance,
        division: Division::Primera,
    }
}

fn population(name: &str, count: u64) -> PopulationRecord {
    PopulationRecord {
        name: name.to_string(),
        population: Some(count),
    }
}

#[test]
fn three_matches_one_ground_round_trip() {
    let index = ReferenceIndex::build(
        vec![stadium("Campo Unico", 30_000, "Equipo Uno", None)],
        &[],
        &[],
        &[],
    )
    .0;
    let resolver = Resolver::new(&index, &[]);
    let matches = vec![
        match_row(1, "Equipo Uno", Some(10_000)),
        match_row(2, "Equipo Uno", Some(20_000)),
        match_row(3, "Equipo Uno", Some(30_000)),
    ];

    let (rows, report) = fold_matches(&matches, &resolver, &index);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.matches, 3);
    assert_eq!(row.att_total, 60_000);
    assert_eq!(row.att_avg, 20_000);
    assert_eq!(row.occ_avg_pct, Some(66.67));
    assert_eq!(report.matches_aggregated, 3);
}

#[test]
fn shared_stadium_splits_per_tenant() {
    let index = ReferenceIndex::build(
        vec![stadium(
            "Estadio Compartido",
            40_000,
            "Equipo Uno",
            Some("Equipo Dos"),
        )],
        &[],
        &[],
        &[],
    )
    .0;
    let resolver = Resolver::new(&index, &[]);
    let matches = vec![
        match_row(1, "Equipo Uno", Some(30_000)),
        match_row(2, "Equipo Dos", Some(10_000)),
        match_row(3, "Equipo Uno", Some(34_000)),
    ];

    let (rows, _) = fold_matches(&matches, &resolver, &index);
    assert_eq!(rows.len(), 2, "one row per tenant, never merged");

    let uno = rows
        .iter()
        .find(|r| r.team_primary == "Equipo Uno")
        .expect("primary tenant row");
    assert_eq!(uno.matches, 2);
    assert_eq!(uno.att_total, 64_000);
    assert_eq!(uno.team_sec.as_deref(), Some("Equipo Dos"));

    let dos = rows
        .iter()
        .find(|r| r.team_primary == "Equipo Dos")
        .expect("secondary tenant row");
    assert_eq!(dos.matches, 1);
    assert_eq!(dos.att_total, 10_000);
    assert_eq!(dos.team_sec.as_deref(), Some("Equipo Uno"));
}

#[test]
fn unknown_capacity_keeps_ratios_null_not_zero() {
    // Bypasses the loader on purpose: a capacity of zero must surface as a
    // null occupancy, never as 0.0.
    let index = ReferenceIndex::build(
        vec![stadium("Campo Sin Aforo", 0, "Equipo Uno", None)],
        &[],
        &[],
        &[],
    )
    .0;
    let resolver = Resolver::new(&index, &[]);
    let matches = vec![match_row(1, "Equipo Uno", Some(5_000))];

    let (rows, _) = fold_matches(&matches, &resolver, &index);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].occ_avg_pct, None);
    // No population tables loaded: every per-capita rate stays null too.
    assert_eq!(rows[0].att_avg_per1k_muni, None);
    assert_eq!(rows[0].att_avg_per1k_prov, None);
    assert_eq!(rows[0].att_avg_per1k_ccaa, None);
}

#[test]
fn per_capita_rates_follow_population_lookups() {
    let index = ReferenceIndex::build(
        vec![stadium("Campo Unico", 30_000, "Equipo Uno", None)],
        &[population("Ciudad", 100_000)],
        &[population("Provincia", 1_000_000)],
        &[],
    )
    .0;
    let resolver = Resolver::new(&index, &[]);
    let matches = vec![match_row(1, "Equipo Uno", Some(20_000))];

    let (rows, _) = fold_matches(&matches, &resolver, &index);
    let row = &rows[0];
    assert_eq!(row.pop_muni, Some(100_000));
    assert_eq!(row.att_avg_per1k_muni, Some(200.0));
    assert_eq!(row.att_avg_per1k_prov, Some(20.0));
    // The region table is empty; only that one rate is null.
    assert_eq!(row.pop_ccaa, None);
    assert_eq!(row.att_avg_per1k_ccaa, None);
}

#[test]
fn jornada_excludes_unresolved_and_missing_attendance() {
    let index = ReferenceIndex::build(
        vec![stadium("Campo Unico", 30_000, "Equipo Uno", None)],
        &[],
        &[],
        &[],
    )
    .0;
    let resolver = Resolver::new(&index, &[]);
    let matches = vec![
        match_row(1, "Equipo Uno", Some(24_000)),
        // Same jornada, no attendance: contributes nothing, not zero.
        match_row(1, "Equipo Uno", None),
        // Unknown club: no stadium, excluded entirely.
        match_row(1, "Club Fantasma", Some(9_000)),
    ];

    let (jornadas, report) = fold_jornadas(&matches, &resolver);
    assert_eq!(jornadas.len(), 1);
    let j = &jornadas[0];
    assert_eq!(j.jornada, 1);
    assert_eq!(j.division, "Primera División");
    assert_eq!(j.matches, 1);
    assert_eq!(j.total_attendance, 24_000);
    assert_eq!(j.total_capacity, 30_000);
    assert_eq!(j.occupancy_pct, Some(80.0));
    assert_eq!(report.skipped_no_attendance, 1);
    assert_eq!(report.skipped_unresolved, 1);
}

#[test]
fn estimated_override_venue_aggregates_separately() {
    use aforo::records::OverrideRecord;

    let index = ReferenceIndex::build(
        vec![stadium("Campo Propio", 15_000, "Equipo Uno", None)],
        &[],
        &[],
        &[],
    )
    .0;
    let overrides = [OverrideRecord {
        season: 2025,
        jornada: 2,
        home_team: "Equipo Uno".to_string(),
        stadium_name: "Sede Neutral".to_string(),
    }];
    let resolver = Resolver::new(&index, &overrides);
    let matches = vec![
        match_row(1, "Equipo Uno", Some(12_000)),
        match_row(2, "Equipo Uno", Some(14_000)),
    ];

    let (rows, _) = fold_matches(&matches, &resolver, &index);
    assert_eq!(rows.len(), 2, "relocated match keys its own row");
    let neutral = rows
        .iter()
        .find(|r| r.stadium_name == "Sede Neutral")
        .expect("estimated venue row");
    assert_eq!(neutral.matches, 1);
    assert!(neutral.capacity_estimated);
}
