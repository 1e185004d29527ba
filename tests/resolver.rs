use aforo::records::{OverrideRecord, StadiumRecord};
use aforo::reference::ReferenceIndex;
use aforo::resolve::{Resolver, VenueKey};

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

fn index_with(stadiums: Vec<StadiumRecord>) -> ReferenceIndex {
    ReferenceIndex::build(stadiums, &[], &[], &[]).0
}

fn override_row(season: u16, jornada: u32, team: &str, stadium: &str) -> OverrideRecord {
    OverrideRecord {
        season,
        jornada,
        home_team: team.to_string(),
        stadium_name: stadium.to_string(),
    }
}

#[test]
fn capacity_fit_picks_smallest_ground_that_holds_the_crowd() {
    let index = index_with(vec![
        stadium("Campo Chico", 20_000, "Doble Sede CF", None),
        stadium("Gran Coliseo", 60_000, "Doble Sede CF", None),
    ]);
    let resolver = Resolver::new(&index, &[]);

    let pick = |att: Option<u32>| {
        resolver
            .resolve("Doble Sede CF", 2025, 1, att)
            .map(|v| v.name)
    };

    assert_eq!(pick(Some(15_000)).as_deref(), Some("Campo Chico"));
    assert_eq!(pick(Some(45_000)).as_deref(), Some("Gran Coliseo"));
    // Overbooked beyond every known ground: largest wins.
    assert_eq!(pick(Some(99_999)).as_deref(), Some("Gran Coliseo"));
    // Unknown attendance: largest is the information-free default.
    assert_eq!(pick(None).as_deref(), Some("Gran Coliseo"));
}

#[test]
fn override_to_roster_stadium_returns_real_capacity() {
    let index = index_with(vec![
        stadium("Campo Propio", 15_000, "Equipo Uno", None),
        stadium("Estadio Grande", 55_000, "Equipo Dos", None),
    ]);
    let overrides = [override_row(2025, 7, "Equipo Uno", "Estadio Grande")];
    let resolver = Resolver::new(&index, &overrides);

    let venue = resolver
        .resolve("Equipo Uno", 2025, 7, Some(8_000))
        .expect("override should resolve");
    assert_eq!(venue.name, "Estadio Grande");
    assert_eq!(venue.capacity, 55_000);
    assert!(!venue.capacity_estimated);
    assert!(matches!(venue.key, VenueKey::Roster(_)));

    // Any other jornada falls back to the heuristic.
    let normal = resolver
        .resolve("Equipo Uno", 2025, 8, Some(8_000))
        .expect("should resolve");
    assert_eq!(normal.name, "Campo Propio");
}

#[test]
fn override_to_unknown_venue_synthesizes_with_default_capacity() {
    let index = index_with(vec![
        stadium("Campo Propio", 15_000, "Equipo Uno", None),
        stadium("Anexo", 5_000, "Equipo Uno", None),
    ]);
    let overrides = [override_row(2025, 3, "Equipo Uno", "Sede Neutral")];
    let resolver = Resolver::new(&index, &overrides);

    let venue = resolver
        .resolve("Equipo Uno", 2025, 3, Some(12_000))
        .expect("a team with a known ground never resolves to nothing");
    assert_eq!(venue.name, "Sede Neutral");
    // Capacity is borrowed from the default (largest) ground and flagged.
    assert_eq!(venue.capacity, 15_000);
    assert!(venue.capacity_estimated);
    assert!(matches!(venue.key, VenueKey::Estimated { .. }));
}

#[test]
fn alias_fallback_reaches_the_roster_spelling() {
    // The roster indexes the club under its short form.
    let index = index_with(vec![stadium("El Sardinero", 22_222, "R. Racing Club", None)]);
    let resolver = Resolver::new(&index, &[]);

    let venue = resolver
        .resolve("Real Racing Club", 2025, 1, Some(10_000))
        .expect("alias should route to the roster key");
    assert_eq!(venue.name, "El Sardinero");
}

#[test]
fn unknown_team_resolves_to_none() {
    let index = index_with(vec![stadium("Campo Propio", 15_000, "Equipo Uno", None)]);
    let resolver = Resolver::new(&index, &[]);
    assert!(resolver.resolve("Inexistente CF", 2025, 1, Some(5_000)).is_none());
    assert!(resolver.resolve("", 2025, 1, Some(5_000)).is_none());
}
