use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::names::{normalize, team_key};
use crate::resolve::ResolvedVenue;

/// Spanish short month names for the formatted date label ("5 oct").
const MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// A match's kickoff as experienced at the venue. Weekday keeps the 0=Sunday
/// convention the consuming charts already use.
///
/// `reliable` is false when the source date failed to parse and the sentinel
/// "now" was substituted; consumers must not present such a time as accurate.
#[derive(Debug, Clone)]
pub struct LocalKickoff {
    pub datetime: NaiveDateTime,
    pub date_label: String,
    pub time_label: String,
    pub weekday: u8,
    pub hour: u8,
    pub reliable: bool,
}

/// Canary Islands home matches run one hour behind the mainland clock the
/// sources record. Detected by team name or by the resolved venue's region
/// or municipality.
pub fn is_canary_home(home_team: &str, venue: Option<&ResolvedVenue>) -> bool {
    if team_key(home_team).contains("las palmas") {
        return true;
    }
    let Some(v) = venue else {
        return false;
    };
    normalize(&v.ccaa).contains("canarias") || normalize(&v.municipality).contains("palmas")
}

/// Build the local wall-clock kickoff from the scraped date and time. This is
/// a display convention, not timezone math: mainland times pass through and
/// Canary home matches get exactly one hour subtracted.
pub fn localize(date_raw: &str, time_raw: &str, canary: bool) -> LocalKickoff {
    let (date, reliable) = match parse_date(date_raw) {
        Some(d) => (d, true),
        // Malformed source date: substitute "now" rather than crash, and
        // flag the result so it is never presented as accurate.
        None => (Local::now().date_naive(), false),
    };
    let time = parse_time(time_raw).unwrap_or(NaiveTime::MIN);

    let mut dt = NaiveDateTime::new(date, time);
    if canary {
        dt -= Duration::hours(1);
    }

    LocalKickoff {
        date_label: format_date_es(dt.date()),
        time_label: format!("{:02}:{:02}", dt.hour(), dt.minute()),
        weekday: dt.weekday().num_days_from_sunday() as u8,
        hour: dt.hour() as u8,
        reliable,
        datetime: dt,
    }
}

/// `dd/mm/yyyy`, tolerating `.` as the separator.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().split(['/', '.']);
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `HH:MM` with an optional seconds part the sources sometimes append.
fn parse_time(raw: &str) -> Option<NaiveTime> {
    let mut parts = raw.trim().split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = parts.next().unwrap_or("0").trim().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn format_date_es(date: NaiveDate) -> String {
    let month = MONTHS_ES[date.month0() as usize];
    format!("{} {month}", date.day())
}

#[cfg(test)]
mod tests {
    use super::{localize, parse_date, parse_time};

    #[test]
    fn parses_slash_and_dot_dates() {
        assert!(parse_date("05/10/2025").is_some());
        assert!(parse_date("05.10.2025").is_some());
        assert!(parse_date("2025-10-05").is_none());
        assert!(parse_date("31/02/2025").is_none());
    }

    #[test]
    fn parses_times_with_optional_seconds() {
        assert_eq!(parse_time("21:00"), parse_time("21:00:00"));
        assert!(parse_time("25:00").is_none());
    }

    #[test]
    fn canary_offset_shifts_one_hour_back() {
        let mainland = localize("05/10/2025", "21:00", false);
        let canary = localize("05/10/2025", "21:00", true);
        assert_eq!(mainland.hour, 21);
        assert_eq!(canary.hour, 20);
        assert_eq!(canary.time_label, "20:00");
        assert!(mainland.reliable && canary.reliable);
    }

    #[test]
    fn weekday_uses_sunday_zero_convention() {
        // 2025-10-05 is a Sunday.
        let k = localize("05/10/2025", "18:30", false);
        assert_eq!(k.weekday, 0);
        assert_eq!(k.date_label, "5 oct");
    }

    #[test]
    fn midnight_crossing_shifts_weekday_too() {
        // Saturday 00:30 in the mainland schedule is Friday 23:30 local.
        let k = localize("04/10/2025", "00:30", true);
        assert_eq!(k.weekday, 5);
        assert_eq!(k.hour, 23);
    }

    #[test]
    fn malformed_date_falls_back_to_unreliable_now() {
        let k = localize("not a date", "21:00", false);
        assert!(!k.reliable);
    }
}
