use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

const WEEKDAYS_FR: [&str; 7] = [
    "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche",
];

const MONTHS_FR: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// "Lundi 15 octobre 2025 à 14:00" for a parsed interview datetime.
pub fn french_long_datetime(dt: &NaiveDateTime) -> String {
    let weekday = WEEKDAYS_FR[dt.weekday().num_days_from_monday() as usize];
    let month = MONTHS_FR[dt.month0() as usize];
    format!(
        "{} {} {} {} à {}",
        weekday,
        dt.day(),
        month,
        dt.year(),
        dt.format("%H:%M")
    )
}

/// "dd/mm/yyyy" display date.
pub fn short_date(dt: &DateTime<Utc>) -> String {
    dt.format("%d/%m/%Y").to_string()
}

/// "yyyymmdd_HHMMSS" slug used in generated filenames.
pub fn timestamp_slug(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%d_%H%M%S").to_string()
}
