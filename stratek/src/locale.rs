//! Spanish date formatting and attachment naming

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

fn month_name(date: NaiveDate) -> &'static str {
    // month0() is always within 0..12
    MONTHS[date.month0() as usize]
}

/// `19 de octubre de 2026`
#[must_use]
pub fn long_date(date: NaiveDate) -> String {
    format!("{} de {} de {}", date.day(), month_name(date), date.year())
}

/// `19 de octubre de 2026, 14:30`
#[must_use]
pub fn long_date_time(at: NaiveDateTime) -> String {
    format!(
        "{}, {:02}:{:02}",
        long_date(at.date()),
        at.hour(),
        at.minute()
    )
}

/// `19/10/2026`
#[must_use]
pub fn short_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Build `<prefix>_<name>_<YYYY-MM-DD>.pdf`
///
/// Whitespace runs in the name collapse to a single `_`; a blank name
/// becomes `Cliente`.
#[must_use]
pub fn artifact_filename(prefix: &str, name: &str, date: NaiveDate) -> String {
    let name = name.split_whitespace().collect::<Vec<_>>().join("_");
    let name = if name.is_empty() { "Cliente" } else { &name };
    format!("{prefix}_{name}_{}.pdf", date.format("%Y-%m-%d"))
}
