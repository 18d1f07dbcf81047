use chrono::{DateTime, Local, Utc};
use panelcount_core::ResultRow;

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

pub fn format_timestamp_datetime(ts: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .with_timezone(&Local);
    dt.format("%Y-%m-%d %H:%M").to_string()
}

pub fn render_results_table(rows: &[ResultRow]) -> String {
    const USER_HEADER: &str = "USER";
    const CONTACTS_HEADER: &str = "CONTACTS";

    let user_width = rows
        .iter()
        .map(|row| row.user.chars().count())
        .chain(std::iter::once(USER_HEADER.len()))
        .max()
        .unwrap_or(USER_HEADER.len());
    let count_width = rows
        .iter()
        .map(|row| row.contacts.to_string().len())
        .chain(std::iter::once(CONTACTS_HEADER.len()))
        .max()
        .unwrap_or(CONTACTS_HEADER.len());

    let mut out = format!("{USER_HEADER:<user_width$}  {CONTACTS_HEADER:>count_width$}\n");
    for row in rows {
        out.push_str(&format!(
            "{:<user_width$}  {:>count_width$}\n",
            row.user, row.contacts
        ));
    }
    out
}
