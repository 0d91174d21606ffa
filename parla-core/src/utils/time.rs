use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
};

/// Restituisce l'istante corrente in UTC formattato come RFC3339 (es. "2025-11-02T12:34:56Z").
pub fn now_timestamp() -> String {
    format_rfc3339(OffsetDateTime::now_utc())
}

/// RFC3339; fuori dagli anni 0..=9999 ripiega sui secondi unix, che `parse_timestamp` accetta.
pub fn format_rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// Legge la `date` del wire: RFC3339 oppure secondi unix. `None` se illeggibile.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
}

/// Formato per il layer di rendering, es. "2025-11-02 12:34:56".
pub fn display_timestamp(ts: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    ts.format(format).unwrap_or_else(|_| format_rfc3339(ts))
}
