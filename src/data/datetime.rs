use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// How the values of a timestamp column are spelled. Detected once per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// RFC 3339 / ISO 8601 with an offset, e.g. `2024-05-01T12:00:00.250Z`.
    Rfc3339,
    /// A `chrono` format string from `DATE_FORMATS`, read as UTC.
    Naive(&'static str),
}

/// ISO-like layouts tried after RFC 3339, most specific first.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d",
];

/// Pick the format with the highest parse rate over the first hundred
/// non-empty values. Returns `None` if nothing parses.
pub fn detect_format<'a, I>(values: I) -> Option<TimestampFormat>
where
    I: IntoIterator<Item = &'a str>,
{
    let sample: Vec<&str> = values
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(100)
        .collect();

    if sample.is_empty() {
        return None;
    }

    let score = |format: TimestampFormat| {
        sample.iter().filter(|s| parse_timestamp(s, format).is_some()).count()
    };

    let mut best = None;
    let mut best_score = score(TimestampFormat::Rfc3339);
    if best_score > 0 {
        best = Some(TimestampFormat::Rfc3339);
    }

    for &fmt in DATE_FORMATS {
        let candidate = TimestampFormat::Naive(fmt);
        let s = score(candidate);
        if s > best_score {
            best_score = s;
            best = Some(candidate);
        }
    }

    best
}

/// Parse to Unix seconds, keeping millisecond precision.
pub fn parse_timestamp(value: &str, format: TimestampFormat) -> Option<f64> {
    let value = value.trim();
    match format {
        TimestampFormat::Rfc3339 => DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.timestamp_millis() as f64 / 1000.0),
        TimestampFormat::Naive(fmt) => {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
                Some(dt.and_utc().timestamp_millis() as f64 / 1000.0)
            } else {
                let d = NaiveDate::parse_from_str(value, fmt).ok()?;
                Some(d.and_hms_opt(0, 0, 0)?.and_utc().timestamp() as f64)
            }
        }
    }
}

/// True when `s` reads as a date or time in any supported format. Used to
/// tell a header row from a data row.
pub fn is_date_like(s: &str) -> bool {
    let s = s.trim();
    if !(s.contains('-') || s.contains('/') || s.contains(':')) {
        return false;
    }
    parse_timestamp(s, TimestampFormat::Rfc3339).is_some()
        || DATE_FORMATS
            .iter()
            .any(|&fmt| parse_timestamp(s, TimestampFormat::Naive(fmt)).is_some())
}
