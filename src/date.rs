//! Timestamp parsing for `created_at` columns and calendar bucketing for time series.

use anyhow::{anyhow, bail, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

/// Fixed-width calendar period used to group timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Bucket {
    Day,
    /// Monday-start weeks.
    #[default]
    Week,
    Month,
}

impl Bucket {
    /// First day (UTC) of the period containing `ts`.
    pub fn start_of(self, ts: OffsetDateTime) -> Result<Date> {
        let date = ts.to_offset(UtcOffset::UTC).date();
        match self {
            Bucket::Day => Ok(date),
            Bucket::Week => {
                let back = date.weekday().number_days_from_monday() as i64;
                date.checked_sub(Duration::days(back))
                    .ok_or_else(|| anyhow!("week start out of range for {date}"))
            }
            Bucket::Month => Ok(Date::from_calendar_date(date.year(), date.month(), 1)?),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Bucket::Day => "day",
            Bucket::Week => "week",
            Bucket::Month => "month",
        };
        f.write_str(s)
    }
}

impl FromStr for Bucket {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "day" => Ok(Bucket::Day),
            "w" | "week" => Ok(Bucket::Week),
            "m" | "month" => Ok(Bucket::Month),
            other => Err(format!("unknown bucket {other:?}, expected day|week|month")),
        }
    }
}

/// Parse a `created_at` cell: RFC 3339 text or integer epoch milliseconds.
/// `null`/absent yields `None`; anything else unparsable is an error.
pub fn parse_timestamp(v: Option<&Value>) -> Result<Option<OffsetDateTime>> {
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            let ts = OffsetDateTime::parse(s, &Rfc3339).map_err(|e| anyhow!("invalid timestamp {s:?}: {e}"))?;
            Ok(Some(ts))
        }
        Some(Value::Number(n)) => {
            let ms = n.as_i64().ok_or_else(|| anyhow!("invalid epoch milliseconds {n}"))?;
            let ts = OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)?;
            Ok(Some(ts))
        }
        Some(other) => bail!("unsupported timestamp value {other}"),
    }
}

/// `YYYY-MM-DD`, used as the period label handed to chart sinks.
pub fn format_date(d: Date) -> String {
    let fmt = format_description!("[year]-[month]-[day]");
    d.format(&fmt).unwrap_or_else(|_| d.to_string())
}
