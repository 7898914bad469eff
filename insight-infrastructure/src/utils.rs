use chrono::{DateTime, Utc};
use time::OffsetDateTime;

pub fn millis_to_utc(ms: i64) -> OffsetDateTime {
    let nanos = i128::from(ms).saturating_mul(1_000_000);
    OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or_else(|_| OffsetDateTime::now_utc())
}

pub fn to_offset(value: DateTime<Utc>) -> OffsetDateTime {
    millis_to_utc(value.timestamp_millis())
}

pub fn from_offset(value: OffsetDateTime) -> DateTime<Utc> {
    let ms = (value.unix_timestamp_nanos() / 1_000_000) as i64;
    insight_domain::millis_to_datetime(ms)
}
