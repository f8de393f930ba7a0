use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::{HmacError, Result};

/// Formats accepted for naive (zone-less) timestamps, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    // RFC 850
    "%A, %d-%b-%y %T GMT",
    // asctime
    "%a %b %e %T %Y",
    "%Y-%m-%d %T",
    "%Y-%m-%dT%T",
];

/// The signature carried by a message, as parsed from its `Authorization`
/// header and timestamp header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    id: String,
    digest: String,
    timestamp: DateTime<Utc>,
}

impl Signature {
    pub(crate) fn new(id: String, digest: String, timestamp: DateTime<Utc>) -> Self {
        Signature {
            id,
            digest,
            timestamp,
        }
    }

    /// The credential id naming the secret key used for signing.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The base64-encoded digest claimed by the message.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// The point in time the message claims to have been signed at.
    ///
    /// No freshness check is applied to this value.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Parses a timestamp header value into an absolute point in time.
///
/// Accepts RFC 2822 / RFC 1123 dates, RFC 850 dates, asctime dates, RFC 3339
/// timestamps, `YYYY-MM-DD HH:MM:SS` (UTC) and `@<unix seconds>`. The Unix
/// epoch itself is rejected.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    let parsed = DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
        .or_else(|| {
            value
                .strip_prefix('@')
                .and_then(|secs| secs.parse::<i64>().ok())
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        });

    match parsed {
        Some(timestamp) if timestamp.timestamp() != 0 => Ok(timestamp),
        _ => Err(HmacError::malformed("Timestamp not valid")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0)
            .single()
            .expect("valid date")
    }

    #[test]
    fn parses_http_dates() {
        assert_eq!(parse_timestamp("Wed, 21 Oct 2015 07:28:00 GMT").unwrap(), expected());
        assert_eq!(
            parse_timestamp("Wednesday, 21-Oct-15 07:28:00 GMT").unwrap(),
            expected()
        );
        assert_eq!(parse_timestamp("Wed Oct 21 07:28:00 2015").unwrap(), expected());
    }

    #[test]
    fn parses_other_forms() {
        assert_eq!(parse_timestamp("2015-10-21T09:28:00+02:00").unwrap(), expected());
        assert_eq!(parse_timestamp("2015-10-21 07:28:00").unwrap(), expected());
        assert_eq!(parse_timestamp(" @1445412480 ").unwrap(), expected());
    }

    #[test]
    fn rejects_garbage() {
        for value in &["not-a-date", "", "@", "@abc", "2015-13-45 99:99:99"] {
            assert_eq!(
                parse_timestamp(value).unwrap_err(),
                HmacError::MalformedMessage("Timestamp not valid".into()),
                "{:?}",
                value
            );
        }
    }

    #[test]
    fn rejects_epoch() {
        assert!(parse_timestamp("@0").is_err());
        assert!(parse_timestamp("Thu, 01 Jan 1970 00:00:00 GMT").is_err());
    }
}
