//! Small conversions shared by the signable actions.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::constants::ONE_HOUR_IN_SECONDS;
use crate::error::{Error, Result};

/// Derive the 32-bit STARK nonce from a client-chosen id: `sha256(id) mod 2^32`.
pub fn nonce_from_client_id(client_id: &str) -> u32 {
    let digest = Sha256::digest(client_id.as_bytes());
    let mut tail = [0u8; 4];
    tail.copy_from_slice(&digest[digest.len() - 4..]);
    u32::from_be_bytes(tail)
}

/// Random numeric client id, as the exchange's reference clients generate.
pub fn generate_random_client_id() -> String {
    let value: u64 = rand::thread_rng().gen_range(0..(1u64 << 53));
    value.to_string()
}

/// Seconds since epoch for an ISO-8601 timestamp; fractional seconds are dropped.
pub fn iso_to_epoch_seconds(iso: &str) -> Result<i64> {
    parse_iso(iso).map(|dt| dt.timestamp())
}

/// `ceil(seconds / 3600)` for an ISO-8601 timestamp, counting any fraction
/// of a second.
pub fn iso_to_epoch_hours(iso: &str) -> Result<u64> {
    let dt = parse_iso(iso)?;
    let seconds = dt.timestamp() + i64::from(dt.timestamp_subsec_nanos() > 0);
    let seconds = u64::try_from(seconds)
        .map_err(|_| Error::encoding(format!("timestamp {iso} is before 1970")))?;
    Ok(epoch_seconds_to_hours(seconds))
}

fn parse_iso(iso: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(iso)
        .map_err(|e| Error::encoding(format!("invalid ISO-8601 timestamp {iso}: {e}")))
}

/// ISO-8601 string with millisecond precision, e.g. `2021-01-08T10:06:12.500Z`.
pub fn epoch_seconds_to_iso(seconds: i64) -> Result<String> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| Error::encoding(format!("timestamp {seconds} out of range")))
}

/// `ceil(seconds / 3600)`
pub fn epoch_seconds_to_hours(seconds: u64) -> u64 {
    seconds.div_ceil(ONE_HOUR_IN_SECONDS)
}
