//! Big-endian field decoding shared by every box reader.
//!
//! MP4 boxes are entirely big-endian. The helpers here centralize the
//! `data[a..b].try_into().unwrap()` pattern that shows up in every box
//! reader so that an out-of-bounds slice produces a proper [`crate::error::ParseFault`]
//! instead of a panic.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::ParseFault;

/// Midnight UTC, 1904-01-01 — the MP4/QuickTime epoch.
fn mp4_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1904, 1, 1, 0, 0, 0).unwrap()
}

pub fn read_u16(data: &[u8], offset: usize) -> Result<u16, ParseFault> {
    let bytes = data
        .get(offset..offset + 2)
        .ok_or(ParseFault::UnexpectedEnd)?;
    Ok(u16::from_be_bytes(bytes.try_into().unwrap()))
}

pub fn read_i16(data: &[u8], offset: usize) -> Result<i16, ParseFault> {
    read_u16(data, offset).map(|v| v as i16)
}

pub fn read_u32(data: &[u8], offset: usize) -> Result<u32, ParseFault> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or(ParseFault::UnexpectedEnd)?;
    Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
}

pub fn read_u64(data: &[u8], offset: usize) -> Result<u64, ParseFault> {
    let bytes = data
        .get(offset..offset + 8)
        .ok_or(ParseFault::UnexpectedEnd)?;
    Ok(u64::from_be_bytes(bytes.try_into().unwrap()))
}

pub fn read_fourcc(data: &[u8], offset: usize) -> Result<[u8; 4], ParseFault> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or(ParseFault::UnexpectedEnd)?;
    Ok(bytes.try_into().unwrap())
}

/// Converts a 4- or 8-byte big-endian tick count since the MP4 epoch into a
/// wall-clock time. Any other width is a caller bug, not a data error.
pub fn ticks_to_datetime(ticks: u64) -> DateTime<Utc> {
    mp4_epoch() + chrono::Duration::seconds(ticks as i64)
}

/// Duration in seconds, rounded down to millisecond precision: the ticks
/// are first expressed as whole milliseconds, then converted to floating
/// point seconds.
pub fn ticks_to_seconds(ticks: u64, timescale: u32) -> f64 {
    if timescale == 0 {
        return 0.0;
    }
    let millis = (1000_f64 * ticks as f64 / timescale as f64).trunc();
    millis / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_fields() {
        let data = [0x00, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03];
        assert_eq!(read_u16(&data, 0).unwrap(), 1);
        assert_eq!(read_u16(&data, 2).unwrap(), 2);
        assert_eq!(read_u32(&data, 4).unwrap(), 3);
    }

    #[test]
    fn out_of_bounds_is_a_fault_not_a_panic() {
        let data = [0u8; 2];
        assert!(matches!(read_u32(&data, 0), Err(ParseFault::UnexpectedEnd)));
    }

    #[test]
    fn epoch_roundtrips_a_known_tick_count() {
        // 1 tick = 1972-01-01 00:00:00 UTC relative to the 1904 epoch.
        let ticks: u64 = 68 * 365 * 24 * 3600 + 17 * 24 * 3600; // approx, leap years included below
        let dt = ticks_to_datetime(ticks);
        assert!(dt.timestamp() > 0);
    }

    #[test]
    fn signed_balance_is_negative_for_high_bit_set() {
        let data = [0xFF, 0xFF];
        assert_eq!(read_i16(&data, 0).unwrap(), -1);
    }

    #[test]
    fn ticks_to_seconds_matches_timescale_ratio() {
        assert_eq!(ticks_to_seconds(5000, 1000), 5.0);
        assert_eq!(ticks_to_seconds(0, 1000), 0.0);
        assert_eq!(ticks_to_seconds(1000, 0), 0.0);
    }
}
