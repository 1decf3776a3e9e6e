//! `tkhd` — Track Header Box.
//!
//! Starts a new `Track`: version, created/modified timestamps, duration,
//! width and height (16.16 fixed-point, so the stored pixel value is the top
//! 16 bits). The source this service was distilled from treated width/height
//! as plain 32-bit words; this reads the real fixed-point field.

use crate::bytes::{read_u32, ticks_to_datetime, ticks_to_seconds};
use crate::error::ParseFault;
use crate::model::Track;

pub const BOX_TYPE: &[u8; 4] = b"tkhd";

/// `tkhd`'s duration is expressed in the enclosing movie's timescale (ISO
/// 14496-12 §8.3.2), not the track's own `mdhd` timescale, so `mvhd` must be
/// read first for this to convert to seconds correctly.
pub fn read(data: &[u8], movie_timescale: u32) -> Result<Track, ParseFault> {
    let version = *data.get(8).ok_or(ParseFault::UnexpectedEnd)?;
    let mut offset = 12;

    let (created_ticks, modified_ticks, duration_ticks) = match version {
        1 => {
            let created = crate::bytes::read_u64(data, offset)?;
            let modified = crate::bytes::read_u64(data, offset + 8)?;
            offset += 16 + 4; // created + modified + track_id
            offset += 4; // reserved
            let duration = crate::bytes::read_u64(data, offset)?;
            offset += 8; // duration
            (created, modified, duration)
        }
        0 => {
            let created = read_u32(data, offset)? as u64;
            let modified = read_u32(data, offset + 4)? as u64;
            offset += 8 + 4; // created + modified + track_id
            offset += 4; // reserved
            let duration = read_u32(data, offset)? as u64;
            offset += 4; // duration
            (created, modified, duration)
        }
        other => return Err(ParseFault::UnsupportedVersion(other)),
    };

    offset += 8; // reserved[2]
    offset += 2 + 2 + 2; // layer, alternate_group, volume
    offset += 2; // reserved
    offset += 36; // unity matrix

    let width = (read_u32(data, offset)? >> 16) as u32;
    let height = (read_u32(data, offset + 4)? >> 16) as u32;

    Ok(Track::new(
        version,
        ticks_to_datetime(created_ticks),
        ticks_to_datetime(modified_ticks),
        ticks_to_seconds(duration_ticks, movie_timescale),
        width,
        height,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tkhd_v0(duration: u32, width: u32, height: u32) -> Vec<u8> {
        let mut buf = vec![0u8; 8];
        buf.push(0); // version
        buf.extend_from_slice(&[0, 0, 0]); // flags
        buf.extend_from_slice(&0u32.to_be_bytes()); // created
        buf.extend_from_slice(&0u32.to_be_bytes()); // modified
        buf.extend_from_slice(&1u32.to_be_bytes()); // track_id
        buf.extend_from_slice(&0u32.to_be_bytes()); // reserved
        buf.extend_from_slice(&duration.to_be_bytes()); // duration
        buf.extend_from_slice(&[0u8; 8]); // reserved[2]
        buf.extend_from_slice(&[0u8; 2]); // layer
        buf.extend_from_slice(&[0u8; 2]); // alternate_group
        buf.extend_from_slice(&[0u8; 2]); // volume
        buf.extend_from_slice(&[0u8; 2]); // reserved
        buf.extend_from_slice(&[0u8; 36]); // matrix
        buf.extend_from_slice(&width.to_be_bytes());
        buf.extend_from_slice(&height.to_be_bytes());
        buf
    }

    #[test]
    fn reads_fixed_point_dimensions() {
        let data = tkhd_v0(5000, 1920 << 16, 1080 << 16);
        let track = read(&data, 1000).unwrap();
        assert_eq!(track.width, 1920);
        assert_eq!(track.height, 1080);
    }

    #[test]
    fn duration_is_converted_using_the_movie_timescale() {
        let data = tkhd_v0(5000, 0, 0);
        let track = read(&data, 1000).unwrap();
        assert_eq!(track.duration, 5.0);
    }
}
