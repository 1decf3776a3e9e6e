//! `mvhd` — Movie Header Box.
//!
//! Populates `Movie`'s timestamps, timescale, duration, playback speed and
//! volume. The rate and volume fields sit right after the version-dependent
//! time block; the source this service was distilled from read them from
//! the wrong offset, treating the whole 4-byte rate+volume group as a single
//! field. This reads the real ISO layout: rate (4 bytes) then volume packed
//! into the high 16 bits of the next 4-byte group.

use crate::bytes::{read_u32, read_u64, ticks_to_datetime, ticks_to_seconds};
use crate::error::ParseFault;
use crate::model::{volume_label, Movie};

pub const BOX_TYPE: &[u8; 4] = b"mvhd";

pub fn read(data: &[u8], movie: &mut Movie) -> Result<(), ParseFault> {
    let version = *data.get(8).ok_or(ParseFault::UnexpectedEnd)?;
    let mut offset = 12;

    let (created_ticks, modified_ticks, timescale, duration_ticks) = match version {
        1 => {
            let created = read_u64(data, offset)?;
            let modified = read_u64(data, offset + 8)?;
            let timescale = read_u32(data, offset + 16)?;
            let duration = read_u64(data, offset + 20)?;
            offset += 28;
            (created, modified, timescale, duration)
        }
        0 => {
            let created = read_u32(data, offset)? as u64;
            let modified = read_u32(data, offset + 4)? as u64;
            let timescale = read_u32(data, offset + 8)?;
            let duration = read_u32(data, offset + 12)? as u64;
            offset += 16;
            (created, modified, timescale, duration)
        }
        other => return Err(ParseFault::UnsupportedVersion(other)),
    };

    let rate = read_u32(data, offset)?;
    offset += 4;
    let volume_group = read_u32(data, offset)?;
    let volume = (volume_group >> 16) as u16;

    movie.version = version;
    movie.created = ticks_to_datetime(created_ticks);
    movie.modified = ticks_to_datetime(modified_ticks);
    movie.timescale = timescale;
    movie.duration = ticks_to_seconds(duration_ticks, timescale);
    movie.playback_speed = (rate >> 16) as u16;
    movie.volume = volume_label(volume);

    Ok(())
}
