//! `mdhd` — Media Header Box.
//!
//! Fills in the current track's stream timescale/duration, and reads the
//! 4-byte type field right after the language code to classify the stream
//! as audio or visual media (the type lookup stays against this region
//! rather than a separate `hdlr` box, per the documented deviation).

use crate::bytes::{read_fourcc, read_u32, read_u64, ticks_to_seconds};
use crate::error::ParseFault;
use crate::model::{stream_type_label, StreamDescriptor};

pub const BOX_TYPE: &[u8; 4] = b"mdhd";

pub fn read(data: &[u8], stream: &mut StreamDescriptor) -> Result<(), ParseFault> {
    let version = *data.get(8).ok_or(ParseFault::UnexpectedEnd)?;
    let mut offset = 12;

    let (timescale, duration_ticks) = match version {
        1 => {
            offset += 8 + 8; // created + modified
            let timescale = read_u32(data, offset)?;
            offset += 4;
            let duration = read_u64(data, offset)?;
            offset += 8;
            (timescale, duration)
        }
        0 => {
            offset += 4 + 4; // created + modified
            let timescale = read_u32(data, offset)?;
            offset += 4;
            let duration = read_u32(data, offset)? as u64;
            offset += 4;
            (timescale, duration)
        }
        other => return Err(ParseFault::UnsupportedVersion(other)),
    };

    offset += 2; // packed language
    offset += 2; // pre_defined

    let handler = read_fourcc(data, offset)?;

    let base = stream.base_mut();
    base.version = version;
    base.timescale = timescale;
    base.duration = ticks_to_seconds(duration_ticks, timescale);
    base.stream_type = stream_type_label(&handler);

    Ok(())
}
