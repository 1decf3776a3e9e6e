//! `stsd` — Sample Description Box.
//!
//! Only the first sample entry is read, and only the fields this service
//! surfaces. Layout differs entirely between the audio and video sample
//! entry, so reading dispatches on the stream's current variant — already
//! promoted by `smhd`/`vmhd` earlier in the same `trak` — rather than on
//! the entry's own format tag.

use crate::bytes::{read_fourcc, read_u16, read_u32};
use crate::error::ParseFault;
use crate::model::{channel_label, StreamDescriptor};

pub const BOX_TYPE: &[u8; 4] = b"stsd";

/// First sample entry's `data_format` sits past: the box header (8), the
/// full-box version/flags + entry count (8), and the entry's own 4-byte
/// size field.
const ENTRY_FORMAT: usize = 8 + 8 + 4;

pub fn read(data: &[u8], stream: &mut StreamDescriptor) -> Result<(), ParseFault> {
    match stream {
        StreamDescriptor::Audio(audio) => {
            let format = read_fourcc(data, ENTRY_FORMAT)?;
            let channels = read_u16(data, ENTRY_FORMAT + 4 + 16)?;
            let sample_rate = read_u32(data, ENTRY_FORMAT + 4 + 16 + 2 + 6)? >> 16;

            audio.format = fourcc_to_string(&format);
            audio.channels = channel_label(channels);
            audio.sample_rate = sample_rate;
        }
        StreamDescriptor::Video(video) => {
            let format = read_fourcc(data, ENTRY_FORMAT)?;
            let horiz_offset = ENTRY_FORMAT + 4 + 28;
            let res_x = (read_u32(data, horiz_offset)? >> 16) as u16;
            let res_y = (read_u32(data, horiz_offset + 4)? >> 16) as u16;
            let color_depth = read_u16(data, horiz_offset + 8 + 38)?;

            video.format = fourcc_to_string(&format);
            video.res_x = res_x;
            video.res_y = res_y;
            video.color_depth = color_depth;
        }
        StreamDescriptor::Base(_) => {
            // Neither smhd nor vmhd seen yet; nothing to classify against.
        }
    }
    Ok(())
}

fn fourcc_to_string(fourcc: &[u8; 4]) -> String {
    String::from_utf8_lossy(fourcc).into_owned()
}
