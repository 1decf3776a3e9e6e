//! `smhd` — Sound Media Header Box.
//!
//! Presence of this box promotes the current track's stream to the audio
//! variant; its one meaningful field is the 8.8 fixed-point balance.

use crate::bytes::read_i16;
use crate::error::ParseFault;
use crate::model::{balance_label, StreamDescriptor};

pub const BOX_TYPE: &[u8; 4] = b"smhd";

pub fn read(data: &[u8], stream: &mut StreamDescriptor) -> Result<(), ParseFault> {
    let balance = read_i16(data, 12)?;
    stream.promote_to_audio(balance_label(balance));
    Ok(())
}
