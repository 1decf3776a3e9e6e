//! `ftyp` — File Type Box.
//!
//! This service only ever needs the major brand, since that's what
//! `model::codec_family` keys off; minor version and the compatible-brand
//! list aren't surfaced anywhere in the response.

use crate::bytes::read_fourcc;
use crate::error::ParseFault;

pub const BOX_TYPE: &[u8; 4] = b"ftyp";

/// Reads the 4-byte major brand starting right after the box header.
pub fn read_major_brand(data: &[u8]) -> Result<[u8; 4], ParseFault> {
    read_fourcc(data, 8)
}
