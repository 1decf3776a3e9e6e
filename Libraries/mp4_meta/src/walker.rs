//! Phase 2 — the tree walker ("Parse").
//!
//! Synchronous recursive descent over the in-memory metadata buffer the
//! scanner produced. Dispatches on each box's 4-char identifier, mutating
//! the file record in place.
//!
//! Container boxes come in two shapes: `moov`/`mdia`/`minf`/`stbl` expose
//! their children as the immediately following bytes, so descending into
//! them shares the enclosing scope rather than opening a new one. `trak`
//! can have siblings, so it gets its own scope and the cursor seeks past it
//! on return.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;
use tracing::{debug, instrument};

use crate::boxes::{ftyp, mdhd, mvhd, smhd, stsd, tkhd, vmhd};
use crate::error::ParseFault;
use crate::model::FileRecord;

#[instrument(skip_all)]
pub fn walk(data: &[u8]) -> Result<FileRecord, ParseFault> {
    let mut record = FileRecord::default();
    walk_scope(data, &mut record, 0, data.len())?;
    debug!(tracks_found = record.movie.tracks.len(), "walk complete");
    Ok(record)
}

fn walk_scope(
    data: &[u8],
    record: &mut FileRecord,
    mut cursor: usize,
    scope_end: usize,
) -> Result<(), ParseFault> {
    while cursor < scope_end {
        if cursor + 8 > scope_end {
            return Err(ParseFault::UnexpectedEnd);
        }

        let mut header = Cursor::new(&data[cursor..cursor + 8]);
        let size = header.read_u32::<BigEndian>().map_err(ParseFault::Io)? as u64;
        let id: [u8; 4] = data[cursor + 4..cursor + 8].try_into().unwrap();

        let (header_len, end) = if size == 1 {
            if cursor + 16 > scope_end {
                return Err(ParseFault::UnexpectedEnd);
            }
            let largesize = u64::from_be_bytes(data[cursor + 8..cursor + 16].try_into().unwrap());
            (16usize, cursor + largesize as usize)
        } else if size == 0 {
            (8usize, scope_end)
        } else {
            if size < 8 {
                return Err(ParseFault::BoxTooSmall { declared: size });
            }
            (8usize, cursor + size as usize)
        };

        if end > scope_end {
            return Err(ParseFault::UnexpectedEnd);
        }

        let body = &data[cursor..end];

        match &id {
            b"ftyp" => {
                let brand = ftyp::read_major_brand(body)?;
                record.codec = crate::model::codec_family(&brand)
                    .ok_or(ParseFault::UnsupportedBrand(brand))?
                    .to_string();
                cursor = end;
            }
            b"mvhd" => {
                mvhd::read(body, &mut record.movie)?;
                cursor = end;
            }
            b"tkhd" => {
                let timescale = record.movie.timescale;
                record.movie.tracks.push(tkhd::read(body, timescale)?);
                cursor = end;
            }
            b"mdhd" => {
                let track = record
                    .movie
                    .tracks
                    .last_mut()
                    .ok_or(ParseFault::UnexpectedEnd)?;
                mdhd::read(body, &mut track.stream)?;
                cursor = end;
            }
            b"smhd" => {
                let track = record
                    .movie
                    .tracks
                    .last_mut()
                    .ok_or(ParseFault::UnexpectedEnd)?;
                smhd::read(body, &mut track.stream)?;
                cursor = end;
            }
            b"vmhd" => {
                let track = record
                    .movie
                    .tracks
                    .last_mut()
                    .ok_or(ParseFault::UnexpectedEnd)?;
                vmhd::read(&mut track.stream)?;
                cursor = end;
            }
            b"stsd" => {
                let track = record
                    .movie
                    .tracks
                    .last_mut()
                    .ok_or(ParseFault::UnexpectedEnd)?;
                stsd::read(body, &mut track.stream)?;
                cursor = end;
            }
            b"trak" => {
                walk_scope(data, record, cursor + header_len, end)?;
                cursor = end;
            }
            b"moov" | b"mdia" | b"minf" | b"stbl" => {
                cursor += header_len;
            }
            _ => {
                cursor = end;
            }
        }
    }

    Ok(())
}
