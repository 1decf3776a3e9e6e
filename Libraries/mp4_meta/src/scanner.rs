//! Phase 1 — the top-level scanner ("Prepare").
//!
//! Streams the request body as a sequence of top-level boxes. Only `ftyp`
//! and `moov` payloads get copied into the metadata buffer the walker later
//! operates on; everything else — `mdat` above all — is skipped over the
//! wire without ever landing in memory.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, instrument};

use crate::error::ParseFault;
use crate::model::codec_family;

/// Bound on the accumulated `ftyp`/`moov` payload. A well-formed file's
/// metadata is kilobytes; this guards against a hostile `moov` claiming an
/// implausible size.
const MAX_METADATA_BYTES: u64 = 16 * 1024 * 1024;

/// Read-ahead window for discarding a skipped box's payload.
const DISCARD_CHUNK: usize = 64 * 1024;

/// Scans `reader` for top-level boxes, returning the concatenated
/// `ftyp`/`moov` bytes (headers included) and the total number of bytes
/// consumed from the stream.
#[instrument(skip_all)]
pub async fn scan<R: AsyncRead + Unpin>(mut reader: R) -> Result<(Vec<u8>, u64), ParseFault> {
    let mut metadata = Vec::new();
    let mut total: u64 = 0;
    let mut scratch = vec![0u8; DISCARD_CHUNK];
    let mut first = true;
    let mut boxes_kept = 0u32;

    loop {
        let header = match read_header(&mut reader).await? {
            Some(header) => header,
            None if first => return Err(ParseFault::NotMp4),
            None => break,
        };

        let size = u32::from_be_bytes(header[0..4].try_into().unwrap()) as u64;
        let id: [u8; 4] = header[4..8].try_into().unwrap();

        if first {
            first = false;
            if id != *b"ftyp" && id != *b"moov" {
                return Err(ParseFault::NotMp4);
            }
        }

        if id == *b"ftyp" || id == *b"moov" {
            if size < 8 {
                return Err(ParseFault::BoxTooSmall { declared: size });
            }
            let payload_len = size - 8;
            if metadata.len() as u64 + 8 + payload_len > MAX_METADATA_BYTES {
                return Err(ParseFault::MetadataTooLarge(MAX_METADATA_BYTES as usize));
            }

            let mut payload = vec![0u8; payload_len as usize];
            reader.read_exact(&mut payload).await.map_err(ParseFault::Io)?;

            if id == *b"ftyp" {
                let brand: [u8; 4] = payload
                    .get(0..4)
                    .ok_or(ParseFault::UnexpectedEnd)?
                    .try_into()
                    .unwrap();
                if codec_family(&brand).is_none() {
                    return Err(ParseFault::UnsupportedBrand(brand));
                }
            }

            metadata.extend_from_slice(&header);
            metadata.extend_from_slice(&payload);
            total += size;
            boxes_kept += 1;
        } else if size == 1 {
            let mut large = [0u8; 8];
            reader.read_exact(&mut large).await.map_err(ParseFault::Io)?;
            let largesize = u64::from_be_bytes(large);
            if largesize < 16 {
                return Err(ParseFault::BoxTooSmall { declared: largesize });
            }
            discard(&mut reader, largesize - 16, &mut scratch).await?;
            total += largesize;
        } else if size == 0 {
            total += 8 + discard_to_eof(&mut reader, &mut scratch).await?;
            break;
        } else {
            if size < 8 {
                return Err(ParseFault::BoxTooSmall { declared: size });
            }
            discard(&mut reader, size - 8, &mut scratch).await?;
            total += size;
        }
    }

    debug!(bytes_scanned = total, boxes_kept, metadata_bytes = metadata.len(), "scan complete");
    Ok((metadata, total))
}

/// Reads the next 8-byte box header. Returns `None` only when zero bytes
/// were available before EOF — a clean end of input. Any EOF after a
/// partial read is a short-read failure.
async fn read_header<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<[u8; 8]>, ParseFault> {
    let mut header = [0u8; 8];
    let mut filled = 0;
    loop {
        if filled == header.len() {
            return Ok(Some(header));
        }
        let n = reader
            .read(&mut header[filled..])
            .await
            .map_err(ParseFault::Io)?;
        if n == 0 {
            return if filled == 0 {
                Ok(None)
            } else {
                Err(ParseFault::UnexpectedEnd)
            };
        }
        filled += n;
    }
}

async fn discard<R: AsyncRead + Unpin>(
    reader: &mut R,
    mut remaining: u64,
    scratch: &mut [u8],
) -> Result<(), ParseFault> {
    while remaining > 0 {
        let chunk = remaining.min(scratch.len() as u64) as usize;
        reader
            .read_exact(&mut scratch[..chunk])
            .await
            .map_err(ParseFault::Io)?;
        remaining -= chunk as u64;
    }
    Ok(())
}

async fn discard_to_eof<R: AsyncRead + Unpin>(
    reader: &mut R,
    scratch: &mut [u8],
) -> Result<u64, ParseFault> {
    let mut consumed = 0u64;
    loop {
        let n = reader.read(scratch).await.map_err(ParseFault::Io)?;
        if n == 0 {
            return Ok(consumed);
        }
        consumed += n as u64;
    }
}
