//! MP4 structural-metadata extraction.
//!
//! Two phases. [`scanner::scan`] streams an [`tokio::io::AsyncRead`] and
//! produces a small in-memory buffer holding only the `ftyp`/`moov` boxes —
//! `mdat` is skipped on the wire, never buffered. [`walker::walk`] then
//! recursively decodes that buffer into a [`model::FileRecord`].
//!
//! [`parse`] drives both phases for callers that just want the finished
//! record.

pub mod boxes;
pub mod bytes;
pub mod error;
pub mod model;
pub mod scanner;
pub mod walker;

pub use error::{ApiError, ParseFault};
pub use model::FileRecord;

use tokio::io::AsyncRead;

/// Runs the scanner then the walker over `reader`, returning the completed
/// file record with its total byte size filled in.
pub async fn parse<R: AsyncRead + Unpin>(reader: R) -> Result<FileRecord, ParseFault> {
    let (metadata, total_size) = scanner::scan(reader).await?;
    let mut record = walker::walk(&metadata)?;
    record.size = total_size;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_file() -> Vec<u8> {
        let mut ftyp = Vec::new();
        ftyp.extend_from_slice(&16u32.to_be_bytes());
        ftyp.extend_from_slice(b"ftyp");
        ftyp.extend_from_slice(b"isom");
        ftyp.extend_from_slice(&0u32.to_be_bytes());

        let mut mvhd = Vec::new();
        mvhd.extend_from_slice(&36u32.to_be_bytes());
        mvhd.extend_from_slice(b"mvhd");
        mvhd.push(0);
        mvhd.extend_from_slice(&[0, 0, 0]);
        mvhd.extend_from_slice(&0u32.to_be_bytes());
        mvhd.extend_from_slice(&0u32.to_be_bytes());
        mvhd.extend_from_slice(&1000u32.to_be_bytes());
        mvhd.extend_from_slice(&5000u32.to_be_bytes());
        mvhd.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        mvhd.extend_from_slice(&0x0100_0000u32.to_be_bytes());

        let mut moov = Vec::new();
        moov.extend_from_slice(&((8 + mvhd.len()) as u32).to_be_bytes());
        moov.extend_from_slice(b"moov");
        moov.extend_from_slice(&mvhd);

        let mut mdat = Vec::new();
        mdat.extend_from_slice(&16u32.to_be_bytes());
        mdat.extend_from_slice(b"mdat");
        mdat.extend_from_slice(&[0xAAu8; 8]);

        let mut file = ftyp;
        file.extend_from_slice(&moov);
        file.extend_from_slice(&mdat);
        file
    }

    #[tokio::test]
    async fn parses_a_minimal_well_formed_file() {
        let data = sample_file();
        let total_len = data.len() as u64;
        let record = parse(Cursor::new(data)).await.unwrap();
        assert_eq!(record.size, total_len);
        assert_eq!(record.codec, "ISO 14496-1 Base Media");
        assert_eq!(record.movie.duration, 5.0);
        assert!(record.movie.tracks.is_empty());
    }

    #[tokio::test]
    async fn empty_body_is_not_a_valid_mp4() {
        let err = parse(Cursor::new(Vec::<u8>::new())).await.unwrap_err();
        assert!(matches!(err, ParseFault::NotMp4));
    }
}
