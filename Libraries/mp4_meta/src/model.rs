//! In-memory model populated by the scanner + walker and serialized as the
//! HTTP response body.
//!
//! Field shapes and JSON names follow `VideoFile`/`Container`/`Track`/
//! `Streamer` as described in `examples/original_source/video.go`; the
//! per-box struct contents mirror what each box reader in `boxes/` actually
//! populates.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Brands this service accepts in `ftyp`, mapped to their codec-family label.
const BRAND_TABLE: &[(&[u8; 4], &str)] = &[
    (b"isom", "ISO 14496-1 Base Media"),
    (b"iso2", "ISO 14496-12 Base Media"),
    (b"mp41", "ISO 14496-1 v1"),
    (b"mp42", "ISO 14496-1 v2"),
    (b"qt  ", "QuickTime Movie"),
    (b"3gp4", "3G MP4 Profile"),
    (b"mp71", "ISO 14496-12 MPEG-7"),
    (b"M4A ", "Apple AAC audio w/ iTunes info"),
    (b"M4B ", "Apple audio w/ iTunes position"),
    (b"mmp4", "3G Mobile MP4"),
];

pub fn codec_family(brand: &[u8; 4]) -> Option<&'static str> {
    BRAND_TABLE
        .iter()
        .find(|(b, _)| *b == brand)
        .map(|(_, name)| *name)
}

/// Stream-type labels read out of the media header. The lookup is kept
/// against the handler-type bytes inside `mdhd` itself rather than a
/// separate `hdlr` box, since this service never reads one.
const TYPE_TABLE: &[(&[u8; 4], &str)] = &[(b"soun", "Audio Media"), (b"vide", "Visual Media")];

pub fn stream_type_label(handler: &[u8; 4]) -> String {
    TYPE_TABLE
        .iter()
        .find(|(h, _)| *h == handler)
        .map(|(_, label)| label.to_string())
        .unwrap_or_default()
}

pub fn volume_label(volume: u16) -> &'static str {
    match volume {
        0 => "mute",
        3 => "maximum",
        _ => "normal",
    }
}

pub fn balance_label(balance: i16) -> &'static str {
    match balance.signum() {
        -1 => "left",
        1 => "right",
        _ => "normal",
    }
}

pub fn channel_label(channels: u16) -> &'static str {
    match channels {
        1 => "Mono",
        2 => "Stereo",
        _ => "undefined",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    #[serde(rename = "Codec")]
    pub codec: String,
    #[serde(rename = "Size")]
    pub size: u64,
    #[serde(rename = "Movie")]
    pub movie: Movie,
}

impl Default for FileRecord {
    fn default() -> Self {
        FileRecord {
            codec: String::new(),
            size: 0,
            movie: Movie::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Movie {
    #[serde(skip)]
    pub version: u8,
    #[serde(rename = "Created")]
    pub created: DateTime<Utc>,
    #[serde(rename = "Modified")]
    pub modified: DateTime<Utc>,
    #[serde(rename = "TimeScale")]
    pub timescale: u32,
    #[serde(rename = "Duration")]
    pub duration: f64,
    #[serde(rename = "PlayBackSpeed")]
    pub playback_speed: u16,
    #[serde(rename = "Volume")]
    pub volume: &'static str,
    #[serde(rename = "Tracks")]
    pub tracks: Vec<Track>,
}

impl Default for Movie {
    fn default() -> Self {
        let epoch = crate::bytes::ticks_to_datetime(0);
        Movie {
            version: 0,
            created: epoch,
            modified: epoch,
            timescale: 0,
            duration: 0.0,
            playback_speed: 0,
            volume: volume_label(0),
            tracks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Track {
    #[serde(skip)]
    pub version: u8,
    #[serde(rename = "Created")]
    pub created: DateTime<Utc>,
    #[serde(rename = "Modified")]
    pub modified: DateTime<Utc>,
    #[serde(rename = "Duration")]
    pub duration: f64,
    #[serde(rename = "Width")]
    pub width: u32,
    #[serde(rename = "Height")]
    pub height: u32,
    #[serde(rename = "Stream")]
    pub stream: StreamDescriptor,
}

impl Track {
    /// A freshly-seen `tkhd`: timestamps/duration/dimensions populated, stream
    /// still the empty base variant until `mdhd`/`smhd`/`vmhd` are seen.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: u8,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
        duration: f64,
        width: u32,
        height: u32,
    ) -> Self {
        Track {
            version,
            created,
            modified,
            duration,
            width,
            height,
            stream: StreamDescriptor::Base(StreamBase::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamBase {
    #[serde(skip)]
    pub version: u8,
    #[serde(rename = "TimeScale")]
    pub timescale: u32,
    #[serde(rename = "Duration")]
    pub duration: f64,
    #[serde(rename = "Type")]
    pub stream_type: String,
}

impl Default for StreamBase {
    fn default() -> Self {
        StreamBase {
            version: 0,
            timescale: 0,
            duration: 0.0,
            stream_type: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioStream {
    #[serde(flatten)]
    pub base: StreamBase,
    #[serde(rename = "AudioBalance")]
    pub balance: &'static str,
    #[serde(rename = "Format")]
    pub format: String,
    #[serde(rename = "Channels")]
    pub channels: &'static str,
    #[serde(rename = "SampleRate")]
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoStream {
    #[serde(flatten)]
    pub base: StreamBase,
    #[serde(rename = "Format")]
    pub format: String,
    #[serde(rename = "ResX")]
    pub res_x: u16,
    #[serde(rename = "ResY")]
    pub res_y: u16,
    #[serde(rename = "ColorDepth")]
    pub color_depth: u16,
}

/// Polymorphic stream descriptor. Starts as `Base` on `tkhd`, is promoted to
/// `Audio`/`Video` on `smhd`/`vmhd` while carrying forward whatever the base
/// variant had already accumulated from `mdhd` — the previously-read base
/// fields survive the promotion.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StreamDescriptor {
    Base(StreamBase),
    Audio(AudioStream),
    Video(VideoStream),
}

impl StreamDescriptor {
    pub fn base(&self) -> &StreamBase {
        match self {
            StreamDescriptor::Base(b) => b,
            StreamDescriptor::Audio(a) => &a.base,
            StreamDescriptor::Video(v) => &v.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut StreamBase {
        match self {
            StreamDescriptor::Base(b) => b,
            StreamDescriptor::Audio(a) => &mut a.base,
            StreamDescriptor::Video(v) => &mut v.base,
        }
    }

    pub fn promote_to_audio(&mut self, balance: &'static str) {
        let base = self.base().clone();
        *self = StreamDescriptor::Audio(AudioStream {
            base,
            balance,
            format: String::new(),
            channels: channel_label(0),
            sample_rate: 0,
        });
    }

    pub fn promote_to_video(&mut self) {
        let base = self.base().clone();
        *self = StreamDescriptor::Video(VideoStream {
            base,
            format: String::new(),
            res_x: 0,
            res_y: 0,
            color_depth: 0,
        });
    }
}
