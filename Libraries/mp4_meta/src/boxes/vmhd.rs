//! `vmhd` — Video Media Header Box.
//!
//! Carries no fields this service surfaces; its presence alone promotes the
//! current track's stream to the video variant.

use crate::error::ParseFault;
use crate::model::StreamDescriptor;

pub const BOX_TYPE: &[u8; 4] = b"vmhd";

pub fn read(stream: &mut StreamDescriptor) -> Result<(), ParseFault> {
    stream.promote_to_video();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StreamBase;

    #[test]
    fn promotes_to_video() {
        let mut stream = StreamDescriptor::Base(StreamBase::default());
        read(&mut stream).unwrap();
        assert!(matches!(stream, StreamDescriptor::Video(_)));
    }
}
