use bytes::{Bytes, BytesMut};
use std::io::Cursor;
use tokio_util::codec::Decoder;

use crate::frame::{self, Frame};
use crate::Error;

/// Splits the byte stream of a connection into request payloads.
///
/// Each item holds the raw bytes of one request frame. The bytes are only checked for shape here;
/// the engine decodes them again, so bytes that can never form a request are handed over up to the
/// next line starting with `*` and reported there as malformed.
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> FrameCodec {
        FrameCodec { max_frame_size }
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        // Check if the frame size exceeds a certain limit to prevent DoS attacks
        if src.len() > self.max_frame_size {
            return Err("frame size exceeds limit".into());
        }

        let mut cursor = Cursor::new(&src[..]);
        match Frame::parse_request(&mut cursor) {
            Ok(_) => {
                let position = usize::try_from(cursor.position())?;
                Ok(Some(src.split_to(position).freeze()))
            }
            // Not enough data to parse a frame.
            Err(frame::Error::Incomplete) => Ok(None),
            Err(frame::Error::Malformed(_)) => {
                let end = resync_point(src).unwrap_or(src.len());
                Ok(Some(src.split_to(end).freeze()))
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(payload) => Ok(Some(payload)),
            None if src.is_empty() => Ok(None),
            // A truncated frame left behind by a client that went away.
            None => Ok(Some(src.split().freeze())),
        }
    }
}

/// Where the next request may start after malformed bytes: just past the first CRLF followed by
/// `*`.
fn resync_point(src: &[u8]) -> Option<usize> {
    src.windows(3)
        .position(|window| window == b"\r\n*")
        .map(|index| index + 2)
}
