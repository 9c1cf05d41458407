//! Line framing for the agent's stream-JSON output.
//!
//! Wraps [`tokio_util::codec::LinesCodec`] with a maximum line length so
//! an unterminated or pathologically large record from a misbehaving
//! agent process cannot exhaust memory. One newline-terminated UTF-8
//! line is one protocol record.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

use crate::{AppError, Result};

/// Maximum line length accepted by the stream codec: 1 MiB.
///
/// Lines exceeding this limit cause [`StreamCodec::decode`] to return
/// [`AppError::Protocol`] with `"line too long"` instead of allocating.
pub const MAX_LINE_BYTES: usize = 1_048_576;

/// Newline-delimited record codec for the agent's stdout stream.
///
/// Delegates framing to [`LinesCodec`] with a fixed [`MAX_LINE_BYTES`]
/// limit. Oversize lines surface as [`AppError::Protocol`]; underlying
/// I/O failures as [`AppError::Io`]. The supervisor skips oversize-line
/// errors without aborting the turn.
#[derive(Debug)]
pub struct StreamCodec(LinesCodec);

impl StreamCodec {
    /// Create a new `StreamCodec` with the default [`MAX_LINE_BYTES`] limit.
    #[must_use]
    pub fn new() -> Self {
        Self(LinesCodec::new_with_max_length(MAX_LINE_BYTES))
    }
}

impl Default for StreamCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for StreamCodec {
    type Item = String;
    type Error = AppError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        self.0.decode(src).map_err(map_codec_error)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        self.0.decode_eof(src).map_err(map_codec_error)
    }
}

fn map_codec_error(e: LinesCodecError) -> AppError {
    match e {
        LinesCodecError::MaxLineLengthExceeded => {
            AppError::Protocol(format!("line too long: exceeded {MAX_LINE_BYTES} bytes"))
        }
        LinesCodecError::Io(io_err) => AppError::Io(io_err.to_string()),
    }
}
