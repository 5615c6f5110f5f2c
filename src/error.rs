//! Errors raised while reading or writing Ogg Opus data.

use thiserror::Error;

/// An error that occured while parsing or building Ogg pages, Opus headers or
/// Opus packets.
#[derive(Error, Debug)]
pub enum Error {
    /// Structural or semantic violation of RFC 6716 / RFC 7845.
    #[error("invalid opus data: {0}")]
    InvalidOpus(String),

    /// Input ended, or a continuation was missing, while a packet was being reassembled.
    #[error("corrupted stream: {0}")]
    CorruptedStream(String),

    /// The packet already holds as many frames as its frame count allows.
    #[error("the number of frames reaches limitation ({0})")]
    FrameLimitExceeded(usize),

    /// A frame of a different length was added to a CBR packet.
    #[error("frame size must be the same in CBR opus packet (expected {expected}, got {actual})")]
    InconsistentFrameSize { expected: usize, actual: usize },

    /// An Opus frame is at most 1275 bytes long.
    #[error("frame of {0} bytes is longer than 1275 bytes")]
    FrameTooLarge(usize),

    /// A partial data packet must be an exact multiple of 255 bytes long.
    #[error("not a partial data packet: length {0} is not a multiple of 255")]
    NotPartialData(usize),

    /// Only version 0 of the Ogg page format exists.
    #[error("unsupported ogg page version: {0}")]
    UnsupportedVersion(u8),

    /// Configuration number outside of 0..32.
    #[error("invalid config id: {0}")]
    InvalidConfig(u8),

    /// Packet code outside of 0..4.
    #[error("invalid opus packet code: {0}")]
    InvalidCode(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidOpus(msg.into())
    }

    pub(crate) fn corrupted(msg: impl Into<String>) -> Self {
        Error::CorruptedStream(msg.into())
    }
}
