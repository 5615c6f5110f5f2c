//! An Opus packet is a container of multiple isoconfig Opus frames.
//!
//! Packets contain a set of frames either of same (usually CBR) or variable size.
//! For variable size frames (usually VBR), variably-sized length fields are present
//! for all but the last frame, for such it becomes non-delimiting. Inside an Ogg
//! stream carrying more than one elementary stream, all but the last packet use the
//! [self-delimiting format][1] wherein a length field also exists for the
//! aforementioned last frame. Both formats are read by [`parser`] and written by
//! [`coder`].
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc6716#appendix-B

pub mod audio;
pub mod coder;
pub mod config;
pub mod parser;
pub mod utils;

use bitvec::prelude::*;

pub use audio::AudioDataPacket;
pub use config::*;

use crate::error::{Error, Result};

/// Code or type of packet. Primarily dictates the layout of frames inside a packet.
/// And optionally padding data if any (only for Code 3 packets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// One frame.
    Code0 = 0,
    /// Two frames.
    Code1 = 1,
    /// Two frames (variable length).
    Code2 = 2,
    /// Multiple frames (upto 120 ms total).
    ///
    /// Static length per frame if CBR else variable length and VBR.
    Code3 = 3,
}

impl TryFrom<u8> for Code {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Code::Code0),
            1 => Ok(Code::Code1),
            2 => Ok(Code::Code2),
            3 => Ok(Code::Code3),
            _ => Err(Error::InvalidCode(value)),
        }
    }
}

/// Fields carried by the frame count byte of a Code 3 packet.
///
/// ```text
///  0 1 2 3 4 5 6 7
/// +-+-+-+-+-+-+-+-+
/// |v|p|     M     |
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code3Header {
    /// Number of frames, 1 to 63.
    pub frame_count: u8,
    pub vbr: bool,
    /// Sum of the raw padding length chain bytes if the packet is padded.
    ///
    /// This is not the number of padding bytes, see [`utils::pad_data_len`].
    pub padding: Option<usize>,
}

impl Code3Header {
    pub const MAX_FRAME_COUNT: u8 = 0x3F;

    pub fn cbr(frame_count: u8) -> Self {
        Self { frame_count, vbr: false, padding: None }
    }

    pub fn vbr(frame_count: u8) -> Self {
        Self { frame_count, vbr: true, padding: None }
    }

    pub fn with_padding(mut self, pad_len_bytes_sum: usize) -> Self {
        self.padding = Some(pad_len_bytes_sum);
        self
    }

    pub(crate) fn from_byte(byte: u8) -> Self {
        let fcb = byte.view_bits::<Msb0>();
        Self {
            frame_count: fcb[2..].load::<u8>(),
            vbr: fcb[0],
            padding: if fcb[1] { Some(0) } else { None },
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        let mut byte = 0u8;
        let fcb = byte.view_bits_mut::<Msb0>();
        fcb.set(0, self.vbr);
        fcb.set(1, self.padding.is_some());
        fcb[2..].store(self.frame_count);
        byte
    }
}

/// Frame layout of a packet, one variant per packet code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Code0,
    Code1,
    Code2,
    Code3(Code3Header),
}

impl Framing {
    pub fn code(&self) -> Code {
        match self {
            Framing::Code0 => Code::Code0,
            Framing::Code1 => Code::Code1,
            Framing::Code2 => Code::Code2,
            Framing::Code3(_) => Code::Code3,
        }
    }

    pub fn frame_count(&self) -> usize {
        match self {
            Framing::Code0 => 1,
            Framing::Code1 | Framing::Code2 => 2,
            Framing::Code3(h) => h.frame_count as usize,
        }
    }

    pub fn is_vbr(&self) -> bool {
        match self {
            Framing::Code0 | Framing::Code1 => false,
            Framing::Code2 => true,
            Framing::Code3(h) => h.vbr,
        }
    }
}

/// Decoded TOC byte.
///
/// ```text
///  0 1 2 3 4 5 6 7
/// +-+-+-+-+-+-+-+-+
/// | config  |s| c |
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Toc {
    pub config: Config,
    pub channel: Channel,
    pub code: Code,
}

impl Toc {
    pub fn parse(byte: u8) -> Self {
        let toc = byte.view_bits::<Msb0>();
        let id = toc[..5].load::<u8>();

        Self {
            config: OPUS_CONFIG_TABLE[id as usize],
            channel: if toc[5] { Channel::Stereo } else { Channel::Mono },
            code: match toc[6..].load::<u8>() {
                0 => Code::Code0,
                1 => Code::Code1,
                2 => Code::Code2,
                _ => Code::Code3,
            },
        }
    }

    pub fn to_byte(self) -> u8 {
        let mut byte = 0u8;
        let toc = byte.view_bits_mut::<Msb0>();
        toc[..5].store(self.config.id);
        toc.set(5, self.channel == Channel::Stereo);
        toc[6..].store(self.code as u8);
        byte
    }
}

/// A single elementary Opus packet.
#[derive(Debug, Clone, PartialEq)]
pub struct OpusPacket {
    config: Config,
    channel: Channel,
    framing: Framing,
    frames: Vec<Vec<u8>>,
}

impl OpusPacket {
    /// Create an empty packet. Code 3 packets need 1 to 63 frames.
    pub fn new(config: Config, channel: Channel, framing: Framing) -> Result<Self> {
        if let Framing::Code3(header) = framing {
            if header.frame_count == 0 || header.frame_count > Code3Header::MAX_FRAME_COUNT {
                return Err(Error::invalid(format!(
                    "code 3 frame count must be within 1..=63, got {}",
                    header.frame_count
                )));
            }
        }

        Ok(Self { config, channel, framing, frames: Vec::new() })
    }

    /// Parse a single packet in the standard (non self-delimiting) format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        parser::parse(data)
    }

    /// Add a frame, checking the frame count limit, the frame size limit and the
    /// CBR size constraint.
    pub fn add_frame(&mut self, frame: impl Into<Vec<u8>>) -> Result<()> {
        let frame = frame.into();
        if frame.len() > utils::MAX_FRAME_LEN {
            return Err(Error::FrameTooLarge(frame.len()));
        }
        let limit = self.frame_count();
        if self.frames.len() == limit {
            return Err(Error::FrameLimitExceeded(limit));
        }
        if !self.is_vbr() {
            if let Some(first) = self.frames.first() {
                if first.len() != frame.len() {
                    return Err(Error::InconsistentFrameSize {
                        expected: first.len(),
                        actual: frame.len(),
                    });
                }
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn code(&self) -> Code {
        self.framing.code()
    }

    pub fn toc(&self) -> Toc {
        Toc { config: self.config, channel: self.channel, code: self.code() }
    }

    /// Number of frames this packet is allowed to hold.
    pub fn frame_count(&self) -> usize {
        self.framing.frame_count()
    }

    pub fn is_vbr(&self) -> bool {
        self.framing.is_vbr()
    }

    pub fn has_padding(&self) -> bool {
        matches!(self.framing, Framing::Code3(Code3Header { padding: Some(_), .. }))
    }

    /// Sum of the padding length chain bytes.
    pub fn pad_len_bytes_sum(&self) -> usize {
        match self.framing {
            Framing::Code3(Code3Header { padding: Some(sum), .. }) => sum,
            _ => 0,
        }
    }

    /// Number of padding bytes trailing the frame data.
    pub fn pad_data_len(&self) -> usize {
        utils::pad_data_len(self.pad_len_bytes_sum())
    }

    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// Audio duration covered by the packet.
    pub fn duration_ms(&self) -> f32 {
        self.config.framesize * self.frame_count() as f32
    }

    /// Whether every frame the framing calls for has been added.
    pub fn is_complete(&self) -> bool {
        self.frames.len() == self.frame_count()
    }

    /// Serialize in the standard format, the last frame length is implicit.
    ///
    /// The packet must be [complete](Self::is_complete), missing frames are
    /// written as empty ones.
    pub fn dump_standard(&self) -> Vec<u8> {
        coder::dump_standard(self)
    }

    /// Serialize in the self-delimiting format of RFC 6716 Appendix B.
    ///
    /// The packet must be [complete](Self::is_complete), missing frames are
    /// written as empty ones.
    pub fn dump_self_delimiting(&self) -> Vec<u8> {
        coder::dump_self_delimiting(self)
    }
}
