use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};

pub const ID_MAGIC: &[u8; 8] = b"OpusHead";

/// Identification header, the first packet of an Ogg Opus stream.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      'O'      |      'p'      |      'u'      |      's'      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      'H'      |      'e'      |      'a'      |      'd'      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Version = 1  | Channel Count |           Pre-skip            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                     Input Sample Rate (Hz)                    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Output Gain (Q7.8 in dB)    | Mapping Family|               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+               :
/// |                                                               |
/// :               Optional Channel Mapping Table...               :
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// See [RFC 7845, Section 5.1](https://datatracker.ietf.org/doc/html/rfc7845#section-5.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdHeader {
    pub major_version: u8,
    pub minor_version: u8,
    pub channel_count: u8,
    /// Number of samples to discard from the decoder output when starting playback.
    pub pre_skip: u16,
    pub input_sample_rate: u32,
    /// Q7.8 gain in dB, see [`IdHeader::output_gain_db`].
    pub output_gain: i16,
    pub channel_mapping_family: u8,
    /// Number of elementary Opus streams in each audio data packet.
    pub stream_count: u8,
    pub coupled_count: u8,
    pub channel_mapping: Vec<u8>,
}

impl IdHeader {
    /// A mapping family 0 header for one or two channels.
    pub fn new(channel_count: u8) -> Result<Self> {
        check_family_zero(channel_count)?;
        Ok(Self {
            major_version: 0,
            minor_version: 1,
            channel_count,
            pre_skip: 0,
            input_sample_rate: 48000,
            output_gain: 0,
            channel_mapping_family: 0,
            stream_count: 1,
            coupled_count: channel_count - 1,
            channel_mapping: (0..channel_count).collect(),
        })
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = Cursor::new(data);
        Self::read(&mut r).map_err(|e| match e {
            Error::Io(_) => Error::invalid("Id Header data is corrupted"),
            e => e,
        })
    }

    fn read(r: &mut Cursor<&[u8]>) -> Result<Self> {
        let mut magic = [0u8; 8];
        r.read_exact(&mut magic)?;
        if &magic != ID_MAGIC {
            return Err(Error::invalid("Id Header packet does not start with 'OpusHead'"));
        }

        let version = r.read_u8()?;
        let channel_count = r.read_u8()?;
        if channel_count < 1 {
            return Err(Error::invalid(format!("invalid channel count: {}", channel_count)));
        }
        let pre_skip = r.read_u16::<LittleEndian>()?;
        let input_sample_rate = r.read_u32::<LittleEndian>()?;
        let output_gain = r.read_i16::<LittleEndian>()?;
        let channel_mapping_family = r.read_u8()?;

        let (stream_count, coupled_count, channel_mapping) = if channel_mapping_family == 0 {
            check_family_zero(channel_count)?;
            (1, channel_count - 1, (0..channel_count).collect())
        } else {
            if channel_mapping_family == 1 && channel_count > 8 {
                return Err(Error::invalid(format!(
                    "channel count must not be more than 8 for channel mapping family 1, got {}",
                    channel_count
                )));
            }
            let stream_count = r.read_u8()?;
            let coupled_count = r.read_u8()?;
            if stream_count == 0 || coupled_count > stream_count {
                return Err(Error::invalid(format!(
                    "invalid stream layout: {} streams, {} coupled",
                    stream_count, coupled_count
                )));
            }
            let mut channel_mapping = vec![0u8; channel_count as usize];
            r.read_exact(&mut channel_mapping)?;
            (stream_count, coupled_count, channel_mapping)
        };

        Ok(Self {
            major_version: version >> 4,
            minor_version: version & 0x0F,
            channel_count,
            pre_skip,
            input_sample_rate,
            output_gain,
            channel_mapping_family,
            stream_count,
            coupled_count,
            channel_mapping,
        })
    }

    /// Output gain in dB.
    pub fn output_gain_db(&self) -> f64 {
        f64::from(self.output_gain) / 256.0
    }

    pub fn dump(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(21 + self.channel_mapping.len());
        out.extend_from_slice(ID_MAGIC);
        out.push((self.major_version << 4) | (self.minor_version & 0x0F));
        out.push(self.channel_count);
        out.extend_from_slice(&self.pre_skip.to_le_bytes());
        out.extend_from_slice(&self.input_sample_rate.to_le_bytes());
        out.extend_from_slice(&self.output_gain.to_le_bytes());
        out.push(self.channel_mapping_family);
        if self.channel_mapping_family != 0 {
            out.push(self.stream_count);
            out.push(self.coupled_count);
            out.extend_from_slice(&self.channel_mapping);
        }
        out
    }
}

fn check_family_zero(channel_count: u8) -> Result<()> {
    if !(1..=2).contains(&channel_count) {
        return Err(Error::invalid(format!(
            "channel count must be 1 or 2 for channel mapping family 0, got {}",
            channel_count
        )));
    }
    Ok(())
}
