//! Audio data packets of an Ogg Opus stream.
//!
//! One Ogg packet carries one Opus packet per elementary stream of the channel
//! mapping. All of them but the last are self-delimiting, the last one uses the
//! standard format ([RFC 6716, Appendix B][1]).
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc6716#appendix-B

use super::parser::{read_self_delimiting, read_standard, Reader};
use super::OpusPacket;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioDataPacket {
    opus_packets: Vec<OpusPacket>,
}

impl AudioDataPacket {
    /// Split `data` into `stream_count` elementary Opus packets.
    pub fn from(data: &[u8], stream_count: usize) -> Result<Self> {
        if stream_count == 0 {
            return Err(Error::invalid("stream count must be at least 1"));
        }

        let mut reader = Reader::new(data);
        let mut opus_packets = Vec::with_capacity(stream_count);
        for _ in 0..stream_count - 1 {
            opus_packets.push(read_self_delimiting(&mut reader)?);
        }
        opus_packets.push(read_standard(&mut reader)?);

        Ok(Self { opus_packets })
    }

    pub fn new(opus_packets: Vec<OpusPacket>) -> Self {
        Self { opus_packets }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, packet: OpusPacket) {
        self.opus_packets.push(packet);
    }

    pub fn opus_packets(&self) -> &[OpusPacket] {
        &self.opus_packets
    }

    pub fn into_inner(self) -> Vec<OpusPacket> {
        self.opus_packets
    }

    /// Concatenate the packets back into one Ogg data packet.
    pub fn dump(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some((last, rest)) = self.opus_packets.split_last() {
            for packet in rest {
                out.extend(packet.dump_self_delimiting());
            }
            out.extend(last.dump_standard());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Channel, Code3Header, Config, Framing};

    fn packet(config: u8, channel: Channel, framing: Framing, frames: &[&[u8]]) -> OpusPacket {
        let mut packet = OpusPacket::new(Config::of(config).unwrap(), channel, framing).unwrap();
        for frame in frames {
            packet.add_frame(*frame).unwrap();
        }
        packet
    }

    #[test]
    fn single_stream() {
        let p = packet(0, Channel::Mono, Framing::Code0, &[&[1, 2, 3]]);
        let data = AudioDataPacket::new(vec![p.clone()]).dump();
        assert_eq!(data, p.dump_standard());

        let parsed = AudioDataPacket::from(&data, 1).unwrap();
        assert_eq!(parsed.opus_packets(), &[p]);
    }

    #[test]
    fn multi_stream_order() {
        let p1 = packet(1, Channel::Stereo, Framing::Code2, &[&[1; 300], &[2; 3]]);
        let p2 = packet(20, Channel::Mono, Framing::Code1, &[&[3; 4], &[4; 4]]);
        let p3 = packet(31, Channel::Stereo, Framing::Code3(Code3Header::cbr(2).with_padding(256)), &[
            &[5; 10],
            &[6; 10],
        ]);

        let mut audio = AudioDataPacket::empty();
        audio.push(p1.clone());
        audio.push(p2.clone());
        audio.push(p3.clone());

        let data = audio.dump();
        let mut expected = p1.dump_self_delimiting();
        expected.extend(p2.dump_self_delimiting());
        expected.extend(p3.dump_standard());
        assert_eq!(data, expected);

        let parsed = AudioDataPacket::from(&data, 3).unwrap();
        assert_eq!(parsed.into_inner(), vec![p1, p2, p3]);
    }

    #[test]
    fn zero_streams() {
        assert!(AudioDataPacket::from(&[0, 1], 0).is_err());
    }

    #[test]
    fn missing_stream() {
        let p = packet(0, Channel::Mono, Framing::Code0, &[&[1, 2, 3]]);
        let data = p.dump_self_delimiting();
        assert!(matches!(AudioDataPacket::from(&data, 2), Err(Error::CorruptedStream(_))));
    }

    #[test]
    fn empty_dump() {
        assert!(AudioDataPacket::empty().dump().is_empty());
    }
}
