//! Parsing of standard and self-delimiting Opus packets.
//!
//! A standard packet leaves out the length of its last frame, which spans the
//! remaining bytes up to the padding. A self-delimiting packet carries every
//! length, so its end is known without looking past it.

use super::utils::parse_frame_length;
use super::{Code, Code3Header, Framing, OpusPacket, Toc};
use crate::error::{Error, Result};

/// Sequential reader over a byte blob holding one or more Opus packets.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    fn byte(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.cursor)
            .ok_or_else(|| Error::corrupted("unexpected end of opus packet"))?;
        self.cursor += 1;
        Ok(byte)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::corrupted(format!(
                "frame of {} bytes overflows the {} remaining bytes",
                len,
                self.remaining()
            )));
        }
        let slice = &self.data[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(slice)
    }

    fn frame_len(&mut self) -> Result<usize> {
        let (len, used) = parse_frame_length(&self.data[self.cursor..])
            .ok_or_else(|| Error::corrupted("truncated frame length"))?;
        self.cursor += used;
        Ok(len)
    }

    fn toc(&mut self) -> Result<Toc> {
        if self.remaining() == 0 {
            return Err(Error::corrupted("no TOC byte"));
        }
        Ok(Toc::parse(self.byte()?))
    }

    /// Frame count byte and padding length chain of a Code 3 packet.
    fn code3_header(&mut self) -> Result<Code3Header> {
        let mut header = Code3Header::from_byte(self.byte()?);

        if header.padding.is_some() {
            // Values from 0...254 indicate that 0...254 bytes of padding are included,
            // 255 means 254 bytes of padding plus the value of the next byte.
            let mut sum = 0usize;
            loop {
                let padb = self.byte()?;
                sum += padb as usize;
                if padb < 255 {
                    break;
                }
            }
            header.padding = Some(sum);
        }

        if header.frame_count == 0 {
            return Err(Error::invalid("code 3 packet having zero audio frames"));
        }

        Ok(header)
    }

    fn skip_padding(&mut self, packet: &OpusPacket) -> Result<()> {
        if packet.has_padding() {
            self.take(packet.pad_data_len())?;
        }
        Ok(())
    }
}

fn new_packet(toc: Toc, framing: Framing) -> Result<OpusPacket> {
    #[cfg(feature = "strict")]
    if let Framing::Code3(header) = framing {
        // At maximum a packet can have
        //
        //  48 -- 2.5ms frames,
        //  24 --   5ms frames,
        //  12 --  10ms frames,
        //   6 --  20ms frames,
        //   3 --  40ms frames and
        //   2 --  60ms frames.
        if toc.config.framesize * header.frame_count as f32 > 120.0 {
            return Err(Error::invalid(format!(
                "code 3 packet of {} x {} ms frames exceeds 120 ms",
                header.frame_count, toc.config.framesize
            )));
        }
    }

    OpusPacket::new(toc.config, toc.channel, framing)
}

/// Parses a standard packet spanning all of `data`.
pub fn parse(data: &[u8]) -> Result<OpusPacket> {
    read_standard(&mut Reader::new(data))
}

/// Parses a self-delimiting packet from the front of `data`, returning it along
/// with the number of bytes it occupied.
pub fn parse_self_delimiting(data: &[u8]) -> Result<(OpusPacket, usize)> {
    let mut reader = Reader::new(data);
    let packet = read_self_delimiting(&mut reader)?;
    Ok((packet, reader.cursor))
}

/// Reads a standard packet consuming the rest of the reader.
pub(crate) fn read_standard(r: &mut Reader<'_>) -> Result<OpusPacket> {
    let toc = r.toc()?;

    match toc.code {
        // Code 0, 1 frame
        Code::Code0 => {
            let mut packet = new_packet(toc, Framing::Code0)?;
            let compressed = r.take(r.remaining())?;
            packet.add_frame(compressed)?;
            Ok(packet)
        }

        // Code 1, 2 frames
        Code::Code1 => {
            let mut packet = new_packet(toc, Framing::Code1)?;
            let remaining = r.remaining();

            #[cfg(feature = "strict")]
            if remaining % 2 != 0 {
                return Err(Error::invalid("code 1 payload must split into two equal frames"));
            }

            // data will be split to two equal sized frames (probably CBR).
            packet.add_frame(r.take(remaining / 2)?)?;
            packet.add_frame(r.take(remaining / 2)?)?;
            Ok(packet)
        }

        // Code 2, 2 frames (var. size)
        Code::Code2 => {
            let mut packet = new_packet(toc, Framing::Code2)?;
            let frame_0_len = r.frame_len()?;
            packet.add_frame(r.take(frame_0_len)?)?;
            packet.add_frame(r.take(r.remaining())?)?;
            Ok(packet)
        }

        // Code 3, multiple frames (var/const. size)
        Code::Code3 => {
            let header = r.code3_header()?;
            let mut packet = new_packet(toc, Framing::Code3(header))?;
            let pad_len = packet.pad_data_len();
            let count = header.frame_count as usize;

            if header.vbr {
                let mut lengths = Vec::with_capacity(count - 1);
                for _ in 0..count - 1 {
                    lengths.push(r.frame_len()?);
                }
                for len in lengths {
                    packet.add_frame(r.take(len)?)?;
                }

                // remaining bytes up to the padding belong to the last VBR frame.
                let last_len = r
                    .remaining()
                    .checked_sub(pad_len)
                    .ok_or_else(|| Error::corrupted("padding overflows the packet"))?;
                packet.add_frame(r.take(last_len)?)?;
            } else {
                // for CBR each frame is of R/M length.
                let len_compressed = r
                    .remaining()
                    .checked_sub(pad_len)
                    .ok_or_else(|| Error::corrupted("padding overflows the packet"))?;

                #[cfg(feature = "strict")]
                if len_compressed % count != 0 {
                    return Err(Error::invalid(
                        "non frame-count integer multiple remainder byte count",
                    ));
                }

                let frame_len = len_compressed / count;
                for _ in 0..count {
                    packet.add_frame(r.take(frame_len)?)?;
                }
            }

            r.skip_padding(&packet)?;
            Ok(packet)
        }
    }
}

/// Reads one self-delimiting packet, leaving the reader right after it.
pub(crate) fn read_self_delimiting(r: &mut Reader<'_>) -> Result<OpusPacket> {
    let toc = r.toc()?;

    match toc.code {
        Code::Code0 => {
            let mut packet = new_packet(toc, Framing::Code0)?;
            let len = r.frame_len()?;
            packet.add_frame(r.take(len)?)?;
            Ok(packet)
        }

        Code::Code1 => {
            let mut packet = new_packet(toc, Framing::Code1)?;
            let len = r.frame_len()?;
            packet.add_frame(r.take(len)?)?;
            packet.add_frame(r.take(len)?)?;
            Ok(packet)
        }

        Code::Code2 => {
            let mut packet = new_packet(toc, Framing::Code2)?;
            let len_0 = r.frame_len()?;
            let len_1 = r.frame_len()?;
            packet.add_frame(r.take(len_0)?)?;
            packet.add_frame(r.take(len_1)?)?;
            Ok(packet)
        }

        Code::Code3 => {
            let header = r.code3_header()?;
            let mut packet = new_packet(toc, Framing::Code3(header))?;
            let count = header.frame_count as usize;

            if header.vbr {
                let mut lengths = Vec::with_capacity(count);
                for _ in 0..count {
                    lengths.push(r.frame_len()?);
                }
                for len in lengths {
                    packet.add_frame(r.take(len)?)?;
                }
            } else {
                let len = r.frame_len()?;
                for _ in 0..count {
                    packet.add_frame(r.take(len)?)?;
                }
            }

            r.skip_padding(&packet)?;
            Ok(packet)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Channel, Config};

    #[test]
    fn code0_standard() {
        let data = [(5 << 3) | 0x04, 1, 2, 3];
        let packet = parse(&data).unwrap();
        assert_eq!(packet.code(), Code::Code0);
        assert_eq!(packet.config().id, 5);
        assert_eq!(packet.channel(), Channel::Stereo);
        assert_eq!(packet.frames(), &[vec![1, 2, 3]]);
    }

    #[test]
    fn code2_standard() {
        let data = [2, 2, 9, 9, 7, 7, 7];
        let packet = parse(&data).unwrap();
        assert_eq!(packet.frames(), &[vec![9, 9], vec![7, 7, 7]]);
    }

    #[test]
    fn code3_vbr_with_padding() {
        // 2 frames, VBR, padded with a chain of [2], frame 0 is 1 byte long.
        let data = [3, 0x80 | 0x40 | 2, 2, 1, 0xAA, 0xBB, 0xCC, 0, 0];
        let packet = parse(&data).unwrap();
        assert_eq!(packet.pad_len_bytes_sum(), 2);
        assert_eq!(packet.frames(), &[vec![0xAA], vec![0xBB, 0xCC]]);
    }

    #[test]
    fn code3_cbr() {
        let data = [3, 3, 1, 1, 2, 2, 3, 3];
        let packet = parse(&data).unwrap();
        assert!(!packet.is_vbr());
        assert_eq!(packet.frames(), &[vec![1, 1], vec![2, 2], vec![3, 3]]);
    }

    #[test]
    fn self_delimiting_consumes_exact_length() {
        let data = [0, 2, 5, 6, 0xFF, 0xFF];
        let (packet, used) = parse_self_delimiting(&data).unwrap();
        assert_eq!(used, 4);
        assert_eq!(packet.frames(), &[vec![5, 6]]);
    }

    #[test]
    fn empty_packet_has_no_toc() {
        assert!(matches!(parse(&[]), Err(Error::CorruptedStream(_))));
    }

    #[test]
    fn length_overflow() {
        assert!(matches!(parse(&[2, 10, 1, 2]), Err(Error::CorruptedStream(_))));
        assert!(matches!(parse_self_delimiting(&[0, 3, 1]), Err(Error::CorruptedStream(_))));
    }

    #[test]
    fn padding_overflow() {
        assert!(matches!(parse(&[3, 0x40 | 1, 10, 1]), Err(Error::CorruptedStream(_))));
    }

    #[test]
    fn zero_frames() {
        assert!(matches!(parse(&[3, 0]), Err(Error::InvalidOpus(_))));
    }

    #[cfg(feature = "strict")]
    #[test]
    fn strict_rejections() {
        // 3 frames of 60 ms
        assert!(matches!(parse(&[(3 << 3) | 3, 3, 0, 0, 0]), Err(Error::InvalidOpus(_))));
        // odd code 1 payload
        assert!(matches!(parse(&[1, 1, 2, 3]), Err(Error::InvalidOpus(_))));
        // CBR remainder
        assert!(matches!(parse(&[3, 2, 1, 2, 3]), Err(Error::InvalidOpus(_))));
    }

    #[test]
    fn config_is_carried() {
        let packet = parse(&[(28 << 3) | 1, 4, 4]).unwrap();
        assert_eq!(packet.config(), Config::of(28).unwrap());
        assert_eq!(packet.frames().len(), 2);
    }
}
