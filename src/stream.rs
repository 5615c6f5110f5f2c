//! Reading an Ogg Opus stream ([RFC 7845][1]).
//!
//! ```text
//!    Page 0         Pages 1 ... n        Pages (n+1) ...
//! +------------+ +---+ +---+ ... +---+ +-----------+ +---------+ +--
//! |            | |   | |   |     |   | |           | |         | |
//! |+----------+| |+-----------------+| |+-------------------+ +-----
//! || ID Header|| ||  Comment Header || ||Audio Data Packet 1| | ...
//! |+----------+| |+-----------------+| |+-------------------+ +-----
//! |            | |   | |   |     |   | |           | |         | |
//! +------------+ +---+ +---+ ... +---+ +-----------+ +---------+ +--
//! ^      ^                           ^
//! |      |                           |
//! |      |                           Mandatory Page Break
//! |      ID header is contained on a single page
//! 'Beginning Of Stream'
//! ```
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc7845#section-3

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};
use crate::header::{CommentHeader, IdHeader, ID_MAGIC};
use crate::ogg::{OggPage, OggStream};
use crate::packet::AudioDataPacket;

/// Packets left over from the last page read, and what that page said about
/// the stream.
#[derive(Debug)]
struct Reassembly {
    pending: VecDeque<Vec<u8>>,
    /// The last page read ended with a complete packet.
    last_page_completed: bool,
    /// The last page read carried the EOS flag.
    ended: bool,
}

impl Default for Reassembly {
    fn default() -> Self {
        Self { pending: VecDeque::new(), last_page_completed: true, ended: false }
    }
}

impl Reassembly {
    /// Take the next buffered packet, telling whether it still continues on a
    /// later page.
    fn pop(&mut self) -> Option<(Vec<u8>, bool)> {
        let data = self.pending.pop_front()?;
        let partial = self.pending.is_empty() && !self.last_page_completed;
        Some((data, partial))
    }

    /// Queue the packets of a freshly read page and hand back its first one.
    fn refill(&mut self, page: OggPage) -> Option<Vec<u8>> {
        self.ended = page.is_eos();
        self.last_page_completed = page.is_completed();
        self.pending.extend(page.into_data_packets());
        self.pending.pop_front()
    }
}

/// Reader of the first Opus logical stream found in an Ogg bitstream.
pub struct OggOpusStream<R> {
    id_header: IdHeader,
    comment_header: CommentHeader,
    ogg: OggStream<R>,
    serial: u32,
    state: Reassembly,
}

impl OggOpusStream<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_ogg(OggStream::open(path)?)
    }
}

impl<R: Read> OggOpusStream<R> {
    /// Read the ID and comment headers from `reader`.
    pub fn new(reader: R) -> Result<Self> {
        Self::from_ogg(OggStream::new(reader))
    }

    pub fn from_ogg(mut ogg: OggStream<R>) -> Result<Self> {
        let (id_header, serial) = read_id_header(&mut ogg)?;
        let comment_header = read_comment_header(&mut ogg, serial)?;

        Ok(Self { id_header, comment_header, ogg, serial, state: Reassembly::default() })
    }

    pub fn id_header(&self) -> &IdHeader {
        &self.id_header
    }

    pub fn comment_header(&self) -> &CommentHeader {
        &self.comment_header
    }

    /// Serial number of the logical stream being read.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Read the next audio data packet, `None` after the last one.
    pub fn read_audio_packet(&mut self) -> Result<Option<AudioDataPacket>> {
        let data = match self.state.pop() {
            Some((data, false)) => data,
            Some((head, true)) => self.accumulate(head)?,
            None if self.state.ended => return Ok(None),
            None => self.accumulate(Vec::new())?,
        };
        if data.is_empty() && self.state.ended {
            // empty EOS page
            return Ok(None);
        }

        AudioDataPacket::from(&data, self.id_header.stream_count as usize).map(Some)
    }

    /// Iterate over the remaining audio data packets.
    pub fn packets(&mut self) -> AudioPackets<'_, R> {
        AudioPackets { stream: self, failed: false }
    }

    /// Append pages of the logical stream to `data` until a packet ends.
    fn accumulate(&mut self, mut data: Vec<u8>) -> Result<Vec<u8>> {
        loop {
            let page = self
                .ogg
                .read_page_of(self.serial)?
                .ok_or_else(|| Error::corrupted("input ended before the end of stream page"))?;

            if !data.is_empty() && !page.is_continued() {
                log::warn!("page {} continues a packet without the continued flag", page.seq_num());
            }

            let packet_count = page.data_packets().len();
            let seq_num = page.seq_num();
            if let Some(first) = self.state.refill(page) {
                data.extend(first);
            }

            if packet_count == 0 && !self.state.ended {
                continue;
            }
            if self.state.ended || packet_count != 1 || self.state.last_page_completed {
                return Ok(data);
            }
            log::debug!("packet continues after page {} ({} bytes so far)", seq_num, data.len());
        }
    }
}

/// Iterator over the audio data packets of an [`OggOpusStream`]. It stops after
/// the first error.
pub struct AudioPackets<'a, R> {
    stream: &'a mut OggOpusStream<R>,
    failed: bool,
}

impl<R: Read> Iterator for AudioPackets<'_, R> {
    type Item = Result<AudioDataPacket>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.stream.read_audio_packet() {
            Ok(packet) => packet.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

fn read_id_header<R: Read>(ogg: &mut OggStream<R>) -> Result<(IdHeader, u32)> {
    loop {
        let page = ogg
            .read_page()?
            .ok_or_else(|| Error::invalid("No ID Header data in this opus file"))?;
        if !page.is_bos() {
            continue;
        }

        match page.data_packets().first() {
            Some(packet) if packet.starts_with(ID_MAGIC) => {}
            _ => {
                log::debug!("skip non-opus logical stream {:#010x}", page.serial_num());
                continue;
            }
        }
        if page.data_packets().len() != 1 {
            return Err(Error::invalid("The ID Header Ogg page must NOT contain other data"));
        }

        let serial = page.serial_num();
        let id_header = IdHeader::parse(&page.data_packets()[0])?;
        log::debug!(
            "found opus stream {:#010x}: {} channels, {} streams",
            serial,
            id_header.channel_count,
            id_header.stream_count
        );
        return Ok((id_header, serial));
    }
}

fn read_comment_header<R: Read>(ogg: &mut OggStream<R>, serial: u32) -> Result<CommentHeader> {
    let mut data = Vec::new();
    loop {
        let page = ogg
            .read_page_of(serial)?
            .ok_or_else(|| Error::corrupted("input ended inside the comment header"))?;
        if page.data_packets().len() != 1 {
            return Err(Error::invalid("Comment Header Ogg pages must only contain 1 data packet"));
        }

        let granule_position = page.granule_position();
        data.extend(page.into_data_packets().concat());
        if granule_position == 0 {
            break;
        }
    }
    CommentHeader::parse(&data)
}
