use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{OggPage, CAPTURE_PATTERN};
use crate::error::{Error, Result};

/// Sequential page reader over a physical Ogg bitstream.
///
/// Pages are located by scanning for the capture pattern, so garbage between
/// pages is skipped. Nothing is buffered beyond the page being parsed.
pub struct OggStream<R> {
    reader: R,
}

impl OggStream<BufReader<File>> {
    /// Open an Ogg file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> OggStream<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read the next page, `None` once the input is exhausted.
    pub fn read_page(&mut self) -> Result<Option<OggPage>> {
        if !self.sync()? {
            return Ok(None);
        }
        self.next_page().map(Some)
    }

    /// Read the next page of the logical stream `serial_num`. Pages of other
    /// logical streams are dropped.
    pub fn read_page_of(&mut self, serial_num: u32) -> Result<Option<OggPage>> {
        while let Some(page) = self.read_page()? {
            if page.serial_num() == serial_num {
                return Ok(Some(page));
            }
            log::debug!(
                "discard page {} of logical stream {:#010x}",
                page.seq_num(),
                page.serial_num()
            );
        }
        Ok(None)
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        match self.reader.read_u8() {
            Ok(byte) => Ok(Some(byte)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Consume input up to and including the next capture pattern.
    fn sync(&mut self) -> Result<bool> {
        let mut matched = 0;
        let mut consumed = 0usize;

        while matched < CAPTURE_PATTERN.len() {
            let byte = match self.next_byte()? {
                Some(byte) => byte,
                None => {
                    if consumed > 0 {
                        log::warn!("{} trailing bytes without an ogg page", consumed);
                    }
                    return Ok(false);
                }
            };
            consumed += 1;

            if byte == CAPTURE_PATTERN[matched] {
                matched += 1;
            } else if byte == CAPTURE_PATTERN[0] {
                matched = 1;
            } else {
                matched = 0;
            }
        }

        let skipped = consumed - CAPTURE_PATTERN.len();
        if skipped > 0 {
            log::warn!("skipped {} bytes before capture pattern", skipped);
        }
        Ok(true)
    }

    /// Parse the rest of a page whose capture pattern was just consumed.
    fn next_page(&mut self) -> Result<OggPage> {
        self.read_page_body().map_err(|e| match e {
            Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Error::corrupted("input ended inside an ogg page")
            }
            e => e,
        })
    }

    fn read_page_body(&mut self) -> Result<OggPage> {
        let r = &mut self.reader;

        let version = r.read_u8()?;
        if version != 0 {
            return Err(Error::UnsupportedVersion(version));
        }

        let mut page = OggPage::empty();
        page.set_flags(r.read_u8()?);
        page.set_granule_position(r.read_i64::<LittleEndian>()?);
        page.set_serial_num(r.read_u32::<LittleEndian>()?);
        page.set_seq_num(r.read_u32::<LittleEndian>()?);
        page.set_checksum(r.read_u32::<LittleEndian>()?);

        let segment_count = r.read_u8()? as usize;
        let mut lace_values = vec![0u8; segment_count];
        r.read_exact(&mut lace_values)?;

        let payload_len = lace_values.iter().map(|&v| v as usize).sum::<usize>();
        let mut payload = vec![0u8; payload_len];
        r.read_exact(&mut payload)?;

        page.add_segments(&lace_values, &payload)?;

        log::trace!(
            "read page {} of logical stream {:#010x}: {} segments, {} packets",
            page.seq_num(),
            page.serial_num(),
            segment_count,
            page.data_packets().len()
        );
        Ok(page)
    }
}
