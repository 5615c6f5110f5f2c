use std::io::Write;

use super::{
    crc, CAPTURE_PATTERN, HEADER_TYPE_BOS, HEADER_TYPE_CONTINUED, HEADER_TYPE_EOS,
    MAX_LACE_VALUE, MAX_SEGMENT_COUNT, PAGE_HEADER_LEN,
};
use crate::error::{Error, Result};

/// Ogg page as defined by [RFC 3533][1].
///
/// The lace values are derived from the data packets and regenerated whenever
/// one is added. Only the last packet of a page may be partial, meaning it
/// continues on the next page of the same logical stream.
///
/// [1]: https://datatracker.ietf.org/doc/html/rfc3533#section-6
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OggPage {
    version: u8,
    flags: u8,
    granule_position: i64,
    serial_num: u32,
    seq_num: u32,
    checksum: u32,
    lace_values: Vec<u8>,
    data_packets: Vec<Vec<u8>>,
}

impl OggPage {
    /// An empty version 0 page with every flag cleared.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn set_flags(&mut self, flags: u8) {
        self.flags = flags;
    }

    /// The first packet continues the partial packet of a previous page.
    pub fn is_continued(&self) -> bool {
        self.flags & HEADER_TYPE_CONTINUED != 0
    }

    pub fn set_continued(&mut self) {
        self.flags |= HEADER_TYPE_CONTINUED;
    }

    pub fn is_bos(&self) -> bool {
        self.flags & HEADER_TYPE_BOS != 0
    }

    pub fn set_bos(&mut self) {
        self.flags |= HEADER_TYPE_BOS;
    }

    pub fn is_eos(&self) -> bool {
        self.flags & HEADER_TYPE_EOS != 0
    }

    pub fn set_eos(&mut self) {
        self.flags |= HEADER_TYPE_EOS;
    }

    pub fn granule_position(&self) -> i64 {
        self.granule_position
    }

    pub fn set_granule_position(&mut self, granule_position: i64) {
        self.granule_position = granule_position;
    }

    pub fn serial_num(&self) -> u32 {
        self.serial_num
    }

    pub fn set_serial_num(&mut self, serial_num: u32) {
        self.serial_num = serial_num;
    }

    pub fn seq_num(&self) -> u32 {
        self.seq_num
    }

    pub fn set_seq_num(&mut self, seq_num: u32) {
        self.seq_num = seq_num;
    }

    /// Stored checksum. It is carried as is and never verified.
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn set_checksum(&mut self, checksum: u32) {
        self.checksum = checksum;
    }

    pub fn seg_count(&self) -> usize {
        self.lace_values.len()
    }

    pub fn lace_values(&self) -> &[u8] {
        &self.lace_values
    }

    pub fn data_packets(&self) -> &[Vec<u8>] {
        &self.data_packets
    }

    pub fn into_data_packets(self) -> Vec<Vec<u8>> {
        self.data_packets
    }

    /// Whether the last packet on this page ends here.
    pub fn is_completed(&self) -> bool {
        matches!(self.lace_values.last(), Some(&last) if last < MAX_LACE_VALUE)
    }

    /// Append a complete packet: `len / 255` lace values of 255 and a
    /// terminating `len % 255`, which is 0 for exact multiples of 255.
    pub fn add_data_packet(&mut self, data: impl Into<Vec<u8>>) -> Result<()> {
        let data = data.into();
        let count = data.len() / MAX_LACE_VALUE as usize;
        self.reserve_segments(count + 1)?;

        self.lace_values.resize(self.lace_values.len() + count, MAX_LACE_VALUE);
        self.lace_values.push((data.len() % MAX_LACE_VALUE as usize) as u8);
        self.data_packets.push(data);
        Ok(())
    }

    /// Append a packet that continues on the next page. Its length must be a
    /// multiple of 255 and no terminating lace value is written.
    pub fn add_partial_data_packet(&mut self, data: impl Into<Vec<u8>>) -> Result<()> {
        let data = data.into();
        if data.len() % MAX_LACE_VALUE as usize != 0 {
            return Err(Error::NotPartialData(data.len()));
        }
        let count = data.len() / MAX_LACE_VALUE as usize;
        self.reserve_segments(count)?;

        self.lace_values.resize(self.lace_values.len() + count, MAX_LACE_VALUE);
        self.data_packets.push(data);
        Ok(())
    }

    fn reserve_segments(&self, count: usize) -> Result<()> {
        if self.lace_values.len() + count > MAX_SEGMENT_COUNT {
            return Err(Error::invalid(format!(
                "a page holds at most {} segments, {} more requested with {} used",
                MAX_SEGMENT_COUNT,
                count,
                self.lace_values.len()
            )));
        }
        Ok(())
    }

    /// Split a segment payload into packets following the lace values: a run of
    /// 255s closed by a smaller value is one complete packet, a trailing run of
    /// 255s is one partial packet.
    pub fn add_segments(&mut self, lace_values: &[u8], payload: &[u8]) -> Result<()> {
        let total = lace_values.iter().map(|&v| v as usize).sum::<usize>();
        if total != payload.len() {
            return Err(Error::corrupted(format!(
                "segment table describes {} bytes but the payload has {}",
                total,
                payload.len()
            )));
        }

        let mut start = 0;
        let mut packet_len = 0;
        for &lace_value in lace_values {
            packet_len += lace_value as usize;
            if lace_value < MAX_LACE_VALUE {
                self.add_data_packet(&payload[start..start + packet_len])?;
                start += packet_len;
                packet_len = 0;
            }
        }
        if packet_len != 0 {
            self.add_partial_data_packet(&payload[start..start + packet_len])?;
        }
        Ok(())
    }

    fn header_bytes(&self, checksum: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(PAGE_HEADER_LEN + self.lace_values.len());
        out.extend_from_slice(CAPTURE_PATTERN);
        out.push(self.version);
        out.push(self.flags);
        out.extend_from_slice(&self.granule_position.to_le_bytes());
        out.extend_from_slice(&self.serial_num.to_le_bytes());
        out.extend_from_slice(&self.seq_num.to_le_bytes());
        out.extend_from_slice(&checksum.to_le_bytes());
        out.push(self.lace_values.len() as u8);
        out.extend_from_slice(&self.lace_values);
        out
    }

    fn dump_with(&self, checksum: u32) -> Vec<u8> {
        let mut out = self.header_bytes(checksum);
        for packet in &self.data_packets {
            out.extend_from_slice(packet);
        }
        out
    }

    /// Serialize the page with its stored checksum.
    pub fn dump(&self) -> Vec<u8> {
        self.dump_with(self.checksum)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.header_bytes(self.checksum))?;
        for packet in &self.data_packets {
            writer.write_all(packet)?;
        }
        Ok(())
    }

    /// CRC-32 of the page computed with the checksum field zeroed.
    pub fn compute_checksum(&self) -> u32 {
        crc::checksum(&self.dump_with(0))
    }

    /// Replace the stored checksum with the computed one.
    pub fn update_checksum(&mut self) {
        self.checksum = self.compute_checksum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        let mut page = OggPage::empty();
        assert!(!page.is_continued() && !page.is_bos() && !page.is_eos());

        page.set_flags(0x01);
        assert!(page.is_continued());
        page.set_flags(0x02);
        assert!(page.is_bos() && !page.is_continued());
        page.set_flags(0x04);
        assert!(page.is_eos() && !page.is_bos());

        page.set_flags(0);
        page.set_continued();
        page.set_bos();
        page.set_eos();
        assert_eq!(page.flags(), 0x07);
    }

    #[test]
    fn lacing() {
        let mut page = OggPage::empty();
        page.add_data_packet(vec![1; 256]).unwrap();
        assert_eq!(page.lace_values(), &[255, 1]);
        assert!(page.is_completed());

        page.add_data_packet(vec![2; 255]).unwrap();
        assert_eq!(page.lace_values(), &[255, 1, 255, 0]);

        page.add_data_packet(Vec::new()).unwrap();
        assert_eq!(page.lace_values(), &[255, 1, 255, 0, 0]);
        assert!(page.is_completed());

        page.add_partial_data_packet(vec![3; 255]).unwrap();
        assert_eq!(page.lace_values(), &[255, 1, 255, 0, 0, 255]);
        assert!(!page.is_completed());
        assert_eq!(page.data_packets().len(), 4);
    }

    #[test]
    fn empty_page_is_not_completed() {
        assert!(!OggPage::empty().is_completed());
    }

    #[test]
    fn partial_packet_length() {
        let mut page = OggPage::empty();
        assert!(matches!(page.add_partial_data_packet(vec![0; 256]), Err(Error::NotPartialData(256))));
        assert_eq!(page.seg_count(), 0);
        assert!(page.data_packets().is_empty());
    }

    #[test]
    fn segment_limit() {
        let mut page = OggPage::empty();
        page.add_partial_data_packet(vec![0; 255 * 255]).unwrap();
        assert_eq!(page.seg_count(), 255);
        assert!(page.add_data_packet(Vec::new()).is_err());

        let mut page = OggPage::empty();
        assert!(page.add_data_packet(vec![0; 255 * 255]).is_err());
    }

    #[test]
    fn desegment() {
        let mut source = OggPage::empty();
        source.add_data_packet(vec![1; 300]).unwrap();
        source.add_data_packet(vec![2; 10]).unwrap();
        source.add_partial_data_packet(vec![3; 510]).unwrap();

        let payload: Vec<u8> = source.data_packets().concat();
        let mut page = OggPage::empty();
        page.add_segments(source.lace_values(), &payload).unwrap();

        assert_eq!(page.lace_values(), source.lace_values());
        assert_eq!(page.data_packets(), source.data_packets());
        assert!(!page.is_completed());
    }

    #[test]
    fn desegment_length_mismatch() {
        let mut page = OggPage::empty();
        assert!(page.add_segments(&[10], &[0; 9]).is_err());
    }

    #[test]
    fn dump_layout() {
        let mut page = OggPage::empty();
        page.set_flags(0x01);
        page.set_granule_position(257);
        page.set_serial_num(0xffff_ffff);
        page.set_seq_num(1025);
        page.set_checksum(0x0403_0201);
        page.add_data_packet(vec![9; 3]).unwrap();

        let expected = [
            b'O', b'g', b'g', b'S', 0, 0x01, 0x01, 0x01, 0, 0, 0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff,
            0x01, 0x04, 0, 0, 0x01, 0x02, 0x03, 0x04, 1, 3, 9, 9, 9,
        ];
        assert_eq!(page.dump(), expected);

        let mut written = Vec::new();
        page.write_to(&mut written).unwrap();
        assert_eq!(written, expected);
    }

    #[test]
    fn checksum_ignores_stored_value() {
        let mut page = OggPage::empty();
        page.add_data_packet(b"OpusHead".to_vec()).unwrap();
        let crc = page.compute_checksum();

        page.set_checksum(0xdead_beef);
        assert_eq!(page.compute_checksum(), crc);

        page.update_checksum();
        assert_eq!(page.checksum(), crc);

        let mut zeroed = page.dump();
        zeroed[22..26].copy_from_slice(&[0; 4]);
        assert_eq!(crc::checksum(&zeroed), crc);
    }
}
