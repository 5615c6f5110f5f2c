// Ogg container support (RFC 3533)
//
// Ogg Page Structure:
// - Capture Pattern: "OggS" (4 bytes)
// - Version: 0 (1 byte)
// - Header Type: 1=continuation, 2=bos, 4=eos (1 byte)
// - Granule Position (8 bytes)
// - Bitstream Serial Number (4 bytes)
// - Page Sequence Number (4 bytes)
// - CRC Checksum (4 bytes)
// - Number of Page Segments (1 byte)
// - Segment Table (variable)
// - Segment payload, the concatenation of all segments

pub mod crc;
pub mod page;
pub mod stream;

pub use page::OggPage;
pub use stream::OggStream;

pub const CAPTURE_PATTERN: &[u8; 4] = b"OggS";

/// Length of the fixed part of a page header, capture pattern included.
pub const PAGE_HEADER_LEN: usize = 27;

/// Lace value continuing a packet into the next segment.
pub const MAX_LACE_VALUE: u8 = 255;

pub const MAX_SEGMENT_COUNT: usize = 255;

pub const HEADER_TYPE_CONTINUED: u8 = 0x01;
pub const HEADER_TYPE_BOS: u8 = 0x02; // Beginning of Stream
pub const HEADER_TYPE_EOS: u8 = 0x04; // End of Stream
