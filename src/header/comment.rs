use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};

pub const COMMENT_MAGIC: &[u8; 8] = b"OpusTags";

/// Comment header, the second packet of an Ogg Opus stream. It may span
/// several pages.
///
/// Tag names are case-insensitive and stored upper-cased. A name may carry more
/// than one value, the order of the header is kept.
///
/// See [RFC 7845, Section 5.2](https://datatracker.ietf.org/doc/html/rfc7845#section-5.2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentHeader {
    vendor: String,
    tags: Vec<(String, String)>,
}

impl CommentHeader {
    pub fn new(vendor: impl Into<String>) -> Self {
        Self { vendor: vendor.into(), tags: Vec::new() }
    }

    /// Parse a comment header. Tags without a `=` are dropped.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = Cursor::new(data);
        Self::read(&mut r).map_err(|e| match e {
            Error::Io(_) => Error::invalid("Comment Header data is corrupted"),
            e => e,
        })
    }

    fn read(r: &mut Cursor<&[u8]>) -> Result<Self> {
        let mut magic = [0u8; 8];
        r.read_exact(&mut magic)?;
        if &magic != COMMENT_MAGIC {
            return Err(Error::invalid("Comment Header packet does not start with 'OpusTags'"));
        }

        let mut header = Self::new(read_string(r)?);

        let tag_count = r.read_u32::<LittleEndian>()?;
        for _ in 0..tag_count {
            let tag = read_string(r)?;
            match tag.split_once('=') {
                Some((key, value)) => header.add_tag(key, value),
                None => log::debug!("ignore malformed comment {:?}", tag),
            }
        }

        Ok(header)
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn set_vendor(&mut self, vendor: impl Into<String>) {
        self.vendor = vendor.into();
    }

    pub fn add_tag(&mut self, key: &str, value: impl Into<String>) {
        self.tags.push((key.to_uppercase(), value.into()));
    }

    /// All tags in header order.
    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    /// Values of one tag, the name is matched case-insensitively.
    pub fn get<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> + 'a {
        let key = key.to_uppercase();
        self.tags
            .iter()
            .filter(move |(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn dump(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(COMMENT_MAGIC);
        write_string(&mut out, &self.vendor);
        out.extend_from_slice(&(self.tags.len() as u32).to_le_bytes());
        for (key, value) in &self.tags {
            write_string(&mut out, &format!("{}={}", key, value));
        }
        out
    }
}

fn read_string(r: &mut Cursor<&[u8]>) -> Result<String> {
    let len = r.read_u32::<LittleEndian>()? as usize;
    let remaining = r.get_ref().len() - r.position() as usize;
    if len > remaining {
        return Err(Error::invalid("Comment Header data is corrupted"));
    }
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut header = CommentHeader::new("libopus 1.3");
        header.add_tag("title", "Test title");
        header.add_tag("ARTIST", "a");
        header.add_tag("Artist", "b");

        let parsed = CommentHeader::parse(&header.dump()).unwrap();
        assert_eq!(parsed.vendor(), "libopus 1.3");
        assert_eq!(parsed.tags().len(), 3);
        assert_eq!(parsed.get("TITLE").collect::<Vec<_>>(), vec!["Test title"]);
        assert_eq!(parsed.get("artist").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(parsed, header);
    }

    #[test]
    fn value_keeps_later_equals() {
        let mut header = CommentHeader::new("");
        header.add_tag("K", "a=b");
        let parsed = CommentHeader::parse(&header.dump()).unwrap();
        assert_eq!(parsed.get("k").next(), Some("a=b"));
    }

    #[test]
    fn drops_malformed_tags() {
        let mut data = COMMENT_MAGIC.to_vec();
        write_string(&mut data, "vendor");
        data.extend_from_slice(&2u32.to_le_bytes());
        write_string(&mut data, "no separator");
        write_string(&mut data, "genre=rock");

        let parsed = CommentHeader::parse(&data).unwrap();
        assert_eq!(parsed.tags(), &[("GENRE".to_string(), "rock".to_string())]);
    }

    #[test]
    fn utf8_lengths_are_bytes() {
        let mut header = CommentHeader::new("vendeur é");
        header.add_tag("TITLE", "日本語");
        let parsed = CommentHeader::parse(&header.dump()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn bad_magic() {
        let mut data = CommentHeader::new("v").dump();
        data[0] = b'X';
        assert!(matches!(CommentHeader::parse(&data), Err(Error::InvalidOpus(_))));
    }

    #[test]
    fn truncated() {
        let mut header = CommentHeader::new("v");
        header.add_tag("TITLE", "abc");
        let data = header.dump();
        assert!(matches!(CommentHeader::parse(&data[..data.len() - 1]), Err(Error::InvalidOpus(_))));
        assert!(matches!(CommentHeader::parse(&data[..10]), Err(Error::InvalidOpus(_))));
    }
}
