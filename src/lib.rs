//! Parsing and serialization of Ogg-encapsulated Opus audio.
//!
//! The crate is layered the same way the formats are:
//!
//! - [`ogg`]: Ogg pages ([RFC 3533][1]) and a capture-pattern synchronizing
//!   page reader.
//! - [`header`]: the ID and comment header packets of [RFC 7845][2].
//! - [`packet`]: Opus packets ([RFC 6716][3]) and the audio data packets that
//!   bundle one of them per elementary stream.
//! - [`stream`]: reassembly of audio data packets from the pages of one
//!   logical Opus stream.
//!
//! No audio is decoded, frames are carried as opaque bytes.
//!
//! ```no_run
//! use opus_ogg::OggOpusStream;
//!
//! let mut stream = OggOpusStream::open("audio.opus")?;
//! println!("{} channels", stream.id_header().channel_count);
//! while let Some(packet) = stream.read_audio_packet()? {
//!     for opus in packet.opus_packets() {
//!         println!("{:?} {} frames", opus.config().mode, opus.frames().len());
//!     }
//! }
//! # Ok::<(), opus_ogg::Error>(())
//! ```
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc3533
//! [2]: https://datatracker.ietf.org/doc/html/rfc7845
//! [3]: https://datatracker.ietf.org/doc/html/rfc6716

pub mod error;
pub mod header;
pub mod ogg;
pub mod packet;
pub mod stream;

pub use error::{Error, Result};
pub use header::{CommentHeader, IdHeader};
pub use ogg::{OggPage, OggStream};
pub use packet::{AudioDataPacket, Channel, Code, Code3Header, Config, Framing, OpusPacket, Toc};
pub use stream::OggOpusStream;
