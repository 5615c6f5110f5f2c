//! Ogg Opus header packets ([RFC 7845, Section 5][1]).
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc7845#section-5

pub mod comment;
pub mod id;

pub use comment::{CommentHeader, COMMENT_MAGIC};
pub use id::{IdHeader, ID_MAGIC};
