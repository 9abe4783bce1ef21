//! Access to dump files and their individual lines.
#![forbid(unsafe_code)]

mod line;
mod source;

pub use line::{LineParseError, ParsedLine, parse_line};
pub use source::{Compression, open_dump};

#[cfg(test)]
mod tests;
