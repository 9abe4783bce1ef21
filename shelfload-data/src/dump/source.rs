use std::io::{self, BufRead, BufReader};

use bzip2::read::MultiBzDecoder;
use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use flate2::read::MultiGzDecoder;

use crate::load::LoadError;

/// Compression applied to a dump file, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Uncompressed text.
    Plain,
    /// `.gz`, as published by Open Library.
    Gzip,
    /// `.bz2`.
    Bzip2,
}

impl Compression {
    /// Infer the compression from the file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => Self::Gzip,
            Some(ext) if ext.eq_ignore_ascii_case("bz2") => Self::Bzip2,
            _ => Self::Plain,
        }
    }
}

/// Open a dump for line-by-line reading.
///
/// The returned reader owns the file handle, which is closed when the reader
/// is dropped. A missing file, a directory, or any other open failure maps to
/// [`LoadError::SourceUnavailable`].
pub fn open_dump(path: &Utf8Path) -> Result<Box<dyn BufRead>, LoadError> {
    let unavailable = |source| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    };
    let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(unavailable)?;
    let metadata = file.metadata().map_err(unavailable)?;
    if !metadata.is_file() {
        return Err(unavailable(io::Error::other("not a regular file")));
    }

    let reader: Box<dyn BufRead> = match Compression::from_path(path) {
        Compression::Plain => Box::new(BufReader::new(file)),
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        Compression::Bzip2 => Box::new(BufReader::new(MultiBzDecoder::new(file))),
    };
    Ok(reader)
}
