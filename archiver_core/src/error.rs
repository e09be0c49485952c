use std::fmt;

/// Everything that can go wrong while encoding or decoding an archive.
#[derive(Debug)]
pub enum ArchiverError {
    /// A read was attempted past the last bit the source holds.
    EndOfStream,
    /// The archive's structure violates the wire format (bad header counts,
    /// an unexpected control symbol, a byte sequence that the canonical
    /// decoder's tree cannot resolve to a leaf).
    MalformedArchive(String),
    /// The underlying byte stream (file, socket, in-memory buffer) failed.
    Io(std::io::Error),
    /// The caller violated an API precondition: closing an encoder with no
    /// files written, or asking a decoder that has already reached the
    /// archive terminator for another entry.
    Usage(&'static str),
}

impl fmt::Display for ArchiverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiverError::EndOfStream => write!(f, "end of stream"),
            ArchiverError::MalformedArchive(detail) => {
                write!(f, "malformed archive: {detail}")
            }
            ArchiverError::Io(err) => write!(f, "I/O error: {err}"),
            ArchiverError::Usage(detail) => write!(f, "usage error: {detail}"),
        }
    }
}

impl std::error::Error for ArchiverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiverError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ArchiverError {
    fn from(err: std::io::Error) -> Self {
        ArchiverError::Io(err)
    }
}

/// Converts an end-of-stream condition encountered in the middle of a file
/// entry into a `MalformedArchive` report; a well-formed archive always
/// carries an `ArchiveEnd` symbol before the underlying stream actually runs
/// out, so running dry early means the bytes are not a valid archive.
pub(crate) fn truncated(err: ArchiverError) -> ArchiverError {
    match err {
        ArchiverError::EndOfStream => {
            ArchiverError::MalformedArchive("stream ended before ArchiveEnd".to_string())
        }
        other => other,
    }
}
