//! Error types for the mmdb-core library

use std::fmt;

/// Result type alias for mmdb-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds produced while locating, decoding, or traversing an MMDB file
#[derive(Debug, Clone)]
pub enum Error {
    /// Underlying byte source failure or short read
    Io(String),

    /// Metadata marker (`\xAB\xCD\xEFMaxMind.com`) not found in the file
    NotAnMmdb,

    /// A read would cross a section or file boundary
    Truncated,

    /// Control byte resolves to an unknown type code
    BadType(u8),

    /// String payload is not valid UTF-8
    BadUtf8,

    /// Pointer resolves outside the data section, or chains to another pointer
    BadPointer,

    /// Integer payload exceeds the declared width for its type, or a
    /// fixed-width type (Double/Float) carries a non-conforming length
    BadLength { kind: &'static str, len: usize },

    /// IPv6 address queried against an IPv4-only database
    VersionMismatch,

    /// Trie traversal exhausted the address bits without a result;
    /// metadata is not a map or is missing required keys; recursion
    /// depth exceeded; or a reserved tag (`EndMarker`/`DataCacheContainer`)
    /// was encountered inside a value tree
    Malformed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
            Error::NotAnMmdb => write!(f, "metadata marker not found: not an MMDB file"),
            Error::Truncated => write!(f, "read crosses section or file boundary"),
            Error::BadType(code) => write!(f, "unknown data type code: {}", code),
            Error::BadUtf8 => write!(f, "invalid UTF-8 in string value"),
            Error::BadPointer => write!(f, "pointer resolves outside the data section, or chains"),
            Error::BadLength { kind, len } => {
                write!(f, "invalid payload length {} for {}", len, kind)
            }
            Error::VersionMismatch => write!(f, "IPv6 address queried against an IPv4 database"),
            Error::Malformed(msg) => write!(f, "malformed MMDB data: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
