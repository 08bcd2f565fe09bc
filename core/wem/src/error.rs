//! Error types for Wwise Vorbis reconstruction.

use thiserror::Error;

/// Result type alias for WEM conversion operations.
pub type WemResult<T> = Result<T, WemError>;

/// Broad failure classes, used by batch callers to decide how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or truncated container and header data.
    Structural,
    /// A setup index points outside the declared tables.
    Reference,
    /// Bits consumed do not agree with a declared size.
    BitAccounting,
    /// Codebook library lookup failed.
    LibraryLookup,
    /// Underlying read or write failure.
    Io,
}

/// Errors that can occur while rebuilding a Vorbis stream from a WEM blob.
#[derive(Debug, Error)]
pub enum WemError {
    /// A required file could not be opened or found.
    #[error("Error opening {filename}")]
    FileOpen {
        /// The name of the file that could not be opened.
        filename: String,
    },

    /// The input contains invalid or malformed data.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },

    /// A region runs past the end of its enclosing buffer or chunk.
    #[error("Parse error: {what} truncated at offset {offset:#x}")]
    Truncated {
        /// Which structure was cut short.
        what: &'static str,
        /// Byte offset where the structure starts.
        offset: u64,
    },

    /// A setup field refers to a codebook, floor, residue, mapping or mode that does not exist.
    #[error("Parse error: invalid {kind} {index}, only {count} defined")]
    InvalidReference {
        /// The kind of table being indexed.
        kind: &'static str,
        /// The offending index.
        index: u32,
        /// Number of entries in the table.
        count: u32,
    },

    /// A setup field holds a value the format forbids.
    #[error("Parse error: invalid {what} {value}")]
    InvalidField {
        /// The field being read.
        what: &'static str,
        /// The value found.
        value: u32,
    },

    /// The codebook data size doesn't match the expected size.
    /// This typically indicates the wrong codebook library is being used.
    #[error("Parse error: expected {expected} bytes, read {actual} - likely wrong codebook")]
    SizeMismatch {
        /// The expected size in bytes.
        expected: u64,
        /// The actual size that was read.
        actual: u64,
    },

    /// The setup packet was not consumed exactly.
    #[error("Parse error: setup packet declares {expected} bits, consumed {actual}")]
    SetupSize {
        /// Declared size in bits.
        expected: u64,
        /// Bits actually consumed.
        actual: u64,
    },

    /// The first audio packet does not start right after the setup packet.
    #[error("Parse error: first audio packet doesn't follow setup ({expected:#x} != {actual:#x})")]
    AudioOffsetMismatch {
        /// Offset where the setup packet ends.
        expected: u64,
        /// Offset recorded for the first audio packet.
        actual: u64,
    },

    /// A codebook ID referenced in the audio file is not found in the codebook library.
    #[error("Parse error: invalid codebook id {id}, try --inline-codebooks")]
    InvalidCodebookId {
        /// The invalid codebook ID that was not found.
        id: u32,
    },

    /// The setup looks like a full (unstripped) setup rather than library references.
    #[error("Parse error: invalid codebook id {id:#x}, try --full-setup")]
    FullSetupHint {
        /// The codebook ID that triggered the hint.
        id: u32,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected end of stream.
    #[error("Unexpected end of stream: {message}")]
    EndOfStream {
        /// Description of where the end of stream occurred.
        message: String,
    },
}

impl WemError {
    /// Create a new parse error with the given message.
    pub fn parse(message: impl Into<String>) -> Self {
        WemError::Parse {
            message: message.into(),
        }
    }

    /// Create a new file open error.
    pub fn file_open(filename: impl Into<String>) -> Self {
        WemError::FileOpen {
            filename: filename.into(),
        }
    }

    pub fn truncated(what: &'static str, offset: u64) -> Self {
        WemError::Truncated { what, offset }
    }

    pub fn invalid_reference(kind: &'static str, index: u32, count: u32) -> Self {
        WemError::InvalidReference { kind, index, count }
    }

    pub fn invalid_field(what: &'static str, value: u32) -> Self {
        WemError::InvalidField { what, value }
    }

    /// Create a new size mismatch error.
    pub fn size_mismatch(expected: u64, actual: u64) -> Self {
        WemError::SizeMismatch { expected, actual }
    }

    /// Create a new invalid codebook ID error.
    pub fn invalid_codebook_id(id: u32) -> Self {
        WemError::InvalidCodebookId { id }
    }

    /// Create a new end of stream error.
    pub fn end_of_stream(message: impl Into<String>) -> Self {
        WemError::EndOfStream {
            message: message.into(),
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WemError::Parse { .. } | WemError::Truncated { .. } => ErrorKind::Structural,
            WemError::InvalidReference { .. } | WemError::InvalidField { .. } => {
                ErrorKind::Reference
            }
            WemError::SizeMismatch { .. }
            | WemError::SetupSize { .. }
            | WemError::AudioOffsetMismatch { .. } => ErrorKind::BitAccounting,
            WemError::InvalidCodebookId { .. } | WemError::FullSetupHint { .. } => {
                ErrorKind::LibraryLookup
            }
            WemError::Io(_) | WemError::FileOpen { .. } | WemError::EndOfStream { .. } => {
                ErrorKind::Io
            }
        }
    }
}
