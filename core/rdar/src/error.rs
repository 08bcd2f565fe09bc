use thiserror::Error;

#[derive(Error, Debug)]
pub enum RdarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid magic: expected RDAR")]
    InvalidMagic,
    #[error("Invalid archive version {0}, expected 12")]
    InvalidVersion(u32),
    #[error("Compression not supported (file {hash})")]
    CompressionUnsupported { hash: u64 },
    #[error("Sectors {first}..{last} of file {hash} outside the offset table ({count} entries)")]
    SectorOutOfRange {
        hash: u64,
        first: u32,
        last: u32,
        count: usize,
    },
    #[error("No file with hash {0}")]
    UnknownHash(u64),
    #[error("Base path cannot be empty")]
    EmptyBaseDir,
}

pub type Result<T> = std::result::Result<T, RdarError>;
