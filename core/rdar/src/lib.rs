//! Reader for RDAR sector-indexed archives.

pub mod error;
pub mod hashes;
pub mod process;
pub mod reader;
pub mod sink;
pub mod types;
pub mod util;

pub use error::{RdarError, Result};
pub use hashes::read_hashes;
pub use reader::Archive;
pub use sink::FileSink;
pub use types::*;
