//! wem library for rebuilding Ogg Vorbis streams from Wwise WEM files.

pub mod bit_reader;
pub mod bit_writer;
pub mod error;
pub mod ogg_stream;
pub mod process;
pub mod vorbis;

pub use bit_reader::BitReader;
pub use bit_writer::{BitSink, BitWriter};
pub use error::*;
pub use ogg_stream::{OggStream, STREAM_SERIAL};
pub use vorbis::*;
