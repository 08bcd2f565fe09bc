pub mod audio;
pub mod codebook;
pub mod converter;
pub mod header;
pub mod helpers;
pub mod packet;
pub mod riff;

pub use codebook::CodebookLibrary;
pub use converter::{ConversionOptions, WwiseRiffVorbis, WwiseRiffVorbisBuilder};
pub use header::ModeTable;
pub use packet::{AudioPacket, AudioPackets, PacketHeader, PacketHeaderStyle};
pub use riff::{Endian, ForcePacketFormat, LoopPoints, VorbLayout, WemHeader};
