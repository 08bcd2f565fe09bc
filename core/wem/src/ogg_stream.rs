//! Ogg page framing for rebuilt Vorbis packets.
//!
//! Bits are accumulated for the packet under construction; [`OggStream::flush_page`]
//! closes it onto its own page. Lacing, CRC, sequence numbers and the
//! beginning/end-of-stream flags are produced by [`ogg::PacketWriter`].

use crate::bit_writer::{BitSink, BitWriter};
use crate::error::WemResult;
use ogg::{PacketWriteEndInfo, PacketWriter};
use std::io::Write;

/// Serial number stamped on every page of a converted stream.
pub const STREAM_SERIAL: u32 = 1;

pub struct OggStream<W: Write> {
    writer: PacketWriter<'static, W>,
    packet: BitWriter,
    granule: u64,
    packets: u32,
}

impl<W: Write> OggStream<W> {
    pub fn new(output: W) -> Self {
        Self {
            writer: PacketWriter::new(output),
            packet: BitWriter::new(),
            granule: 0,
            packets: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.packet.write_bit(bit);
    }

    pub fn write_bits(&mut self, value: u32, count: u8) {
        self.packet.write_bits(value, count);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.packet.write_bytes(bytes);
    }

    /// Granule position recorded on the page closed by the next flush.
    pub fn set_granule(&mut self, granule: u64) {
        self.granule = granule;
    }

    /// Close the current packet onto its own page.
    pub fn flush_page(&mut self, last: bool) -> WemResult<()> {
        let packet = std::mem::take(&mut self.packet).into_inner();
        let end = if last {
            PacketWriteEndInfo::EndStream
        } else {
            PacketWriteEndInfo::EndPage
        };

        self.writer.write_packet(packet, STREAM_SERIAL, end, self.granule)?;
        self.packets += 1;
        Ok(())
    }

    /// Number of packets flushed so far.
    pub fn packets_written(&self) -> u32 {
        self.packets
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> BitSink for OggStream<W> {
    fn write_bits(&mut self, value: u32, count: u8) {
        OggStream::write_bits(self, value, count);
    }

    fn write_bit(&mut self, bit: bool) {
        OggStream::write_bit(self, bit);
    }
}
