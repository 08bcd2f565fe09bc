//! Audio packet remuxing.
//!
//! Each Wwise packet becomes one Ogg page. In the modified packet format the
//! packet type bit and the two window flags of long blocks are dropped by the
//! encoder; they are put back here using the setup's mode table.

use crate::bit_reader::BitReader;
use crate::error::{WemError, WemResult};
use crate::ogg_stream::OggStream;
use crate::vorbis::header::ModeTable;
use crate::vorbis::packet::{AudioPacket, AudioPackets};
use crate::vorbis::riff::WemHeader;
use std::io::Write;

/// Wwise writes this granule on some packets; players expect a real position.
const GRANULE_SENTINEL: u32 = 0xFFFF_FFFF;

/// Derives granule positions for layouts whose packet headers carry none.
struct GranuleClock {
    short_block: u64,
    long_block: u64,
    prev_block: Option<u64>,
    position: u64,
}

impl GranuleClock {
    fn new(header: &WemHeader) -> Self {
        Self {
            short_block: 1u64 << header.blocksize_0_pow.min(31),
            long_block: 1u64 << header.blocksize_1_pow.min(31),
            prev_block: None,
            position: 0,
        }
    }

    fn advance(&mut self, long: bool) -> u64 {
        let block = if long {
            self.long_block
        } else {
            self.short_block
        };
        if let Some(prev) = self.prev_block {
            self.position += (prev + block) / 4;
        }
        self.prev_block = Some(block);
        self.position
    }
}

/// Mode number of a packet, read from its first byte.
fn packet_mode(payload: &[u8], modes: &ModeTable, mod_packets: bool) -> Option<u32> {
    let first = *payload.first()?;
    let mask = (1u32 << modes.mode_bits()) - 1;
    // Standard packets lead with the packet type bit
    let shift = if mod_packets { 0 } else { 1 };
    Some((first as u32 >> shift) & mask)
}

/// Remux every audio packet from the first audio offset to the end of the
/// `data` chunk. Returns the number of packets written.
pub fn write_audio_packets<W: Write>(
    data: &[u8],
    header: &WemHeader,
    modes: Option<&ModeTable>,
    output: &mut OggStream<W>,
) -> WemResult<u32> {
    let chunk = header.data_chunk()?;
    let start = chunk.offset + header.first_audio_packet_offset as u64;
    let end = chunk.end();
    let style = header.layout.packet_header_style();

    let mut packets = AudioPackets::new(data, header.endian, style, start, end);
    let mut clock = GranuleClock::new(header);
    let mut prev_blockflag = false;
    let mut count = 0u32;

    while let Some(packet) = packets.next() {
        let packet = packet?;
        let last = packet.header.next_offset == end;

        let granule = match packet.header.granule {
            Some(GRANULE_SENTINEL) => 1,
            Some(granule) => granule as u64,
            None if last => header.sample_count as u64,
            None => match modes.and_then(|m| {
                packet_mode(packet.payload, m, header.mod_packets).map(|mode| m.is_long(mode))
            }) {
                Some(long) => clock.advance(long?),
                None => clock.position,
            },
        };
        output.set_granule(granule);

        if header.mod_packets {
            let modes = modes.ok_or_else(|| WemError::parse("didn't load mode_blockflag"))?;
            prev_blockflag =
                write_mod_packet(&packet, packets.peek(), modes, prev_blockflag, output)?;
        } else {
            output.write_bytes(packet.payload);
        }

        output.flush_page(last)?;
        count += 1;
    }

    tracing::debug!("remuxed {} audio packet(s)", count);

    Ok(count)
}

/// Rebuild the first byte of a modified packet and copy the rest. Returns the
/// packet's own window flag.
fn write_mod_packet<W: Write>(
    packet: &AudioPacket<'_>,
    next: Option<WemResult<AudioPacket<'_>>>,
    modes: &ModeTable,
    prev_blockflag: bool,
    output: &mut OggStream<W>,
) -> WemResult<bool> {
    let Some((first, rest)) = packet.payload.split_first() else {
        return Err(WemError::parse(format!(
            "empty audio packet at {:#x}",
            packet.header.offset
        )));
    };

    let mode_bits = modes.mode_bits();
    let first = [*first];
    let mut reader = BitReader::new(&first);

    // packet type: audio
    output.write_bit(false);

    let mode = reader.read_bits(mode_bits)?;
    output.write_bits(mode, mode_bits);

    let remainder = reader.read_bits(8 - mode_bits)?;

    let long = modes.is_long(mode)?;
    if long {
        let next_long = match next {
            Some(Ok(next)) => match packet_mode(next.payload, modes, true) {
                Some(next_mode) => modes.is_long(next_mode)?,
                None => false,
            },
            _ => false,
        };
        output.write_bit(prev_blockflag);
        output.write_bit(next_long);
    }

    output.write_bits(remainder, 8 - mode_bits);
    output.write_bytes(rest);

    Ok(long)
}
