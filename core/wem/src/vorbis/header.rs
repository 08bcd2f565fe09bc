//! Vorbis header reconstruction.
//!
//! Wwise keeps only a stripped setup packet. The identification and comment
//! headers are regenerated from the container fields, and the setup header is
//! rebuilt field by field with every table reference validated. Older files
//! that still carry the full header triad are copied instead.

use crate::bit_reader::BitReader;
use crate::bit_writer::BitSink;
use crate::error::{WemError, WemResult};
use crate::ogg_stream::OggStream;
use crate::vorbis::codebook::CodebookLibrary;
use crate::vorbis::converter::ConversionOptions;
use crate::vorbis::helpers::ilog;
use crate::vorbis::packet::{AudioPacket, PacketHeaderStyle, read_packet};
use crate::vorbis::riff::WemHeader;
use std::io::Write;

const VERSION: &str = "0.24";
const VORBIS_BYTES: &[u8] = b"vorbis";

/// Vendor string written into every rebuilt comment header.
pub fn vendor_string() -> String {
    format!("converted from Audiokinetic Wwise by ww2ogg {VERSION}")
}

/// Window flags of the setup's modes, needed to rebuild modified audio packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTable {
    blockflags: Vec<bool>,
    mode_bits: u8,
}

impl ModeTable {
    pub fn new(blockflags: Vec<bool>) -> Self {
        let mode_bits = ilog(blockflags.len().saturating_sub(1) as u32);
        Self {
            blockflags,
            mode_bits,
        }
    }

    /// Width of the mode number at the start of each audio packet.
    pub fn mode_bits(&self) -> u8 {
        self.mode_bits
    }

    pub fn len(&self) -> usize {
        self.blockflags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blockflags.is_empty()
    }

    /// Whether `mode` uses the long window.
    pub fn is_long(&self, mode: u32) -> WemResult<bool> {
        self.blockflags
            .get(mode as usize)
            .copied()
            .ok_or_else(|| WemError::invalid_reference("mode", mode, self.blockflags.len() as u32))
    }
}

fn write_vorbis_packet_header<S: BitSink>(output: &mut S, packet_type: u8) {
    output.write_bits(packet_type as u32, 8);
    for &b in VORBIS_BYTES {
        output.write_bits(b as u32, 8);
    }
}

fn write_string<S: BitSink>(output: &mut S, value: &str) {
    output.write_bits(value.len() as u32, 32);
    for b in value.bytes() {
        output.write_bits(b as u32, 8);
    }
}

/// Identification header built from the container fields.
pub fn write_identification<S: BitSink>(header: &WemHeader, output: &mut S) {
    write_vorbis_packet_header(output, 1);
    output.write_bits(0, 32); // version
    output.write_bits(header.channels as u32, 8);
    output.write_bits(header.sample_rate, 32);
    output.write_bits(0, 32); // bitrate_max
    output.write_bits(header.avg_bytes_per_second.wrapping_mul(8), 32);
    output.write_bits(0, 32); // bitrate_min
    output.write_bits(header.blocksize_0_pow as u32, 4);
    output.write_bits(header.blocksize_1_pow as u32, 4);
    output.write_bit(true); // framing
}

/// Comment header carrying the vendor string and, when looped, the loop points.
pub fn write_comment<S: BitSink>(header: &WemHeader, output: &mut S) {
    write_vorbis_packet_header(output, 3);
    write_string(output, &vendor_string());

    match header.loop_points {
        None => output.write_bits(0, 32),
        Some(points) => {
            output.write_bits(2, 32);
            write_string(output, &format!("LoopStart={}", points.start));
            write_string(output, &format!("LoopEnd={}", points.end));
        }
    }

    output.write_bit(true); // framing
}

/// Rebuild the setup header from the stripped setup packet.
///
/// Returns the mode table, or `None` when the setup was bit-copied under
/// `full_setup` and never parsed.
pub fn rebuild_setup<S: BitSink>(
    data: &[u8],
    header: &WemHeader,
    codebooks: &CodebookLibrary,
    options: &ConversionOptions,
    output: &mut S,
) -> WemResult<Option<ModeTable>> {
    let chunk = header.data_chunk()?;
    let style = header.layout.packet_header_style();
    let setup = read_packet(
        data,
        header.endian,
        style,
        chunk.offset + header.setup_packet_offset as u64,
        chunk.end(),
    )?;

    if setup.header.granule.is_some_and(|g| g != 0) {
        return Err(WemError::parse("setup packet granule != 0"));
    }

    write_vorbis_packet_header(output, 5);

    let mut reader = BitReader::new(setup.payload);
    let expected = setup.header.size as u64 * 8;
    let body = rebuild_setup_body(
        &mut reader,
        setup.header.size,
        codebooks,
        options,
        header.channels,
        output,
    );
    // A setup that runs out of bits is shorter than what it declares
    let modes = match body {
        Err(WemError::EndOfStream { .. }) => {
            return Err(WemError::SetupSize {
                expected,
                actual: reader.bits_consumed(),
            });
        }
        result => result?,
    };

    reader.skip_to_byte_boundary();
    if reader.bits_consumed() != expected {
        return Err(WemError::SetupSize {
            expected,
            actual: reader.bits_consumed(),
        });
    }

    check_audio_offset(header, setup.header.next_offset, chunk.offset)?;

    Ok(modes)
}

/// Codebooks, time placeholder and tables of a stripped setup packet.
fn rebuild_setup_body<S: BitSink>(
    reader: &mut BitReader<'_>,
    setup_size: u32,
    codebooks: &CodebookLibrary,
    options: &ConversionOptions,
    channels: u16,
    output: &mut S,
) -> WemResult<Option<ModeTable>> {
    let codebook_count_less1 = reader.read_bits(8)?;
    let codebook_count = codebook_count_less1 + 1;
    output.write_bits(codebook_count_less1, 8);

    if options.inline_codebooks {
        for _ in 0..codebook_count {
            if options.full_setup {
                CodebookLibrary::copy(reader, output)?;
            } else {
                CodebookLibrary::rebuild_from_reader(reader, output)?;
            }
        }
    } else {
        for _ in 0..codebook_count {
            let codebook_id = reader.read_bits(10)?;
            match codebooks.rebuild(codebook_id as usize, output) {
                Ok(()) => {}
                Err(WemError::InvalidCodebookId { id }) => {
                    // 0x342 followed by 0x1590 is the "BCV" sync of a full codebook
                    if codebook_id == 0x342 && reader.read_bits(14).ok() == Some(0x1590) {
                        return Err(WemError::FullSetupHint { id: codebook_id });
                    }
                    return Err(WemError::invalid_codebook_id(id));
                }
                Err(e) => return Err(e),
            }
        }
    }

    // Time domain transforms placeholder
    output.write_bits(0, 6);
    output.write_bits(0, 16);

    let modes = if options.full_setup {
        let size_bits = setup_size as u64 * 8;
        while reader.bits_consumed() < size_bits {
            output.write_bit(reader.read_bit()?);
        }
        None
    } else {
        Some(rebuild_tables(reader, output, channels, codebook_count)?)
    };

    Ok(modes)
}

fn check_audio_offset(header: &WemHeader, next_offset: u64, data_offset: u64) -> WemResult<()> {
    let first_audio = data_offset + header.first_audio_packet_offset as u64;
    if next_offset != first_audio {
        return Err(WemError::AudioOffsetMismatch {
            expected: next_offset,
            actual: first_audio,
        });
    }
    Ok(())
}

fn rebuild_tables<S: BitSink>(
    reader: &mut BitReader<'_>,
    output: &mut S,
    channels: u16,
    codebook_count: u32,
) -> WemResult<ModeTable> {
    let floor_count_less1 = reader.read_bits(6)?;
    let floor_count = floor_count_less1 + 1;
    output.write_bits(floor_count_less1, 6);

    for _ in 0..floor_count {
        output.write_bits(1, 16); // floor type 1
        rebuild_floor(reader, output, codebook_count)?;
    }

    let residue_count_less1 = reader.read_bits(6)?;
    let residue_count = residue_count_less1 + 1;
    output.write_bits(residue_count_less1, 6);

    for _ in 0..residue_count {
        rebuild_residue(reader, output, codebook_count)?;
    }

    let mapping_count_less1 = reader.read_bits(6)?;
    let mapping_count = mapping_count_less1 + 1;
    output.write_bits(mapping_count_less1, 6);

    for _ in 0..mapping_count {
        output.write_bits(0, 16); // mapping type 0
        rebuild_mapping(reader, output, channels, floor_count, residue_count)?;
    }

    let mode_count_less1 = reader.read_bits(6)?;
    let mode_count = mode_count_less1 + 1;
    output.write_bits(mode_count_less1, 6);

    let mut blockflags = Vec::with_capacity(mode_count as usize);
    for _ in 0..mode_count {
        let block_flag = reader.read_bit()?;
        output.write_bit(block_flag);
        blockflags.push(block_flag);

        output.write_bits(0, 16); // windowtype
        output.write_bits(0, 16); // transformtype

        let mapping = reader.read_bits(8)?;
        output.write_bits(mapping, 8);
        if mapping >= mapping_count {
            return Err(WemError::invalid_reference("mode mapping", mapping, mapping_count));
        }
    }

    output.write_bit(true); // framing

    Ok(ModeTable::new(blockflags))
}

fn rebuild_floor<S: BitSink>(
    reader: &mut BitReader<'_>,
    output: &mut S,
    codebook_count: u32,
) -> WemResult<()> {
    let partitions = reader.read_bits(5)?;
    output.write_bits(partitions, 5);

    let mut partition_classes = Vec::with_capacity(partitions as usize);
    for _ in 0..partitions {
        let class = reader.read_bits(4)?;
        output.write_bits(class, 4);
        partition_classes.push(class);
    }

    let maximum_class = partition_classes.iter().copied().max().unwrap_or(0);
    let mut class_dimensions = Vec::with_capacity(maximum_class as usize + 1);

    for _ in 0..=maximum_class {
        let dimensions_less1 = reader.read_bits(3)?;
        output.write_bits(dimensions_less1, 3);
        class_dimensions.push(dimensions_less1 + 1);

        let subclasses = reader.read_bits(2)?;
        output.write_bits(subclasses, 2);

        if subclasses != 0 {
            let masterbook = reader.read_bits(8)?;
            output.write_bits(masterbook, 8);
            if masterbook >= codebook_count {
                return Err(WemError::invalid_reference(
                    "floor1 masterbook",
                    masterbook,
                    codebook_count,
                ));
            }
        }

        for _ in 0..(1u32 << subclasses) {
            let book_plus1 = reader.read_bits(8)?;
            output.write_bits(book_plus1, 8);
            if book_plus1 > 0 && book_plus1 - 1 >= codebook_count {
                return Err(WemError::invalid_reference(
                    "floor1 subclass book",
                    book_plus1 - 1,
                    codebook_count,
                ));
            }
        }
    }

    let multiplier_less1 = reader.read_bits(2)?;
    output.write_bits(multiplier_less1, 2);

    let rangebits = reader.read_bits(4)? as u8;
    output.write_bits(rangebits as u32, 4);

    for class in partition_classes {
        for _ in 0..class_dimensions[class as usize] {
            let x = reader.read_bits(rangebits)?;
            output.write_bits(x, rangebits);
        }
    }

    Ok(())
}

fn rebuild_residue<S: BitSink>(
    reader: &mut BitReader<'_>,
    output: &mut S,
    codebook_count: u32,
) -> WemResult<()> {
    let residue_type = reader.read_bits(2)?;
    output.write_bits(residue_type, 16);
    if residue_type > 2 {
        return Err(WemError::invalid_field("residue type", residue_type));
    }

    let begin = reader.read_bits(24)?;
    let end = reader.read_bits(24)?;
    let partition_size_less1 = reader.read_bits(24)?;
    let classifications_less1 = reader.read_bits(6)?;
    let classbook = reader.read_bits(8)?;
    let classifications = classifications_less1 + 1;

    output.write_bits(begin, 24);
    output.write_bits(end, 24);
    output.write_bits(partition_size_less1, 24);
    output.write_bits(classifications_less1, 6);
    output.write_bits(classbook, 8);

    if classbook >= codebook_count {
        return Err(WemError::invalid_reference(
            "residue classbook",
            classbook,
            codebook_count,
        ));
    }

    let mut cascade = Vec::with_capacity(classifications as usize);
    for _ in 0..classifications {
        let low_bits = reader.read_bits(3)?;
        output.write_bits(low_bits, 3);

        let bitflag = reader.read_bit()?;
        output.write_bit(bitflag);

        let high_bits = if bitflag {
            let high = reader.read_bits(5)?;
            output.write_bits(high, 5);
            high
        } else {
            0
        };

        cascade.push(high_bits * 8 + low_bits);
    }

    for pattern in cascade {
        for k in 0..8 {
            if pattern & (1 << k) != 0 {
                let book = reader.read_bits(8)?;
                output.write_bits(book, 8);
                if book >= codebook_count {
                    return Err(WemError::invalid_reference(
                        "residue book",
                        book,
                        codebook_count,
                    ));
                }
            }
        }
    }

    Ok(())
}

fn rebuild_mapping<S: BitSink>(
    reader: &mut BitReader<'_>,
    output: &mut S,
    channels: u16,
    floor_count: u32,
    residue_count: u32,
) -> WemResult<()> {
    let channels = channels as u32;

    let submaps_flag = reader.read_bit()?;
    output.write_bit(submaps_flag);

    let submaps = if submaps_flag {
        let submaps_less1 = reader.read_bits(4)?;
        output.write_bits(submaps_less1, 4);
        submaps_less1 + 1
    } else {
        1
    };

    let square_polar_flag = reader.read_bit()?;
    output.write_bit(square_polar_flag);

    if square_polar_flag {
        let coupling_steps_less1 = reader.read_bits(8)?;
        output.write_bits(coupling_steps_less1, 8);

        let width = ilog(channels.saturating_sub(1));
        for _ in 0..=coupling_steps_less1 {
            let magnitude = reader.read_bits(width)?;
            let angle = reader.read_bits(width)?;
            output.write_bits(magnitude, width);
            output.write_bits(angle, width);

            if angle == magnitude {
                return Err(WemError::invalid_field("coupling", angle));
            }
            for channel in [magnitude, angle] {
                if channel >= channels {
                    return Err(WemError::invalid_reference(
                        "coupling channel",
                        channel,
                        channels,
                    ));
                }
            }
        }
    }

    // Reserved field Wwise leaves in place
    let reserved = reader.read_bits(2)?;
    output.write_bits(reserved, 2);
    if reserved != 0 {
        return Err(WemError::invalid_field("mapping reserved field", reserved));
    }

    if submaps > 1 {
        for _ in 0..channels {
            let mux = reader.read_bits(4)?;
            output.write_bits(mux, 4);
            if mux >= submaps {
                return Err(WemError::invalid_reference("mapping mux", mux, submaps));
            }
        }
    }

    for _ in 0..submaps {
        let time_config = reader.read_bits(8)?;
        output.write_bits(time_config, 8);

        let floor = reader.read_bits(8)?;
        output.write_bits(floor, 8);
        if floor >= floor_count {
            return Err(WemError::invalid_reference("floor", floor, floor_count));
        }

        let residue = reader.read_bits(8)?;
        output.write_bits(residue, 8);
        if residue >= residue_count {
            return Err(WemError::invalid_reference("residue", residue, residue_count));
        }
    }

    Ok(())
}

fn read_triad_packet<'a>(
    data: &'a [u8],
    header: &WemHeader,
    offset: u64,
    limit: u64,
    name: &str,
    packet_type: u8,
) -> WemResult<AudioPacket<'a>> {
    let packet = read_packet(data, header.endian, PacketHeaderStyle::Legacy8, offset, limit)?;

    if packet.header.granule.is_some_and(|g| g != 0) {
        return Err(WemError::parse(format!("{name} packet granule != 0")));
    }
    if packet.payload.first() != Some(&packet_type) {
        return Err(WemError::parse(format!("wrong type for {name} packet")));
    }

    Ok(packet)
}

fn copy_setup<S: BitSink>(
    reader: &mut BitReader<'_>,
    size_bits: u64,
    output: &mut S,
) -> WemResult<()> {
    // type and "vorbis"
    for _ in 0..7 {
        output.write_bits(reader.read_bits(8)?, 8);
    }

    let codebook_count_less1 = reader.read_bits(8)?;
    output.write_bits(codebook_count_less1, 8);
    for _ in 0..=codebook_count_less1 {
        CodebookLibrary::copy(reader, output)?;
    }

    while reader.bits_consumed() < size_bits {
        output.write_bit(reader.read_bit()?);
    }
    Ok(())
}

/// Copy the identification, comment and setup packets of a file that still
/// carries them, one page each.
pub fn copy_header_triad<W: Write>(
    data: &[u8],
    header: &WemHeader,
    output: &mut OggStream<W>,
) -> WemResult<()> {
    let chunk = header.data_chunk()?;
    let limit = chunk.end();
    let mut offset = chunk.offset + header.setup_packet_offset as u64;

    let information = read_triad_packet(data, header, offset, limit, "information", 1)?;
    output.write_bytes(information.payload);
    output.flush_page(false)?;
    offset = information.header.next_offset;

    let comment = read_triad_packet(data, header, offset, limit, "comment", 3)?;
    output.write_bytes(comment.payload);
    output.flush_page(false)?;
    offset = comment.header.next_offset;

    let setup = read_triad_packet(data, header, offset, limit, "setup", 5)?;
    let mut reader = BitReader::new(setup.payload);
    let size_bits = setup.header.size as u64 * 8;
    match copy_setup(&mut reader, size_bits, output) {
        Err(WemError::EndOfStream { .. }) => {
            return Err(WemError::SetupSize {
                expected: size_bits,
                actual: reader.bits_consumed(),
            });
        }
        result => result?,
    }
    output.flush_page(false)?;

    check_audio_offset(header, setup.header.next_offset, chunk.offset)
}

/// Write the three header pages. Returns the mode table when the setup was
/// rebuilt, `None` for a copied triad or a bit-copied full setup.
pub fn emit_headers<W: Write>(
    data: &[u8],
    header: &WemHeader,
    codebooks: &CodebookLibrary,
    options: &ConversionOptions,
    output: &mut OggStream<W>,
) -> WemResult<Option<ModeTable>> {
    if header.layout.header_triad_present() {
        copy_header_triad(data, header, output)?;
        return Ok(None);
    }

    write_identification(header, output);
    output.flush_page(false)?;

    write_comment(header, output);
    output.flush_page(false)?;

    let modes = rebuild_setup(data, header, codebooks, options, output)?;
    output.flush_page(false)?;

    tracing::debug!(
        "rebuilt setup header, {} mode(s)",
        modes.as_ref().map_or(0, ModeTable::len)
    );

    Ok(modes)
}
