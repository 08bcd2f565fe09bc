//! RIFF/RIFX container parsing for Wwise Vorbis files.
//!
//! Locates the chunks of a WEM blob and decodes the codec parameters stored in
//! `fmt `, `cue `, `smpl` and `vorb`. The exact `vorb` size selects one of a
//! closed set of [`VorbLayout`]s, which decides where every other field lives.

use crate::error::{WemError, WemResult};
use crate::vorbis::packet::PacketHeaderStyle;
use byteorder::{BE, ByteOrder, LE};
use std::fmt;

const FMT_SIGNATURE: [u8; 16] = [
    1, 0, 0, 0, 0, 0, 0x10, 0, 0x80, 0, 0, 0xAA, 0, 0x38, 0x9b, 0x71,
];

/// Channel-layout subtypes seen in shipped files.
const KNOWN_SUBTYPES: [u32; 6] = [4, 3, 0x33, 0x37, 0x3b, 0x3f];

/// Specifies how to handle Wwise modified Vorbis packet format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForcePacketFormat {
    /// Automatically detect packet format from the file header.
    #[default]
    NoForce,
    /// Force interpretation as modified Wwise packets.
    ForceModPackets,
    /// Force interpretation as standard Vorbis packets.
    ForceNoModPackets,
}

/// Byte order of every multi-byte field in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// `RIFF`
    Little,
    /// `RIFX`
    Big,
}

impl Endian {
    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Endian::Little => LE::read_u16(buf),
            Endian::Big => BE::read_u16(buf),
        }
    }

    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Endian::Little => LE::read_u32(buf),
            Endian::Big => BE::read_u32(buf),
        }
    }
}

/// Bounds-checked field access over the whole input blob.
#[derive(Clone, Copy)]
pub(crate) struct ByteView<'a> {
    data: &'a [u8],
    endian: Endian,
}

impl<'a> ByteView<'a> {
    pub(crate) fn new(data: &'a [u8], endian: Endian) -> Self {
        Self { data, endian }
    }

    pub(crate) fn bytes(&self, offset: u64, len: u64, what: &'static str) -> WemResult<&'a [u8]> {
        let start = usize::try_from(offset).map_err(|_| WemError::truncated(what, offset))?;
        let len = usize::try_from(len).map_err(|_| WemError::truncated(what, offset))?;
        start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| WemError::truncated(what, offset))
    }

    pub(crate) fn u8_at(&self, offset: u64, what: &'static str) -> WemResult<u8> {
        Ok(self.bytes(offset, 1, what)?[0])
    }

    pub(crate) fn u16_at(&self, offset: u64, what: &'static str) -> WemResult<u16> {
        Ok(self.endian.read_u16(self.bytes(offset, 2, what)?))
    }

    pub(crate) fn u32_at(&self, offset: u64, what: &'static str) -> WemResult<u32> {
        Ok(self.endian.read_u32(self.bytes(offset, 4, what)?))
    }
}

/// Location and size of a RIFF chunk body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkLocation {
    /// Byte offset of the chunk body from the start of the file.
    pub offset: u64,
    /// Size of the chunk body in bytes.
    pub size: u64,
}

impl ChunkLocation {
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// Chunks found in the container. A repeated chunk keeps its last occurrence.
#[derive(Debug, Clone, Default)]
pub struct ChunkInfo {
    pub fmt: Option<ChunkLocation>,
    pub cue: Option<ChunkLocation>,
    pub list: Option<ChunkLocation>,
    pub smpl: Option<ChunkLocation>,
    pub vorb: Option<ChunkLocation>,
    pub data: Option<ChunkLocation>,
}

/// `vorb` layout variants, keyed by the chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VorbLayout {
    /// No `vorb` chunk; the fields sit inside a 0x42 byte `fmt `.
    Embedded,
    Size28,
    Size2A,
    Size2C,
    Size32,
    Size34,
}

impl VorbLayout {
    pub fn from_size(size: u64) -> WemResult<Self> {
        match size {
            0x28 => Ok(VorbLayout::Size28),
            0x2A => Ok(VorbLayout::Size2A),
            0x2C => Ok(VorbLayout::Size2C),
            0x32 => Ok(VorbLayout::Size32),
            0x34 => Ok(VorbLayout::Size34),
            _ => Err(WemError::parse(format!("bad vorb size {size:#x}"))),
        }
    }

    /// Older files still carry full identification, comment and setup packets.
    pub fn header_triad_present(self) -> bool {
        matches!(self, VorbLayout::Size28 | VorbLayout::Size2C)
    }

    pub fn packet_header_style(self) -> PacketHeaderStyle {
        match self {
            VorbLayout::Size28 | VorbLayout::Size2C => PacketHeaderStyle::Legacy8,
            VorbLayout::Embedded | VorbLayout::Size2A => PacketHeaderStyle::Modern2,
            VorbLayout::Size32 | VorbLayout::Size34 => PacketHeaderStyle::Modern6,
        }
    }

    fn has_mod_signal(self) -> bool {
        matches!(self, VorbLayout::Embedded | VorbLayout::Size2A)
    }

    fn packet_offsets_at(self) -> u64 {
        if self.has_mod_signal() { 0x10 } else { 0x18 }
    }

    fn uid_at(self) -> Option<u64> {
        match self {
            VorbLayout::Embedded | VorbLayout::Size2A => Some(0x24),
            VorbLayout::Size32 | VorbLayout::Size34 => Some(0x2C),
            VorbLayout::Size28 | VorbLayout::Size2C => None,
        }
    }
}

impl fmt::Display for VorbLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VorbLayout::Embedded => write!(f, "embedded in fmt"),
            VorbLayout::Size28 => write!(f, "0x28"),
            VorbLayout::Size2A => write!(f, "0x2A"),
            VorbLayout::Size2C => write!(f, "0x2C"),
            VorbLayout::Size32 => write!(f, "0x32"),
            VorbLayout::Size34 => write!(f, "0x34"),
        }
    }
}

/// Loop points in samples; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopPoints {
    pub start: u32,
    pub end: u32,
}

/// Everything the container says about the stream.
#[derive(Debug, Clone)]
pub struct WemHeader {
    pub endian: Endian,
    pub riff_size: u64,
    pub chunks: ChunkInfo,
    pub layout: VorbLayout,

    pub channels: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_second: u32,
    pub ext_unk: u16,
    pub subtype: Option<u32>,

    pub cue_count: u32,
    pub loop_points: Option<LoopPoints>,

    pub sample_count: u32,
    pub mod_signal: Option<u32>,
    pub mod_packets: bool,
    pub setup_packet_offset: u32,
    pub first_audio_packet_offset: u32,
    pub uid: u32,
    pub blocksize_0_pow: u8,
    pub blocksize_1_pow: u8,
}

impl WemHeader {
    /// Parse the container of a complete WEM blob.
    pub fn parse(data: &[u8], force_packet_format: ForcePacketFormat) -> WemResult<Self> {
        if data.len() < 12 {
            return Err(WemError::truncated("RIFF", 0));
        }

        let endian = match &data[0..4] {
            b"RIFF" => Endian::Little,
            b"RIFX" => Endian::Big,
            _ => return Err(WemError::parse("missing RIFF")),
        };
        let view = ByteView::new(data, endian);

        let riff_size = view.u32_at(4, "RIFF")? as u64 + 8;
        if riff_size > data.len() as u64 {
            return Err(WemError::truncated("RIFF", 0));
        }

        if &data[8..12] != b"WAVE" {
            return Err(WemError::parse("missing WAVE"));
        }

        let chunks = scan_chunks(&view, riff_size)?;
        let (Some(fmt), Some(_)) = (chunks.fmt, chunks.data) else {
            return Err(WemError::parse("expected fmt, data chunks"));
        };

        let (layout, vorb) = match chunks.vorb {
            None if fmt.size == 0x42 => (
                VorbLayout::Embedded,
                ChunkLocation::new(fmt.offset + 0x18, fmt.size - 0x18),
            ),
            None => return Err(WemError::parse("expected 0x42 fmt if vorb missing")),
            Some(vorb) if matches!(fmt.size, 0x12 | 0x18 | 0x28) => {
                (VorbLayout::from_size(vorb.size)?, vorb)
            }
            Some(_) => return Err(WemError::parse("bad fmt size")),
        };

        let mut header = Self {
            endian,
            riff_size,
            chunks,
            layout,
            channels: 0,
            sample_rate: 0,
            avg_bytes_per_second: 0,
            ext_unk: 0,
            subtype: None,
            cue_count: 0,
            loop_points: None,
            sample_count: 0,
            mod_signal: None,
            mod_packets: false,
            setup_packet_offset: 0,
            first_audio_packet_offset: 0,
            uid: 0,
            blocksize_0_pow: 0,
            blocksize_1_pow: 0,
        };

        header.parse_fmt(&view, fmt)?;
        header.parse_cue(&view)?;
        let raw_loop = header.parse_smpl(&view)?;
        header.parse_vorb(&view, vorb, force_packet_format)?;
        header.loop_points = raw_loop
            .map(|(start, end)| validate_loop(start, end, header.sample_count))
            .transpose()?;

        tracing::debug!(
            "{:?} container, vorb layout {}, {} channel(s) at {} Hz, mod packets: {}",
            endian,
            layout,
            header.channels,
            header.sample_rate,
            header.mod_packets
        );

        Ok(header)
    }

    /// The `data` chunk body.
    pub fn data_chunk(&self) -> WemResult<ChunkLocation> {
        self.chunks
            .data
            .ok_or_else(|| WemError::parse("missing data chunk"))
    }

    fn parse_fmt(&mut self, view: &ByteView<'_>, fmt: ChunkLocation) -> WemResult<()> {
        const WHAT: &str = "fmt chunk";
        let base = fmt.offset;

        if view.u16_at(base, WHAT)? != 0xFFFF {
            return Err(WemError::parse("bad codec id"));
        }

        self.channels = view.u16_at(base + 2, WHAT)?;
        self.sample_rate = view.u32_at(base + 4, WHAT)?;
        self.avg_bytes_per_second = view.u32_at(base + 8, WHAT)?;

        if view.u16_at(base + 12, WHAT)? != 0 {
            return Err(WemError::parse("bad block align"));
        }

        if view.u16_at(base + 14, WHAT)? != 0 {
            return Err(WemError::parse("expected 0 bps"));
        }

        let extra = fmt.size - 0x12;
        if view.u16_at(base + 16, WHAT)? as u64 != extra {
            return Err(WemError::parse("bad extra fmt length"));
        }

        if extra >= 2 {
            self.ext_unk = view.u16_at(base + 18, WHAT)?;
        }

        if extra >= 6 {
            let subtype = view.u32_at(base + 20, WHAT)?;
            if !KNOWN_SUBTYPES.contains(&subtype) {
                tracing::debug!("unknown channel layout subtype {:#x}", subtype);
            }
            self.subtype = Some(subtype);
        }

        if fmt.size == 0x28 && view.bytes(base + 24, 16, WHAT)? != FMT_SIGNATURE {
            return Err(WemError::parse("expected signature in extra fmt?"));
        }

        Ok(())
    }

    fn parse_cue(&mut self, view: &ByteView<'_>) -> WemResult<()> {
        if let Some(cue) = self.chunks.cue {
            self.cue_count = view.u32_at(cue.offset, "cue chunk")?;
        }
        Ok(())
    }

    fn parse_smpl(&mut self, view: &ByteView<'_>) -> WemResult<Option<(u32, u32)>> {
        let Some(smpl) = self.chunks.smpl else {
            return Ok(None);
        };
        const WHAT: &str = "smpl chunk";

        if view.u32_at(smpl.offset + 0x1C, WHAT)? != 1 {
            return Err(WemError::parse("expected one loop"));
        }

        let start = view.u32_at(smpl.offset + 0x2C, WHAT)?;
        let end = view.u32_at(smpl.offset + 0x30, WHAT)?;
        Ok(Some((start, end)))
    }

    fn parse_vorb(
        &mut self,
        view: &ByteView<'_>,
        vorb: ChunkLocation,
        force_packet_format: ForcePacketFormat,
    ) -> WemResult<()> {
        const WHAT: &str = "vorb chunk";
        let base = vorb.offset;

        self.sample_count = view.u32_at(base, WHAT)?;

        if self.layout.has_mod_signal() {
            let mod_signal = view.u32_at(base + 0x4, WHAT)?;
            self.mod_packets = !matches!(mod_signal, 0x4A | 0x4B | 0x69 | 0x70);
            self.mod_signal = Some(mod_signal);
        }

        match force_packet_format {
            ForcePacketFormat::NoForce => {}
            ForcePacketFormat::ForceModPackets => self.mod_packets = true,
            ForcePacketFormat::ForceNoModPackets => self.mod_packets = false,
        }

        let offsets_at = base + self.layout.packet_offsets_at();
        self.setup_packet_offset = view.u32_at(offsets_at, WHAT)?;
        self.first_audio_packet_offset = view.u32_at(offsets_at + 4, WHAT)?;

        if let Some(uid_at) = self.layout.uid_at() {
            self.uid = view.u32_at(base + uid_at, WHAT)?;
            self.blocksize_0_pow = view.u8_at(base + uid_at + 4, WHAT)?;
            self.blocksize_1_pow = view.u8_at(base + uid_at + 5, WHAT)?;
        }

        Ok(())
    }
}

fn scan_chunks(view: &ByteView<'_>, riff_size: u64) -> WemResult<ChunkInfo> {
    let mut chunks = ChunkInfo::default();
    let mut chunk_offset: u64 = 12;

    while chunk_offset < riff_size {
        if chunk_offset + 8 > riff_size {
            return Err(WemError::truncated("chunk header", chunk_offset));
        }

        let chunk_type = view.bytes(chunk_offset, 4, "chunk header")?;
        let chunk_size = view.u32_at(chunk_offset + 4, "chunk header")? as u64;
        let location = ChunkLocation::new(chunk_offset + 8, chunk_size);

        match chunk_type {
            b"fmt " => chunks.fmt = Some(location),
            b"cue " => chunks.cue = Some(location),
            b"LIST" => chunks.list = Some(location),
            b"smpl" => chunks.smpl = Some(location),
            b"vorb" => chunks.vorb = Some(location),
            b"data" => chunks.data = Some(location),
            _ => {}
        }

        chunk_offset += 8 + chunk_size;
    }

    if chunk_offset > riff_size {
        return Err(WemError::truncated("chunk", chunk_offset));
    }

    Ok(chunks)
}

/// Resolve a stored loop end (0 = end of stream, otherwise inclusive) and
/// check `start < end <= sample_count`.
fn validate_loop(start: u32, end: u32, sample_count: u32) -> WemResult<LoopPoints> {
    let end = if end == 0 {
        sample_count
    } else {
        end.checked_add(1)
            .ok_or_else(|| WemError::parse("loops out of range"))?
    };

    if start >= end || end > sample_count {
        return Err(WemError::parse("loops out of range"));
    }

    Ok(LoopPoints { start, end })
}

impl fmt::Display for WemHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let container = match self.endian {
            Endian::Little => "RIFF (little-endian)",
            Endian::Big => "RIFX (big-endian)",
        };
        writeln!(f, "Container: {container}")?;
        writeln!(f, "Vorb layout: {}", self.layout)?;
        writeln!(f, "Channels: {}", self.channels)?;
        writeln!(f, "Sample rate: {} Hz", self.sample_rate)?;
        writeln!(f, "Average bitrate: {} bps", self.avg_bytes_per_second as u64 * 8)?;
        writeln!(f, "Samples: {}", self.sample_count)?;
        if let Some(subtype) = self.subtype {
            writeln!(f, "Channel layout: {subtype:#x}")?;
        }
        if self.chunks.cue.is_some() {
            writeln!(f, "Cue points: {}", self.cue_count)?;
        }
        if let Some(lp) = self.loop_points {
            writeln!(f, "Loop: {} - {}", lp.start, lp.end)?;
        }
        if self.layout.header_triad_present() {
            writeln!(f, "Headers: full triad present")?;
        } else {
            writeln!(
                f,
                "Block sizes: {} / {}",
                1u32 << self.blocksize_0_pow.min(31),
                1u32 << self.blocksize_1_pow.min(31)
            )?;
        }
        writeln!(f, "Packet headers: {}", self.layout.packet_header_style())?;
        write!(
            f,
            "Packets: {}",
            if self.mod_packets {
                "modified"
            } else {
                "standard"
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_u16(out: &mut Vec<u8>, v: u16) {
        out.extend_from_slice(&v.to_le_bytes());
    }

    fn push_u32(out: &mut Vec<u8>, v: u32) {
        out.extend_from_slice(&v.to_le_bytes());
    }

    fn chunk(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        push_u32(&mut out, body.len() as u32);
        out.extend_from_slice(body);
        out
    }

    fn fmt_body(size: u16) -> Vec<u8> {
        let mut out = Vec::new();
        push_u16(&mut out, 0xFFFF);
        push_u16(&mut out, 2);
        push_u32(&mut out, 48000);
        push_u32(&mut out, 16000);
        push_u16(&mut out, 0);
        push_u16(&mut out, 0);
        push_u16(&mut out, size - 0x12);
        out.resize(size as usize, 0);
        if size >= 0x18 {
            out[18..20].copy_from_slice(&0u16.to_le_bytes());
            out[20..24].copy_from_slice(&3u32.to_le_bytes());
        }
        out
    }

    fn vorb_body(size: usize) -> Vec<u8> {
        let mut out = vec![0u8; size];
        out[0..4].copy_from_slice(&44100u32.to_le_bytes());
        out
    }

    fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = b"RIFF".to_vec();
        push_u32(&mut out, body.len() as u32 + 4);
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn test_minimal_32_layout() {
        let mut vorb = vorb_body(0x32);
        vorb[0x18..0x1C].copy_from_slice(&0u32.to_le_bytes());
        vorb[0x1C..0x20].copy_from_slice(&0x40u32.to_le_bytes());
        vorb[0x2C..0x30].copy_from_slice(&0xDEADBEEFu32.to_le_bytes());
        vorb[0x30] = 8;
        vorb[0x31] = 11;

        let data = riff(&[
            chunk(b"fmt ", &fmt_body(0x18)),
            chunk(b"vorb", &vorb),
            chunk(b"data", &[0u8; 4]),
        ]);
        let header = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap();

        assert_eq!(header.endian, Endian::Little);
        assert_eq!(header.layout, VorbLayout::Size32);
        assert_eq!(header.channels, 2);
        assert_eq!(header.sample_rate, 48000);
        assert_eq!(header.sample_count, 44100);
        assert_eq!(header.subtype, Some(3));
        assert_eq!(header.first_audio_packet_offset, 0x40);
        assert_eq!(header.uid, 0xDEADBEEF);
        assert_eq!((header.blocksize_0_pow, header.blocksize_1_pow), (8, 11));
        assert!(!header.mod_packets);
        assert_eq!(header.data_chunk().unwrap().size, 4);
    }

    #[test]
    fn test_mod_signal_detection() {
        let mut vorb = vorb_body(0x2A);
        vorb[4..8].copy_from_slice(&0x4Au32.to_le_bytes());
        let data = riff(&[
            chunk(b"fmt ", &fmt_body(0x12)),
            chunk(b"vorb", &vorb),
            chunk(b"data", &[]),
        ]);

        let header = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap();
        assert!(!header.mod_packets);
        assert_eq!(header.mod_signal, Some(0x4A));

        let forced = WemHeader::parse(&data, ForcePacketFormat::ForceModPackets).unwrap();
        assert!(forced.mod_packets);

        let mut vorb = vorb_body(0x2A);
        vorb[4..8].copy_from_slice(&0x1234u32.to_le_bytes());
        let data = riff(&[
            chunk(b"fmt ", &fmt_body(0x12)),
            chunk(b"vorb", &vorb),
            chunk(b"data", &[]),
        ]);
        assert!(
            WemHeader::parse(&data, ForcePacketFormat::NoForce)
                .unwrap()
                .mod_packets
        );
        assert!(
            !WemHeader::parse(&data, ForcePacketFormat::ForceNoModPackets)
                .unwrap()
                .mod_packets
        );
    }

    #[test]
    fn test_embedded_vorb() {
        let mut fmt = fmt_body(0x42);
        // vorb fields start at fmt + 0x18
        fmt[0x18..0x1C].copy_from_slice(&1000u32.to_le_bytes());
        fmt[0x18 + 0x24 + 4] = 7;
        fmt[0x18 + 0x24 + 5] = 10;
        let data = riff(&[chunk(b"fmt ", &fmt), chunk(b"data", &[])]);

        let header = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap();
        assert_eq!(header.layout, VorbLayout::Embedded);
        assert_eq!(header.sample_count, 1000);
        assert_eq!((header.blocksize_0_pow, header.blocksize_1_pow), (7, 10));
        assert_eq!(
            header.layout.packet_header_style(),
            PacketHeaderStyle::Modern2
        );
    }

    #[test]
    fn test_missing_data_chunk() {
        let data = riff(&[
            chunk(b"fmt ", &fmt_body(0x18)),
            chunk(b"vorb", &vorb_body(0x34)),
        ]);
        let err = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap_err();
        assert!(err.to_string().contains("expected fmt, data chunks"));
    }

    #[test]
    fn test_missing_fmt_chunk() {
        let data = riff(&[chunk(b"vorb", &vorb_body(0x34)), chunk(b"data", &[])]);
        assert!(WemHeader::parse(&data, ForcePacketFormat::NoForce).is_err());
    }

    #[test]
    fn test_bad_vorb_size() {
        let data = riff(&[
            chunk(b"fmt ", &fmt_body(0x18)),
            chunk(b"vorb", &vorb_body(0x30)),
            chunk(b"data", &[]),
        ]);
        assert!(WemHeader::parse(&data, ForcePacketFormat::NoForce).is_err());
    }

    #[test]
    fn test_riff_truncated() {
        let mut data = riff(&[
            chunk(b"fmt ", &fmt_body(0x18)),
            chunk(b"vorb", &vorb_body(0x34)),
            chunk(b"data", &[0u8; 16]),
        ]);
        data.truncate(data.len() - 1);
        let err = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap_err();
        assert!(matches!(err, WemError::Truncated { what: "RIFF", .. }));
    }

    #[test]
    fn test_chunk_overruns_riff() {
        let mut data = riff(&[
            chunk(b"fmt ", &fmt_body(0x18)),
            chunk(b"vorb", &vorb_body(0x34)),
            chunk(b"data", &[0u8; 8]),
        ]);
        // Claim a longer data chunk than the RIFF holds.
        let len = data.len();
        data[len - 12..len - 8].copy_from_slice(&64u32.to_le_bytes());
        let err = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap_err();
        assert!(matches!(err, WemError::Truncated { what: "chunk", .. }));
    }

    #[test]
    fn test_chunk_header_truncated() {
        let mut data = riff(&[
            chunk(b"fmt ", &fmt_body(0x18)),
            chunk(b"vorb", &vorb_body(0x34)),
            chunk(b"data", &[]),
        ]);
        data.extend_from_slice(b"JUNK");
        let riff_size = data.len() as u32 - 8;
        data[4..8].copy_from_slice(&riff_size.to_le_bytes());
        let err = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap_err();
        assert!(matches!(
            err,
            WemError::Truncated {
                what: "chunk header",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_chunks_skipped() {
        let data = riff(&[
            chunk(b"JUNK", &[1, 2, 3, 4]),
            chunk(b"fmt ", &fmt_body(0x18)),
            chunk(b"vorb", &vorb_body(0x34)),
            chunk(b"LIST", &[0u8; 6]),
            chunk(b"data", &[]),
        ]);
        let header = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap();
        assert_eq!(header.chunks.list.map(|l| l.size), Some(6));
    }

    #[test]
    fn test_big_endian_container() {
        let mut fmt = Vec::new();
        fmt.extend_from_slice(&0xFFFFu16.to_be_bytes());
        fmt.extend_from_slice(&1u16.to_be_bytes());
        fmt.extend_from_slice(&22050u32.to_be_bytes());
        fmt.extend_from_slice(&4000u32.to_be_bytes());
        fmt.extend_from_slice(&[0, 0, 0, 0]);
        fmt.extend_from_slice(&0u16.to_be_bytes());

        let mut vorb = vec![0u8; 0x34];
        vorb[0..4].copy_from_slice(&500u32.to_be_bytes());

        let mut body = Vec::new();
        for (id, b) in [(b"fmt ", &fmt), (b"vorb", &vorb), (b"data", &Vec::new())] {
            body.extend_from_slice(id);
            body.extend_from_slice(&(b.len() as u32).to_be_bytes());
            body.extend_from_slice(b);
        }
        let mut data = b"RIFX".to_vec();
        data.extend_from_slice(&(body.len() as u32 + 4).to_be_bytes());
        data.extend_from_slice(b"WAVE");
        data.extend_from_slice(&body);

        let header = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap();
        assert_eq!(header.endian, Endian::Big);
        assert_eq!(header.channels, 1);
        assert_eq!(header.sample_rate, 22050);
        assert_eq!(header.sample_count, 500);
    }

    #[test]
    fn test_fmt_checks() {
        let mut fmt = fmt_body(0x18);
        fmt[0] = 0x01;
        let data = riff(&[
            chunk(b"fmt ", &fmt),
            chunk(b"vorb", &vorb_body(0x34)),
            chunk(b"data", &[]),
        ]);
        let err = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap_err();
        assert!(err.to_string().contains("bad codec id"));

        let data = riff(&[
            chunk(b"fmt ", &fmt_body(0x28)),
            chunk(b"vorb", &vorb_body(0x34)),
            chunk(b"data", &[]),
        ]);
        let err = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap_err();
        assert!(err.to_string().contains("signature"));

        let mut fmt = fmt_body(0x28);
        fmt[24..40].copy_from_slice(&FMT_SIGNATURE);
        let data = riff(&[
            chunk(b"fmt ", &fmt),
            chunk(b"vorb", &vorb_body(0x34)),
            chunk(b"data", &[]),
        ]);
        assert!(WemHeader::parse(&data, ForcePacketFormat::NoForce).is_ok());
    }

    #[test]
    fn test_unknown_subtype_accepted() {
        let mut fmt = fmt_body(0x18);
        fmt[20..24].copy_from_slice(&0x7777u32.to_le_bytes());
        let data = riff(&[
            chunk(b"fmt ", &fmt),
            chunk(b"vorb", &vorb_body(0x34)),
            chunk(b"data", &[]),
        ]);
        let header = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap();
        assert_eq!(header.subtype, Some(0x7777));
    }

    #[test]
    fn test_loop_validation() {
        assert_eq!(
            validate_loop(1000, 0, 44100).unwrap(),
            LoopPoints {
                start: 1000,
                end: 44100
            }
        );
        assert_eq!(validate_loop(10, 99, 100).unwrap().end, 100);
        assert!(validate_loop(10, 100, 100).is_err());
        assert!(validate_loop(100, 0, 100).is_err());
        assert!(validate_loop(50, 49, 100).is_err());
        assert!(validate_loop(0, u32::MAX, 100).is_err());
    }

    #[test]
    fn test_smpl_requires_one_loop() {
        let mut smpl = vec![0u8; 0x3C];
        smpl[0x1C..0x20].copy_from_slice(&2u32.to_le_bytes());
        let data = riff(&[
            chunk(b"fmt ", &fmt_body(0x18)),
            chunk(b"smpl", &smpl),
            chunk(b"vorb", &vorb_body(0x34)),
            chunk(b"data", &[]),
        ]);
        let err = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap_err();
        assert!(err.to_string().contains("expected one loop"));
    }

    #[test]
    fn test_display_summary() {
        let data = riff(&[
            chunk(b"fmt ", &fmt_body(0x18)),
            chunk(b"vorb", &vorb_body(0x2C)),
            chunk(b"data", &[]),
        ]);
        let header = WemHeader::parse(&data, ForcePacketFormat::NoForce).unwrap();
        let text = header.to_string();
        assert!(text.contains("Vorb layout: 0x2C"));
        assert!(text.contains("full triad present"));
        assert!(text.contains("8 byte"));
    }
}
