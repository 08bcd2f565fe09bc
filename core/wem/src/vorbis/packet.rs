//! Wwise audio packet header structures.
//!
//! Wwise packs Vorbis packets back to back in the `data` chunk, each behind a
//! small header whose shape depends on the `vorb` layout:
//!
//! - 8 bytes: `u32` size + `u32` granule (old files with a full header triad)
//! - 6 bytes: `u16` size + `u32` granule
//! - 2 bytes: `u16` size only

use crate::error::{WemError, WemResult};
use crate::vorbis::riff::{ByteView, Endian};
use std::fmt;

/// Shape of the per-packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketHeaderStyle {
    Legacy8,
    Modern6,
    Modern2,
}

impl PacketHeaderStyle {
    pub fn header_size(self) -> u64 {
        match self {
            PacketHeaderStyle::Legacy8 => 8,
            PacketHeaderStyle::Modern6 => 6,
            PacketHeaderStyle::Modern2 => 2,
        }
    }

    pub fn has_granule(self) -> bool {
        !matches!(self, PacketHeaderStyle::Modern2)
    }
}

impl fmt::Display for PacketHeaderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketHeaderStyle::Legacy8 => write!(f, "8 byte (size + granule)"),
            PacketHeaderStyle::Modern6 => write!(f, "6 byte (size + granule)"),
            PacketHeaderStyle::Modern2 => write!(f, "2 byte (size only)"),
        }
    }
}

/// A decoded packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Size of the header in bytes (2, 6 or 8).
    pub header_size: u64,
    /// Offset to the packet payload data.
    pub offset: u64,
    /// Size of the packet payload in bytes.
    pub size: u32,
    /// Granule position, absent in 2 byte headers.
    pub granule: Option<u32>,
    /// Offset to the next packet header.
    pub next_offset: u64,
}

/// One packet: its header plus a view of the payload.
#[derive(Debug, Clone, Copy)]
pub struct AudioPacket<'a> {
    pub header: PacketHeader,
    pub payload: &'a [u8],
}

/// Read the packet at `offset`. Header and payload must both end at or before `limit`.
pub fn read_packet<'a>(
    data: &'a [u8],
    endian: Endian,
    style: PacketHeaderStyle,
    offset: u64,
    limit: u64,
) -> WemResult<AudioPacket<'a>> {
    let header_size = style.header_size();
    if offset + header_size > limit {
        return Err(WemError::truncated("page header", offset));
    }

    let view = ByteView::new(data, endian);
    let (size, granule) = match style {
        PacketHeaderStyle::Legacy8 => (
            view.u32_at(offset, "page header")?,
            Some(view.u32_at(offset + 4, "page header")?),
        ),
        PacketHeaderStyle::Modern6 => (
            view.u16_at(offset, "page header")? as u32,
            Some(view.u32_at(offset + 2, "page header")?),
        ),
        PacketHeaderStyle::Modern2 => (view.u16_at(offset, "page header")? as u32, None),
    };

    let payload_offset = offset + header_size;
    let next_offset = payload_offset + size as u64;
    if next_offset > limit {
        return Err(WemError::truncated("file", offset));
    }

    Ok(AudioPacket {
        header: PacketHeader {
            header_size,
            offset: payload_offset,
            size,
            granule,
            next_offset,
        },
        payload: view.bytes(payload_offset, size as u64, "file")?,
    })
}

/// Walks the packets of a region in order. Finite and not restartable; stops
/// after the first error.
pub struct AudioPackets<'a> {
    data: &'a [u8],
    endian: Endian,
    style: PacketHeaderStyle,
    offset: u64,
    end: u64,
    failed: bool,
}

impl<'a> AudioPackets<'a> {
    pub fn new(
        data: &'a [u8],
        endian: Endian,
        style: PacketHeaderStyle,
        start: u64,
        end: u64,
    ) -> Self {
        Self {
            data,
            endian,
            style,
            offset: start,
            end,
            failed: false,
        }
    }

    /// The packet the next call to `next` would yield, without advancing.
    pub fn peek(&self) -> Option<WemResult<AudioPacket<'a>>> {
        if self.failed || self.offset >= self.end {
            return None;
        }
        Some(read_packet(
            self.data,
            self.endian,
            self.style,
            self.offset,
            self.end,
        ))
    }
}

impl<'a> Iterator for AudioPackets<'a> {
    type Item = WemResult<AudioPacket<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.peek()?;
        match &result {
            Ok(packet) => self.offset = packet.header.next_offset,
            Err(_) => self.failed = true,
        }
        Some(result)
    }
}
