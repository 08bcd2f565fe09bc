use crate::error::{RdarError, Result};
use crate::types::*;
use crate::util::filetime_to_unix;
use byteorder::{LE, ReadBytesExt};
use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom, Write};

const MAGIC: &[u8; 4] = b"RDAR";
const VERSION: u32 = 12;
const WEM_MAGIC: &[u8; 4] = b"RIFF";

/// An opened archive: header and table are read up front, file data on demand.
pub struct Archive<R> {
    reader: R,
    header: Header,
    table: Table,
    index: HashMap<u64, usize>,
    names: HashMap<u64, String>,
}

fn read_header<R: Read>(reader: &mut R) -> Result<Header> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(RdarError::InvalidMagic);
    }

    let version = reader.read_u32::<LE>()?;
    if version != VERSION {
        return Err(RdarError::InvalidVersion(version));
    }

    Ok(Header {
        version,
        table_offset: reader.read_u64::<LE>()?,
        table_size: reader.read_u64::<LE>()?,
        unknown: reader.read_u64::<LE>()?,
        file_size: reader.read_u64::<LE>()?,
    })
}

fn read_record<R: Read>(reader: &mut R, id: u32) -> Result<FileRecord> {
    let hash = reader.read_u64::<LE>()?;
    let time = reader.read_u64::<LE>()?;
    let flags = reader.read_u32::<LE>()?;
    let first_sector = reader.read_u32::<LE>()?;
    let last_sector = reader.read_u32::<LE>()?;
    let first_unknown = reader.read_u32::<LE>()?;
    let last_unknown = reader.read_u32::<LE>()?;
    let mut sha1 = [0u8; 20];
    reader.read_exact(&mut sha1)?;

    Ok(FileRecord {
        id,
        hash,
        time,
        flags,
        first_sector,
        last_sector,
        first_unknown,
        last_unknown,
        sha1,
    })
}

fn read_table<R: Read>(reader: &mut R) -> Result<Table> {
    let number = reader.read_u32::<LE>()?;
    let size = reader.read_u32::<LE>()?;
    let checksum = reader.read_u64::<LE>()?;
    let file_count = reader.read_u32::<LE>()?;
    let offset_count = reader.read_u32::<LE>()?;
    let hash_count = reader.read_u32::<LE>()?;

    let mut records = Vec::new();
    for id in 0..file_count {
        records.push(read_record(reader, id)?);
    }

    let mut offsets = Vec::new();
    for _ in 0..offset_count {
        offsets.push(SectorOffset {
            offset: reader.read_u64::<LE>()?,
            physical_size: reader.read_u32::<LE>()?,
            virtual_size: reader.read_u32::<LE>()?,
        });
    }

    let mut dependencies = Vec::new();
    for _ in 0..hash_count {
        dependencies.push(reader.read_u64::<LE>()?);
    }

    Ok(Table {
        number,
        size,
        checksum,
        records,
        offsets,
        dependencies,
    })
}

impl<R: Read + Seek> Archive<R> {
    /// Read header and table. `names` maps file hashes to archive paths.
    pub fn new(mut reader: R, names: HashMap<u64, String>) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let header = read_header(&mut reader)?;

        reader.seek(SeekFrom::Start(header.table_offset))?;
        let table = read_table(&mut reader)?;

        // A repeated hash resolves to its last record
        let index = table
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.hash, i))
            .collect();

        tracing::debug!(
            "archive table: {} file(s), {} sector(s), {} dependency hash(es)",
            table.records.len(),
            table.offsets.len(),
            table.dependencies.len()
        );

        Ok(Self {
            reader,
            header,
            table,
            index,
            names,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Records in table order.
    pub fn records(&self) -> &[FileRecord] {
        &self.table.records
    }

    /// One record per hash, in table order. A repeated hash keeps only the
    /// record [`Archive::record`] resolves it to.
    pub fn unique_records(&self) -> impl Iterator<Item = &FileRecord> {
        self.table
            .records
            .iter()
            .enumerate()
            .filter(|(i, r)| self.index.get(&r.hash) == Some(i))
            .map(|(_, r)| r)
    }

    pub fn record(&self, hash: u64) -> Result<&FileRecord> {
        self.index
            .get(&hash)
            .map(|&i| &self.table.records[i])
            .ok_or(RdarError::UnknownHash(hash))
    }

    /// Archive path of `hash`, or `<hash>.bin` when the hash list doesn't know it.
    pub fn make_filename(&self, hash: u64) -> String {
        match self.names.get(&hash) {
            Some(name) => name.clone(),
            None => format!("{}.bin", hash),
        }
    }

    /// The sector offsets of a record.
    pub fn sectors(&self, record: &FileRecord) -> Result<&[SectorOffset]> {
        self.table
            .offsets
            .get(record.sectors())
            .ok_or(RdarError::SectorOutOfRange {
                hash: record.hash,
                first: record.first_sector,
                last: record.last_sector,
                count: self.table.offsets.len(),
            })
    }

    /// Stored size of a record: the sum of its physical sector sizes.
    pub fn record_size(&self, record: &FileRecord) -> Result<u64> {
        Ok(self
            .sectors(record)?
            .iter()
            .map(|s| s.physical_size as u64)
            .sum())
    }

    /// A record is a WEM when its first sector is stored uncompressed and
    /// starts with `RIFF`.
    pub fn is_wem(&mut self, record: &FileRecord) -> Result<bool> {
        let Some(first) = self.sectors(record)?.first().copied() else {
            return Ok(false);
        };
        if first.is_compressed() || first.physical_size < 4 {
            return Ok(false);
        }

        self.reader.seek(SeekFrom::Start(first.offset))?;
        let mut magic = [0u8; 4];
        self.reader.read_exact(&mut magic)?;
        Ok(&magic == WEM_MAGIC)
    }

    /// Copy a record's bytes to `out`. Returns the number of bytes written.
    pub fn extract_to<W: Write>(&mut self, record: &FileRecord, out: &mut W) -> Result<u64> {
        let sectors = self.sectors(record)?.to_vec();
        let mut written = 0u64;

        for sector in sectors {
            if sector.is_compressed() {
                return Err(RdarError::CompressionUnsupported { hash: record.hash });
            }

            self.reader.seek(SeekFrom::Start(sector.offset))?;
            let copied = std::io::copy(
                &mut (&mut self.reader).take(sector.physical_size as u64),
                out,
            )?;
            if copied != sector.physical_size as u64 {
                return Err(RdarError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("sector at {:#x} truncated", sector.offset),
                )));
            }
            written += copied;
        }

        Ok(written)
    }

    /// Read a record into memory, exactly `record_size` bytes.
    pub fn read_record(&mut self, record: &FileRecord) -> Result<Vec<u8>> {
        // Sizes come from the table; grow as the reads succeed
        let mut data = Vec::new();
        self.extract_to(record, &mut data)?;
        Ok(data)
    }

    /// Name, time, size and hash of every distinct file, in table order.
    pub fn list(&self) -> Result<Vec<FileInfo>> {
        self.unique_records()
            .map(|r| {
                Ok(FileInfo {
                    name: self.make_filename(r.hash),
                    time: filetime_to_unix(r.time),
                    size: self.record_size(r)?,
                    hash: r.hash,
                })
            })
            .collect()
    }
}
