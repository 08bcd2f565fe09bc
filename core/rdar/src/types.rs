/// Archive header at offset 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub table_offset: u64,
    pub table_size: u64,
    pub unknown: u64,
    pub file_size: u64,
}

/// One file entry of the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileRecord {
    /// Position in the table.
    pub id: u32,
    pub hash: u64,
    /// Windows FILETIME.
    pub time: u64,
    pub flags: u32,
    pub first_sector: u32,
    /// Exclusive.
    pub last_sector: u32,
    pub first_unknown: u32,
    pub last_unknown: u32,
    pub sha1: [u8; 20],
}

impl FileRecord {
    pub fn sectors(&self) -> std::ops::Range<usize> {
        self.first_sector as usize..self.last_sector as usize
    }
}

/// Where one sector of file data lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectorOffset {
    pub offset: u64,
    pub physical_size: u32,
    pub virtual_size: u32,
}

impl SectorOffset {
    pub fn is_compressed(&self) -> bool {
        self.physical_size != self.virtual_size
    }
}

/// The file table: records, sector offsets and dependency hashes.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub number: u32,
    pub size: u32,
    pub checksum: u64,
    pub records: Vec<FileRecord>,
    pub offsets: Vec<SectorOffset>,
    pub dependencies: Vec<u64>,
}

/// What `list` reports for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    /// Unix seconds.
    pub time: i64,
    pub size: u64,
    pub hash: u64,
}
