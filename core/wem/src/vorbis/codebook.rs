//! Vorbis codebook library for rebuilding Wwise audio.
//!
//! Wwise audio files use a stripped Vorbis format that references codebooks in an
//! external library instead of embedding them. The library is a packed blob:
//! the codebooks back to back, a little-endian `u32` offset table, and a
//! trailing `u32` giving the position of that table. The table has one entry
//! per codebook plus an end marker.
//!
//! If conversion fails with size mismatch errors, the file was most likely
//! packed against a different library.
//!
//! ```no_run
//! use wem::CodebookLibrary;
//!
//! let codebooks = CodebookLibrary::from_file("packed_codebooks.bin")?;
//! println!("{} codebooks", codebooks.codebook_count());
//! # Ok::<(), wem::WemError>(())
//! ```

use crate::bit_reader::BitReader;
use crate::bit_writer::BitSink;
use crate::error::{WemError, WemResult};
use crate::vorbis::helpers::{book_map_type1_quantvals, ilog};
use byteorder::{ByteOrder, LE};
use std::path::Path;

/// Sync pattern opening every canonical codebook ("BCV").
pub const CODEBOOK_SYNC: u32 = 0x564342;

#[derive(Debug, Clone, Default)]
pub struct CodebookLibrary {
    data: Vec<u8>,
    offsets: Vec<usize>,
}

impl CodebookLibrary {
    /// Create an empty codebook library.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load codebooks from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> WemResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => WemError::file_open(path.display().to_string()),
            _ => WemError::Io(e),
        })?;
        Self::from_bytes(&data)
    }

    /// Build a library from individual stripped codebooks.
    pub fn from_codebooks<I, B>(codebooks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut data = Vec::new();
        let mut offsets = Vec::new();

        for cb in codebooks {
            offsets.push(data.len());
            data.extend_from_slice(cb.as_ref());
        }
        offsets.push(data.len());

        Self { data, offsets }
    }

    /// Load codebooks from a packed library blob.
    pub fn from_bytes(data: &[u8]) -> WemResult<Self> {
        let len = data.len();
        if len < 4 {
            return Err(WemError::parse("codebook library too short"));
        }

        let table_offset = LE::read_u32(&data[len - 4..]) as usize;
        if table_offset > len - 4 {
            return Err(WemError::parse("invalid codebook library offset table"));
        }

        // The trailing pointer doubles as the end marker of the table.
        let table = &data[table_offset..];
        if table.len() % 4 != 0 {
            return Err(WemError::parse("invalid codebook library table size"));
        }

        let mut offsets = Vec::with_capacity(table.len() / 4);
        for entry in table.chunks_exact(4) {
            let offset = LE::read_u32(entry) as usize;
            if offset > table_offset || offsets.last().is_some_and(|&prev| offset < prev) {
                return Err(WemError::parse("invalid codebook offset"));
            }
            offsets.push(offset);
        }

        Ok(Self {
            data: data[..table_offset].to_vec(),
            offsets,
        })
    }

    /// Serialize back into the packed library layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        let table_offset = out.len() as u32;
        let mut word = [0u8; 4];

        let offsets = if self.offsets.is_empty() {
            vec![0]
        } else {
            self.offsets.clone()
        };
        for &offset in &offsets[..offsets.len() - 1] {
            LE::write_u32(&mut word, offset as u32);
            out.extend_from_slice(&word);
        }
        LE::write_u32(&mut word, table_offset);
        out.extend_from_slice(&word);
        out
    }

    /// Get the number of codebooks in the library.
    pub fn codebook_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Get a codebook by index.
    pub fn get_codebook(&self, index: usize) -> WemResult<&[u8]> {
        if index >= self.codebook_count() {
            return Err(WemError::invalid_codebook_id(index as u32));
        }

        let start = self.offsets[index];
        let end = self.offsets[index + 1];
        self.data
            .get(start..end)
            .ok_or_else(|| WemError::parse("invalid codebook range"))
    }

    /// Get the size in bytes of a codebook by index.
    pub fn get_codebook_size(&self, index: usize) -> WemResult<usize> {
        self.get_codebook(index).map(<[u8]>::len)
    }

    /// Rebuild library codebook `index` in canonical form.
    pub fn rebuild<S: BitSink>(&self, index: usize, output: &mut S) -> WemResult<()> {
        let codebook = self.get_codebook(index)?;
        let mut reader = BitReader::new(codebook);
        let len = codebook.len() as u64;
        match rebuild_stripped(&mut reader, output) {
            // The entry needs more bytes than the library gives it
            Err(WemError::EndOfStream { .. }) => {
                return Err(WemError::size_mismatch(len, len + 1));
            }
            result => result?,
        }

        // Packed sizes round up to the byte containing the last bit.
        let bytes_read = reader.bits_consumed() / 8 + 1;
        if bytes_read != len {
            return Err(WemError::size_mismatch(len, bytes_read));
        }
        Ok(())
    }

    /// Rebuild a stripped codebook that appears inline in the setup packet.
    pub fn rebuild_from_reader<S: BitSink>(
        input: &mut BitReader<'_>,
        output: &mut S,
    ) -> WemResult<()> {
        rebuild_stripped(input, output)
    }

    /// Copy a canonical codebook verbatim.
    pub fn copy<S: BitSink>(input: &mut BitReader<'_>, output: &mut S) -> WemResult<()> {
        // IN: 24 bit identifier, 16 bit dimensions, 24 bit entry count
        let id = input.read_bits(24)?;
        let dimensions = input.read_bits(16)?;
        let entries = input.read_bits(24)?;

        if id != CODEBOOK_SYNC {
            return Err(WemError::parse("invalid codebook identifier"));
        }

        output.write_bits(id, 24);
        output.write_bits(dimensions, 16);
        output.write_bits(entries, 24);

        let ordered = input.read_bits(1)?;
        output.write_bits(ordered, 1);

        if ordered != 0 {
            copy_ordered_lengths(input, output, entries)?;
        } else {
            let sparse = input.read_bits(1)?;
            output.write_bits(sparse, 1);

            for _ in 0..entries {
                let present = if sparse != 0 {
                    let present = input.read_bits(1)?;
                    output.write_bits(present, 1);
                    present != 0
                } else {
                    true
                };

                if present {
                    let codeword_length = input.read_bits(5)?;
                    output.write_bits(codeword_length, 5);
                }
            }
        }

        let lookup_type = input.read_bits(4)?;
        output.write_bits(lookup_type, 4);

        match lookup_type {
            0 => Ok(()),
            1 => copy_lookup(input, output, book_map_type1_quantvals(entries, dimensions)),
            2 => copy_lookup(input, output, entries.saturating_mul(dimensions)),
            _ => Err(WemError::parse("invalid lookup type")),
        }
    }
}

fn rebuild_stripped<S: BitSink>(input: &mut BitReader<'_>, output: &mut S) -> WemResult<()> {
    // IN: 4 bit dimensions, 14 bit entry count
    let dimensions = input.read_bits(4)?;
    let entries = input.read_bits(14)?;

    // OUT: 24 bit identifier, 16 bit dimensions, 24 bit entry count
    output.write_bits(CODEBOOK_SYNC, 24);
    output.write_bits(dimensions, 16);
    output.write_bits(entries, 24);

    let ordered = input.read_bits(1)?;
    output.write_bits(ordered, 1);

    if ordered != 0 {
        copy_ordered_lengths(input, output, entries)?;
    } else {
        // IN: 3 bit codeword length width, 1 bit sparse flag
        let codeword_length_length = input.read_bits(3)?;
        let sparse = input.read_bits(1)?;

        if codeword_length_length == 0 || codeword_length_length > 5 {
            return Err(WemError::parse("nonsense codeword length"));
        }

        // OUT: 1 bit sparse flag
        output.write_bits(sparse, 1);

        for _ in 0..entries {
            let present = if sparse != 0 {
                let present = input.read_bits(1)?;
                output.write_bits(present, 1);
                present != 0
            } else {
                true
            };

            if present {
                let codeword_length = input.read_bits(codeword_length_length as u8)?;
                output.write_bits(codeword_length, 5);
            }
        }
    }

    // IN: 1 bit lookup type, OUT: 4 bit lookup type
    let lookup_type = input.read_bits(1)?;
    output.write_bits(lookup_type, 4);

    if lookup_type == 1 {
        copy_lookup(input, output, book_map_type1_quantvals(entries, dimensions))?;
    }

    Ok(())
}

fn copy_ordered_lengths<S: BitSink>(
    input: &mut BitReader<'_>,
    output: &mut S,
    entries: u32,
) -> WemResult<()> {
    let initial_length = input.read_bits(5)?;
    output.write_bits(initial_length, 5);

    let mut current_entry = 0u32;
    while current_entry < entries {
        let num_bits = ilog(entries - current_entry);
        let number = input.read_bits(num_bits)?;
        output.write_bits(number, num_bits);
        current_entry = current_entry.saturating_add(number);
    }

    if current_entry > entries {
        return Err(WemError::parse("current_entry out of range"));
    }
    Ok(())
}

fn copy_lookup<S: BitSink>(
    input: &mut BitReader<'_>,
    output: &mut S,
    values: u32,
) -> WemResult<()> {
    let min = input.read_bits(32)?;
    let max = input.read_bits(32)?;
    let value_length = input.read_bits(4)?;
    let sequence_flag = input.read_bits(1)?;
    output.write_bits(min, 32);
    output.write_bits(max, 32);
    output.write_bits(value_length, 4);
    output.write_bits(sequence_flag, 1);

    let width = (value_length + 1) as u8;
    for _ in 0..values {
        let val = input.read_bits(width)?;
        output.write_bits(val, width);
    }
    Ok(())
}
