/// Destination for LSB-first bit output.
pub trait BitSink {
    /// Append the low `count` bits of `value`, up to 32.
    fn write_bits(&mut self, value: u32, count: u8);

    fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u32, 1);
    }
}

/// Accumulates bits LSB-first into bytes.
pub struct BitWriter {
    buffer: Vec<u8>,
    bit_buffer: u8,
    bits_stored: u8,
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            bit_buffer: 0,
            bits_stored: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        if bit {
            self.bit_buffer |= 1 << self.bits_stored;
        }
        self.bits_stored += 1;

        if self.bits_stored == 8 {
            self.buffer.push(self.bit_buffer);
            self.bit_buffer = 0;
            self.bits_stored = 0;
        }
    }

    /// Append the low `count` bits of `value`, up to 32.
    pub fn write_bits(&mut self, value: u32, count: u8) {
        for i in 0..count.min(32) {
            self.write_bit((value & (1 << i)) != 0);
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.bits_stored == 0 {
            self.buffer.extend_from_slice(bytes);
        } else {
            for &b in bytes {
                self.write_bits(b as u32, 8);
            }
        }
    }

    pub fn bits_written(&self) -> u64 {
        self.buffer.len() as u64 * 8 + self.bits_stored as u64
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.bits_stored == 0
    }

    /// Finish the packet, zero-padding the last partial byte.
    pub fn into_inner(mut self) -> Vec<u8> {
        if self.bits_stored > 0 {
            self.buffer.push(self.bit_buffer);
        }
        self.buffer
    }
}

impl BitSink for BitWriter {
    fn write_bits(&mut self, value: u32, count: u8) {
        BitWriter::write_bits(self, value, count);
    }

    fn write_bit(&mut self, bit: bool) {
        BitWriter::write_bit(self, bit);
    }
}
