//! Synthetic WEM builders shared by the integration tests.
#![allow(dead_code)]

use wem::BitWriter;

pub const SAMPLE_RATE: u32 = 48000;
pub const AVG_BYTES: u32 = 16000;
pub const SAMPLE_COUNT: u32 = 44100;
pub const BLOCKSIZE_0: u8 = 8;
pub const BLOCKSIZE_1: u8 = 11;
pub const CODEBOOK_SYNC: u32 = 0x564342;
/// Layout with no `vorb` chunk: its fields ride inside a 0x42 byte `fmt `.
pub const EMBEDDED: usize = 0x42;
/// Every layout the builder can produce.
pub const LAYOUTS: [usize; 6] = [EMBEDDED, 0x28, 0x2A, 0x2C, 0x32, 0x34];

/// One entry of the packed library: dims 1, two entries of length 1, no lookup.
pub fn write_stripped_codebook(w: &mut BitWriter) {
    w.write_bits(1, 4);
    w.write_bits(2, 14);
    w.write_bits(0, 1); // unordered
    w.write_bits(1, 3); // 1 bit lengths
    w.write_bits(0, 1); // not sparse
    w.write_bits(0, 1);
    w.write_bits(0, 1);
    w.write_bits(0, 1); // lookup 0
}

pub fn stripped_codebook() -> Vec<u8> {
    let mut w = BitWriter::new();
    write_stripped_codebook(&mut w);
    w.into_inner()
}

/// The same codebook in canonical form.
pub fn write_canonical_codebook(w: &mut BitWriter) {
    w.write_bits(CODEBOOK_SYNC, 24);
    w.write_bits(1, 16);
    w.write_bits(2, 24);
    w.write_bits(0, 1);
    w.write_bits(0, 1);
    w.write_bits(0, 5);
    w.write_bits(0, 5);
    w.write_bits(0, 4);
}

pub fn library() -> wem::CodebookLibrary {
    wem::CodebookLibrary::from_codebooks([stripped_codebook()])
}

/// Floors, residues, mappings and modes of a one channel stream with a short
/// mode 0 and a long mode 1.
pub fn write_tables(w: &mut BitWriter, masterbook: Option<u32>) {
    // one floor
    w.write_bits(0, 6);
    w.write_bits(1, 5); // partitions
    w.write_bits(0, 4); // class 0
    w.write_bits(0, 3); // dimensions 1
    match masterbook {
        Some(book) => {
            w.write_bits(1, 2);
            w.write_bits(book, 8);
            w.write_bits(0, 8);
            w.write_bits(0, 8);
        }
        None => {
            w.write_bits(0, 2);
            w.write_bits(0, 8);
        }
    }
    w.write_bits(1, 2); // multiplier
    w.write_bits(4, 4); // rangebits
    w.write_bits(5, 4); // x

    // one residue
    w.write_bits(0, 6);
    w.write_bits(0, 2); // type 0
    w.write_bits(0, 24);
    w.write_bits(32, 24);
    w.write_bits(15, 24);
    w.write_bits(0, 6);
    w.write_bits(0, 8); // classbook
    w.write_bits(0, 3);
    w.write_bit(false);

    // one mapping
    w.write_bits(0, 6);
    w.write_bit(false); // one submap
    w.write_bit(false); // no coupling
    w.write_bits(0, 2); // reserved
    w.write_bits(0, 8); // time config
    w.write_bits(0, 8); // floor
    w.write_bits(0, 8); // residue

    // two modes
    w.write_bits(1, 6);
    w.write_bit(false);
    w.write_bits(0, 8);
    w.write_bit(true);
    w.write_bits(0, 8);
}

/// Stripped setup referencing library codebook 0.
pub fn external_setup() -> Vec<u8> {
    let mut w = BitWriter::new();
    w.write_bits(0, 8);
    w.write_bits(0, 10);
    write_tables(&mut w, None);
    w.into_inner()
}

/// Stripped setup with the codebook inline.
pub fn inline_setup() -> Vec<u8> {
    let mut w = BitWriter::new();
    w.write_bits(0, 8);
    write_stripped_codebook(&mut w);
    write_tables(&mut w, None);
    w.into_inner()
}

/// Full setup: canonical inline codebook followed by opaque bits.
pub fn full_setup() -> Vec<u8> {
    let mut w = BitWriter::new();
    w.write_bits(0, 8);
    write_canonical_codebook(&mut w);
    w.write_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]);
    w.into_inner()
}

#[derive(Debug, Clone)]
pub struct TestPacket {
    pub payload: Vec<u8>,
    pub granule: u32,
}

pub fn audio(payload: &[u8], granule: u32) -> TestPacket {
    TestPacket {
        payload: payload.to_vec(),
        granule,
    }
}

/// Description of a synthetic WEM file.
#[derive(Debug, Clone)]
pub struct WemBuilder {
    pub big_endian: bool,
    /// 0x28, 0x2A, 0x2C, 0x32, 0x34 or [`EMBEDDED`].
    pub vorb_size: usize,
    pub mod_signal: u32,
    pub loop_points: Option<(u32, u32)>,
    /// One stripped setup packet, or the three triad packets.
    pub header_packets: Vec<Vec<u8>>,
    pub audio: Vec<TestPacket>,
    /// Added to the recorded first-audio offset.
    pub first_audio_skew: u32,
    /// Raw bytes appended to the data chunk after the last packet.
    pub data_tail: Vec<u8>,
}

impl WemBuilder {
    pub fn new(vorb_size: usize, setup: Vec<u8>) -> Self {
        Self {
            big_endian: false,
            vorb_size,
            mod_signal: 0x4A,
            loop_points: None,
            header_packets: vec![setup],
            audio: Vec::new(),
            first_audio_skew: 0,
            data_tail: Vec::new(),
        }
    }

    pub fn with_audio(mut self, audio: Vec<TestPacket>) -> Self {
        self.audio = audio;
        self
    }

    fn embedded(&self) -> bool {
        self.vorb_size == EMBEDDED
    }

    fn u16(&self, out: &mut Vec<u8>, v: u16) {
        if self.big_endian {
            out.extend_from_slice(&v.to_be_bytes());
        } else {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn u32(&self, out: &mut Vec<u8>, v: u32) {
        if self.big_endian {
            out.extend_from_slice(&v.to_be_bytes());
        } else {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn put_u32(&self, out: &mut [u8], at: usize, v: u32) {
        let bytes = if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        };
        out[at..at + 4].copy_from_slice(&bytes);
    }

    fn packet(&self, out: &mut Vec<u8>, payload: &[u8], granule: u32) {
        match self.vorb_size {
            0x28 | 0x2C => {
                self.u32(out, payload.len() as u32);
                self.u32(out, granule);
            }
            0x2A | EMBEDDED => self.u16(out, payload.len() as u16),
            _ => {
                self.u16(out, payload.len() as u16);
                self.u32(out, granule);
            }
        }
        out.extend_from_slice(payload);
    }

    fn chunk(&self, out: &mut Vec<u8>, id: &[u8; 4], body: &[u8]) {
        out.extend_from_slice(id);
        self.u32(out, body.len() as u32);
        out.extend_from_slice(body);
    }

    pub fn build(&self) -> Vec<u8> {
        let mut fmt = Vec::new();
        self.u16(&mut fmt, 0xFFFF);
        self.u16(&mut fmt, 1);
        self.u32(&mut fmt, SAMPLE_RATE);
        self.u32(&mut fmt, AVG_BYTES);
        self.u16(&mut fmt, 0);
        self.u16(&mut fmt, 0);
        self.u16(&mut fmt, if self.embedded() { 0x30 } else { 6 });
        self.u16(&mut fmt, 0);
        self.u32(&mut fmt, 4);

        let mut data = Vec::new();
        for header in &self.header_packets {
            self.packet(&mut data, header, 0);
        }
        let first_audio = data.len() as u32 + self.first_audio_skew;
        for packet in &self.audio {
            self.packet(&mut data, &packet.payload, packet.granule);
        }
        data.extend_from_slice(&self.data_tail);

        let vorb_len = if self.embedded() { 0x2A } else { self.vorb_size };
        let mut vorb = vec![0u8; vorb_len];
        self.put_u32(&mut vorb, 0, SAMPLE_COUNT);
        let (offsets_at, uid_at) = match self.vorb_size {
            0x2A | EMBEDDED => {
                self.put_u32(&mut vorb, 4, self.mod_signal);
                (0x10, Some(0x24))
            }
            0x32 | 0x34 => (0x18, Some(0x2C)),
            _ => (0x18, None),
        };
        self.put_u32(&mut vorb, offsets_at, 0);
        self.put_u32(&mut vorb, offsets_at + 4, first_audio);
        if let Some(uid_at) = uid_at {
            self.put_u32(&mut vorb, uid_at, 0x1234);
            vorb[uid_at + 4] = BLOCKSIZE_0;
            vorb[uid_at + 5] = BLOCKSIZE_1;
        }

        if self.embedded() {
            fmt.extend_from_slice(&vorb);
        }

        let mut body = b"WAVE".to_vec();
        self.chunk(&mut body, b"fmt ", &fmt);
        if let Some((start, end)) = self.loop_points {
            let mut smpl = vec![0u8; 0x3C];
            self.put_u32(&mut smpl, 0x1C, 1);
            self.put_u32(&mut smpl, 0x2C, start);
            self.put_u32(&mut smpl, 0x30, end);
            self.chunk(&mut body, b"smpl", &smpl);
        }
        if !self.embedded() {
            self.chunk(&mut body, b"vorb", &vorb);
        }
        self.chunk(&mut body, b"data", &data);

        let mut out = if self.big_endian {
            b"RIFX".to_vec()
        } else {
            b"RIFF".to_vec()
        };
        self.u32(&mut out, body.len() as u32);
        out.extend_from_slice(&body);
        out
    }
}

/// Every packet of an Ogg stream with its page granule and end-of-stream flag.
pub fn ogg_packets(ogg: &[u8]) -> Vec<(Vec<u8>, u64, bool)> {
    let mut reader = ogg::PacketReader::new(std::io::Cursor::new(ogg.to_vec()));
    let mut packets = Vec::new();
    while let Some(packet) = reader.read_packet().unwrap() {
        let granule = packet.absgp_page();
        let last = packet.last_in_stream();
        packets.push((packet.data, granule, last));
    }
    packets
}

/// Body of every Ogg page in stream order.
pub fn ogg_page_bodies(ogg: &[u8]) -> Vec<Vec<u8>> {
    let mut pages = Vec::new();
    let mut at = 0;
    while at < ogg.len() {
        assert_eq!(&ogg[at..at + 4], b"OggS");
        let segments = ogg[at + 26] as usize;
        let body_start = at + 27 + segments;
        let body_len: usize = ogg[at + 27..body_start].iter().map(|&l| l as usize).sum();
        pages.push(ogg[body_start..body_start + body_len].to_vec());
        at = body_start + body_len;
    }
    pages
}
