//! Wwise RIFF/RIFX Vorbis converter.
//!
//! [`WwiseRiffVorbis`] parses the container of an in-memory WEM blob and
//! writes the equivalent Ogg Vorbis stream.
//!
//! # Example
//!
//! ```no_run
//! use wem::{CodebookLibrary, WwiseRiffVorbis};
//!
//! # fn main() -> Result<(), wem::WemError> {
//! let data = std::fs::read("audio.wem")?;
//! let codebooks = CodebookLibrary::from_file("packed_codebooks.bin")?;
//!
//! let converter = WwiseRiffVorbis::new(&data, &codebooks)?;
//! let ogg = converter.to_vec()?;
//! std::fs::write("audio.ogg", ogg)?;
//! # Ok(())
//! # }
//! ```

use crate::error::WemResult;
use crate::ogg_stream::OggStream;
use crate::vorbis::audio::write_audio_packets;
use crate::vorbis::codebook::CodebookLibrary;
use crate::vorbis::header::emit_headers;
use crate::vorbis::riff::{ForcePacketFormat, WemHeader};
use std::io::Write;

/// Configuration options for Wwise to Ogg conversion.
///
/// # Example
///
/// ```
/// use wem::{ConversionOptions, ForcePacketFormat};
///
/// let options = ConversionOptions::default()
///     .with_inline_codebooks(true)
///     .with_force_packet_format(ForcePacketFormat::ForceModPackets);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Codebooks are stored inline in the setup packet instead of as library ids.
    pub inline_codebooks: bool,

    /// The setup packet holds a full Vorbis setup rather than the stripped form.
    pub full_setup: bool,

    /// Override for the detected modified packet format.
    pub force_packet_format: ForcePacketFormat,
}

impl ConversionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inline_codebooks(mut self, value: bool) -> Self {
        self.inline_codebooks = value;
        self
    }

    pub fn with_full_setup(mut self, value: bool) -> Self {
        self.full_setup = value;
        self
    }

    pub fn with_force_packet_format(mut self, format: ForcePacketFormat) -> Self {
        self.force_packet_format = format;
        self
    }
}

/// Builder for [`WwiseRiffVorbis`].
///
/// ```no_run
/// use wem::{CodebookLibrary, ForcePacketFormat, WwiseRiffVorbis};
///
/// # fn main() -> Result<(), wem::WemError> {
/// let data = std::fs::read("special.wem")?;
/// let codebooks = CodebookLibrary::empty();
///
/// let converter = WwiseRiffVorbis::builder(&data, &codebooks)
///     .inline_codebooks(true)
///     .full_setup(true)
///     .force_packet_format(ForcePacketFormat::ForceNoModPackets)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct WwiseRiffVorbisBuilder<'a> {
    data: &'a [u8],
    codebooks: &'a CodebookLibrary,
    options: ConversionOptions,
}

impl<'a> WwiseRiffVorbisBuilder<'a> {
    pub fn new(data: &'a [u8], codebooks: &'a CodebookLibrary) -> Self {
        Self {
            data,
            codebooks,
            options: ConversionOptions::default(),
        }
    }

    pub fn inline_codebooks(mut self, value: bool) -> Self {
        self.options.inline_codebooks = value;
        self
    }

    pub fn full_setup(mut self, value: bool) -> Self {
        self.options.full_setup = value;
        self
    }

    pub fn force_packet_format(mut self, format: ForcePacketFormat) -> Self {
        self.options.force_packet_format = format;
        self
    }

    /// Set all options from a ConversionOptions struct.
    pub fn options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse the container and build the converter.
    pub fn build(self) -> WemResult<WwiseRiffVorbis<'a>> {
        WwiseRiffVorbis::with_options(self.data, self.codebooks, self.options)
    }
}

/// Converts one WEM blob to Ogg Vorbis.
///
/// The container is parsed up front; [`generate_ogg`](Self::generate_ogg)
/// can then be called any number of times.
pub struct WwiseRiffVorbis<'a> {
    data: &'a [u8],
    codebooks: &'a CodebookLibrary,
    header: WemHeader,
    options: ConversionOptions,
}

impl<'a> WwiseRiffVorbis<'a> {
    /// Parse `data` with default options.
    pub fn new(data: &'a [u8], codebooks: &'a CodebookLibrary) -> WemResult<Self> {
        Self::with_options(data, codebooks, ConversionOptions::default())
    }

    pub fn builder(data: &'a [u8], codebooks: &'a CodebookLibrary) -> WwiseRiffVorbisBuilder<'a> {
        WwiseRiffVorbisBuilder::new(data, codebooks)
    }

    pub fn with_options(
        data: &'a [u8],
        codebooks: &'a CodebookLibrary,
        options: ConversionOptions,
    ) -> WemResult<Self> {
        let header = WemHeader::parse(data, options.force_packet_format)?;
        Ok(Self {
            data,
            codebooks,
            header,
            options,
        })
    }

    /// The parsed container fields.
    pub fn header(&self) -> &WemHeader {
        &self.header
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Write the complete Ogg Vorbis stream to `output`.
    ///
    /// Headers come first, one page each, then one page per audio packet.
    /// The last audio page carries the end-of-stream flag.
    ///
    /// # Errors
    ///
    /// Fails when the audio data is truncated, a setup reference points
    /// outside its table, or a codebook id is missing from the library (or
    /// the library doesn't match the file). Output already written to
    /// `output` is then incomplete; use [`to_vec`](Self::to_vec) to avoid
    /// partial files.
    pub fn generate_ogg<W: Write>(&self, output: W) -> WemResult<W> {
        let mut stream = OggStream::new(output);

        let modes = emit_headers(
            self.data,
            &self.header,
            self.codebooks,
            &self.options,
            &mut stream,
        )?;
        let packets = write_audio_packets(self.data, &self.header, modes.as_ref(), &mut stream)?;

        tracing::debug!(
            "wrote {} page(s), {} audio packet(s)",
            stream.packets_written(),
            packets
        );

        Ok(stream.into_inner())
    }

    /// Render the stream into memory.
    pub fn to_vec(&self) -> WemResult<Vec<u8>> {
        self.generate_ogg(Vec::new())
    }
}
