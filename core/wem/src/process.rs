use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{CodebookLibrary, ConversionOptions, WemHeader, WemResult, WwiseRiffVorbis};

/// Convert an in-memory WEM blob to an Ogg Vorbis byte buffer.
pub fn convert_bytes(
    data: &[u8],
    codebooks: &CodebookLibrary,
    options: &ConversionOptions,
) -> WemResult<Vec<u8>> {
    WwiseRiffVorbis::with_options(data, codebooks, options.clone())?.to_vec()
}

/// Load the codebook library, or an empty one when every codebook is inline.
pub fn load_codebooks(path: &Path, options: &ConversionOptions) -> Result<CodebookLibrary> {
    if options.inline_codebooks {
        return Ok(CodebookLibrary::empty());
    }
    CodebookLibrary::from_file(path)
        .with_context(|| format!("Failed to load codebooks from {:?}", path))
}

pub fn wem_decode(
    input: &Path,
    output: &Option<PathBuf>,
    codebooks: &Path,
    options: &ConversionOptions,
) -> Result<()> {
    let out_path = match output {
        Some(p) => p.clone(),
        None => input.with_extension("ogg"),
    };

    tracing::info!("Decoding {:?} -> {:?}", input, out_path);

    let data = fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;
    let library = load_codebooks(codebooks, options)?;

    // Nothing touches the output path unless the whole stream was rebuilt
    let ogg = convert_bytes(&data, &library, options)
        .with_context(|| format!("Failed to convert {:?}", input))?;

    fs::write(&out_path, &ogg).with_context(|| format!("Failed to write {:?}", out_path))?;

    tracing::info!("Decoding successful: {:?} ({} bytes)", out_path, ogg.len());
    Ok(())
}

pub fn wem_info(input: &Path) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;
    let header = WemHeader::parse(&data, Default::default())
        .with_context(|| format!("Failed to parse {:?}", input))?;

    println!("File: {:?}", input);
    print!("{}", header);
    Ok(())
}
