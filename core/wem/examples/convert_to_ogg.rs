//! Convert every `.wem` below the given directories to `.ogg` next to it.
//!
//! Usage: convert_to_ogg <packed_codebooks.bin> [dir...]
use std::fs;
use std::path::{Path, PathBuf};
use wem::{CodebookLibrary, ConversionOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let Some(codebook_path) = args.get(1) else {
        eprintln!("usage: convert_to_ogg <packed_codebooks.bin> [dir...]");
        return Ok(());
    };
    let dirs = if args.len() > 2 {
        args[2..].to_vec()
    } else {
        vec![".".to_string()]
    };

    let mut wem_files = Vec::new();
    for dir in &dirs {
        find_wem_files(Path::new(dir), &mut wem_files)?;
    }
    println!("Found {} .wem files.", wem_files.len());

    let codebooks = CodebookLibrary::from_file(Path::new(codebook_path))?;
    let options = ConversionOptions::default();

    let mut converted = 0;
    let mut skipped = 0;
    let mut failed = 0;

    for path in &wem_files {
        let data = fs::read(path)?;
        match wem::process::convert_bytes(&data, &codebooks, &options) {
            Ok(ogg) => {
                fs::write(path.with_extension("ogg"), ogg)?;
                converted += 1;
            }
            // ADPCM, PCM and AAC WEMs are not Vorbis
            Err(e) if e.to_string().contains("bad codec id") => skipped += 1,
            Err(e) => {
                failed += 1;
                println!("Failed {:?}: {}", path, e);
            }
        }
    }

    println!("Converted: {}", converted);
    println!("Skipped: {}", skipped);
    println!("Failed: {}", failed);
    Ok(())
}

fn find_wem_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                find_wem_files(&path, files)?;
            } else if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wem"))
            {
                files.push(path);
            }
        }
    }
    Ok(())
}
