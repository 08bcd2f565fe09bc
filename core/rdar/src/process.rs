use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::fs;
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::util::{format_time, human_readable_size};
use crate::{Archive, FileRecord, FileSink, read_hashes};
use wem::{CodebookLibrary, ConversionOptions};

/// Outcome of a batch conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub converted: usize,
    pub failed: usize,
    /// Records that are not WEM files.
    pub skipped: usize,
}

pub fn open_archive(input: &Path, hashes: &Path) -> Result<Archive<BufReader<fs::File>>> {
    let hash_file = fs::File::open(hashes)
        .with_context(|| format!("could not open hashes file {:?}", hashes))?;
    let names = read_hashes(BufReader::new(hash_file))?;

    let file =
        fs::File::open(input).with_context(|| format!("could not open archive {:?}", input))?;
    let archive = Archive::new(BufReader::new(file), names)
        .with_context(|| format!("Failed to read archive {:?}", input))?;
    Ok(archive)
}

/// One line per record: date, size, hash and name.
pub fn list_lines<R: Read + Seek>(archive: &Archive<R>) -> Result<Vec<String>> {
    Ok(archive
        .list()?
        .into_iter()
        .map(|f| {
            format!(
                "{}  {:<10} {:<32} {}",
                format_time(f.time),
                human_readable_size(f.size),
                f.hash,
                f.name
            )
        })
        .collect())
}

pub fn list(input: &Path, hashes: &Path) -> Result<()> {
    let archive = open_archive(input, hashes)?;
    for line in list_lines(&archive)? {
        println!("{}", line);
    }
    Ok(())
}

/// Write the raw bytes of one record to stdout.
pub fn single(input: &Path, hashes: &Path, hash: u64) -> Result<()> {
    let mut archive = open_archive(input, hashes)?;
    let record = *archive.record(hash)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    archive.extract_to(&record, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Extract every record under `sink`. Returns the number of files written.
pub fn extract_all<R: Read + Seek>(archive: &mut Archive<R>, sink: &FileSink) -> Result<usize> {
    let records: Vec<FileRecord> = archive.unique_records().copied().collect();

    for record in &records {
        let name = archive.make_filename(record.hash);
        let data = archive
            .read_record(record)
            .with_context(|| format!("could not extract file: {}", name))?;
        sink.write(&name, &data)?;
    }

    Ok(records.len())
}

pub fn extract(input: &Path, hashes: &Path, out_dir: &Path) -> Result<()> {
    let mut archive = open_archive(input, hashes)?;
    let sink = FileSink::new(out_dir)?;
    let count = extract_all(&mut archive, &sink)?;
    tracing::info!("Extracted {} file(s) to {:?}", count, out_dir);
    Ok(())
}

/// `name` with its extension swapped for `.ogg`.
pub fn ogg_name(name: &str) -> String {
    let file_start = name.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let stem = match name[file_start..].rfind('.') {
        Some(dot) => &name[..file_start + dot],
        None => name,
    };
    format!("{}.ogg", stem)
}

fn convert_record<R: Read + Seek>(
    archive: &Mutex<Archive<R>>,
    record: &FileRecord,
    name: &str,
    codebooks: &CodebookLibrary,
    options: &ConversionOptions,
    sink: &FileSink,
) -> Result<()> {
    let data = archive
        .lock()
        .map_err(|_| anyhow!("archive lock poisoned"))?
        .read_record(record)?;

    let ogg = wem::process::convert_bytes(&data, codebooks, options)?;
    sink.write(&ogg_name(name), &ogg)?;
    Ok(())
}

/// Convert every WEM record to Ogg Vorbis under `sink`.
///
/// Reads go through the shared archive one at a time; conversions run in
/// parallel. A record that fails is logged and counted, the batch continues.
pub fn extract_all_wem<R: Read + Seek + Send>(
    mut archive: Archive<R>,
    sink: &FileSink,
    codebooks: &CodebookLibrary,
    options: &ConversionOptions,
) -> Result<ExtractSummary> {
    let records: Vec<FileRecord> = archive.unique_records().copied().collect();

    let mut wems = Vec::new();
    let mut skipped = 0;
    let mut unreadable = 0;
    for record in &records {
        let name = archive.make_filename(record.hash);
        match archive.is_wem(record) {
            Ok(true) => wems.push((*record, name)),
            Ok(false) => skipped += 1,
            Err(e) => {
                tracing::warn!("could not extract file: {}: {}", name, e);
                unreadable += 1;
            }
        }
    }

    let archive = Mutex::new(archive);
    let converted = wems
        .par_iter()
        .filter(|(record, name)| {
            match convert_record(&archive, record, name, codebooks, options, sink) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("could not extract file: {}: {:#}", name, e);
                    false
                }
            }
        })
        .count();

    Ok(ExtractSummary {
        converted,
        failed: unreadable + wems.len() - converted,
        skipped,
    })
}

pub fn extract_wem(input: &Path, hashes: &Path, codebooks: &Path, out_dir: &Path) -> Result<()> {
    let archive = open_archive(input, hashes)?;
    let sink = FileSink::new(out_dir)?;
    let options = ConversionOptions::default();
    let library = wem::process::load_codebooks(codebooks, &options)?;

    let summary = extract_all_wem(archive, &sink, &library, &options)?;
    tracing::info!(
        "Converted {} WEM file(s), {} failed, {} other file(s) skipped",
        summary.converted,
        summary.failed,
        summary.skipped
    );
    Ok(())
}
