use anyhow::Result;
use clap::Subcommand;
use rdar::process::{extract, extract_wem, list, single};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum RdarCommands {
    /// List the files of an RDAR archive
    List {
        /// Input archive
        archive: PathBuf,
        /// Hash list (`hash,path` per line)
        #[arg(long, env = "HASHES_FILE", default_value = "hashes.csv")]
        hashes: PathBuf,
    },
    /// Write one file of an archive to stdout
    Single {
        /// Input archive
        archive: PathBuf,
        /// File hash
        hash: u64,
        #[arg(long, env = "HASHES_FILE", default_value = "hashes.csv")]
        hashes: PathBuf,
    },
    /// Extract every file of an archive
    Extract {
        /// Input archive
        archive: PathBuf,
        /// Output directory
        output: PathBuf,
        #[arg(long, env = "HASHES_FILE", default_value = "hashes.csv")]
        hashes: PathBuf,
    },
    /// Convert every WEM file of an archive to Ogg Vorbis
    ExtractWem {
        /// Input archive
        archive: PathBuf,
        /// Output directory
        output: PathBuf,
        #[arg(long, env = "HASHES_FILE", default_value = "hashes.csv")]
        hashes: PathBuf,
        /// Packed codebook library
        #[arg(
            short,
            long,
            env = "CODEBOOKS_FILE",
            default_value = "packed_codebooks.bin"
        )]
        codebooks: PathBuf,
    },
}

pub fn handle(cmd: RdarCommands) -> Result<()> {
    match cmd {
        RdarCommands::List { archive, hashes } => list(&archive, &hashes),
        RdarCommands::Single {
            archive,
            hash,
            hashes,
        } => single(&archive, &hashes, hash),
        RdarCommands::Extract {
            archive,
            output,
            hashes,
        } => extract(&archive, &hashes, &output),
        RdarCommands::ExtractWem {
            archive,
            output,
            hashes,
            codebooks,
        } => extract_wem(&archive, &hashes, &codebooks, &output),
    }
}
