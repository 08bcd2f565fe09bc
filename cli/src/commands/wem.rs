use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use wem::ConversionOptions;
use wem::ForcePacketFormat;
use wem::process::{wem_decode, wem_info};

#[derive(Subcommand)]
pub enum WemCommands {
    /// Rebuild a Vorbis WEM as Ogg Vorbis
    Decode {
        /// Input WEM file
        input: PathBuf,
        /// Output OGG file (optional, defaults to input with .ogg extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        vorbis: VorbisArgs,
    },
    /// Print the parsed RIFF header of a WEM file
    Info {
        /// Input WEM file
        input: PathBuf,
    },
}

/// Codebook and packet options shared by every command that converts WEM data.
#[derive(Args, Debug, Clone)]
pub struct VorbisArgs {
    /// Packed codebook library
    #[arg(
        short,
        long,
        env = "CODEBOOKS_FILE",
        default_value = "packed_codebooks.bin"
    )]
    pub codebooks: PathBuf,
    /// Codebooks are stored inline in the setup packet
    #[arg(long)]
    pub inline_codebooks: bool,
    /// Setup packet is a complete Vorbis setup (implies inline codebooks)
    #[arg(long)]
    pub full_setup: bool,
    /// Treat audio packets as modified Wwise packets
    #[arg(long, conflicts_with = "no_mod_packets")]
    pub mod_packets: bool,
    /// Treat audio packets as standard Vorbis packets
    #[arg(long)]
    pub no_mod_packets: bool,
}

impl VorbisArgs {
    pub fn options(&self) -> ConversionOptions {
        let format = if self.mod_packets {
            ForcePacketFormat::ForceModPackets
        } else if self.no_mod_packets {
            ForcePacketFormat::ForceNoModPackets
        } else {
            ForcePacketFormat::NoForce
        };

        ConversionOptions::new()
            .with_inline_codebooks(self.inline_codebooks || self.full_setup)
            .with_full_setup(self.full_setup)
            .with_force_packet_format(format)
    }
}

pub fn handle(cmd: WemCommands) -> Result<()> {
    match cmd {
        WemCommands::Decode {
            input,
            output,
            vorbis,
        } => wem_decode(&input, &output, &vorbis.codebooks, &vorbis.options()),
        WemCommands::Info { input } => wem_info(&input),
    }
}
