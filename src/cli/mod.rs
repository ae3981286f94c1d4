//! CLI Module
//!
//! Command-line interface for the Wavrec recorder.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wavrec - record, encode and inspect 16-bit PCM WAVE files
#[derive(Parser, Debug)]
#[command(name = "wavrec")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a take from a capture source and deliver it as WAV
    #[command(name = "record")]
    Record {
        /// Audio file standing in for the microphone
        #[arg(short, long)]
        source: PathBuf,

        /// Label for the filename (blank uses the default label)
        #[arg(short, long, default_value = "")]
        label: String,

        /// Output directory (overrides the configuration)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-encode a WAV file as canonical 16-bit PCM
    #[command(name = "encode")]
    Encode {
        /// Input WAV file (8/16/24/32-bit int or 32-bit float)
        input: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        /// Resample to this rate first
        #[arg(long)]
        sample_rate: Option<u32>,
    },

    /// Print the header of a canonical WAV file
    #[command(name = "inspect")]
    Inspect {
        /// File to inspect
        path: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a sine test tone
    #[command(name = "tone")]
    Tone {
        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        /// Frequency in Hz
        #[arg(short, long, default_value_t = 440.0)]
        frequency: f32,

        /// Duration in seconds
        #[arg(short, long, default_value_t = 1.0)]
        duration: f32,

        /// Number of channels
        #[arg(short = 'n', long, default_value_t = 1)]
        channels: usize,

        /// Sample rate in Hz
        #[arg(short = 'r', long, default_value_t = 48000)]
        sample_rate: u32,
    },

    /// List recordings in a directory
    #[command(name = "list")]
    List {
        /// Directory to scan
        dir: PathBuf,
    },

    /// Print the effective configuration
    #[command(name = "config")]
    PrintConfig,
}
