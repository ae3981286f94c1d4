//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use log::{info, warn};
use walkdir::WalkDir;

use crate::config::RecorderConfig;
use crate::engine::{generate_test_tone, interleave, resample, write_wave_file, HoundDecoder};
use crate::error::{Result, WavrecError};
use crate::session::{
    DirectoryDelivery, FileCapture, NoopWakeLock, RecordingPipeline, RecordingReport,
};
use crate::wav::{encode, WavHeader, HEADER_LEN};

/// Record a take from `source` and deliver it into the output directory.
pub fn record(config: &RecorderConfig, source: &Path, label: &str) -> Result<RecordingReport> {
    info!("Recording from: {}", source.display());

    let capture = FileCapture::open(source, config.capture_chunk_size)?;
    let mut session =
        RecordingPipeline::session(Box::new(capture), Some(Box::new(NoopWakeLock::new())), config);

    session.start()?;
    let captured = session.stop()?;

    let mut pipeline = RecordingPipeline::new(
        Box::new(HoundDecoder::new()),
        Box::new(DirectoryDelivery::new(&config.output_dir)),
        config,
    );
    pipeline.finish(captured, label)
}

/// Print a recording report.
pub fn print_report(report: &RecordingReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Saved: {}", report.delivery.location);
    println!(
        "Format: {} ch @ {} Hz, 16-bit PCM",
        report.channels, report.sample_rate
    );
    println!(
        "Length: {} frames ({:.2}s)",
        report.frame_count, report.duration_secs
    );
    println!("Size: {} bytes", report.delivery.size_bytes);
    println!("SHA-256: {}", report.delivery.sha256);

    Ok(())
}

/// Re-encode any WAV file as canonical 16-bit PCM.
pub fn encode_file(input: &Path, output: &Path, sample_rate: Option<u32>) -> Result<()> {
    info!("Encoding {} -> {}", input.display(), output.display());

    let mut decoded = HoundDecoder::new().decode_file(input)?;
    if let Some(rate) = sample_rate {
        decoded = resample(decoded, rate)?;
    }

    let wave = encode(&interleave(&decoded)?, decoded.sample_rate)?;
    write_wave_file(&wave, output)?;

    println!(
        "Wrote {} ({} ch @ {} Hz, {} frames)",
        output.display(),
        decoded.channel_count(),
        decoded.sample_rate,
        decoded.frame_count()
    );

    Ok(())
}

/// Print the header of a canonical WAV file.
pub fn inspect(path: &Path, json: bool) -> Result<()> {
    let bytes = fs::read(path)?;
    let header = WavHeader::parse(&bytes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&header)?);
        return Ok(());
    }

    println!("File: {}", path.display());
    println!("{:-<40}", "");
    println!("ChunkSize:     {}", header.chunk_size);
    println!("AudioFormat:   {}", header.audio_format);
    println!("NumChannels:   {}", header.channels);
    println!("SampleRate:    {}", header.sample_rate);
    println!("ByteRate:      {}", header.byte_rate);
    println!("BlockAlign:    {}", header.block_align);
    println!("BitsPerSample: {}", header.bits_per_sample);
    println!("DataSize:      {}", header.data_len);
    println!("{:-<40}", "");
    println!(
        "{} frames, {:.3}s",
        header.frame_count(),
        header.duration_secs()
    );

    let actual = bytes.len().saturating_sub(HEADER_LEN);
    if actual != header.data_len as usize {
        warn!(
            "Declared data size {} does not match the {} payload bytes present",
            header.data_len, actual
        );
    }

    Ok(())
}

/// Write a sine test tone.
pub fn tone(
    output: &Path,
    frequency: f32,
    duration: f32,
    channels: usize,
    sample_rate: u32,
) -> Result<()> {
    let decoded = generate_test_tone(frequency, duration, sample_rate, channels, 0.5)?;
    let wave = encode(&interleave(&decoded)?, sample_rate)?;
    write_wave_file(&wave, output)?;

    println!(
        "Wrote {:.1} Hz tone to {} ({} bytes)",
        frequency,
        output.display(),
        wave.len()
    );

    Ok(())
}

/// List the WAV recordings under `dir`.
pub fn list(dir: &Path) -> Result<()> {
    let mut found = 0usize;

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
    {
        found += 1;
        match fs::read(entry.path())
            .map_err(WavrecError::from)
            .and_then(|bytes| WavHeader::parse(&bytes))
        {
            Ok(header) => println!(
                "{}  {} ch  {} Hz  {:.2}s",
                entry.path().display(),
                header.channels,
                header.sample_rate,
                header.duration_secs()
            ),
            Err(e) => println!("{}  (unreadable: {})", entry.path().display(), e),
        }
    }

    if found == 0 {
        println!("No recordings in {}", dir.display());
    }

    Ok(())
}

/// Print the effective configuration.
pub fn print_config(config: &RecorderConfig) -> Result<()> {
    println!("{}", config.to_json()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_tone_then_encode_then_record() {
        let dir = tempdir().unwrap();
        let tone_path = dir.path().join("tone.wav");
        let encoded_path = dir.path().join("encoded.wav");

        tone(&tone_path, 440.0, 0.1, 2, 44100).unwrap();
        encode_file(&tone_path, &encoded_path, Some(22050)).unwrap();

        let header = WavHeader::parse(&fs::read(&encoded_path).unwrap()).unwrap();
        assert_eq!(header.sample_rate, 22050);
        assert_eq!(header.channels, 2);

        let config = RecorderConfig {
            output_dir: dir.path().join("takes"),
            capture_chunk_size: 1000,
            ..RecorderConfig::default()
        };
        let report = record(&config, &encoded_path, "Demo").unwrap();
        assert!(report.delivery.filename.starts_with("Demo_"));
        assert_eq!(report.channels, 2);
        assert!(Path::new(&report.delivery.location).exists());

        inspect(&encoded_path, false).unwrap();
        list(dir.path()).unwrap();
    }

    #[test]
    fn test_inspect_rejects_non_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();
        assert!(inspect(&path, false).is_err());
    }
}
