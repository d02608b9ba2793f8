//! Analyzer Module
//!
//! Drives a whole run: reads the MFT dump in 1024-byte records, decodes
//! them (optionally in parallel per batch), keeps them in the record table
//! and flushes each batch to the chosen writer.

use crate::error::{MftError, Result};
use crate::export::{create_writer, ExportFormat, ExportRow, RecordWriter};
use crate::logging;
use crate::ntfs::structs::MFT_RECORD_SIZE;
use crate::ntfs::{DecodeContext, MftRecord, RawRecord};
use crate::table::RecordTable;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// Analyzer Configuration
// ============================================================================

/// Configuration for one analysis run
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Raw `$MFT` dump to read
    pub input: PathBuf,
    /// Output file
    pub output: PathBuf,
    pub format: ExportFormat,
    /// Compute MD5/SHA-256/SHA-512/CRC32 per record
    pub compute_hashes: bool,
    /// Decoder diagnostics: 0 quiet, 1 warnings, 2+ trace
    pub debug_level: u8,
    /// Records held before a flush to the writer
    pub batch_size: usize,
    /// Decode each batch on the rayon pool
    pub parallel: bool,
    /// Show progress during the run
    pub show_progress: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            format: ExportFormat::Csv,
            compute_hashes: false,
            debug_level: 0,
            batch_size: 1000,
            parallel: false,
            show_progress: true,
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Counters gathered during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub total_records: u64,
    pub active_records: u64,
    pub directories: u64,
    pub files: u64,
    /// Records that could not be read whole (short trailing data)
    pub failed_records: u64,
    pub fixup_failures: u64,
    pub invalid_magic: u64,
    pub elapsed: Duration,
}

impl AnalysisStats {
    fn count(&mut self, record: &MftRecord) {
        self.total_records += 1;
        if !record.is_valid() {
            self.invalid_magic += 1;
        }
        if !record.fixup.is_ok() {
            self.fixup_failures += 1;
        }
        if record.is_in_use() {
            self.active_records += 1;
            if record.is_directory() {
                self.directories += 1;
            } else {
                self.files += 1;
            }
        }
    }
}

// ============================================================================
// Analyzer
// ============================================================================

pub struct MftAnalyzer {
    config: AnalyzerConfig,
    /// Cancellation flag
    cancelled: Arc<AtomicBool>,
}

impl MftAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Get cancellation token
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Cancel the run at the next record boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run the analysis, writing to the configured output file
    pub fn analyze(&self) -> Result<AnalysisStats> {
        let mut writer = create_writer(self.config.format, &self.config.output)?;
        self.analyze_into(writer.as_mut())
    }

    /// Run the analysis into an already constructed writer
    pub fn analyze_into(&self, writer: &mut dyn RecordWriter) -> Result<AnalysisStats> {
        let start_time = Instant::now();
        let file = File::open(&self.config.input)?;
        let input_len = file.metadata()?.len();
        let expected_records = input_len / MFT_RECORD_SIZE as u64;

        logging::separator(&format!("ANALYZE {}", self.config.input.display()));
        log::info!(
            target: "analyzer",
            "input {} ({}, {} records), format {:?}, hashes={}, parallel={}, batch={}",
            self.config.input.display(),
            format_size(input_len, BINARY),
            expected_records,
            self.config.format,
            self.config.compute_hashes,
            self.config.parallel,
            self.config.batch_size
        );

        let pb = if self.config.show_progress {
            let pb = ProgressBar::new(expected_records);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .map(|s| s.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            pb.set_message(format!("Reading {}", format_size(input_len, BINARY)));
            Some(pb)
        } else {
            None
        };

        let mut reader = BufReader::new(file);
        let mut table = RecordTable::new();
        let mut stats = AnalysisStats::default();
        let batch_size = self.config.batch_size.max(1);
        let mut position: u64 = 0;
        let mut cancelled = false;

        writer.write_header()?;

        loop {
            // Read one batch of raw records
            let mut batch: Vec<(u64, RawRecord)> = Vec::with_capacity(batch_size);
            let mut exhausted = false;
            while batch.len() < batch_size {
                if self.is_cancelled() {
                    cancelled = true;
                    break;
                }
                match read_record(&mut reader) {
                    Ok(Some(raw)) => {
                        batch.push((position, raw));
                        position += 1;
                    }
                    Ok(None) => {
                        exhausted = true;
                        break;
                    }
                    Err(e) if e.is_recoverable() => {
                        log::warn!(target: "analyzer", "trailing data after record {}: {}", position, e);
                        stats.failed_records += 1;
                        exhausted = true;
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }

            let decoded = self.decode_batch(batch);
            for record in decoded {
                stats.count(&record);
                if table.insert(record).is_some() {
                    log::warn!(target: "analyzer", "duplicate record number replaced");
                }
            }
            if let Some(ref pb) = pb {
                pb.set_position(position);
            }

            self.flush(&mut table, writer)?;

            if cancelled || exhausted {
                break;
            }
        }

        writer.finish()?;
        stats.elapsed = start_time.elapsed();

        log::info!(
            target: "analyzer",
            "{} records ({} active, {} dirs, {} files), {} fixup failures, {} bad magic, {:.2}s",
            stats.total_records,
            stats.active_records,
            stats.directories,
            stats.files,
            stats.fixup_failures,
            stats.invalid_magic,
            stats.elapsed.as_secs_f64()
        );

        if let Some(ref pb) = pb {
            if cancelled {
                pb.abandon_with_message(format!("Cancelled after {} records", stats.total_records));
            } else {
                pb.finish_with_message(format!(
                    "Complete: {} records ({:.2}s)",
                    stats.total_records,
                    stats.elapsed.as_secs_f64()
                ));
            }
        }
        logging::flush();

        if cancelled {
            return Err(MftError::Cancelled);
        }
        Ok(stats)
    }

    /// Hash (before fixup) and decode one batch, preserving input order
    fn decode_batch(&self, batch: Vec<(u64, RawRecord)>) -> Vec<MftRecord> {
        let debug_level = self.config.debug_level;
        let compute_hashes = self.config.compute_hashes;

        let decode = move |(position, raw): (u64, RawRecord)| {
            let hashes = compute_hashes.then(|| raw.hashes());
            let mut record = raw.decode(&DecodeContext::for_record(debug_level, position));
            record.hashes = hashes;
            record
        };

        if self.config.parallel {
            batch.into_par_iter().map(decode).collect()
        } else {
            batch.into_iter().map(decode).collect()
        }
    }

    /// Resolve paths for the held records, hand them to the writer and drain
    fn flush(&self, table: &mut RecordTable, writer: &mut dyn RecordWriter) -> Result<()> {
        if table.is_empty() {
            return Ok(());
        }

        let paths: Vec<String> = table.iter().map(|r| table.build_path(r.record_number)).collect();
        let rows: Vec<ExportRow<'_>> = table
            .iter()
            .zip(paths.iter())
            .map(|(record, path)| ExportRow {
                record,
                path: path.as_str(),
            })
            .collect();

        log::debug!(target: "analyzer", "flushing {} records", rows.len());
        writer.write_batch(&rows)?;

        table.drain();
        Ok(())
    }
}

/// Decode the single record at `record_number`, hashes included
pub fn decode_record_at(input: &Path, record_number: u64, debug_level: u8) -> Result<MftRecord> {
    let mut file = File::open(input)?;
    let len = file.metadata()?.len();
    let offset = record_number
        .checked_mul(MFT_RECORD_SIZE as u64)
        .filter(|o| o.checked_add(MFT_RECORD_SIZE as u64).is_some_and(|end| end <= len))
        .ok_or_else(|| {
            MftError::InvalidMftRecord(
                record_number,
                format!("beyond end of input ({} records)", len / MFT_RECORD_SIZE as u64),
            )
        })?;

    let mut buf = [0u8; MFT_RECORD_SIZE];
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(&mut buf)?;
    let raw = RawRecord::try_from(&buf[..])?;
    let hashes = raw.hashes();
    let mut record = raw.decode(&DecodeContext::for_record(debug_level, record_number));
    record.hashes = Some(hashes);
    Ok(record)
}

/// Read the next record, tolerating short reads from the underlying source.
/// `None` at a clean end of input; fewer than 1024 trailing bytes fail
/// with `BufferTooSmall`.
fn read_record<R: Read>(reader: &mut R) -> Result<Option<RawRecord>> {
    let mut buf = vec![0u8; MFT_RECORD_SIZE];
    let mut filled = 0;

    while filled < MFT_RECORD_SIZE {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    if filled == 0 {
        return Ok(None);
    }
    RawRecord::try_from(&buf[..filled]).map(Some)
}
