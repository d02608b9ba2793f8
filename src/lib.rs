//! mftscope - forensic decoder for raw NTFS Master File Table dumps
//!
//! Reads an extracted `$MFT` file record by record, repairs each record's
//! sector fixups, decodes every attribute it recognises and resolves full
//! paths through parent references.
//!
//! # Features
//!
//! - **Defensive decoding**: every read is bounds-checked; malformed
//!   attributes are skipped, never fatal to the record
//! - **All 15 standard attribute types**, including security descriptors,
//!   index roots, reparse points and extended attributes
//! - **Path resolution** with orphan, unknown-parent and cycle handling
//! - **Exports** to CSV, JSON, XML, mactime body files and timelines
//! - **Hashing** of raw records (MD5, SHA-256, SHA-512, CRC32)
//!
//! # Example
//!
//! ```no_run
//! use mftscope::{AnalyzerConfig, ExportFormat, MftAnalyzer};
//!
//! fn main() -> mftscope::Result<()> {
//!     let analyzer = MftAnalyzer::new(AnalyzerConfig {
//!         input: "MFT".into(),
//!         output: "mft.csv".into(),
//!         format: ExportFormat::Csv,
//!         ..Default::default()
//!     });
//!
//!     let stats = analyzer.analyze()?;
//!     println!("{} records, {} in use", stats.total_records, stats.active_records);
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod error;
pub mod export;
pub mod hashing;
pub mod logging;
pub mod ntfs;
pub mod table;

// Re-export main types
pub use analyzer::{decode_record_at, AnalysisStats, AnalyzerConfig, MftAnalyzer};
pub use error::{AttributeError, MftError, Result};
pub use export::{ExportFormat, ExportRow, RecordWriter};
pub use hashing::RecordHashes;
pub use table::RecordTable;

// Re-export NTFS types that users might need
pub use ntfs::{DecodeContext, FixupStatus, MftRecord, RawRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format bytes as human-readable string
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
