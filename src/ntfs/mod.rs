//! NTFS on-disk structures and the MFT record decoder
//!
//! - `structs`: constants, headers, references and timestamps
//! - `bounds` / `validation`: checked reads and semantic checks
//! - `attribute` / `data_runs`: common attribute header and run lists
//! - `attributes`: one decoder per attribute type
//! - `record`: fixup and the per-record dispatch loop

pub mod attribute;
pub mod attributes;
pub mod bounds;
pub mod data_runs;
pub mod record;
pub mod structs;
pub mod validation;

// Re-export commonly used types
pub use attribute::{AttributeForm, AttributeHeader, NonResidentHeader};
pub use attributes::Attribute;
pub use bounds::ByteReader;
pub use data_runs::{DataRun, DataRunDecoder};
pub use record::{apply_fixup, FixupStatus, MftRecord, RawRecord};
pub use structs::{AttributeType, FileReference, FilenameNamespace, Guid, RecordHeader, WindowsTime};
pub use validation::{DecodeContext, Validation};
