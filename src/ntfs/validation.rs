//! Semantic validation on top of the bounds layer
//!
//! Validators never decode anything themselves; they judge a value that has
//! already been read safely and report a uniform [`Validation`] outcome. A
//! failed semantic check is a warning for the caller to log, the value is
//! still surfaced. Structural checks (attribute geometry) are the exception:
//! their failure means the attribute cannot be trusted at all.

use super::bounds::ByteReader;
use super::structs::{FileReference, WindowsTime, FILE_REFERENCE_MASK};
use crate::error::{AttrResult, AttributeError};
use std::fmt;

/// Earliest plausible timestamp (1980-01-01)
pub const MIN_PLAUSIBLE_TICKS: u64 = 119_600_064_000_000_000;

/// Latest plausible timestamp (2200-01-01)
pub const MAX_PLAUSIBLE_TICKS: u64 = 189_025_920_000_000_000;

/// Smallest attribute: the common 16-byte header
pub const MIN_ATTRIBUTE_LENGTH: usize = 16;

/// Largest attribute length accepted from a header
pub const MAX_ATTRIBUTE_LENGTH: usize = 65536;

// ============================================================================
// Outcome
// ============================================================================

/// Result of a validation step: validity, a reason, and how far the caller
/// may safely advance
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    pub valid: bool,
    pub reason: String,
    pub consumed: usize,
}

impl Validation {
    pub fn ok(consumed: usize) -> Self {
        Self {
            valid: true,
            reason: String::new(),
            consumed,
        }
    }

    /// Valid, but with something worth logging
    pub fn warning(consumed: usize, reason: impl Into<String>) -> Self {
        Self {
            valid: true,
            reason: reason.into(),
            consumed,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
            consumed: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn has_warning(&self) -> bool {
        self.valid && !self.reason.is_empty()
    }

    /// Turn a failed outcome into an attribute error so decoders can use `?`
    pub fn into_result(self) -> AttrResult<usize> {
        if self.valid {
            Ok(self.consumed)
        } else {
            Err(AttributeError::Malformed(self.reason))
        }
    }
}

impl From<AttrResult<()>> for Validation {
    fn from(result: AttrResult<()>) -> Self {
        match result {
            Ok(()) => Validation::ok(0),
            Err(e) => Validation::fail(e.to_string()),
        }
    }
}

// ============================================================================
// Decode context
// ============================================================================

/// Per-record diagnostics state threaded through every decoder call
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeContext {
    /// 0 = quiet, 1 = semantic warnings, 2+ = per-attribute trace
    pub debug_level: u8,
    /// Position of the record in the input stream, when known
    pub record_number: Option<u64>,
}

impl DecodeContext {
    pub fn new(debug_level: u8) -> Self {
        Self {
            debug_level,
            record_number: None,
        }
    }

    pub fn for_record(debug_level: u8, record_number: u64) -> Self {
        Self {
            debug_level,
            record_number: Some(record_number),
        }
    }

    pub fn warn(&self, message: impl fmt::Display) {
        if self.debug_level >= 1 {
            log::warn!(target: "validator", "record {}: {}", RecordLabel(self.record_number), message);
        }
    }

    pub fn trace(&self, message: impl fmt::Display) {
        if self.debug_level >= 2 {
            log::debug!(target: "validator", "record {}: {}", RecordLabel(self.record_number), message);
        }
    }

    /// Log a validation outcome that is not clean. Returns `outcome.valid`.
    pub fn report(&self, field: &str, outcome: &Validation) -> bool {
        if !outcome.valid {
            self.warn(format_args!("{}: {}", field, outcome.reason));
        } else if outcome.has_warning() {
            self.trace(format_args!("{}: {}", field, outcome.reason));
        }
        outcome.valid
    }
}

struct RecordLabel(Option<u64>);

impl fmt::Display for RecordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{}", n),
            None => f.write_str("?"),
        }
    }
}

// ============================================================================
// Validators
// ============================================================================

/// Check that `width` bytes are available at `offset`
pub fn validate_bounds(reader: &ByteReader<'_>, offset: usize, width: usize) -> Validation {
    match reader.check(offset, width) {
        Ok(()) => Validation::ok(width),
        Err(e) => Validation::fail(e.to_string()),
    }
}

/// Zero is valid-but-unset; otherwise the tick count must fall in the
/// 1980..2200 window
pub fn validate_timestamp(time: WindowsTime) -> Validation {
    if !time.is_set() {
        return Validation::warning(8, "timestamp not set");
    }
    if time.ticks() < MIN_PLAUSIBLE_TICKS || time.ticks() > MAX_PLAUSIBLE_TICKS {
        return Validation::fail(format!(
            "implausible timestamp {} ({})",
            time.ticks(),
            time
        ));
    }
    Validation::ok(8)
}

/// A record number must fit in 48 bits
pub fn validate_record_number(record_number: u64) -> Validation {
    if record_number > FILE_REFERENCE_MASK {
        return Validation::fail(format!(
            "record number {} exceeds the 48-bit limit",
            record_number
        ));
    }
    Validation::ok(8)
}

/// File references are always structurally valid once masked; a zero
/// sequence number is flagged
pub fn validate_file_reference(reference: FileReference) -> Validation {
    let outcome = validate_record_number(reference.record_number());
    if !outcome.valid {
        return outcome;
    }
    if reference.sequence_number() == 0 && !reference.is_zero() {
        return Validation::warning(8, format!("zero sequence number in reference {}", reference));
    }
    Validation::ok(8)
}

/// Any 16 bytes form a GUID; only availability is checked
pub fn validate_guid(reader: &ByteReader<'_>, offset: usize) -> Validation {
    validate_bounds(reader, offset, 16)
}

/// Attribute length must lie in `[16, 65536]` and end inside the buffer
pub fn validate_attribute_length(reader: &ByteReader<'_>, offset: usize, length: usize) -> Validation {
    if !(MIN_ATTRIBUTE_LENGTH..=MAX_ATTRIBUTE_LENGTH).contains(&length) {
        return Validation::fail(format!(
            "attribute length {} outside [{}, {}]",
            length, MIN_ATTRIBUTE_LENGTH, MAX_ATTRIBUTE_LENGTH
        ));
    }
    match reader.check(offset, length) {
        Ok(()) => Validation::ok(length),
        Err(_) => Validation::fail(format!(
            "attribute at {} with length {} overruns record of {} bytes",
            offset,
            length,
            reader.len()
        )),
    }
}

/// Resident value must start inside the attribute and end within it
pub fn validate_resident_value(attribute_length: usize, value_offset: usize, value_length: usize) -> Validation {
    if value_offset >= attribute_length {
        return Validation::fail(format!(
            "value offset {} not inside attribute of length {}",
            value_offset, attribute_length
        ));
    }
    if value_offset + value_length > attribute_length {
        return Validation::fail(format!(
            "value span {}+{} overruns attribute of length {}",
            value_offset, value_length, attribute_length
        ));
    }
    Validation::ok(value_length)
}

/// Non-resident size and VCN fields must be mutually consistent
pub fn validate_non_resident_sizes(
    start_vcn: u64,
    last_vcn: u64,
    allocated_size: u64,
    actual_size: u64,
    initialized_size: u64,
) -> Validation {
    // An empty stream is stored with last_vcn = -1.
    if start_vcn > last_vcn && last_vcn != u64::MAX {
        return Validation::fail(format!("start VCN {} after last VCN {}", start_vcn, last_vcn));
    }
    if actual_size > allocated_size {
        return Validation::fail(format!(
            "actual size {} exceeds allocated size {}",
            actual_size, allocated_size
        ));
    }
    if initialized_size > actual_size {
        return Validation::fail(format!(
            "initialized size {} exceeds actual size {}",
            initialized_size, actual_size
        ));
    }
    Validation::ok(48)
}

/// Characters NTFS accepts in POSIX names that Windows rejects
pub const ILLEGAL_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Warn about names Windows itself could not create
pub fn validate_filename(name: &str) -> Validation {
    if name.is_empty() {
        return Validation::fail("empty file name");
    }
    if let Some(c) = name.chars().find(|c| ILLEGAL_FILENAME_CHARS.contains(c)) {
        return Validation::warning(name.len(), format!("file name contains illegal character '{}'", c));
    }
    if name.chars().any(|c| (c as u32) < 0x20) {
        return Validation::warning(name.len(), "file name contains control characters");
    }
    Validation::ok(name.len())
}
