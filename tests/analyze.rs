mod common;

use common::*;
use mftscope::{hashing, AnalyzerConfig, ExportFormat, MftAnalyzer, MftError};
use std::path::Path;

/// Nine records: zeroed slots 0-4, the root at 5, `Users` at 6, a zeroed
/// slot at 7 and `notes.txt` at 8 inside `Users`
fn write_mft(path: &Path) -> Vec<u8> {
    let mut data = vec![0u8; 5 * RECORD_SIZE];
    data.extend(directory(5, ".", ROOT_REFERENCE));
    data.extend(directory(6, "Users", ROOT_REFERENCE));
    data.extend(vec![0u8; RECORD_SIZE]);
    let notes = file(8, "notes.txt", reference(6));
    data.extend(&notes);
    std::fs::write(path, &data).unwrap();
    notes
}

fn config(input: &Path, output: &Path, format: ExportFormat) -> AnalyzerConfig {
    AnalyzerConfig {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        format,
        compute_hashes: true,
        batch_size: 2,
        show_progress: false,
        ..Default::default()
    }
}

#[test]
fn test_csv_across_batches() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("MFT");
    let output = dir.path().join("mft.csv");
    let notes = write_mft(&input);

    let stats = MftAnalyzer::new(config(&input, &output, ExportFormat::Csv))
        .analyze()
        .unwrap();
    assert_eq!(stats.total_records, 9);
    assert_eq!(stats.active_records, 3);
    assert_eq!(stats.directories, 2);
    assert_eq!(stats.files, 1);
    assert_eq!(stats.invalid_magic, 6);
    assert_eq!(stats.fixup_failures, 0);

    let csv = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 10);
    assert!(lines[0].starts_with("Record Number,Record Status,"));

    // Parent 6 was flushed in an earlier batch
    let row = lines.iter().find(|l| l.contains("notes.txt")).unwrap();
    assert!(row.starts_with("8,Valid,In Use,File,"));
    assert!(row.contains(",\\Users\\notes.txt,"));

    let hashes = hashing::compute(&notes);
    assert!(row.contains(&hashes.md5));
    assert!(row.ends_with(&format!(",{}", hashes.crc32)));
}

#[test]
fn test_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("MFT");
    let output = dir.path().join("mft.json");
    write_mft(&input);

    let mut config = config(&input, &output, ExportFormat::Json);
    config.parallel = true;
    MftAnalyzer::new(config).analyze().unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(records.len(), 9);

    let numbers: Vec<u64> = records
        .iter()
        .map(|r| r["recordNumber"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, vec![0, 0, 0, 0, 0, 5, 6, 0, 8]);

    let notes = &records[8];
    assert_eq!(notes["filename"], "notes.txt");
    assert_eq!(notes["filepath"], "\\Users\\notes.txt");
    assert_eq!(notes["parentRecordNumber"], 6);
    assert_eq!(notes["crc32"].as_str().map(str::len), Some(8));
    assert_eq!(records[5]["filepath"], "\\");
}

#[test]
fn test_timeline_skips_unset_times() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("MFT");
    let output = dir.path().join("mft.timeline");
    write_mft(&input);

    MftAnalyzer::new(config(&input, &output, ExportFormat::Timeline))
        .analyze()
        .unwrap();

    // Every FN time in the fixture is zero
    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.is_empty());
}

#[test]
fn test_cancelled_run_still_finishes_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("MFT");
    let output = dir.path().join("mft.json");
    write_mft(&input);

    let analyzer = MftAnalyzer::new(config(&input, &output, ExportFormat::Json));
    analyzer.cancel();
    let err = analyzer.analyze().unwrap_err();
    assert!(matches!(err, MftError::Cancelled));

    let text = std::fs::read_to_string(&output).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = MftAnalyzer::new(config(
        &dir.path().join("absent"),
        &dir.path().join("out.csv"),
        ExportFormat::Csv,
    ))
    .analyze()
    .unwrap_err();
    assert!(matches!(err, MftError::IoError(_)));
}
