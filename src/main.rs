//! mftscope CLI
//!
//! Decodes a raw `$MFT` dump into CSV, JSON, XML, body or timeline output,
//! or prints a single decoded record.

use clap::{Parser, Subcommand};
use console::style;
use indicatif::HumanDuration;
use mftscope::ntfs::structs::file_attributes;
use mftscope::{decode_record_at, format_size, AnalyzerConfig, ExportFormat, MftAnalyzer, MftError, MftRecord};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Instant;

/// mftscope - forensic NTFS Master File Table decoder
#[derive(Parser)]
#[command(name = "mftscope")]
#[command(author = "mftscope Contributors")]
#[command(version)]
#[command(about = "Forensic decoder for raw NTFS $MFT dumps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode every record and export them
    Analyze {
        /// Raw $MFT file
        #[arg(short, long)]
        file: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(long, value_enum, group = "output_format")]
        format: Option<ExportFormat>,

        /// Shorthand for --format csv
        #[arg(long, group = "output_format")]
        csv: bool,

        /// Shorthand for --format json
        #[arg(long, group = "output_format")]
        json: bool,

        /// Shorthand for --format xml
        #[arg(long, group = "output_format")]
        xml: bool,

        /// Shorthand for --format body
        #[arg(long, group = "output_format")]
        body: bool,

        /// Shorthand for --format timeline
        #[arg(long, group = "output_format")]
        timeline: bool,

        /// Hash every raw record (MD5, SHA-256, SHA-512, CRC32)
        #[arg(short = 'H', long)]
        hash: bool,

        /// Log verbosity (-v info, -vv debug, -vvv trace)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Decoder diagnostics (-d warnings, -dd per-attribute trace)
        #[arg(short, long, action = clap::ArgAction::Count)]
        debug: u8,

        /// Records per flush
        #[arg(long, default_value = "1000")]
        batch_size: usize,

        /// Decode batches on all cores
        #[arg(long)]
        parallel: bool,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,

        /// Write log lines to this file instead of stderr
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Decode and print a single record
    Record {
        /// Raw $MFT file
        #[arg(short, long)]
        file: PathBuf,

        /// Record number
        #[arg(short = 'n', long)]
        number: u64,

        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// Decoder diagnostics
        #[arg(short, long, action = clap::ArgAction::Count)]
        debug: u8,
    },
}

/// `--format` or one of its shorthands; `--csv` is the default anyway
struct FormatFlags {
    format: Option<ExportFormat>,
    json: bool,
    xml: bool,
    body: bool,
    timeline: bool,
}

impl FormatFlags {
    fn resolve(&self) -> ExportFormat {
        if let Some(format) = self.format {
            return format;
        }
        match (self.json, self.xml, self.body, self.timeline) {
            (true, ..) => ExportFormat::Json,
            (_, true, ..) => ExportFormat::Xml,
            (_, _, true, _) => ExportFormat::Body,
            (.., true) => ExportFormat::Timeline,
            _ => ExportFormat::Csv,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            file,
            output,
            format,
            csv: _,
            json,
            xml,
            body,
            timeline,
            hash,
            verbose,
            debug,
            batch_size,
            parallel,
            no_progress,
            log_file,
        } => {
            let flags = FormatFlags {
                format,
                json,
                xml,
                body,
                timeline,
            };
            let config = AnalyzerConfig {
                input: file,
                output,
                format: flags.resolve(),
                compute_hashes: hash,
                debug_level: debug,
                batch_size: batch_size.max(1),
                parallel,
                show_progress: !no_progress,
            };
            mftscope::logging::init(mftscope::logging::level_for_verbosity(verbose), log_file.as_deref())
                .and_then(|_| cmd_analyze(config))
        }

        Commands::Record {
            file,
            number,
            json,
            debug,
        } => mftscope::logging::init(mftscope::logging::level_for_verbosity(debug), None)
            .and_then(|_| cmd_record(&file, number, json, debug)),
    };

    mftscope::logging::flush();

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

/// Analyze command implementation
fn cmd_analyze(config: AnalyzerConfig) -> mftscope::Result<()> {
    let start = Instant::now();

    println!(
        "{} Decoding {} to {} ({:?})",
        style("→").cyan().bold(),
        style(config.input.display()).yellow(),
        style(config.output.display()).yellow(),
        config.format
    );

    let analyzer = MftAnalyzer::new(config);

    let token = analyzer.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || token.store(true, Ordering::SeqCst)) {
        log::warn!(target: "main", "Ctrl-C handler not installed: {}", e);
    }

    let stats = match analyzer.analyze() {
        Ok(stats) => stats,
        Err(MftError::Cancelled) => {
            println!(
                "{} Cancelled after {}; output holds the records flushed so far",
                style("!").yellow().bold(),
                HumanDuration(start.elapsed())
            );
            return Err(MftError::Cancelled);
        }
        Err(e) => return Err(e),
    };

    println!();
    println!(
        "{} Analysis complete in {}",
        style("✓").green().bold(),
        style(HumanDuration(stats.elapsed)).cyan()
    );
    println!();
    println!("  {} {}", style("Records:").bold(), stats.total_records);
    println!("  {} {}", style("In use:").bold(), stats.active_records);
    println!("  {} {}", style("Files:").bold(), stats.files);
    println!("  {} {}", style("Directories:").bold(), stats.directories);
    if stats.invalid_magic > 0 {
        println!("  {} {}", style("Invalid magic:").bold(), style(stats.invalid_magic).red());
    }
    if stats.fixup_failures > 0 {
        println!("  {} {}", style("Fixup failures:").bold(), style(stats.fixup_failures).red());
    }
    if stats.failed_records > 0 {
        println!("  {} {}", style("Failed:").bold(), style(stats.failed_records).red());
    }
    println!();
    let secs = stats.elapsed.as_secs_f64();
    if secs > 0.0 {
        println!(
            "  {} {:.0} records/sec",
            style("Speed:").bold(),
            stats.total_records as f64 / secs
        );
    }

    Ok(())
}

/// Record command implementation
fn cmd_record(file: &std::path::Path, number: u64, as_json: bool, debug: u8) -> mftscope::Result<()> {
    let record = decode_record_at(file, number, debug)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_record(&record);
    Ok(())
}

fn print_record(record: &MftRecord) {
    let header = &record.header;

    println!(
        "{} Record {}",
        style("→").cyan().bold(),
        style(record.record_number).yellow()
    );
    println!();
    println!(
        "  {} {}",
        style("Signature:").bold(),
        if record.is_valid() {
            style("FILE").green()
        } else {
            style("invalid").red()
        }
    );
    println!("  {} {}", style("Fixup:").bold(), record.fixup);
    println!(
        "  {} 0x{:04X} ({}, {})",
        style("Flags:").bold(),
        header.flags,
        if record.is_in_use() { "in use" } else { "not in use" },
        record.file_type()
    );
    println!("  {} {}", style("Sequence:").bold(), header.sequence_number);
    println!("  {} {}", style("Hard links:").bold(), header.hard_link_count);
    println!("  {} {}", style("LSN:").bold(), header.log_sequence_number);
    println!(
        "  {} {} of {} bytes",
        style("Used:").bold(),
        header.used_size,
        header.allocated_size
    );
    if header.record_number as u64 != record.record_number {
        println!(
            "  {} {}",
            style("Embedded number:").bold(),
            style(header.record_number).red()
        );
    }
    if !header.is_base_record() {
        println!("  {} {}", style("Base record:").bold(), header.base_reference);
    }
    println!("  {} {}", style("Size:").bold(), format_size(record.file_size()));

    if let Some(ref si) = record.standard_information {
        println!();
        println!("  {}", style("$STANDARD_INFORMATION").cyan());
        println!("    {} {}", style("Created:").dim(), si.times.creation);
        println!("    {} {}", style("Modified:").dim(), si.times.modification);
        println!("    {} {}", style("Changed:").dim(), si.times.entry);
        println!("    {} {}", style("Accessed:").dim(), si.times.access);
        let names = file_attributes::describe(si.file_attributes);
        if !names.is_empty() {
            println!("    {} {}", style("Attributes:").dim(), names.join(" | "));
        }
    }

    for fname in &record.file_names {
        println!();
        println!(
            "  {} {}",
            style("$FILE_NAME").cyan(),
            style(fname.namespace.as_str()).dim()
        );
        println!("    {} {}", style("Name:").dim(), style(&fname.name).yellow());
        println!("    {} {}", style("Parent:").dim(), fname.parent);
        println!("    {} {}", style("Created:").dim(), fname.times.creation);
        println!("    {} {}", style("Modified:").dim(), fname.times.modification);
    }

    if let Some(ref oid) = record.object_id {
        println!();
        println!("  {} {}", style("$OBJECT_ID").cyan(), oid.object_id);
    }

    let mut summaries: Vec<(&str, String)> = Vec::new();
    if let Some(ref list) = record.attribute_list {
        summaries.push(("$ATTRIBUTE_LIST", list.summary()));
    }
    if let Some(ref sd) = record.security_descriptor {
        summaries.push(("$SECURITY_DESCRIPTOR", sd.summary()));
    }
    if let Some(ref vn) = record.volume_name {
        summaries.push(("$VOLUME_NAME", vn.name.clone()));
    }
    if let Some(ref vi) = record.volume_information {
        summaries.push(("$VOLUME_INFORMATION", vi.summary()));
    }
    if let Some(ref data) = record.data {
        summaries.push(("$DATA", data.summary()));
    }
    for stream in &record.alternate_streams {
        summaries.push(("$DATA", stream.summary()));
    }
    if let Some(ref root) = record.index_root {
        summaries.push(("$INDEX_ROOT", root.summary()));
    }
    if let Some(ref alloc) = record.index_allocation {
        summaries.push(("$INDEX_ALLOCATION", alloc.summary()));
    }
    if let Some(ref bitmap) = record.bitmap {
        summaries.push(("$BITMAP", bitmap.summary()));
    }
    if let Some(ref reparse) = record.reparse_point {
        summaries.push(("$REPARSE_POINT", reparse.summary()));
    }
    if let Some(ref info) = record.ea_information {
        summaries.push(("$EA_INFORMATION", info.summary()));
    }
    if let Some(ref ea) = record.ea {
        summaries.push(("$EA", ea.summary()));
    }
    if let Some(ref lus) = record.logged_utility_stream {
        summaries.push(("$LOGGED_UTILITY_STREAM", lus.summary()));
    }

    if !summaries.is_empty() {
        println!();
        for (label, summary) in summaries {
            println!("  {} {}", style(format!("{:<22}", label)).cyan(), summary);
        }
    }

    if let Some(ref data) = record.data {
        for extent in data.extents() {
            let lcn = extent.lcn.map(|l| l.to_string()).unwrap_or_else(|| "sparse".to_string());
            println!(
                "  {} VCN {} -> LCN {} ({} clusters)",
                style("Extent:").dim(),
                extent.vcn,
                lcn,
                extent.cluster_count
            );
        }
    }

    if let Some(ref hashes) = record.hashes {
        println!();
        println!("  {} {}", style("MD5:").dim(), hashes.md5);
        println!("  {} {}", style("SHA-256:").dim(), hashes.sha256);
        println!("  {} {}", style("CRC32:").dim(), hashes.crc32);
    }
}
