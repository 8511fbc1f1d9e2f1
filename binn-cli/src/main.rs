//! BINN CLI - Command-line tool for BINN buffers
//!
//! This binary provides command-line interfaces for:
//! - validate: structural check of an untrusted buffer
//! - info: top-level type, size, count and entry listing
//! - dump: decode to JSON
//! - encode: JSON → BINN

use binn_codec::{
    decode_item_with_limits, from_json, to_json, validate, validate_with_limits, ContainerRef,
    Item, Key, Limits, ValueOptions,
};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "binn")]
#[command(about = "Validate, inspect and produce BINN buffers")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a file holds a well-formed BINN item
    Validate {
        /// Input file
        input: PathBuf,
        /// Maximum container nesting depth
        #[arg(long, default_value_t = Limits::default().max_depth)]
        max_depth: usize,
    },
    /// Show type, size, count and entries
    ///
    /// Examples:
    ///   binn info data.binn
    ///   binn info data.binn --format json
    Info {
        /// Input file
        input: PathBuf,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = InfoFormat::Table)]
        format: InfoFormat,
    },
    /// Decode a BINN file to JSON
    Dump {
        /// Input file
        input: PathBuf,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
        /// Maximum container nesting depth
        #[arg(long, default_value_t = Limits::default().max_depth)]
        max_depth: usize,
    },
    /// Encode a JSON object or array to BINN
    Encode {
        /// Input file (JSON object or array)
        input: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
        /// Store integers at their JSON width instead of the narrowest one
        #[arg(long)]
        no_int_compression: bool,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum InfoFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, serde::Serialize)]
struct ItemSummary {
    #[serde(rename = "type")]
    type_name: &'static str,
    size: usize,
    count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entries: Vec<EntrySummary>,
}

#[derive(Debug, Clone, serde::Serialize)]
struct EntrySummary {
    key: String,
    #[serde(rename = "type")]
    type_name: &'static str,
    size: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { input, max_depth } => handle_validate(input, max_depth)?,
        Commands::Info { input, format } => handle_info(input, format)?,
        Commands::Dump {
            input,
            pretty,
            max_depth,
        } => handle_dump(input, pretty, max_depth)?,
        Commands::Encode {
            input,
            output,
            no_int_compression,
        } => handle_encode(input, output, !no_int_compression)?,
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn handle_validate(input: PathBuf, max_depth: usize) -> Result<(), Box<dyn Error>> {
    let bytes = fs::read(&input)?;
    let limits = Limits {
        max_depth,
        ..Limits::default()
    };
    let header = validate_with_limits(&bytes, &limits)
        .map_err(|e| format!("invalid: {}: {e}", input.display()))?;

    if header.size < bytes.len() {
        debug!(trailing = bytes.len() - header.size, "ignoring bytes after item");
    }
    println!(
        "valid: {} size={} count={}",
        header.type_tag.name(),
        header.size,
        header.count
    );
    Ok(())
}

fn handle_info(input: PathBuf, format: InfoFormat) -> Result<(), Box<dyn Error>> {
    let bytes = fs::read(&input)?;
    let summary = summarize(&bytes)?;

    let mut stdout = std::io::stdout().lock();
    match format {
        InfoFormat::Table => print_info_table(&mut stdout, &summary)?,
        InfoFormat::Json => print_info_json(&mut stdout, &summary)?,
    }
    Ok(())
}

fn handle_dump(input: PathBuf, pretty: bool, max_depth: usize) -> Result<(), Box<dyn Error>> {
    let bytes = fs::read(&input)?;
    let limits = Limits {
        max_depth,
        ..Limits::default()
    };
    let item = decode_item_with_limits(&bytes, &limits)?;
    let json = to_json(&item)?;

    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, &json)?;
    } else {
        serde_json::to_writer(&mut stdout, &json)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn handle_encode(
    input: PathBuf,
    output: PathBuf,
    int_compression: bool,
) -> Result<(), Box<dyn Error>> {
    let text = fs::read(&input)?;
    let json: serde_json::Value = serde_json::from_slice(&text)?;
    let opts = ValueOptions {
        int_compression,
        ..ValueOptions::default()
    };
    let value = from_json(&json, opts)?;
    fs::write(&output, value.as_bytes())?;

    let mut stderr = std::io::stderr().lock();
    writeln!(
        &mut stderr,
        "Encoded {} {} entries → {} bytes ({})",
        value.count(),
        value.kind(),
        value.size(),
        output.display()
    )?;
    Ok(())
}

fn summarize(bytes: &[u8]) -> Result<ItemSummary, Box<dyn Error>> {
    let header = validate(bytes)?;
    let mut summary = ItemSummary {
        type_name: header.type_tag.name(),
        size: header.size,
        count: header.count,
        entries: Vec::new(),
    };

    if header.type_tag.is_container() {
        let reader = ContainerRef::open(bytes)?;
        for entry in reader.entries() {
            let (key, item) = entry?;
            summary.entries.push(EntrySummary {
                key: key_label(&key),
                type_name: item.type_tag().name(),
                size: item_size(&item)?,
            });
        }
    }
    Ok(summary)
}

fn key_label(key: &Key<'_>) -> String {
    match key {
        Key::Name(name) => name.to_string(),
        other => other.to_string(),
    }
}

// Decoded items keep their stored width, so the uncompressed length is the
// length on the wire.
fn item_size(item: &Item<'_>) -> Result<usize, Box<dyn Error>> {
    Ok(item.encoded_len(false)?)
}

fn print_info_table(writer: &mut dyn Write, summary: &ItemSummary) -> Result<(), Box<dyn Error>> {
    writeln!(writer, "Type\tSize\tCount")?;
    writeln!(
        writer,
        "{}\t{}\t{}",
        summary.type_name, summary.size, summary.count
    )?;

    if !summary.entries.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Key\tType\tSize")?;
        for entry in &summary.entries {
            writeln!(writer, "{}\t{}\t{}", entry.key, entry.type_name, entry.size)?;
        }
    }
    Ok(())
}

fn print_info_json(writer: &mut dyn Write, summary: &ItemSummary) -> Result<(), Box<dyn Error>> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use binn_codec::Value;

    fn sample_bytes() -> Vec<u8> {
        let mut obj = Value::object().unwrap();
        obj.object_set("id", 300u32).unwrap();
        obj.object_set("name", "widget").unwrap();
        obj.to_vec()
    }

    #[test]
    fn summarize_lists_entries() {
        let summary = summarize(&sample_bytes()).unwrap();
        assert_eq!(summary.type_name, "object");
        assert_eq!(summary.count, 2);
        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.entries[0].key, "id");
        assert_eq!(summary.entries[0].type_name, "uint16");
        assert_eq!(summary.entries[0].size, 3);
        assert_eq!(summary.entries[1].type_name, "string");
        assert_eq!(summary.entries[1].size, 9);
        let body: usize = summary
            .entries
            .iter()
            .map(|e| e.size + 1 + e.key.len())
            .sum();
        assert_eq!(summary.size, 3 + body);
    }

    #[test]
    fn summarize_scalar_has_no_entries() {
        let summary = summarize(&[0x21, 0xFE]).unwrap();
        assert_eq!(summary.type_name, "int8");
        assert_eq!(summary.size, 2);
        assert!(summary.entries.is_empty());
    }

    #[test]
    fn print_info_table_includes_keys() {
        let summary = summarize(&sample_bytes()).unwrap();
        let mut out = Vec::new();
        print_info_table(&mut out, &summary).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Type\tSize\tCount\nobject\t"));
        assert!(text.contains("id\tuint16\t3"));
        assert!(text.contains("name\tstring\t9"));
    }

    #[test]
    fn print_info_json_is_parseable() {
        let summary = summarize(&sample_bytes()).unwrap();
        let mut out = Vec::new();
        print_info_json(&mut out, &summary).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["count"], 2);
        assert_eq!(json["entries"][1]["key"], "name");
    }

    #[test]
    fn map_keys_print_as_numbers() {
        assert_eq!(key_label(&Key::Id(-4)), "-4");
        assert_eq!(key_label(&Key::Name("k")), "k");
        assert_eq!(key_label(&Key::Position(2)), "#2");
    }
}
