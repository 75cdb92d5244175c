use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use lab_core::{ParseOptions, ParsedResult, ReferenceTable};
use lab_hl7::encoding::decode_legacy_western_text;
use lab_hl7::parse_message;
use lab_hl7::prompt::observations_prompt_block;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lab-cli",
    about = "Parse an HL7 v2 lab message and classify its observations."
)]
struct Args {
    /// Path to the HL7 message file.
    #[arg(short, long)]
    input: PathBuf,

    /// Decode the file as single-byte Western-European text instead of UTF-8.
    #[arg(long)]
    legacy: bool,

    /// JSON list of `{parameter, ideal_range}` records replacing the built-in table.
    #[arg(long)]
    reference_table: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Output::Preview)]
    format: Output,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Output {
    /// Patient summary and observation table.
    Preview,
    /// Full parsed result as JSON.
    Json,
    /// Observation lines as sent to the analysis service.
    Prompt,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Could not read file {:?}", args.input))?;
    let message = if args.legacy {
        decode_legacy_western_text(&bytes)
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    let mut options = ParseOptions::default();
    if let Some(path) = &args.reference_table {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read reference table {path:?}"))?;
        let table = ReferenceTable::from_json_str(&json)?;
        tracing::info!(entries = table.len(), "Loaded reference table");
        options.reference_table = Some(table);
    }

    let parsed = parse_message(&message, &options)?;

    match args.format {
        Output::Preview => print_preview(&parsed),
        Output::Json => println!("{}", serde_json::to_string_pretty(&parsed)?),
        Output::Prompt => println!("{}", observations_prompt_block(&parsed)),
    }

    Ok(())
}

fn print_preview(parsed: &ParsedResult) {
    println!(
        "Message type: {}\nSegments: {}",
        parsed.message_type, parsed.total_segments
    );

    if let Some(patient) = &parsed.patient {
        let age = parsed
            .header
            .as_ref()
            .and_then(|header| header.timestamp())
            .and_then(|stamp| patient.age_on(stamp.date()));
        match age {
            Some(age) => println!(
                "Patient: {} ({}, {} y, born {})",
                patient.full_name(),
                patient.sex,
                age,
                patient.birth_date
            ),
            None => println!(
                "Patient: {} ({}, born {})",
                patient.full_name(),
                patient.sex,
                patient.birth_date
            ),
        }
    }

    println!();
    for obs in &parsed.observations {
        let status = obs.canonical_status();
        let marker = if status.is_abnormal() { "!" } else { " " };
        println!(
            "{marker} {:<8} {:<28} {:>10} {:<10} {:<14} {}",
            obs.code,
            obs.text,
            obs.value,
            obs.units.as_deref().unwrap_or(""),
            obs.reference_range.as_deref().unwrap_or(""),
            status.label()
        );
        if let Some(ideal) = &obs.ideal_range {
            println!("{:>12}ideal: {ideal}", "");
        }
        for note in &obs.notes {
            println!("{:>12}note: {note}", "");
        }
    }

    for note in &parsed.notes {
        println!("Note {}: {}", note.set_id, note.text);
    }
}
