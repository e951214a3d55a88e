//! dataset-series CLI - time-series data sets to chartable series
//!
//! # Main Commands
//!
//! ```bash
//! dataset-series series readings.csv --date-format "%Y-%m-%d"   # CSV to series JSON
//! dataset-series series readings.csv --chart --title Readings    # CSV to chart figure
//! dataset-series fetch 65f0c0ffee --chart                        # Stored data set to chart
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! dataset-series translate "%d/%m/%Y %H:%M"   # Show the translated date format
//! dataset-series parse readings.csv           # Just parse CSV to payload JSON
//! dataset-series detect photo.png             # Show the detected data type
//! dataset-series validate payload.json        # Validate a payload against the schema
//! ```

use clap::{Parser, Subcommand};
use dataset_series::{
    fetch_series, parser, series_from_file, telemetry, translate, validation, ChartLayout,
    DataSetClient, DataType, IndexErrorPolicy, PlotFigure, ReshapeOptions, SeriesOverrides,
    SeriesResult, Settings, TabularPayload,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dataset-series")]
#[command(about = "Turn time-series data sets into chartable series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Reshape flags shared by `series` and `fetch`.
#[derive(clap::Args)]
struct ReshapeArgs {
    /// Keep empty cells as NaN instead of repeating the previous value
    #[arg(long)]
    no_fill: bool,

    /// Fail on the first index cell that is not a timestamp
    #[arg(long)]
    strict: bool,

    /// Output a chart figure instead of the series
    #[arg(long)]
    chart: bool,

    /// Chart title
    #[arg(long)]
    title: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a %-escaped date format to token notation
    Translate {
        /// Format such as "%Y-%m-%d"
        format: Option<String>,

        /// Translate an absent format (index values are epoch seconds)
        #[arg(long, conflicts_with = "format")]
        epoch: bool,
    },

    /// Parse a CSV file and output the payload JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full pipeline: CSV → payload → series (or chart figure)
    Series {
        /// Input CSV file
        input: PathBuf,

        /// Index column (default: first column)
        #[arg(short, long)]
        index_column: Option<String>,

        /// %-escaped date format of the index column (default: epoch seconds)
        #[arg(short = 'f', long)]
        date_format: Option<String>,

        /// Display label for a column, as column=Label (repeatable)
        #[arg(short, long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,

        #[command(flatten)]
        reshape: ReshapeArgs,
    },

    /// Fetch a stored time-series data set and output its series
    Fetch {
        /// Data set id
        id: String,

        #[command(flatten)]
        reshape: ReshapeArgs,
    },

    /// Detect the data type of a file
    Detect {
        /// Input file
        input: PathBuf,
    },

    /// Validate a time-series payload JSON file
    Validate {
        /// Input JSON file (one payload object)
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    telemetry::init_tracing(telemetry::DEFAULT_LEVEL);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Translate { format, epoch } => cmd_translate(format.as_deref(), epoch),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Series {
            input,
            index_column,
            date_format,
            labels,
            reshape,
        } => {
            let overrides = SeriesOverrides {
                index_column,
                date_format,
                column_mapping: labels.into_iter().collect(),
            };
            cmd_series(&input, &overrides, &reshape)
        }

        Commands::Fetch { id, reshape } => cmd_fetch(&id, &reshape).await,

        Commands::Detect { input } => cmd_detect(&input),

        Commands::Validate { input } => cmd_validate(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_label(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((column, label)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), label.trim().to_string()))
        }
        _ => Err(format!("expected column=Label, got '{}'", s)),
    }
}

fn reshape_options(settings: &Settings, args: &ReshapeArgs) -> ReshapeOptions {
    let mut options = settings.reshape.clone();
    if args.no_fill {
        options.fill_gaps = false;
    }
    if args.strict {
        options.on_index_error = IndexErrorPolicy::Abort;
    }
    options
}

fn cmd_translate(format: Option<&str>, epoch: bool) -> Result<(), Box<dyn std::error::Error>> {
    if format.is_none() && !epoch {
        return Err("give a format, or --epoch for an absent one".into());
    }

    println!("{}", translate(format)?);
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let bytes = fs::read(input)?;
    let result = match delimiter {
        Some(d) => parser::parse_bytes_with_delimiter(&bytes, d)?,
        None => parser::parse_bytes_auto(&bytes)?,
    };

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        match result.delimiter {
            '\t' => "\\t".to_string(),
            c => c.to_string(),
        },
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", result.headers().join(", "));
    eprintln!("✅ Parsed {} rows", result.row_count());

    let payload = result.into_stored_payload();
    let json = serde_json::to_string_pretty(&payload)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_series(
    input: &Path,
    overrides: &SeriesOverrides,
    args: &ReshapeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    let options = reshape_options(&settings, args);

    eprintln!("📄 Reading CSV: {}", input.display());
    let result = series_from_file(input, overrides, &options)?;
    if let Some(info) = &result.csv_info {
        eprintln!("   Encoding: {}", info.encoding);
        eprintln!("   Columns: {}", info.headers.join(", "));
    }

    print_result(&result, args, ChartLayout::default())
}

async fn cmd_fetch(id: &str, args: &ReshapeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    let options = reshape_options(&settings, args);
    let client = DataSetClient::from_settings(&settings);

    eprintln!("🌐 Fetching data set {} from {}", id, client.api_prefix());
    let result = fetch_series(&client, id, &SeriesOverrides::default(), &options).await?;

    print_result(&result, args, ChartLayout::preview())
}

fn print_result(
    result: &SeriesResult,
    args: &ReshapeArgs,
    layout: ChartLayout,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✅ {} series", result.series.len());
    if !result.skipped.is_empty() {
        eprintln!("⚠️  {} rows skipped:", result.skipped.len());
        for err in result.skipped.iter().take(5) {
            eprintln!("   - {}", err);
        }
    }

    let json = if args.chart {
        let layout = match &args.title {
            Some(title) => layout.with_title(title.clone()),
            None => layout,
        };
        serde_json::to_string_pretty(&PlotFigure::from_series(&result.series, layout))?
    } else {
        serde_json::to_string_pretty(result)?
    };

    write_output(&json, args.output.as_deref())
}

fn cmd_detect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data_type = DataType::from_path(input);
    eprintln!("🔎 {}: {}", input.display(), data_type.label());
    println!("{}", data_type);
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let value: Value = serde_json::from_str(&content)?;

    let mut problems = match validation::validate_time_series_payload(&value) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    // Shape rules only make sense once the payload deserializes
    if problems.is_empty() {
        let payload: TabularPayload = serde_json::from_value(value)?;
        if let Err(errors) = payload.check_shape() {
            problems.extend(errors);
        }
    }

    if problems.is_empty() {
        eprintln!("✅ Payload is valid");
        return Ok(());
    }

    eprintln!("\n❌ Payload invalid:");
    for problem in &problems {
        eprintln!("   - {}", problem);
    }
    std::process::exit(1);
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
