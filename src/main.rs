// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use fiscal_correction::{
    format_rules, format_summary, load_csv, logging, CategoryTag, Config, CorrectionRun,
    Pipeline, DEDUCTION_RULES, KEYWORD_RULES,
};

#[derive(Debug, Parser)]
#[command(
    name = "fiscal-correction",
    version,
    about = "Fiscal deduction corrections for ledger exports"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify and correct a ledger CSV, writing the annotated export.
    Correct(CorrectArgs),
    /// Correct a ledger CSV and browse the result in the terminal.
    View(InputArgs),
    /// Print the classification keywords and deduction table.
    Rules {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args, Clone)]
struct InputArgs {
    /// Ledger CSV to process.
    input: PathBuf,

    /// Field delimiter (defaults to config, then ',').
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Header of the ledger-account column.
    #[arg(long)]
    label_column: Option<String>,

    /// Header of the amount column.
    #[arg(long)]
    amount_column: Option<String>,
}

#[derive(Debug, Args, Clone)]
struct CorrectArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output path; `-` writes to stdout. Defaults to the export file name next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the per-row audit trail.
    #[arg(long)]
    audit: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init("fiscal_correction=warn");

    let cli = Cli::parse();

    match cli.command {
        Command::Correct(args) => run_correct(args),
        Command::View(args) => run_view(args),
        Command::Rules { json } => print_rules(json),
    }
}

fn print_rules(json: bool) -> Result<()> {
    if json {
        let rules = serde_json::json!({
            "keyword_rules": KEYWORD_RULES,
            "default_category": CategoryTag::OtherCosts,
            "deduction_rules": DEDUCTION_RULES,
        });
        println!("{}", serde_json::to_string_pretty(&rules)?);
    } else {
        print!("{}", format_rules());
    }
    Ok(())
}

/// Loaded config with CLI overrides applied
fn resolve_config(args: &InputArgs) -> Result<Config> {
    let mut config = Config::load().context("Failed to load configuration")?;

    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    if let Some(label) = &args.label_column {
        config.label_column = label.clone();
    }
    if let Some(amount) = &args.amount_column {
        config.amount_column = amount.clone();
    }

    config.validate()?;
    Ok(config)
}

fn process(args: &InputArgs, config: &Config) -> Result<CorrectionRun> {
    let delimiter = config.delimiter_byte()?;

    let table = load_csv(&args.input, delimiter)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    info!(rows = table.row_count(), path = %args.input.display(), "loaded ledger");

    let run = Pipeline::from_config(config)
        .run_table(table)
        .with_context(|| format!("Failed to correct {}", args.input.display()))?;

    Ok(run)
}

fn default_output(input: &Path, config: &Config) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&config.export_file_name)
}

fn run_correct(args: CorrectArgs) -> Result<()> {
    let config = resolve_config(&args.input)?;
    let run = process(&args.input, &config)?;
    let bytes = run.to_csv(config.delimiter_byte()?)?;

    let to_stdout = args.output.as_deref() == Some(Path::new("-"));
    if to_stdout {
        std::io::stdout().write_all(&bytes)?;
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input.input, &config));

    if output == args.input.input {
        bail!("Refusing to overwrite the input file {}", output.display());
    }

    println!("📊 Fiscal correction");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if !run.stripped_columns.is_empty() {
        println!(
            "↻ Recomputed existing columns: {}",
            run.stripped_columns.join(", ")
        );
    }

    print!("{}", format_summary(&run.summary()));

    if args.audit {
        println!("\n📝 Audit trail");
        println!("{}", run.audit.render());
    }

    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Corrections written to {}", output.display());

    Ok(())
}

#[cfg(feature = "tui")]
fn run_view(args: InputArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let run = process(&args, &config)?;

    let mut app = ui::App::new(run);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_view(_args: InputArgs) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: fiscal-correction correct <INPUT> --audit");
    std::process::exit(1);
}
