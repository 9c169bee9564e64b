//! Entry point for the Freela Engine binary.
//!
//! A small JSON command line front end over the pricing engine.  The
//! directory containing tax table JSON files may be specified via
//! `--tax-dir` or the `FREELA_TAX_TABLE_DIR` environment variable; if
//! unset the compiled-in tables are used.  Logs go to stderr so stdout
//! stays machine readable.
//!
//! Usage:
//!   freela_engine calculate input.json --cents
//!   freela_engine compare 5000
//!   freela_engine regime PJ_SIMPLES
//!   freela_engine examples

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use freela_engine::config::{Settings, DEFAULT_LOG_FILTER};
use freela_engine::{presets, PricingInput, TaxRegime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "freela_engine")]
#[command(about = "Freelancer rate calculator for Brazilian tax regimes")]
struct Args {
    /// Directory of tax table JSON files
    #[arg(long, global = true, env = "FREELA_TAX_TABLE_DIR")]
    tax_dir: Option<PathBuf>,

    /// Tax year to price against (defaults to the latest table)
    #[arg(long, global = true, env = "FREELA_TAX_YEAR")]
    year: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price a single input read from FILE, or stdin when omitted
    Calculate {
        file: Option<PathBuf>,
        /// Round currency figures to cents
        #[arg(long)]
        cents: bool,
    },
    /// Compare every regime for a monthly income using baseline parameters
    Compare { income: Decimal },
    /// Describe a tax regime
    Regime { name: String },
    /// Price the bundled example scenarios
    Examples,
}

#[derive(Serialize)]
struct PresetOutput<'a> {
    name: &'a str,
    description: &'a str,
    input: &'a PricingInput,
    result: freela_engine::PricingResult,
}

fn read_input(file: Option<&PathBuf>) -> Result<PricingInput> {
    let data = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read input from stdin")?;
            buf
        }
    };
    serde_json::from_str(&data).context("input is not a valid pricing request")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings {
        tax_table_dir: args.tax_dir,
        tax_year: args.year,
    };
    let engine = settings.build_engine()?;

    match args.command {
        Command::Calculate { file, cents } => {
            let input = read_input(file.as_ref())?;
            let result = engine.calculate(&input)?;
            if cents {
                print_json(&result.rounded_to_cents())
            } else {
                print_json(&result)
            }
        }
        Command::Compare { income } => {
            let base = PricingInput::baseline(income, TaxRegime::Mei);
            print_json(&engine.compare_regimes(&base)?)
        }
        Command::Regime { name } => {
            let regime: TaxRegime = name.parse()?;
            print_json(&engine.regime_info(regime))
        }
        Command::Examples => {
            let presets = presets::examples();
            let inputs: Vec<PricingInput> = presets.iter().map(|p| p.input.clone()).collect();
            let mut output = Vec::with_capacity(presets.len());
            for (preset, result) in presets.iter().zip(engine.calculate_batch(&inputs)) {
                output.push(PresetOutput {
                    name: preset.name,
                    description: preset.description,
                    input: &preset.input,
                    result: result?.rounded_to_cents(),
                });
            }
            print_json(&output)
        }
    }
}
