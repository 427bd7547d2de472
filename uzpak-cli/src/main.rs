//! uzpak CLI - compress and decompress uz1 package files.

use clap::{error::ErrorKind, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uzpak_uz1::{
    compress_with_progress, decompress_with_progress, Progress, Result, Variant,
};

#[derive(Parser)]
#[command(name = "uzpak", version, about = "uz1 package compressor/decompressor")]
struct Cli {
    /// Log chatter (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Hide the progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a package file into a .uz container
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output .uz file
        output: PathBuf,

        /// Pipeline variant written in the header
        #[arg(long, value_enum, default_value = "ut99")]
        variant: VariantArg,

        /// Filename embedded in the container (defaults to the input name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Decompress a .uz container
    #[command(alias = "x")]
    Decompress {
        /// .uz file to decompress
        input: PathBuf,

        /// Output file
        output: PathBuf,
    },
}

/// Pipeline variant as a CLI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    /// Four-stage pipeline, signature 1234
    Ut99,
    /// Five-stage pipeline, signature 5678
    Extended,
}

impl From<VariantArg> for Variant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Ut99 => Variant::Ut99,
            VariantArg::Extended => Variant::Extended,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
            let _ = err.print();
            return code;
        }
    };

    init_logger(cli.verbose);

    let result = match &cli.command {
        Commands::Compress {
            input,
            output,
            variant,
            name,
        } => cmd_compress(input, output, (*variant).into(), name.as_deref(), cli.quiet),
        Commands::Decompress { input, output } => cmd_decompress(input, output, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn cmd_compress(
    input: &Path,
    output: &Path,
    variant: Variant,
    name: Option<&str>,
    quiet: bool,
) -> Result<()> {
    let embedded_name = match name {
        Some(name) => name.to_string(),
        None => input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "package".to_string()),
    };

    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);

    let bar = create_progress_bar(quiet);
    let result = compress_with_progress(
        reader,
        &mut writer,
        &embedded_name,
        variant,
        |update| {
            advance_bar(&bar, update);
            true
        },
    );
    bar.finish_and_clear();

    finish(result, writer, output)?;
    println!("{} -> {}", input.display(), output.display());
    Ok(())
}

fn cmd_decompress(input: &Path, output: &Path, quiet: bool) -> Result<()> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);

    let bar = create_progress_bar(quiet);
    let result = decompress_with_progress(reader, &mut writer, |update| {
        advance_bar(&bar, update);
        true
    });
    bar.finish_and_clear();

    let name = finish(result, writer, output)?;
    println!(
        "{} -> {} (original name: {})",
        input.display(),
        output.display(),
        name
    );
    Ok(())
}

/// Complete or clean up after a pipeline run: on failure the partially
/// written output file is removed.
fn finish<T>(result: Result<T>, writer: BufWriter<File>, output: &Path) -> Result<T> {
    match result {
        Ok(value) => {
            drop(writer);
            Ok(value)
        }
        Err(err) => {
            drop(writer);
            let _ = std::fs::remove_file(output);
            Err(err)
        }
    }
}

fn create_progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    bar
}

fn advance_bar(bar: &ProgressBar, update: Progress) {
    bar.set_length(update.total_steps as u64);
    bar.set_position(update.step as u64 - 1);
    bar.set_message(format!(
        "({}/{}) {}",
        update.step,
        update.total_steps,
        update.stage.name()
    ));
}
