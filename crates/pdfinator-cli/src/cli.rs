//! CLI argument parsing for pdfinator.
//!
//! Global flags select the directories and verbosity shared by every
//! subcommand. Each subcommand maps to one library operation, `watch` runs the
//! polling loop.
//!
//! # Examples
//!
//! ```text
//! pdfinator split pdfs/book.pdf --pages-per-split 3
//! pdfinator merge "scans/*.pdf" -o bundle.pdf
//! pdfinator --input-dir inbox watch --action decrypt --once
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use pdfinator::config::{Config, OverwriteMode};
use pdfinator::error::Result;
use pdfinator::watch::WatchAction;

/// Split, merge, edit, unlock and extract text from PDF files.
///
/// Single operations run once and exit. The `watch` subcommand polls the
/// input directory and handles every new PDF exactly once, remembering
/// handled files in a registry.
#[derive(Parser, Debug)]
#[command(name = "pdfinator")]
#[command(version)]
#[command(about = "Split, merge, edit, unlock and extract text from PDF files", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// JSON configuration file
    ///
    /// Keys not present in the file keep their defaults. Flags given on the
    /// command line take precedence over the file.
    #[arg(long, global = true, value_name = "FILE", env = "PDFINATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory scanned for input PDFs [default: ./pdfs]
    #[arg(long, global = true, value_name = "DIR", env = "PDFINATOR_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving all outputs [default: ./output]
    #[arg(long, global = true, value_name = "DIR", env = "PDFINATOR_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory receiving one log file per run [default: ./logs]
    #[arg(long, global = true, value_name = "DIR", env = "PDFINATOR_LOGS_DIR")]
    pub logs_dir: Option<PathBuf>,

    /// Registry of already processed files [default: processed.txt]
    #[arg(long, global = true, value_name = "FILE", env = "PDFINATOR_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Never overwrite existing output files
    ///
    /// If an output file already exists, fail instead of replacing it.
    #[arg(long, global = true)]
    pub no_clobber: bool,

    /// Verbose output - show per-part and per-file details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Operations.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Split a PDF into parts of N pages
    ///
    /// Parts are written to <output-dir>/<name>/. With one page per part the
    /// files are named "<name> - Page i.pdf", otherwise "<name> - Part i.pdf".
    Split {
        /// PDF to split (looked up in the input directory if not found as given)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pages per output part
        #[arg(short = 'k', long, value_name = "N", default_value_t = 1)]
        pages_per_split: usize,

        /// Also write the text of every part to <name>/text/
        #[arg(long)]
        extract_text: bool,
    },

    /// Merge PDFs in the given order
    ///
    /// Inputs may be glob patterns. Missing inputs are skipped with a
    /// warning as long as two inputs remain; the exit code is then 7.
    Merge {
        /// Input files or patterns, in merge order
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<String>,

        /// Output file [default: <output-dir>/(a)+(b).pdf]
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Write a copy of a PDF without one page
    DeletePage {
        /// Source PDF
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 1-based page number to delete
        #[arg(value_name = "PAGE", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Write a copy of a PDF with one page repeated right after itself
    DuplicatePage {
        /// Source PDF
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 1-based page number to duplicate
        #[arg(value_name = "PAGE", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Extract the text layer of every page
    ExtractText {
        /// Source PDF
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output text file [default: <output-dir>/<name> - Text.txt]
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Unlock an encrypted PDF
    ///
    /// The given password is tried first, then the configured extra
    /// passwords and a built-in list of common ones. Unencrypted files are
    /// copied unchanged.
    Decrypt {
        /// Encrypted PDF
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Password to try first
        #[arg(short, long, value_name = "PASSWORD", env = "PDFINATOR_PASSWORD")]
        password: Option<String>,

        /// Output file [default: <output-dir>/<name> (Unlocked).pdf]
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show the PDFs under the input directory as a tree
    List,

    /// Poll the input directory and handle every new PDF once
    Watch(WatchArgs),
}

/// What `watch` does with each new file.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionArg {
    /// Ask on the console for every file
    #[default]
    Menu,
    /// Split into parts of --pages-per-split pages
    Split,
    /// Extract the text layer
    ExtractText,
    /// Unlock with the candidate passwords
    Decrypt,
}

/// Arguments of the `watch` subcommand.
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Action applied to every new file
    #[arg(short, long, value_enum, default_value_t = ActionArg::Menu)]
    pub action: ActionArg,

    /// Pages per part for the split action
    #[arg(short = 'k', long, value_name = "N", default_value_t = 1)]
    pub pages_per_split: usize,

    /// Seconds between two scans [default: 10]
    #[arg(long, value_name = "SECONDS", env = "PDFINATOR_INTERVAL")]
    pub interval: Option<u64>,

    /// Also scan sub-directories of the input directory
    #[arg(short, long)]
    pub recursive: bool,

    /// Run a single pass and exit
    #[arg(long)]
    pub once: bool,

    /// Password tried first by the decrypt action
    #[arg(short, long, value_name = "PASSWORD", env = "PDFINATOR_PASSWORD")]
    pub password: Option<String>,
}

impl WatchArgs {
    /// The fixed action to apply, or `None` for the interactive menu.
    pub fn watch_action(&self) -> Option<WatchAction> {
        match self.action {
            ActionArg::Menu => None,
            ActionArg::Split => Some(WatchAction::Split {
                pages_per_split: self.pages_per_split,
            }),
            ActionArg::ExtractText => Some(WatchAction::ExtractText),
            ActionArg::Decrypt => Some(WatchAction::Decrypt {
                password: self.password.clone(),
            }),
        }
    }
}

impl Cli {
    /// Build the validated configuration for this invocation.
    ///
    /// Starts from the configuration file (or the defaults) and applies every
    /// flag given on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or the
    /// resulting configuration is invalid.
    pub fn to_config(&self) -> Result<Config> {
        let global = &self.global;

        let mut config = match &global.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(dir) = &global.input_dir {
            config.input_dir = dir.clone();
        }
        if let Some(dir) = &global.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dir) = &global.logs_dir {
            config.logs_dir = dir.clone();
        }
        if let Some(path) = &global.registry {
            config.registry_path = path.clone();
        }
        if global.no_clobber {
            config.overwrite_mode = OverwriteMode::NoClobber;
        }
        config.verbose = global.verbose;
        config.quiet = global.quiet;

        if let Command::Watch(args) = &self.command {
            if let Some(interval) = args.interval {
                config.poll_interval_secs = interval;
            }
            config.recursive |= args.recursive;
        }

        config.validate()?;
        Ok(config)
    }
}
