use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Arguments for `create`.
#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    /// Path of the archive to write.
    pub archive: PathBuf,
    /// Files to add to the archive, in the order they should be written.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Prints timing and size statistics after the operation completes.
    #[arg(short, long)]
    pub stats: bool,
}

#[derive(Debug, Clone, Args)]
pub struct UnzipArgs {
    /// Archive to extract.
    pub archive: PathBuf,
    /// Prints timing and size statistics after the operation completes.
    #[arg(short, long)]
    pub stats: bool,
}

/// The operations this tool supports.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Packs one or more files into a canonical Huffman archive.
    #[clap(alias = "c")]
    Create(CreateArgs),
    /// Extracts every file entry from an archive.
    #[clap(alias = "x")]
    Unzip(UnzipArgs),
}

/// A canonical Huffman file archiver.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Canonical Huffman file archiver.",
    long_about = "Packs files into a Huffman-coded archive, or unpacks one back onto disk. \
Each file entry carries its own code table, so the archive needs no central index.",
    after_help = "
    EXAMPLES:
    # 1. Archive two files
    archiver create bundle.huff notes.txt photo.png

    # 2. Archive with timing/size statistics
    archiver create bundle.huff notes.txt photo.png --stats

    # 3. Extract into the current directory
    archiver unzip bundle.huff

    # 4. Using the short aliases
    archiver c bundle.huff notes.txt
    archiver x bundle.huff
"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    /// Validates filesystem preconditions the subcommand needs before any
    /// work starts: inputs exist, the archive's parent directory exists (for
    /// `create`), or the archive to unzip exists (for `unzip`).
    ///
    /// Returned errors are filesystem-precondition failures, not argument
    /// parsing failures, so the caller maps them to the subcommand's own
    /// failure exit code rather than the argument-parsing one.
    pub fn validate(&self) -> Result<(), CliError> {
        match &self.command {
            Commands::Create(args) => {
                for input in &args.inputs {
                    if !input.is_file() {
                        return Err(CliError::InputFileNotFound(input.clone()));
                    }
                }
                if let Some(parent) = args.archive.parent() {
                    if !parent.as_os_str().is_empty() && !parent.is_dir() {
                        return Err(CliError::OutputParentDirNotFound(
                            parent.to_path_buf(),
                        ));
                    }
                }
                Ok(())
            }
            Commands::Unzip(args) => {
                if !args.archive.is_file() {
                    return Err(CliError::InputFileNotFound(args.archive.clone()));
                }
                Ok(())
            }
        }
    }
}

/// A filesystem precondition the chosen subcommand needs was not met.
/// Distinct from [`clap::Error`]: this is raised after argument parsing
/// already succeeded, so it is reported through the subcommand's own
/// failure exit code rather than the argument-parsing one.
#[derive(Debug)]
pub enum CliError {
    /// An input path (or the archive to unzip) does not exist or isn't a file.
    InputFileNotFound(PathBuf),
    /// The archive's parent directory does not exist.
    OutputParentDirNotFound(PathBuf),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::InputFileNotFound(path) => {
                write!(f, "input file not found: {}", path.display())
            }
            CliError::OutputParentDirNotFound(path) => {
                write!(f, "output directory does not exist: {}", path.display())
            }
        }
    }
}

impl std::error::Error for CliError {}

/// Parses the process's command line arguments. Does not check filesystem
/// preconditions; call [`CliArgs::validate`] once the subcommand is known,
/// so its failure can be reported through that subcommand's exit code.
pub fn parse_args() -> Result<CliArgs, clap::Error> {
    CliArgs::try_parse()
}
