use clap::{Args, Parser, Subcommand, ValueEnum};
use fat_core::{Backend, RecordFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "fatdev: FAT-style segmented file table", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Log debug events to stderr (FAT_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,

    /// Defaults to the interactive shell
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// JSON config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the catalog and segment records
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Max chars per segment
    #[arg(long)]
    pub capacity: Option<usize>,

    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Cbor,
}

impl From<FormatArg> for RecordFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Json => RecordFormat::Json,
            FormatArg::Cbor => RecordFormat::Cbor,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Fs,
    Memory,
}

impl From<BackendArg> for Backend {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Fs => Backend::Fs,
            BackendArg::Memory => Backend::Memory,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive menu (create/list/open/modify/delete/recover)
    Shell,

    /// Create a file; content is read from stdin when --content is omitted
    Create {
        name: String,
        #[arg(long)]
        content: Option<String>,
    },

    /// List live files, or the trash with --deleted
    Ls {
        #[arg(long)]
        deleted: bool,
        /// show segment counts and locators
        #[arg(long)]
        long: bool,
    },

    /// Print a live file's content by its `ls` index
    Cat { index: usize },

    /// Replace a live file's content (whole chain rewrite)
    Edit {
        index: usize,
        #[arg(long)]
        content: Option<String>,
        /// commit without asking
        #[arg(long)]
        yes: bool,
    },

    /// Move a live file to the trash
    Rm {
        index: usize,
        #[arg(long)]
        yes: bool,
    },

    /// Restore a file by its `ls --deleted` index
    Recover {
        index: usize,
        #[arg(long)]
        yes: bool,
    },

    /// Check every chain against the catalog and report orphan segments
    Verify,
}
