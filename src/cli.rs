use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::export::ExportFormat;

#[derive(Parser)]
#[command(name = "harsift")]
#[command(about = "Filter HAR captures with boolean expressions and export a trimmed archive or compact text.")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where filter and export settings are read from.
#[derive(Args, Clone, Debug, Default)]
pub struct SnapshotArgs {
    /// Filter configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub filters: Option<PathBuf>,

    /// Export settings JSON file
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Read settings not given as files from the per-archive settings store
    #[arg(long)]
    pub use_store: bool,

    /// Settings store directory (default: [store] dir, else the user data directory)
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export the visible, selected entries as a HAR file or plain text
    Export {
        /// HAR file to export from
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        /// Output file, or - for stdout (default: filtered-HH-MM_<name> / ai-HH-MM_<name>.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Estimate the token size of an export
    Estimate {
        /// HAR file to inspect
        input: PathBuf,

        /// Print JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// List entries in view order
    List {
        /// HAR file to inspect
        input: PathBuf,

        /// Include hidden entries (marked with -)
        #[arg(long)]
        all: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Show entry counts per domain
    Domains {
        /// HAR file to inspect
        input: PathBuf,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show quick filters and how many entries each hides
    Quick {
        /// HAR file to inspect
        input: PathBuf,

        /// Apply a preset first (docs-xhr, reset)
        #[arg(long)]
        preset: Option<String>,

        /// Flip a quick filter (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        toggle: Vec<String>,

        /// Write the edited filters back to --filters or the store
        #[arg(long)]
        save: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// List noise headers and edit the custom list
    Noise {
        /// HAR file whose export settings to use
        input: Option<PathBuf>,

        /// Add a custom noise header (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        add: Vec<String>,

        /// Remove a custom noise header (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        remove: Vec<String>,

        /// Re-enable a noise header (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        enable: Vec<String>,

        /// Disable a noise header so it is kept on export (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        disable: Vec<String>,

        /// Write the edited settings back to --settings or the store
        #[arg(long)]
        save: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Manage the per-archive settings store
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },

    /// Print the resolved configuration
    Config,

    /// Generate shell completions
    #[cfg(feature = "completions")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum StoreCommands {
    /// Print the stored filters and export settings of an archive
    Show {
        input: PathBuf,

        #[arg(long, value_name = "DIR")]
        store_dir: Option<PathBuf>,
    },

    /// Store filter and settings files for an archive
    Save {
        input: PathBuf,

        /// Filter configuration JSON file
        #[arg(long, value_name = "FILE")]
        filters: Option<PathBuf>,

        /// Export settings JSON file
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,

        #[arg(long, value_name = "DIR")]
        store_dir: Option<PathBuf>,
    },

    /// Copy stored filters from one archive to another
    Copy {
        source: PathBuf,
        target: PathBuf,

        /// Merge into the target instead of replacing it
        #[arg(long)]
        merge: bool,

        /// Also copy custom and disabled noise headers
        #[arg(long)]
        noise: bool,

        /// Also copy export settings
        #[arg(long)]
        export_settings: bool,

        #[arg(long, value_name = "DIR")]
        store_dir: Option<PathBuf>,
    },
}
