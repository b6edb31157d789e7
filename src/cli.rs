//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `formtalk`.
#[derive(Debug, Parser)]
#[command(name = "formtalk", version, about = "Fill in forms through a typed conversation")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fill in a form interactively over stdin and stdout.
    Run {
        /// Form definition file.
        form: PathBuf,
        /// Seed for template variant choice.
        #[arg(long, env = "FORMTALK_SEED")]
        seed: Option<u64>,
        /// Write a replayable transcript of the session to this path.
        #[arg(long)]
        record: Option<PathBuf>,
        /// Print the confirmed answers as JSON instead of YAML.
        #[arg(long)]
        json: bool,
    },
    /// Validate a form definition and summarize its fields.
    Check {
        /// Form definition file.
        form: PathBuf,
    },
    /// List the terms each field and value is recognized by.
    Terms {
        /// Form definition file.
        form: PathBuf,
        /// Only list this field.
        #[arg(long)]
        field: Option<String>,
    },
    /// Re-run a transcript against a form and report changed replies.
    Replay {
        /// Transcript file written by `run --record`.
        transcript: PathBuf,
        /// Form definition file; defaults to the one named in the transcript.
        #[arg(long)]
        form: Option<PathBuf>,
    },
}
