use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

/// Expand recurring cleaning shifts and inspect the weekly schedule grid.
#[derive(Parser, Debug)]
#[command(name = "shiftgrid", version, about)]
pub struct CliArgs {
    /// Display name stamped as `changed_by` on generated entries.
    #[arg(long = "as", env = "SHIFTGRID_USER", global = true)]
    pub user: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    pub format: Format,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a task file and report every problem found.
    Check {
        /// YAML file with `pattern` and `template` sections.
        file: PathBuf,
    },

    /// List the occurrences a task file produces.
    Expand {
        file: PathBuf,

        /// First date of the window (default: the pattern's start date).
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last date of the window (default: end of series, or the configured
        /// horizon for open-ended series).
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Expand several task files and show one week as a building × day grid.
    Grid {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Any date inside the week to show.
        #[arg(long)]
        week: NaiveDate,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}
