use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use onboardflow::DocumentFormat;

#[derive(Debug, Parser)]
#[command(
    name = "onboardflow",
    version,
    about = "Multi-step onboarding wizards for Attirelly partners"
)]
pub struct Cli {
    /// Configuration file (JSON, YAML or TOML)
    #[arg(short = 'c', long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding saved drafts
    #[arg(long = "draft-dir", value_name = "DIR", global = true)]
    pub draft_dir: Option<PathBuf>,

    /// Base URL of the onboarding API
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// More log output; repeat for more detail
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the built-in onboarding flows
    Flows,
    /// Show progress and the active section of a flow
    Show(FlowArgs),
    /// Fill in fields of a section: FIELD=VALUE, nested fields as a.b=VALUE
    Set {
        #[command(flatten)]
        flow: FlowArgs,
        /// Section id, e.g. basicInformation
        section: String,
        #[arg(value_name = "FIELD=VALUE", required = true, num_args = 1..)]
        assignments: Vec<String>,
    },
    /// Clear fields of a section
    Unset {
        #[command(flatten)]
        flow: FlowArgs,
        section: String,
        #[arg(value_name = "FIELD", required = true, num_args = 1..)]
        fields: Vec<String>,
    },
    /// Validate the active section and move to the next one
    Next(FlowArgs),
    /// Move to the previous section
    Back(FlowArgs),
    /// Jump to an already reached section
    Goto {
        #[command(flatten)]
        flow: FlowArgs,
        section: String,
    },
    /// Store the current state as a draft and print its id
    Save(FlowArgs),
    /// Print the payload that would be submitted
    Payload {
        #[command(flatten)]
        flow: FlowArgs,
        /// json, or yaml/toml when compiled in
        #[arg(long = "format", value_name = "FORMAT", default_value = "json")]
        format: DocumentFormat,
    },
    /// Validate every section and send the payload
    Submit {
        #[command(flatten)]
        flow: FlowArgs,
        /// Write the payload instead of calling the API
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Dry-run destinations ("-" writes to stdout)
        #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
        outputs: Vec<String>,
        /// Keep the draft after a successful submission
        #[arg(long = "keep-draft")]
        keep_draft: bool,
    },
    /// Delete the saved draft and start over
    Discard(FlowArgs),
    /// Open the interactive terminal wizard
    Run {
        #[command(flatten)]
        flow: FlowArgs,
        /// Start from scratch even if a draft exists
        #[arg(long = "fresh")]
        fresh: bool,
        /// Return the payload on submit instead of calling the API
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
}

#[derive(Debug, Args)]
pub struct FlowArgs {
    /// Built-in flow id (seller, influencer, mua, wedding-planner, stylist)
    /// or a path to a flow document
    pub flow: String,

    /// Work on this draft instead of the flow's active one
    #[arg(long = "draft", value_name = "ID")]
    pub draft: Option<String>,
}
