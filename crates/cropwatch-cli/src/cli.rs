//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use cropwatch_domain::RequestKind;

/// Cropwatch CLI - Turn crop-analysis model output into structured results.
#[derive(Debug, Parser)]
#[command(name = "cropwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CROPWATCH_CONFIG")]
    pub config: Option<String>,

    /// Log extraction details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (provenance only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract a structured result from raw model output
    Extract(ExtractArgs),

    /// Show the expected answer shape for request kinds
    Schema(SchemaArgs),

    /// Ask the model for an analysis and extract the answer
    Analyze(AnalyzeArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Request kind (trends, insights, risk_assessment, image-health-analysis, general-analysis)
    #[arg(short, long)]
    pub kind: RequestKind,

    /// File holding the raw model output (stdin when omitted)
    #[arg(long)]
    pub file: Option<String>,
}

/// Arguments for the schema command.
#[derive(Debug, Parser)]
pub struct SchemaArgs {
    /// Request kind (all kinds when omitted)
    #[arg(short, long)]
    pub kind: Option<RequestKind>,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    #[command(subcommand)]
    pub target: AnalyzeTarget,
}

/// What to analyze.
#[derive(Debug, Clone, Subcommand)]
pub enum AnalyzeTarget {
    /// Trends, insights or risk assessment from field readings
    Field {
        /// Request kind (trends, insights or risk_assessment)
        #[arg(short, long)]
        kind: RequestKind,

        /// JSON file with the field readings
        #[arg(short, long)]
        data: String,

        /// Forecast horizon, e.g. "14 days"
        #[arg(short, long)]
        timeframe: Option<String>,
    },

    /// Plant health from a photo
    Image {
        /// Image file
        #[arg(short, long)]
        image: String,

        /// MIME type (guessed from the extension when omitted)
        #[arg(long)]
        mime: Option<String>,

        /// Description of what the photo shows
        #[arg(long)]
        context: Option<String>,
    },

    /// Summary of uploaded assets
    Upload {
        /// Uploaded asset as type:name (repeatable)
        #[arg(long = "file", value_name = "TYPE:NAME")]
        files: Vec<String>,

        /// Description of the assets
        #[arg(long)]
        context: Option<String>,
    },
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
