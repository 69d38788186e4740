use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::sample::DEFAULT_SEED;

#[derive(Debug, Parser)]
#[command(
    name = "kira-cohortexpr",
    version,
    about = "Cohort gene-expression ingestion and pathway scoring"
)]
pub struct Cli {
    #[arg(long, global = true, default_value_t = false, help = "Only log warnings and errors")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest expression tables into patient records and reports.
    Run(RunArgs),
    /// Print target genes and pathway groups.
    Genes(GenesArgs),
    /// Query a records.jsonl store.
    Query(QueryArgs),
    /// Write a synthetic expression table.
    Sample(SampleArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, required = true, num_args = 1.., help = "Expression table or directory (repeatable)")]
    pub input: Vec<PathBuf>,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, help = "Clinical table to merge by patient identifier")]
    pub clinical: Option<PathBuf>,

    #[arg(long, help = "JSON configuration overriding the built-in profile")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Cohort label for every input (default: file name before the first '_')")]
    pub cohort: Option<String>,

    #[arg(long, help = "Patients per record batch")]
    pub batch_size: Option<usize>,

    #[arg(long, default_value_t = false, help = "Append to an existing records.jsonl")]
    pub append: bool,
}

#[derive(Debug, Args)]
pub struct GenesArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[arg(long)]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: QueryCommand,
}

#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Distinct cohort labels.
    Cohorts,
    /// Number of stored records.
    Count,
    /// Records of one cohort as JSON lines.
    Cohort {
        name: String,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    #[arg(long)]
    pub config: Option<PathBuf>,
}
