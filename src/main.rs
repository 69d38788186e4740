mod cli;
mod genes;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;
mod sample;
mod store;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::{Cli, Commands, GenesArgs, QueryArgs, QueryCommand, RunArgs, SampleArgs};
use crate::genes::defs::alias_of;
use crate::input::discover_inputs;
use crate::model::config::PipelineConfig;
use crate::pipeline::stage6_output::{StoreMode, write_outputs};
use crate::pipeline::{RunInputs, run_pipeline};
use crate::store::{JsonlStore, RecordStore};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.quiet);

    match cli.command {
        Commands::Run(args) => handle_run(args),
        Commands::Genes(args) => handle_genes(args),
        Commands::Query(args) => handle_query(args),
        Commands::Sample(args) => handle_sample(args),
    }
}

fn load_config(path: Option<&Path>, batch_size: Option<usize>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default_v1(),
    };
    let config = config.with_batch_size(batch_size);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn handle_run(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), args.batch_size)?;
    let files = discover_inputs(&args.input).context("failed to resolve --input")?;
    tracing::info!(
        files = files.len(),
        targets = config.target_genes.len(),
        pathways = config.pathways.len(),
        batch_size = config.batch_size,
        "run started"
    );

    let output = run_pipeline(&RunInputs {
        files: &files,
        cohort: args.cohort.as_deref(),
        clinical: args.clinical.as_deref(),
        config: &config,
    });

    let mode = if args.append {
        StoreMode::Append
    } else {
        StoreMode::Replace
    };
    let paths = write_outputs(&output, &config, &args.out, mode)
        .with_context(|| format!("failed to write outputs to {}", args.out.display()))?;
    tracing::info!(
        store = %paths.records.display(),
        stored = paths.stored,
        scores = %paths.pathway_scores.display(),
        report = %paths.report.display(),
        "run complete"
    );

    if output.files_processed() == 0 {
        anyhow::bail!(
            "no input file produced patient records; see {}",
            paths.summary.display()
        );
    }
    Ok(())
}

fn handle_genes(args: GenesArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), None)?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "target genes ({}):", config.target_genes.len())?;
    for symbol in config.target_genes.symbols() {
        match alias_of(symbol) {
            Some(alias) => writeln!(out, "{}\t(alias {})", symbol, alias)?,
            None => writeln!(out, "{}", symbol)?,
        }
    }
    writeln!(out, "pathway groups ({}):", config.pathways.len())?;
    for group in &config.pathways {
        writeln!(
            out,
            "{}\t{}\t{}",
            group.name,
            group.weight,
            group.genes.join(",")
        )?;
    }
    Ok(())
}

fn handle_query(args: QueryArgs) -> Result<()> {
    let store = JsonlStore::new(&args.store);
    if !store.path().exists() {
        anyhow::bail!("record store {} does not exist", args.store.display());
    }
    let mut out = std::io::stdout().lock();
    match args.command {
        QueryCommand::Cohorts => {
            for cohort in store.distinct_cohorts()? {
                writeln!(out, "{}", cohort)?;
            }
        }
        QueryCommand::Count => {
            writeln!(out, "{}", store.count()?)?;
        }
        QueryCommand::Cohort { name, limit } => {
            for record in store.query_by_cohort(&name, limit)? {
                writeln!(out, "{}", serde_json::to_string(&record)?)?;
            }
        }
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<()> {
    let config = load_config(args.config.as_deref(), None)?;
    let path = sample::write_sample_dataset(&args.out, &config.target_genes, args.seed)
        .with_context(|| format!("failed to write sample dataset to {}", args.out.display()))?;
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
