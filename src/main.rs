use anyhow::Context;
use clap::Parser;

use dirschema::cli::Cli;
use dirschema::{format_errors, DsValidator, MetaConvention};

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level_filter())
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let convention = MetaConvention::from_tuple(
        cli.meta_path_prefix.clone(),
        cli.meta_path_suffix.clone(),
        cli.meta_file_prefix.clone(),
        cli.meta_file_suffix.clone(),
    )
    .context("invalid metadata convention")?;

    let mut validator = DsValidator::from_path(&cli.schema, convention)
        .with_context(|| format!("failed to load schema '{}'", cli.schema.display()))?;

    if let Some(basedir) = &cli.local_basedir {
        validator = validator.with_local_basedir(basedir.clone());
    }
    validator = validator.with_relative_prefix(cli.relative_prefix.clone());

    let report = validator
        .validate(&cli.target)
        .with_context(|| format!("failed to validate '{}'", cli.target.display()))?;

    if report.is_empty() {
        log::info!("no validation errors");
        return Ok(());
    }

    println!("{}", format_errors(&report).context("failed to render report")?);
    anyhow::bail!("{} path(s) failed validation", report.len());
}
