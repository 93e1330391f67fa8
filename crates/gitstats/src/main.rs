// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitstats: run shell tasks against every commit of a git repository
//!
//! Data lines go to stdout. Progress, warnings and the cleanup prompt go to
//! stderr, so the output can be redirected to a file while the run is watched.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use gitstats::cli::{Cli, Command};
use gitstats::config::Configuration;
use gitstats::run::{GitStats, RunRequest};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the records
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(cli.log_level().into()),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let gitstats = GitStats::with_defaults();
    let stdout = io::stdout();

    match &cli.command {
        Command::Run {
            repository,
            tasks,
            format,
            branch,
            config,
            ..
        } => {
            let configuration = Configuration::load(&config.config)?;
            let mut request = RunRequest::new(repository.as_str())
                .with_tasks(tasks.iter().cloned())
                .with_format(format.as_str());
            if let Some(branch) = branch {
                request = request.with_branch(branch.as_str());
            }

            let summary = gitstats
                .run(&configuration, &request, &mut stdout.lock())
                .with_context(|| format!("Run over {repository} failed"))?;

            cli.command
                .cleanup_policy()
                .apply(&summary.workdir, &mut io::stdin().lock(), &mut io::stderr())
                .with_context(|| format!("Cleanup of {} failed", summary.workdir.display()))?;
        }
        Command::RunOnce {
            directory,
            tasks,
            format,
            config,
        } => {
            let configuration = Configuration::load(&config.config)?;
            gitstats
                .run_once(&configuration, directory, tasks, format, &mut stdout.lock())
                .with_context(|| format!("Run in {} failed", directory.display()))?;
        }
        Command::Clear { branch, .. } => {
            let workspace = cli
                .command
                .workspace_path()
                .context("No workspace to clear")?;
            gitstats
                .clear(&workspace, branch)
                .with_context(|| format!("Clearing {} failed", workspace.display()))?;
        }
    }

    io::stderr().flush()?;
    Ok(())
}
