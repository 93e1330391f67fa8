// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! CLI parsing tests
//!
//! These tests cover the logging flags, the subcommand arguments, and the
//! interactions between them.

use std::path::PathBuf;

use clap::Parser;
use gitstats::cli::{Cli, Command, ConfigArgs};
use gitstats::workspace::CleanupPolicy;
use tracing::Level;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("gitstats").chain(args.iter().copied()))
        .expect("parse should succeed")
}

// ============================================================================
// --verbose / --quiet
// ============================================================================

#[test]
fn test_verbose_short_flag_v() {
    let cli = parse(&["-v", "clear"]);
    assert!(cli.verbose);
    assert!(!cli.quiet);
    assert_eq!(cli.log_level(), Level::DEBUG);
}

#[test]
fn test_quiet_long_flag() {
    let cli = parse(&["--quiet", "clear"]);
    assert!(cli.quiet);
    assert_eq!(cli.log_level(), Level::WARN);
}

#[test]
fn test_no_flags_means_info_level() {
    let cli = parse(&["clear"]);
    assert_eq!(cli.log_level(), Level::INFO);
}

#[test]
fn test_verbose_and_quiet_verbose_wins() {
    let cli = parse(&["-q", "-v", "clear"]);
    assert!(cli.verbose && cli.quiet);
    assert_eq!(cli.log_level(), Level::DEBUG);
}

#[test]
fn test_logging_flags_are_global() {
    let cli = parse(&["run", "repo", "-v"]);
    assert!(cli.verbose);

    let cli = parse(&["run-once", "--quiet"]);
    assert!(cli.quiet);
}

#[test]
fn test_verbose_flag_value_syntax_not_supported() {
    let result = Cli::try_parse_from(["gitstats", "--verbose=true", "clear"]);
    assert!(result.is_err(), "Boolean flags don't support =value syntax");
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_with_tasks_and_options() {
    let cli = parse(&[
        "run",
        "https://example.com/repo.git",
        "files",
        "todos",
        "--format",
        "ndjson",
        "--branch",
        "develop",
        "--config",
        "/etc/gitstats.yml",
        "--keep",
    ]);

    match cli.command {
        Command::Run {
            ref repository,
            ref tasks,
            ref format,
            ref branch,
            ref config,
            ..
        } => {
            assert_eq!(repository, "https://example.com/repo.git");
            assert_eq!(tasks, &["files", "todos"]);
            assert_eq!(format, "ndjson");
            assert_eq!(branch.as_deref(), Some("develop"));
            assert_eq!(config.config, PathBuf::from("/etc/gitstats.yml"));
        }
        ref other => panic!("Expected Run, got {other:?}"),
    }
    assert_eq!(cli.command.cleanup_policy(), CleanupPolicy::Keep);
}

#[test]
fn test_run_short_flags() {
    let cli = parse(&["run", "repo", "-f", "json", "-b", "main", "-c", "other.yml"]);
    match cli.command {
        Command::Run {
            format,
            branch,
            config,
            ..
        } => {
            assert_eq!(format, "json");
            assert_eq!(branch.as_deref(), Some("main"));
            assert_eq!(config.config, PathBuf::from("other.yml"));
        }
        other => panic!("Expected Run, got {other:?}"),
    }
}

#[test]
fn test_run_requires_repository() {
    assert!(Cli::try_parse_from(["gitstats", "run"]).is_err());
}

#[test]
fn test_keep_and_delete_conflict() {
    let result = Cli::try_parse_from(["gitstats", "run", "repo", "--keep", "--delete"]);
    assert!(result.is_err());
}

#[test]
fn test_run_asks_by_default() {
    let cli = parse(&["run", "repo"]);
    assert_eq!(cli.command.cleanup_policy(), CleanupPolicy::Ask);
}

// ============================================================================
// run-once and clear
// ============================================================================

#[test]
fn test_run_once_defaults() {
    let cli = parse(&["run-once"]);
    match cli.command {
        Command::RunOnce {
            directory,
            tasks,
            format,
            config,
        } => {
            assert_eq!(directory, PathBuf::from("."));
            assert!(tasks.is_empty());
            assert_eq!(format, "csv");
            if std::env::var_os("GITSTATS_CONFIG").is_none() {
                assert_eq!(config, ConfigArgs::default());
            }
        }
        other => panic!("Expected RunOnce, got {other:?}"),
    }
}

#[test]
fn test_run_once_directory_and_tasks() {
    let cli = parse(&["run-once", "/src/project", "loc"]);
    match cli.command {
        Command::RunOnce {
            directory, tasks, ..
        } => {
            assert_eq!(directory, PathBuf::from("/src/project"));
            assert_eq!(tasks, vec!["loc".to_string()]);
        }
        other => panic!("Expected RunOnce, got {other:?}"),
    }
}

#[test]
fn test_clear_with_workspace_and_branch() {
    let cli = parse(&["clear", "--workspace", "/tmp/ws", "--branch", "main"]);
    assert_eq!(cli.command.workspace_path(), Some(PathBuf::from("/tmp/ws")));
    match cli.command {
        Command::Clear { branch, .. } => assert_eq!(branch, "main"),
        other => panic!("Expected Clear, got {other:?}"),
    }
}

#[test]
fn test_workspace_path_only_for_clear() {
    assert!(parse(&["run", "repo"]).command.workspace_path().is_none());
}

#[test]
fn test_unknown_subcommand() {
    assert!(Cli::try_parse_from(["gitstats", "ingest"]).is_err());
}
