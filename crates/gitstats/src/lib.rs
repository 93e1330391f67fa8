// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitstats library
//!
//! Walks the commit history of a git repository, runs a set of shell tasks at
//! every commit, and streams one record per commit through an output
//! formatter. The binary is a thin layer over [`run::GitStats`]; everything is
//! exported here for integration tests and for use as a library.

pub mod cli;
pub mod config;
pub mod engine;
pub mod format;
pub mod record;
pub mod run;
pub mod workspace;
