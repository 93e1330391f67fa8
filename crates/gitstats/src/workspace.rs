// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Working directories
//!
//! A run clones into a fresh temporary directory that outlives the process
//! unless the user agrees to delete it. The `clear` command instead works on
//! a fixed local workspace under the platform data directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Prefix of temporary clone directories
pub const TEMP_PREFIX: &str = "gitstats_";

/// Create an empty temporary directory that is not removed on drop
///
/// # Errors
///
/// Returns an IO error if the directory cannot be created.
pub fn create_temporary() -> io::Result<PathBuf> {
    let dir = tempfile::Builder::new().prefix(TEMP_PREFIX).tempdir()?;
    let path = dir.keep();
    debug!(path = %path.display(), "Created working directory");
    Ok(path)
}

/// Remove a working directory and everything in it
///
/// # Errors
///
/// Returns an IO error if the directory cannot be removed.
pub fn remove(path: &Path) -> io::Result<()> {
    info!("Deleting {}", path.display());
    fs::remove_dir_all(path)
}

/// Default location of the workspace handled by `clear`
///
/// Platform-specific:
/// - macOS: ~/Library/Application Support/gitstats/repository
/// - Linux: ~/.local/share/gitstats/repository
/// - Windows: %LOCALAPPDATA%\gitstats\repository
#[must_use]
pub fn default_workspace() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gitstats")
        .join("repository")
}

/// What to do with the working directory once a run has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPolicy {
    /// Ask on the terminal
    #[default]
    Ask,
    /// Leave the directory in place
    Keep,
    /// Delete without asking
    Delete,
}

impl CleanupPolicy {
    /// Policy selected by the `--keep` / `--delete` flags
    #[must_use]
    pub fn from_flags(keep: bool, delete: bool) -> Self {
        match (keep, delete) {
            (true, _) => Self::Keep,
            (false, true) => Self::Delete,
            (false, false) => Self::Ask,
        }
    }

    /// Apply the policy to `path`, prompting through `input`/`prompt` for `Ask`
    ///
    /// Returns whether the directory was deleted.
    ///
    /// # Errors
    ///
    /// Returns an IO error if prompting or deleting fails.
    pub fn apply(
        self,
        path: &Path,
        input: &mut impl BufRead,
        prompt: &mut impl Write,
    ) -> io::Result<bool> {
        let delete = match self {
            Self::Keep => false,
            Self::Delete => true,
            Self::Ask => confirm(
                &format!("Delete directory {}?", path.display()),
                input,
                prompt,
            )?,
        };

        if delete {
            remove(path)?;
        } else {
            info!("Not deleting {}", path.display());
        }
        Ok(delete)
    }
}

/// Ask a yes/no question, defaulting to yes
///
/// An empty answer or end of input counts as yes.
///
/// # Errors
///
/// Returns an IO error if writing the prompt or reading the answer fails.
pub fn confirm(question: &str, input: &mut impl BufRead, prompt: &mut impl Write) -> io::Result<bool> {
    write!(prompt, "{question} [Y/n] ")?;
    prompt.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "" | "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(answer: &str) -> (bool, String) {
        let mut prompt = Vec::new();
        let accepted =
            confirm("Delete?", &mut Cursor::new(answer.as_bytes()), &mut prompt).expect("confirm");
        (accepted, String::from_utf8(prompt).expect("utf8"))
    }

    #[test]
    fn test_confirm_defaults_to_yes() {
        assert_eq!(ask("\n"), (true, "Delete? [Y/n] ".to_string()));
        assert!(ask("").0);
        assert!(ask("Y\n").0);
        assert!(ask(" yes \n").0);
    }

    #[test]
    fn test_confirm_rejects_anything_else() {
        assert!(!ask("n\n").0);
        assert!(!ask("No\n").0);
        assert!(!ask("maybe\n").0);
    }

    #[test]
    fn test_policy_from_flags() {
        assert_eq!(CleanupPolicy::from_flags(false, false), CleanupPolicy::Ask);
        assert_eq!(CleanupPolicy::from_flags(true, false), CleanupPolicy::Keep);
        assert_eq!(CleanupPolicy::from_flags(false, true), CleanupPolicy::Delete);
    }

    #[test]
    fn test_create_temporary_persists() {
        let path = create_temporary().expect("create");
        assert!(path.is_dir());
        assert!(
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(TEMP_PREFIX))
        );
        remove(&path).expect("remove");
        assert!(!path.exists());
    }

    #[test]
    fn test_apply_policies() {
        let keep = create_temporary().expect("create");
        let deleted = CleanupPolicy::Keep
            .apply(&keep, &mut Cursor::new(Vec::new()), &mut io::sink())
            .expect("apply");
        assert!(!deleted);
        assert!(keep.exists());

        let deleted = CleanupPolicy::Ask
            .apply(&keep, &mut Cursor::new(b"n\n".to_vec()), &mut io::sink())
            .expect("apply");
        assert!(!deleted);
        assert!(keep.exists());

        let deleted = CleanupPolicy::Delete
            .apply(&keep, &mut Cursor::new(Vec::new()), &mut io::sink())
            .expect("apply");
        assert!(deleted);
        assert!(!keep.exists());
    }

    #[test]
    fn test_default_workspace() {
        let path = default_workspace();
        assert!(path.ends_with("gitstats/repository"));
    }
}
