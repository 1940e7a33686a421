//! Git facts collector
//!
//! Shells out to `git` in a fixed working directory and turns its output into
//! the records stored with each note. The four queries behind a snapshot are
//! independent and run concurrently.

pub mod parse;

use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

use crate::error::GitError;
use crate::model::{CommitRecord, GitSnapshot, RepositoryDescriptor, WorkingTreeStatus};

pub use parse::{
    is_single_line_form, normalize_root, parse_branch_list, parse_log, parse_status,
};

pub struct GitCollector {
    working_dir: PathBuf,
}

impl GitCollector {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Output is forced untranslated so stderr can be classified, and paths
    /// are printed verbatim instead of octal-quoted.
    async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        debug!(dir = %self.working_dir.display(), ?args, "running git");

        let output = Command::new("git")
            .args(["-c", "core.quotePath=false"])
            .args(args)
            .current_dir(&self.working_dir)
            .env("LC_ALL", "C")
            .env("LANGUAGE", "")
            .output()
            .await?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.to_lowercase().contains("not a git repository") {
            return Err(GitError::NotARepository(
                self.working_dir.display().to_string(),
            ));
        }
        Err(GitError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            stderr,
        })
    }

    /// Current branch name.
    ///
    /// Falls back to the `*` line of `git branch` when the direct query prints
    /// nothing (detached HEAD, old git).
    pub async fn current_branch(&self) -> Result<String, GitError> {
        match self.run(&["branch", "--show-current"]).await {
            Ok(out) if !out.trim().is_empty() => return Ok(out.trim().to_string()),
            Err(e @ GitError::NotARepository(_)) | Err(e @ GitError::Spawn(_)) => return Err(e),
            _ => {}
        }

        let listing = self.run(&["branch"]).await?;
        parse_branch_list(&listing)
            .ok_or_else(|| GitError::NotARepository(self.working_dir.display().to_string()))
    }

    /// Up to `count` most recent commits, newest first.
    pub async fn recent_commits(&self, count: usize) -> Result<Vec<CommitRecord>, GitError> {
        if count == 0 {
            return Err(GitError::InvalidCommitCount(count));
        }

        let limit = format!("-{count}");
        let format = format!("--pretty=format:{}", parse::LOG_FORMAT);
        let output = match self.run(&["log", &limit, &format, "--name-only"]).await {
            Ok(out) => out,
            Err(GitError::CommandFailed { stderr, .. }) if is_empty_history(&stderr) => {
                return Ok(Vec::new())
            }
            Err(e) => return Err(e),
        };

        let mut commits = parse_log(&output);
        commits.truncate(count);
        Ok(commits)
    }

    pub async fn working_tree_status(&self) -> Result<WorkingTreeStatus, GitError> {
        let output = self.run(&["status", "--porcelain"]).await?;
        Ok(parse_status(&output))
    }

    /// Normalized top-level directory of the repository
    pub async fn repository_root(&self) -> Result<String, GitError> {
        let output = self.run(&["rev-parse", "--show-toplevel"]).await?;
        let root = normalize_root(&output);
        if root.is_empty() {
            return Err(GitError::NotARepository(
                self.working_dir.display().to_string(),
            ));
        }
        Ok(root)
    }

    pub async fn repository(&self) -> Result<RepositoryDescriptor, GitError> {
        Ok(RepositoryDescriptor::from_path(self.repository_root().await?))
    }

    /// Collect branch, history, status and root concurrently.
    /// Any single failure fails the snapshot.
    pub async fn snapshot(&self, commit_count: usize) -> Result<GitSnapshot, GitError> {
        if commit_count == 0 {
            return Err(GitError::InvalidCommitCount(commit_count));
        }

        let (branch, commits, status, repo_path) = tokio::try_join!(
            self.current_branch(),
            self.recent_commits(commit_count),
            self.working_tree_status(),
            self.repository_root(),
        )?;

        Ok(GitSnapshot {
            branch,
            commits,
            status,
            repo_path,
        })
    }
}

fn is_empty_history(stderr: &str) -> bool {
    stderr.contains("does not have any commits") || stderr.contains("bad default revision")
}
