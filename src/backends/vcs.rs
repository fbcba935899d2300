//! Version control integration
//!
//! Git is driven through a [`CommandRunner`] so the branch/commit/push flow can
//! be exercised without a repository. A failing command is returned as
//! [`SweepError::CommandFailed`]; the caller decides how fatal that is.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::process::Command;

use crate::core::error::{SweepError, SweepResult};

static BRANCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._/-]+$").expect("Invalid BRANCH_RE regex"));

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandRunner {
    /// Run `program args...` inside `cwd`; a non-zero exit is an error
    fn run(&mut self, program: &str, args: &[&str], cwd: &Path) -> SweepResult<CommandOutput>;
}

/// Runs real processes
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[&str], cwd: &Path) -> SweepResult<CommandOutput> {
        let command_line = render_command(program, args);
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| SweepError::CommandFailed {
                command: command_line.clone(),
                stderr: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(SweepError::CommandFailed {
                command: command_line,
                stderr: stderr.trim_end().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

pub fn render_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reject names git would refuse or that could be read as options
pub fn validate_branch(name: &str) -> SweepResult<()> {
    let valid = BRANCH_RE.is_match(name)
        && !name.starts_with('-')
        && !name.starts_with('/')
        && !name.ends_with('/')
        && !name.ends_with(".lock")
        && !name.contains("..")
        && !name.contains("//");
    if valid {
        Ok(())
    } else {
        Err(SweepError::InvalidBranch(name.to_string()))
    }
}

/// One git command that ran successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitStep {
    pub command: String,
    pub output: CommandOutput,
}

/// Git steps around a rename pass
pub struct GitFlow<'r, R: CommandRunner> {
    runner: &'r mut R,
    repo: &'r Path,
    /// Steps run so far, in order
    steps: Vec<GitStep>,
}

impl<'r, R: CommandRunner> GitFlow<'r, R> {
    pub fn new(runner: &'r mut R, repo: &'r Path) -> Self {
        Self {
            runner,
            repo,
            steps: Vec::new(),
        }
    }

    fn git(&mut self, args: &[&str]) -> SweepResult<()> {
        let output = self.runner.run("git", args, self.repo)?;
        self.steps.push(GitStep {
            command: render_command("git", args),
            output,
        });
        Ok(())
    }

    /// Stash local edits, check out `default_branch`, create `branch` from it
    pub fn prepare(&mut self, default_branch: &str, branch: &str) -> SweepResult<()> {
        validate_branch(default_branch)?;
        validate_branch(branch)?;

        self.git(&["stash"])?;
        self.git(&["checkout", default_branch])?;
        self.git(&["checkout", "-b", branch])?;
        Ok(())
    }

    /// Stage everything, commit with `message`, push `branch` to origin
    pub fn publish(&mut self, branch: &str, message: &str) -> SweepResult<()> {
        validate_branch(branch)?;
        if message.trim().is_empty() {
            return Err(SweepError::InvalidInput(
                "commit message must not be empty".to_string(),
            ));
        }

        self.git(&["add", "."])?;
        self.git(&["commit", "-m", message])?;
        self.git(&["push", "origin", branch])?;
        Ok(())
    }

    pub fn steps(&self) -> &[GitStep] {
        &self.steps
    }
}
