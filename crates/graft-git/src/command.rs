//! Runner for `git` subprocesses.
//!
//! Every operation that must honor git's command-line contract goes through
//! [`Git`], which pins the working directory and turns a non-zero exit into
//! [`Error::CommandFailed`].

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use bstr::ByteSlice;
use tracing::debug;

use crate::error::{Error, Result};

/// Invokes the `git` executable inside a fixed working directory.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Git<'a> {
    dir: &'a Path,
}

impl<'a> Git<'a> {
    pub(crate) const fn new(dir: &'a Path) -> Self {
        Self { dir }
    }

    /// Run git and return stdout as text with trailing whitespace removed.
    pub(crate) fn run(&self, args: &[&str]) -> Result<String> {
        let stdout = self.run_bytes(args)?;
        Ok(stdout.to_str_lossy().trim_end().to_string())
    }

    /// Run git and return stdout byte for byte.
    ///
    /// Patch text goes through here: file content need not be UTF-8.
    pub(crate) fn run_bytes(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = self.output(args, None)?;
        check(args, &output)?;
        Ok(output.stdout)
    }

    /// Run git with `input` written to its stdin.
    pub(crate) fn run_with_stdin(&self, args: &[&str], input: &[u8]) -> Result<String> {
        let output = self.output(args, Some(input))?;
        check(args, &output)?;
        Ok(output.stdout.to_str_lossy().trim_end().to_string())
    }

    /// Run git and hand back the raw output, whatever the exit status.
    ///
    /// For commands whose exit code carries meaning (`diff --quiet`,
    /// `config <key>`).
    pub(crate) fn probe(&self, args: &[&str]) -> Result<Output> {
        self.output(args, None)
    }

    fn output(&self, args: &[&str], stdin: Option<&[u8]>) -> Result<Output> {
        debug!(dir = %self.dir.display(), args = %args.join(" "), "running git");

        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(self.dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let Some(input) = stdin else {
            return Ok(cmd.stdin(Stdio::null()).output()?);
        };

        let mut child = cmd.stdin(Stdio::piped()).spawn()?;
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(input)?;
            // Dropping the handle closes stdin so git sees EOF.
        }
        Ok(child.wait_with_output()?)
    }
}

/// Convert a failed exit status into [`Error::CommandFailed`].
pub(crate) fn check(args: &[&str], output: &Output) -> Result<()> {
    if output.status.success() {
        Ok(())
    } else {
        Err(failure(args, output))
    }
}

/// Build the error describing an unsuccessful git invocation.
pub(crate) fn failure(args: &[&str], output: &Output) -> Error {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stderr = if stderr.is_empty() {
        // `git am` reports apply failures on stdout.
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    };

    Error::CommandFailed {
        command: args.join(" "),
        stderr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_trims_output() {
        let temp = TempDir::new().unwrap();
        let version = Git::new(temp.path()).run(&["--version"]).unwrap();
        assert!(version.starts_with("git version"));
        assert!(!version.ends_with('\n'));
    }

    #[test]
    fn test_failed_command_reports_args() {
        let temp = TempDir::new().unwrap();
        let err = Git::new(temp.path())
            .run(&["rev-parse", "--verify", "HEAD"])
            .unwrap_err();

        match err {
            Error::CommandFailed { command, stderr } => {
                assert_eq!(command, "rev-parse --verify HEAD");
                assert!(!stderr.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stdin_is_forwarded() {
        let temp = TempDir::new().unwrap();
        let hash = Git::new(temp.path())
            .run_with_stdin(&["hash-object", "--stdin"], b"hello\n")
            .unwrap();
        assert_eq!(hash, "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn test_run_bytes_keeps_non_utf8() {
        let temp = TempDir::new().unwrap();
        let git = Git::new(temp.path());
        git.run(&["init", "-q"]).unwrap();
        let blob = git
            .run_with_stdin(&["hash-object", "-w", "--stdin"], b"caf\xe9\n")
            .unwrap();

        let content = git.run_bytes(&["cat-file", "blob", &blob]).unwrap();
        assert_eq!(content, b"caf\xe9\n");
    }
}
