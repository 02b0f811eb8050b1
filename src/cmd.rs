//! External command plumbing.
//!
//! Every destructive operation is first built as a `CommandSpec` by a pure
//! function, so tests can assert on the exact program and arguments without
//! a disk. `run` is the only place that actually executes anything; the
//! whole pipeline aborts on the first nonzero exit status.

use anyhow::{Context, Result};
use std::process::Command;

use crate::errors::InstallerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Run a command with inherited stdio. Tools that prompt (cryptsetup,
/// passwd) talk to the terminal directly.
pub fn run(spec: &CommandSpec, dry_run: bool) -> Result<()> {
    if dry_run {
        log::info!("DRY RUN: {spec}");
        return Ok(());
    }
    log::debug!("exec: {spec}");
    let status = Command::new(&spec.program)
        .args(&spec.args)
        .status()
        .with_context(|| format!("failed to spawn {}", spec.program))?;
    if !status.success() {
        return Err(InstallerError::CommandFailed(format!("{spec} ({status})")).into());
    }
    Ok(())
}

/// Run a command and capture stdout (trimmed). Never dry-runs: callers only
/// use this for read-only queries (blkid, blockdev, lsblk).
pub fn output(spec: &CommandSpec) -> Result<String> {
    log::debug!("query: {spec}");
    let output = Command::new(&spec.program)
        .args(&spec.args)
        .output()
        .with_context(|| format!("failed to spawn {}", spec.program))?;
    if !output.status.success() {
        return Err(InstallerError::CommandFailed(format!("{spec} ({})", output.status)).into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_displays_as_command_line() {
        let spec = CommandSpec::new("sgdisk", &["--zap-all", "/dev/sda"]);
        assert_eq!(spec.to_string(), "sgdisk --zap-all /dev/sda");
    }

    #[test]
    fn dry_run_executes_nothing() {
        let spec = CommandSpec::new("definitely-not-a-real-binary", &[]);
        run(&spec, true).expect("dry run must not spawn");
    }

    #[test]
    fn failing_command_reports_spec() {
        let spec = CommandSpec::new("false", &[]);
        let err = run(&spec, false).unwrap_err();
        assert!(err.to_string().contains("false"));
    }
}
