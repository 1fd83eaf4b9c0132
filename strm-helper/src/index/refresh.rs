//! Delegation to the external index builder.
//!
//! Rebuilding the index from the live cloud listing is not done here; a
//! refresher just hands the index location to whatever tool owns that job.

use crate::utils::{Result, StrmError};
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// Placeholder replaced by the index database path in command arguments.
pub const INDEX_PLACEHOLDER: &str = "{index}";

pub trait IndexRefresher {
    /// Rebuild or update the index stored at `index_path`.
    fn refresh(&self, index_path: &Path) -> Result<()>;
}

/// Runs a configured program, e.g. `["p115updatedb", "--dbfile", "{index}"]`.
#[derive(Debug, Clone)]
pub struct CommandRefresher {
    program: String,
    args: Vec<String>,
}

impl CommandRefresher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full command line (program followed by its arguments).
    pub fn from_command_line(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| StrmError::Config("refresh command is empty".into()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    fn expanded_args(&self, index_path: &Path) -> Vec<String> {
        let index = index_path.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(INDEX_PLACEHOLDER, &index))
            .collect()
    }
}

impl IndexRefresher for CommandRefresher {
    fn refresh(&self, index_path: &Path) -> Result<()> {
        let args = self.expanded_args(index_path);
        tracing::info!(
            program = %self.program,
            index = %index_path.display(),
            "Refreshing remote index"
        );

        let started = Instant::now();
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| StrmError::Refresh(format!("failed to spawn {}: {}", self.program, e)))?;

        if !status.success() {
            return Err(StrmError::Refresh(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Remote index refreshed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_expansion() {
        let refresher = CommandRefresher::new(
            "p115updatedb",
            vec!["--dbfile".into(), "{index}".into(), "--top-dirs=0".into()],
        );
        let args = refresher.expanded_args(Path::new("/data/115.sqlite"));
        assert_eq!(args, vec!["--dbfile", "/data/115.sqlite", "--top-dirs=0"]);
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(matches!(
            CommandRefresher::from_command_line(&[]),
            Err(StrmError::Config(_))
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_refresh_exit_status() {
        let ok = CommandRefresher::from_command_line(&["true".to_string()]).unwrap();
        assert!(ok.refresh(Path::new("/tmp/index.sqlite")).is_ok());

        let failing = CommandRefresher::from_command_line(&["false".to_string()]).unwrap();
        assert!(matches!(
            failing.refresh(Path::new("/tmp/index.sqlite")),
            Err(StrmError::Refresh(_))
        ));

        let missing = CommandRefresher::new("/nonexistent/refresh-binary-12345", Vec::new());
        assert!(matches!(
            missing.refresh(Path::new("/tmp/index.sqlite")),
            Err(StrmError::Refresh(_))
        ));
    }
}
