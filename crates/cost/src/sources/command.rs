//! External pricing command cost source.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{CostSource, CostSourceError};
use crate::report::CostReport;

/// Runs an external pricing program and parses the JSON object it prints.
///
/// The program must exit successfully and write exactly one JSON object of
/// cost fields to stdout. Anything on stderr is logged.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append arguments passed to the program.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn failure(&self, message: impl Into<String>) -> CostSourceError {
        CostSourceError::Command {
            program: self.program.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl CostSource for CommandSource {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn get_total_cost(&self) -> Result<CostReport, CostSourceError> {
        debug!(program = %self.program, args = ?self.args, "Running pricing command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.failure(format!("failed to spawn: {e}")))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!(program = %self.program, stderr = %stderr.trim(), "Pricing command wrote to stderr");
        }

        if !output.status.success() {
            return Err(self.failure(format!("exited with {}", output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        CostReport::from_json_str(stdout.trim())
    }
}
